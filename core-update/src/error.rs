use bridge_traits::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Storage error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Database error: {0}")]
    Library(#[from] LibraryError),

    #[error("Failed to read playlist {uri}: {message}")]
    Playlist { uri: String, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },
}

pub type Result<T> = std::result::Result<T, UpdateError>;
