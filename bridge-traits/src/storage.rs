//! Storage and Input Stream Abstractions
//!
//! Provides platform-agnostic traits for resolving database URIs against the
//! music storage and for opening resources ready for reading.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Kind of object a storage path refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular,
    Directory,
    Other,
}

/// File information returned by [`Storage::get_info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFileInfo {
    pub kind: FileKind,
    pub size: u64,
    /// Modification time as a Unix timestamp in seconds
    pub mtime: i64,
}

impl StorageFileInfo {
    /// Build info for a regular file
    pub fn regular(size: u64, mtime: i64) -> Self {
        Self {
            kind: FileKind::Regular,
            size,
            mtime,
        }
    }

    pub fn is_regular(&self) -> bool {
        self.kind == FileKind::Regular
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// Music storage trait
///
/// Abstracts the location holding the music files:
/// - Desktop: A local directory tree
/// - NAS/remote: A mounted or network-backed share
///
/// URIs handed to the storage are UTF-8, `/`-separated and relative to the
/// storage root. The empty string denotes the root itself.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::Storage;
///
/// async fn playlist_exists(storage: &dyn Storage, uri: &str) -> Result<bool> {
///     let path = storage.map_utf8(uri);
///     storage.exists(&path).await
/// }
/// ```
#[async_trait]
pub trait Storage: Send + Sync {
    /// Map a database URI to the storage path it lives at
    ///
    /// The result is what [`exists`](Self::exists) and
    /// [`InputStreamProvider::open_ready`] expect.
    fn map_utf8(&self, uri_utf8: &str) -> String;

    /// Check whether a mapped storage path exists
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Get information about the object at a database URI
    async fn get_info(&self, uri_utf8: &str) -> Result<StorageFileInfo>;
}

/// A resource opened and ready for reading
#[derive(Debug, Clone)]
pub struct InputStream {
    /// Location the stream was opened from
    pub uri: String,
    /// MIME type, when the host knows it
    pub mime_type: Option<String>,
    /// Complete stream contents
    pub data: Bytes,
}

impl InputStream {
    pub fn new(uri: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
            data: data.into(),
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Input stream trait
///
/// Opens a mapped storage path (or an absolute URL the host understands) and
/// returns once the stream is ready, i.e. its contents are available.
///
/// Playlists are small, so the stream is delivered fully buffered.
#[async_trait]
pub trait InputStreamProvider: Send + Sync {
    /// Open `uri` and wait until it is ready for reading
    ///
    /// # Errors
    /// Returns error if the resource cannot be opened or read
    async fn open_ready(&self, uri: &str) -> Result<InputStream>;
}
