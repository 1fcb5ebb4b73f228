//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the database update core and the
//! host that owns the music storage. The core never touches the filesystem
//! directly; every capability it needs goes through one of the traits below.
//!
//! ## Traits
//!
//! ### Storage & I/O
//! - [`Storage`](storage::Storage) - Map database URIs to storage paths, check existence, stat files
//! - [`InputStreamProvider`](storage::InputStreamProvider) - Open a resource ready for reading
//!
//! ### Utilities
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type for consistent
//! error handling. Platform implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Include error context (e.g., file paths)
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds so a single implementation
//! can be shared between the update worker and request-serving tasks.
//!
//! ## Examples
//!
//! ### Implementing Storage
//!
//! ```ignore
//! use bridge_traits::storage::{Storage, StorageFileInfo};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyStorage {
//!     root: String,
//! }
//!
//! #[async_trait]
//! impl Storage for MyStorage {
//!     fn map_utf8(&self, uri_utf8: &str) -> String {
//!         format!("{}/{}", self.root, uri_utf8)
//!     }
//!
//!     async fn exists(&self, path: &str) -> Result<bool> {
//!         // Implementation
//!         todo!()
//!     }
//!
//!     async fn get_info(&self, uri_utf8: &str) -> Result<StorageFileInfo> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod logger;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use storage::{FileKind, InputStream, InputStreamProvider, Storage, StorageFileInfo};
