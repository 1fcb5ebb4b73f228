//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides implementations of the bridge traits backed by the
//! local filesystem:
//! - `Storage` using a music directory and `tokio::fs`
//! - `InputStreamProvider` reading local files with `tokio::fs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{LocalStorage, TokioInputStreamProvider};
//! use bridge_traits::{InputStreamProvider, Storage};
//!
//! #[tokio::main]
//! async fn main() {
//!     let storage = LocalStorage::new("/srv/music");
//!     let input = TokioInputStreamProvider::new();
//!
//!     let path = storage.map_utf8("albums/list.m3u");
//!     let stream = input.open_ready(&path).await.unwrap();
//! }
//! ```

mod filesystem;

pub use filesystem::{LocalStorage, TokioInputStreamProvider};
