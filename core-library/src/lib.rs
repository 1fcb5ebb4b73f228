//! # Library Management Module
//!
//! Owns the in-memory music database: a hierarchical tree of directories,
//! songs and playlist metadata records, guarded by the database lock.
//!
//! ## Overview
//!
//! This module manages:
//! - Domain models for directories, songs and playlist records
//! - The directory tree with keyed child and song containers
//! - The process-wide database lock with scoped acquisition
//! - UTF-8 URI helpers shared by the update code

pub mod database;
pub mod error;
pub mod models;
pub mod tree;
pub mod uri;

pub use database::{Database, DatabaseGuard};
pub use error::{LibraryError, Result};
pub use models::{
    DetachedSong, DirectoryId, DirectoryKind, PlaylistInfo, PlaylistVector, Song,
};
pub use tree::{Directory, DirectoryTree, LookupResult};
