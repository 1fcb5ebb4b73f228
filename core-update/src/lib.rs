//! # Database Update Module
//!
//! Folds playlist files into the music database during an update pass.
//!
//! ## Overview
//!
//! This module manages:
//! - The playlist plugin contract and registry
//! - Expanding playlist files into virtual directories of tracks
//! - Keeping per-directory records of playlists that are not expanded
//! - Pruning playlist tracks whose target disappeared
//!
//! ## Components
//!
//! - **Playlist Plugins** (`playlist`): `PlaylistPlugin`, `SongEnumerator`, `PlaylistRegistry`
//! - **Database Editor** (`editor`): Song and directory removal with change events
//! - **Update Walk** (`walk`): State of one update pass and its modified flag
//! - **Playlist Ingestion** (`playlist_update`): Playlist files into the tree
//! - **Purge** (`purge`): Removal of dangling playlist tracks

pub mod editor;
pub mod error;
pub mod playlist;
pub mod playlist_update;
pub mod purge;
pub mod walk;

pub use editor::DatabaseEditor;
pub use error::{Result, UpdateError};
pub use playlist::{PlaylistPlugin, PlaylistRegistry, SongEnumerator, BAIL_URI};
pub use playlist_update::PlaylistScan;
pub use walk::UpdateWalk;
