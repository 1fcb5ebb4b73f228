//! Domain models for the music database
//!
//! This module contains the entities stored in the directory tree together
//! with the detached song records produced by playlist plugins.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a directory node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectoryId(pub Uuid);

impl DirectoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for DirectoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// What a directory node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectoryKind {
    /// A real directory in the music storage
    #[default]
    Regular,
    /// A virtual directory holding the expanded contents of one playlist file
    Playlist,
}

impl DirectoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Playlist => "playlist",
        }
    }
}

/// A song as yielded by a playlist plugin, not yet attached to the tree
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetachedSong {
    /// URI as written in the playlist (relative path, absolute path or URL)
    uri: String,
    /// Track title, if the playlist carried one
    pub title: Option<String>,
    /// Track artist, if the playlist carried one
    pub artist: Option<String>,
    /// Duration in milliseconds, if known
    pub duration_ms: Option<u64>,
    /// Modification time (Unix seconds), 0 when unknown
    pub mtime: i64,
}

impl DetachedSong {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// A song owned by a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// File name, unique within the owning directory
    pub filename: String,
    /// Owning directory
    pub directory: DirectoryId,
    /// Reference to the real song this entry stands for.
    ///
    /// Empty for ordinary songs. Playlist tracks hold either an absolute
    /// URI or a path relative to the virtual directory.
    pub target: String,
    /// Set when some playlist resolves to this song
    pub in_playlist: bool,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_ms: Option<u64>,
    pub mtime: i64,
}

impl Song {
    pub fn new(filename: impl Into<String>, directory: DirectoryId) -> Self {
        Self {
            filename: filename.into(),
            directory,
            target: String::new(),
            in_playlist: false,
            title: None,
            artist: None,
            duration_ms: None,
            mtime: 0,
        }
    }

    /// Take over a detached song, moving it into `directory`.
    ///
    /// The file name starts out as the detached URI; callers assign the
    /// final name before attaching the song to the tree.
    pub fn from_detached(detached: DetachedSong, directory: DirectoryId) -> Self {
        Self {
            filename: detached.uri,
            directory,
            target: String::new(),
            in_playlist: false,
            title: detached.title,
            artist: detached.artist,
            duration_ms: detached.duration_ms,
            mtime: detached.mtime,
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    pub fn has_target(&self) -> bool {
        !self.target.is_empty()
    }
}

/// Metadata record for a playlist file that was not expanded into a
/// virtual directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub name: String,
    pub mtime: i64,
}

impl PlaylistInfo {
    pub fn new(name: impl Into<String>, mtime: i64) -> Self {
        Self {
            name: name.into(),
            mtime,
        }
    }
}

/// Playlist records of one directory, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistVector {
    items: Vec<PlaylistInfo>,
}

impl PlaylistVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, or refresh the mtime of the one with the same name.
    ///
    /// Returns `true` if the vector changed.
    pub fn update_or_insert(&mut self, pi: PlaylistInfo) -> bool {
        match self.items.iter_mut().find(|existing| existing.name == pi.name) {
            Some(existing) => {
                if existing.mtime == pi.mtime {
                    return false;
                }
                existing.mtime = pi.mtime;
            }
            None => self.items.insert(0, pi),
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaylistInfo> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
