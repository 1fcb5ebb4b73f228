//! # Playlist Ingestion
//!
//! Folds playlist files found by the walk into the database.
//!
//! ## Workflow
//!
//! 1. Find the plugin for the file suffix ([`UpdateWalk::update_playlist_file`])
//! 2. Plugins that do not expand playlists get a [`PlaylistInfo`] record
//! 3. Otherwise get or recreate the virtual directory for the file
//! 4. Open the playlist and pull its entries one by one
//!    ([`UpdateWalk::update_playlist_entries`]): every entry becomes a
//!    `trackNNNN` song whose target points back at the real file, and a real
//!    song of the same name in the containing directory is dropped
//! 5. Conclude: an empty or failed playlist loses its virtual directory
//!
//! A missing file, the bail sentinel or any read error ends the scan of
//! that one playlist. Songs already dropped from the containing directory
//! stay dropped; only the virtual directory is discarded.

use bridge_traits::StorageFileInfo;
use core_library::{uri, DirectoryId, PlaylistInfo, Song};
use core_runtime::events::{CoreEvent, UpdateEvent};
use std::collections::HashSet;
use tracing::{debug, error, warn};

use crate::error::{Result, UpdateError};
use crate::playlist::{PlaylistPlugin, SongEnumerator, BAIL_URI};
use crate::walk::UpdateWalk;

/// How scanning one playlist ended
#[derive(Debug)]
pub enum PlaylistScan {
    /// All entries were read; `tracks` of them went into the virtual directory
    Ingested { tracks: usize },
    /// No enumerator could be opened for the playlist
    Unsupported,
    /// The plugin yielded the bail sentinel
    Bailed,
    /// An entry references a file that does not exist
    Aborted(UpdateError),
    /// Opening or reading the playlist failed
    Failed(UpdateError),
}

impl PlaylistScan {
    pub fn is_ingested(&self) -> bool {
        matches!(self, Self::Ingested { .. })
    }

    pub fn error(&self) -> Option<&UpdateError> {
        match self {
            Self::Aborted(err) | Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Target stored in a playlist track for the entry `entry_uri`.
///
/// Relative entries are relative to the directory holding the playlist,
/// which is the parent of the virtual directory.
fn track_target(entry_uri: &str) -> String {
    if uri::is_absolute_or_has_scheme(entry_uri) {
        entry_uri.to_string()
    } else {
        format!("../{}", entry_uri)
    }
}

fn track_filename(track: u32) -> String {
    format!("track{:04}", track)
}

impl UpdateWalk {
    /// Handle a playlist file found in `directory`.
    ///
    /// Returns `false` if no plugin handles `suffix`. Failures while reading
    /// the playlist are logged and contained; they never reach the caller.
    pub async fn update_playlist_file(
        &mut self,
        directory: DirectoryId,
        name: &str,
        suffix: &str,
        info: &StorageFileInfo,
    ) -> bool {
        let Some(plugin) = self.registry.find_by_suffix(suffix) else {
            return false;
        };

        if self.registry.as_folder(plugin.as_ref()) {
            self.update_playlist_as_folder(directory, name, info, plugin.as_ref())
                .await;
        } else {
            let pi = PlaylistInfo::new(name, info.mtime);
            let mut tree = self.db.lock();
            match tree.directory_mut(directory) {
                Ok(node) => {
                    if node.playlists.update_or_insert(pi) {
                        self.modified = true;
                    }
                }
                Err(err) => error!(name = %name, error = %err, "Failed to record playlist"),
            }
        }

        true
    }

    /// Expand the playlist file `name` in `parent` into a virtual directory.
    pub async fn update_playlist_as_folder(
        &mut self,
        parent: DirectoryId,
        name: &str,
        info: &StorageFileInfo,
        plugin: &dyn PlaylistPlugin,
    ) -> PlaylistScan {
        let uri = match self.child_uri(parent, name) {
            Ok(uri) => uri,
            Err(err) => return self.conclude_playlist(name, None, PlaylistScan::Failed(err)),
        };

        if !plugin.supports_stream() {
            debug!(uri = %uri, "Plugin cannot read streams");
            return PlaylistScan::Unsupported;
        }

        let directory = match self.make_virtual_directory_if_modified(parent, name, info) {
            Ok(directory) => directory,
            Err(err) => return self.conclude_playlist(&uri, None, PlaylistScan::Failed(err)),
        };

        let path = self.storage.map_utf8(&uri);
        debug!(path = %path, "scanning playlist");

        let scan = match self.open_playlist(&path, plugin).await {
            Ok(Some(mut enumerator)) => {
                self.ingest_entries(parent, directory, enumerator.as_mut())
                    .await
            }
            Ok(None) => PlaylistScan::Unsupported,
            Err(err) => PlaylistScan::Failed(err),
        };

        self.conclude_playlist(&uri, directory, scan)
    }

    /// Fold the entries of an opened playlist into the database.
    ///
    /// `directory` is the virtual directory receiving the tracks; without
    /// one, entries only override real songs in `parent`.
    pub async fn update_playlist_entries(
        &mut self,
        parent: DirectoryId,
        directory: Option<DirectoryId>,
        enumerator: &mut dyn SongEnumerator,
    ) -> PlaylistScan {
        let uri = {
            let tree = self.db.lock();
            tree.path(directory.unwrap_or(parent)).unwrap_or_default()
        };

        let scan = self.ingest_entries(parent, directory, enumerator).await;
        self.conclude_playlist(&uri, directory, scan)
    }

    async fn open_playlist(
        &self,
        path: &str,
        plugin: &dyn PlaylistPlugin,
    ) -> Result<Option<Box<dyn SongEnumerator>>> {
        // held until the enumerator exists
        let stream_lock = tokio::sync::Mutex::new(());
        let _guard = stream_lock.lock().await;

        let stream = self.input.open_ready(path).await?;
        plugin.open_stream(stream).await
    }

    async fn ingest_entries(
        &mut self,
        parent: DirectoryId,
        directory: Option<DirectoryId>,
        enumerator: &mut dyn SongEnumerator,
    ) -> PlaylistScan {
        match self.try_ingest_entries(parent, directory, enumerator).await {
            Ok(scan) => scan,
            Err(err) => PlaylistScan::Failed(err),
        }
    }

    async fn try_ingest_entries(
        &mut self,
        parent: DirectoryId,
        directory: Option<DirectoryId>,
        enumerator: &mut dyn SongEnumerator,
    ) -> Result<PlaylistScan> {
        let (parent_path, mut real_songs) = {
            let tree = self.db.lock();
            let songs: HashSet<String> = tree.song_filenames(parent).into_iter().collect();
            (tree.path(parent)?, songs)
        };
        let storage_parent = self.storage.map_utf8(&parent_path);

        let mut track = 0;
        let mut tracks = 0;

        while let Some(entry) = enumerator.next_song().await? {
            if entry.uri() == BAIL_URI {
                return Ok(PlaylistScan::Bailed);
            }

            let entry_uri = entry.uri().to_string();
            let song = directory.map(|directory| {
                track += 1;
                let mut song =
                    Song::from_detached(entry, directory).with_target(track_target(&entry_uri));
                song.filename = track_filename(track);
                song
            });

            let path = format!("{}/{}", storage_parent, entry_uri);
            if !self.storage.exists(&path).await? {
                error!(path = %path, "File not found");
                return Ok(PlaylistScan::Aborted(UpdateError::FileNotFound { path }));
            }

            {
                let mut tree = self.db.lock();
                if let (Some(directory), Some(song)) = (directory, song) {
                    tree.add_song(directory, song)?;
                    tracks += 1;
                }

                if real_songs.remove(&entry_uri)
                    && self
                        .editor
                        .delete_song(&mut tree, parent, &entry_uri)
                        .is_some()
                {
                    self.modified = true;
                }
            }
        }

        Ok(PlaylistScan::Ingested { tracks })
    }

    /// Common end of every playlist scan: report the outcome and drop the
    /// virtual directory unless the scan succeeded and left it non-empty.
    fn conclude_playlist(
        &mut self,
        uri: &str,
        directory: Option<DirectoryId>,
        scan: PlaylistScan,
    ) -> PlaylistScan {
        let event = match &scan {
            PlaylistScan::Ingested { tracks } => {
                debug!(uri = %uri, tracks = *tracks, "Playlist scanned");
                Some(UpdateEvent::PlaylistScanned {
                    uri: uri.to_string(),
                    songs: *tracks,
                })
            }
            PlaylistScan::Unsupported => {
                debug!(uri = %uri, "Playlist not supported");
                None
            }
            PlaylistScan::Bailed => {
                debug!(uri = %uri, "Playlist plugin gave up");
                None
            }
            PlaylistScan::Aborted(err) => Some(UpdateEvent::PlaylistFailed {
                uri: uri.to_string(),
                message: err.to_string(),
            }),
            PlaylistScan::Failed(err) => {
                let path = self.storage.map_utf8(uri);
                error!(uri = %uri, path = %path, error = %err, "Failed to scan playlist");
                Some(UpdateEvent::PlaylistFailed {
                    uri: uri.to_string(),
                    message: err.to_string(),
                })
            }
        };

        if let Some(directory) = directory {
            let mut tree = self.db.lock();
            let discard = match tree.get(directory) {
                Some(node) => !scan.is_ingested() || node.is_empty(),
                None => false,
            };

            if discard {
                match self.editor.delete_directory(&mut tree, directory) {
                    Ok(()) => self.modified = true,
                    Err(err) => warn!(uri = %uri, error = %err, "Failed to remove playlist directory"),
                }
            }
        }

        if let Some(event) = event {
            self.events.emit(CoreEvent::Update(event)).ok();
        }

        scan
    }
}
