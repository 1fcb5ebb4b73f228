//! # Database Editor
//!
//! Removal primitives used by the update walk. Besides mutating the tree,
//! the editor announces every removed song and directory on the event bus
//! so players can drop stale entries from their queues.
//!
//! Methods taking a [`DirectoryTree`] expect the caller to hold the
//! database lock; the `lock_*` variants acquire it themselves.

use core_library::{uri, Database, DirectoryId, DirectoryTree, Song};
use core_runtime::events::{CoreEvent, EventBus, UpdateEvent};
use std::collections::HashMap;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct DatabaseEditor {
    events: EventBus,
}

impl DatabaseEditor {
    pub fn new(events: EventBus) -> Self {
        Self { events }
    }

    /// Remove a song from its directory.
    ///
    /// Returns the removed song, or `None` if the directory holds no song
    /// with that file name.
    pub fn delete_song(
        &self,
        tree: &mut DirectoryTree,
        directory: DirectoryId,
        filename: &str,
    ) -> Option<Song> {
        let song = tree.remove_song(directory, filename)?;
        let path = tree.path(directory).unwrap_or_default();
        self.emit(UpdateEvent::SongRemoved {
            uri: uri::build(&path, &song.filename),
        });
        Some(song)
    }

    /// Recursively delete a directory with all its songs and children.
    ///
    /// # Errors
    ///
    /// Returns error for the root directory or an unknown id.
    pub fn delete_directory(&self, tree: &mut DirectoryTree, directory: DirectoryId) -> Result<()> {
        let path = tree.path(directory)?;
        let paths: HashMap<DirectoryId, String> = tree
            .descendants(directory)
            .into_iter()
            .filter_map(|id| tree.path(id).ok().map(|path| (id, path)))
            .collect();

        for removed in tree.detach(directory)? {
            let base = paths.get(&removed.id()).map(String::as_str).unwrap_or_default();
            for song in removed.songs() {
                self.emit(UpdateEvent::SongRemoved {
                    uri: uri::build(base, &song.filename),
                });
            }
        }

        debug!(path = %path, "Removed directory");
        self.emit(UpdateEvent::DirectoryRemoved { path });
        Ok(())
    }

    /// [`delete_directory`](Self::delete_directory) under the database lock
    pub fn lock_delete_directory(&self, db: &Database, directory: DirectoryId) -> Result<()> {
        let mut tree = db.lock();
        self.delete_directory(&mut tree, directory)
    }

    fn emit(&self, event: UpdateEvent) {
        // nobody listening is fine
        self.events.emit(CoreEvent::Update(event)).ok();
    }
}
