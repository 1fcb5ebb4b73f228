//! # Update Walk
//!
//! State of one database update pass.
//!
//! The directory walk itself (visiting storage directories and regular
//! song files) is driven by the host; this type carries what the pass
//! needs to fold playlist files into the tree:
//!
//! - the database and its lock
//! - the storage and input-stream bridges
//! - the playlist plugin registry with the configured overrides
//! - the modified flag, reported by [`UpdateWalk::finish`]
//!
//! ## Usage
//!
//! ```ignore
//! let mut walk = UpdateWalk::from_config(&config, db.clone(), registry);
//! let mut events = walk.events().subscribe();
//! let info = config.storage.get_info("rock/mix.m3u").await?;
//! walk.update_playlist_file(rock, "mix.m3u", "m3u", &info).await;
//! walk.purge_dangling_from_playlists(db.root());
//! if walk.finish() {
//!     // schedule a database save
//! }
//! ```

use bridge_traits::{InputStreamProvider, Storage, StorageFileInfo};
use core_library::{uri, Database, DirectoryId, DirectoryKind};
use core_runtime::config::UpdateConfig;
use core_runtime::events::{CoreEvent, EventBus, UpdateEvent};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

use crate::editor::DatabaseEditor;
use crate::error::Result;
use crate::playlist::PlaylistRegistry;

pub struct UpdateWalk {
    pub(crate) db: Arc<Database>,
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) input: Arc<dyn InputStreamProvider>,
    pub(crate) registry: PlaylistRegistry,
    pub(crate) editor: DatabaseEditor,
    pub(crate) events: EventBus,
    discard: bool,
    hide_playlist_targets: bool,
    pub(crate) modified: bool,
}

impl UpdateWalk {
    /// Start an update pass.
    ///
    /// The as-folder overrides configured in `config` are applied to
    /// `registry`.
    pub fn new(
        config: &UpdateConfig,
        db: Arc<Database>,
        registry: PlaylistRegistry,
        events: EventBus,
    ) -> Self {
        Self {
            db,
            storage: Arc::clone(&config.storage),
            input: Arc::clone(&config.input),
            registry: registry.with_folder_overrides(config.playlist_folders.clone()),
            editor: DatabaseEditor::new(events.clone()),
            events,
            discard: config.discard,
            hide_playlist_targets: config.hide_playlist_targets,
            modified: false,
        }
    }

    /// Start an update pass announcing changes on a fresh bus sized by
    /// `config.event_buffer_size`.
    pub fn from_config(
        config: &UpdateConfig,
        db: Arc<Database>,
        registry: PlaylistRegistry,
    ) -> Self {
        Self::new(config, db, registry, EventBus::new(config.event_buffer_size))
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn editor(&self) -> &DatabaseEditor {
        &self.editor
    }

    /// Has this pass changed the database so far?
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Filenames of the songs in `directory` that are listed to clients.
    ///
    /// Songs some playlist resolves to are left out when the pass was
    /// configured to hide playlist targets.
    pub fn visible_songs(&self, directory: DirectoryId) -> Vec<String> {
        self.db
            .lock()
            .visible_songs(directory, self.hide_playlist_targets)
            .into_iter()
            .map(|song| song.filename.clone())
            .collect()
    }

    /// End the pass.
    ///
    /// Announces [`UpdateEvent::DatabaseModified`] if the tree changed and
    /// returns the modified flag.
    pub fn finish(self) -> bool {
        if self.modified {
            info!("Database modified");
            self.events
                .emit(CoreEvent::Update(UpdateEvent::DatabaseModified))
                .ok();
        }
        self.modified
    }

    /// Get the virtual directory mirroring the file `name` in `parent`,
    /// recreating it when the file changed.
    ///
    /// Returns `None` when an up-to-date playlist directory already exists.
    /// A stale one (other mtime, a regular directory of the same name, or a
    /// forced rescan) is deleted and replaced by an empty directory stamped
    /// with the file's mtime.
    pub fn make_virtual_directory_if_modified(
        &mut self,
        parent: DirectoryId,
        name: &str,
        info: &StorageFileInfo,
    ) -> Result<Option<DirectoryId>> {
        let mut tree = self.db.lock();

        if let Some(existing) = tree.find_child(parent, name) {
            let directory = tree.directory(existing)?;
            if directory.mtime == info.mtime && directory.is_playlist() && !self.discard {
                return Ok(None);
            }

            self.editor.delete_directory(&mut tree, existing)?;
            self.modified = true;
        }

        let directory = tree.make_child(parent, name, DirectoryKind::Playlist, info.mtime)?;
        self.modified = true;
        debug!(name = %name, mtime = info.mtime, "Created playlist directory");
        Ok(Some(directory))
    }

    /// Database URI of the file `name` in `parent`
    pub(crate) fn child_uri(&self, parent: DirectoryId, name: &str) -> Result<String> {
        let parent_path = self.db.lock().path(parent)?;
        Ok(uri::build(&parent_path, name))
    }
}

impl fmt::Debug for UpdateWalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateWalk")
            .field("registry", &self.registry)
            .field("discard", &self.discard)
            .field("modified", &self.modified)
            .finish()
    }
}
