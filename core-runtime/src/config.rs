//! # Update Configuration Module
//!
//! Provides configuration management for the database update.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct an
//! `UpdateConfig` holding the bridges the update walk talks to and the
//! options that change how playlists are folded into the database. It
//! enforces fail-fast validation so a missing capability is reported before
//! the first directory is visited.
//!
//! ## Required Dependencies
//!
//! - `Storage` - Maps database URIs to storage paths and checks existence
//! - `InputStreamProvider` - Opens playlist files for the playlist plugins
//!
//! When the `desktop-shims` feature is enabled, local-filesystem defaults
//! rooted at the music directory are injected if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::UpdateConfig;
//!
//! let config = UpdateConfig::builder()
//!     .music_directory("/srv/music")
//!     .hide_playlist_targets(true)
//!     .playlist_as_folder("cue", false)
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{InputStreamProvider, Storage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Configuration of a database update.
///
/// Use [`UpdateConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct UpdateConfig {
    /// Root of the music storage
    pub music_directory: PathBuf,

    /// Storage the database URIs are resolved against
    pub storage: Arc<dyn Storage>,

    /// Opens playlist files for the playlist plugins
    pub input: Arc<dyn InputStreamProvider>,

    /// Hide songs referenced by a playlist from directory listings
    pub hide_playlist_targets: bool,

    /// Rebuild every playlist directory even if its file is unchanged
    pub discard: bool,

    /// Per-plugin override of whether playlists expand into directories,
    /// keyed by plugin name
    pub playlist_folders: HashMap<String, bool>,

    /// Buffer size of the update event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for UpdateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateConfig")
            .field("music_directory", &self.music_directory)
            .field("storage", &"Storage { ... }")
            .field("input", &"InputStreamProvider { ... }")
            .field("hide_playlist_targets", &self.hide_playlist_targets)
            .field("discard", &self.discard)
            .field("playlist_folders", &self.playlist_folders)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl UpdateConfig {
    /// Creates a new builder for constructing an `UpdateConfig`.
    pub fn builder() -> UpdateConfigBuilder {
        UpdateConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.music_directory.as_os_str().is_empty() {
            return Err(Error::Config(
                "Music directory cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if let Some(name) = self.playlist_folders.keys().find(|name| name.is_empty()) {
            return Err(Error::Config(format!(
                "Playlist plugin name cannot be empty (got '{}')",
                name
            )));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn storage_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "Storage".to_string(),
        message: "Storage implementation is required to resolve database URIs. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default LocalStorage. \
                 Other hosts: inject a Storage adapter for the music location."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn input_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "InputStreamProvider".to_string(),
        message: "InputStreamProvider implementation is required to open playlist files. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default TokioInputStreamProvider."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_storage(music_directory: &Path) -> Result<Arc<dyn Storage>> {
    use bridge_desktop::LocalStorage;

    let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(music_directory));
    Ok(storage)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_storage(_music_directory: &Path) -> Result<Arc<dyn Storage>> {
    Err(storage_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_input() -> Result<Arc<dyn InputStreamProvider>> {
    use bridge_desktop::TokioInputStreamProvider;

    let input: Arc<dyn InputStreamProvider> = Arc::new(TokioInputStreamProvider::new());
    Ok(input)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_input() -> Result<Arc<dyn InputStreamProvider>> {
    Err(input_missing_error())
}

/// Builder for constructing [`UpdateConfig`] instances.
#[derive(Default)]
pub struct UpdateConfigBuilder {
    music_directory: Option<PathBuf>,
    storage: Option<Arc<dyn Storage>>,
    input: Option<Arc<dyn InputStreamProvider>>,
    hide_playlist_targets: bool,
    discard: bool,
    playlist_folders: HashMap<String, bool>,
    event_buffer_size: Option<usize>,
}

impl UpdateConfigBuilder {
    /// Sets the music directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::UpdateConfig;
    ///
    /// let builder = UpdateConfig::builder()
    ///     .music_directory("/srv/music");
    /// ```
    pub fn music_directory<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.music_directory = Some(path.into());
        self
    }

    /// Sets the storage implementation.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the input stream implementation.
    pub fn input(mut self, input: Arc<dyn InputStreamProvider>) -> Self {
        self.input = Some(input);
        self
    }

    /// Hide songs referenced by playlists from directory listings.
    ///
    /// Default: `false`
    pub fn hide_playlist_targets(mut self, hide: bool) -> Self {
        self.hide_playlist_targets = hide;
        self
    }

    /// Rebuild every playlist directory regardless of modification times.
    ///
    /// Default: `false`
    pub fn discard(mut self, discard: bool) -> Self {
        self.discard = discard;
        self
    }

    /// Override whether playlists handled by `plugin` expand into directories.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::UpdateConfig;
    ///
    /// let builder = UpdateConfig::builder()
    ///     .playlist_as_folder("m3u", false);
    /// ```
    pub fn playlist_as_folder(mut self, plugin: impl Into<String>, as_folder: bool) -> Self {
        self.playlist_folders.insert(plugin.into(), as_folder);
        self
    }

    /// Sets the update event bus buffer size.
    ///
    /// Default: [`DEFAULT_EVENT_BUFFER_SIZE`]
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `UpdateConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(UpdateConfig)` on success, or an error if:
    /// - The music directory is missing
    /// - Required bridges are missing and no default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<UpdateConfig> {
        let music_directory = self.music_directory.ok_or_else(|| {
            Error::Config(
                "Music directory is required. Use .music_directory() to set it.".to_string(),
            )
        })?;

        let storage = match self.storage {
            Some(storage) => storage,
            None => provide_default_storage(&music_directory)?,
        };

        let input = match self.input {
            Some(input) => input,
            None => provide_default_input()?,
        };

        let config = UpdateConfig {
            music_directory,
            storage,
            input,
            hide_playlist_targets: self.hide_playlist_targets,
            discard: self.discard,
            playlist_folders: self.playlist_folders,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;

        Ok(config)
    }
}
