//! # Playlist Plugins
//!
//! Contract between the update walk and the playlist format parsers.
//!
//! A [`PlaylistPlugin`] recognises playlist files by suffix and turns an
//! opened [`InputStream`] into a [`SongEnumerator`], a lazy sequence of
//! [`DetachedSong`] entries pulled one at a time. Parsing itself lives in
//! the plugins; the walk only consumes the entries.
//!
//! Whether a plugin's playlists are expanded into virtual directories is
//! decided by [`PlaylistRegistry::as_folder`]: the configured per-plugin
//! override if there is one, else the plugin's own default.

use async_trait::async_trait;
use bridge_traits::InputStream;
use core_library::DetachedSong;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// URI a plugin yields when it could not make sense of the playlist
pub const BAIL_URI: &str = "mpd://bail";

/// Lazy sequence of playlist entries
#[async_trait]
pub trait SongEnumerator: Send {
    /// Pull the next entry; `Ok(None)` marks the end of the playlist.
    ///
    /// # Errors
    ///
    /// Returns error when the underlying stream fails or the playlist
    /// cannot be decoded.
    async fn next_song(&mut self) -> Result<Option<DetachedSong>>;
}

/// A playlist format handler
#[async_trait]
pub trait PlaylistPlugin: Send + Sync {
    /// Name used for configuration overrides (e.g. `"m3u"`)
    fn name(&self) -> &'static str;

    /// File name suffixes handled, without the leading dot
    fn suffixes(&self) -> &'static [&'static str];

    /// Expand playlists into virtual directories unless configured otherwise
    fn as_folder(&self) -> bool {
        true
    }

    /// Can this plugin read from an opened input stream?
    fn supports_stream(&self) -> bool {
        true
    }

    /// Start enumerating a playlist.
    ///
    /// Returns `Ok(None)` when the stream does not hold a playlist this
    /// plugin understands.
    async fn open_stream(&self, stream: InputStream) -> Result<Option<Box<dyn SongEnumerator>>>;
}

/// The set of available playlist plugins
#[derive(Default, Clone)]
pub struct PlaylistRegistry {
    plugins: Vec<Arc<dyn PlaylistPlugin>>,
    folder_overrides: HashMap<String, bool>,
}

impl PlaylistRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin. Earlier registrations win on suffix clashes.
    pub fn register(mut self, plugin: Arc<dyn PlaylistPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Replace the per-plugin as-folder overrides, keyed by plugin name
    pub fn with_folder_overrides(mut self, overrides: HashMap<String, bool>) -> Self {
        self.folder_overrides = overrides;
        self
    }

    /// Find the plugin handling a file suffix (case-insensitive)
    pub fn find_by_suffix(&self, suffix: &str) -> Option<Arc<dyn PlaylistPlugin>> {
        self.plugins
            .iter()
            .find(|plugin| {
                plugin
                    .suffixes()
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(suffix))
            })
            .cloned()
    }

    pub fn as_folder(&self, plugin: &dyn PlaylistPlugin) -> bool {
        self.folder_overrides
            .get(plugin.name())
            .copied()
            .unwrap_or_else(|| plugin.as_folder())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PlaylistRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.plugins.iter().map(|plugin| plugin.name()).collect();
        f.debug_struct("PlaylistRegistry")
            .field("plugins", &names)
            .field("folder_overrides", &self.folder_overrides)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticPlugin {
        name: &'static str,
        suffixes: &'static [&'static str],
        as_folder: bool,
    }

    #[async_trait]
    impl PlaylistPlugin for StaticPlugin {
        fn name(&self) -> &'static str {
            self.name
        }

        fn suffixes(&self) -> &'static [&'static str] {
            self.suffixes
        }

        fn as_folder(&self) -> bool {
            self.as_folder
        }

        async fn open_stream(
            &self,
            _stream: InputStream,
        ) -> Result<Option<Box<dyn SongEnumerator>>> {
            Ok(None)
        }
    }

    fn registry() -> PlaylistRegistry {
        PlaylistRegistry::new()
            .register(Arc::new(StaticPlugin {
                name: "m3u",
                suffixes: &["m3u", "m3u8"],
                as_folder: true,
            }))
            .register(Arc::new(StaticPlugin {
                name: "cue",
                suffixes: &["cue"],
                as_folder: false,
            }))
    }

    #[test]
    fn test_find_by_suffix() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_suffix("m3u8").unwrap().name(), "m3u");
        assert_eq!(registry.find_by_suffix("CUE").unwrap().name(), "cue");
        assert!(registry.find_by_suffix("mp3").is_none());
    }

    #[test]
    fn test_as_folder_defaults_to_plugin() {
        let registry = registry();
        let m3u = registry.find_by_suffix("m3u").unwrap();
        let cue = registry.find_by_suffix("cue").unwrap();
        assert!(registry.as_folder(m3u.as_ref()));
        assert!(!registry.as_folder(cue.as_ref()));
    }

    #[test]
    fn test_as_folder_override() {
        let overrides = HashMap::from([("m3u".to_string(), false), ("cue".to_string(), true)]);
        let registry = registry().with_folder_overrides(overrides);
        let m3u = registry.find_by_suffix("m3u").unwrap();
        let cue = registry.find_by_suffix("cue").unwrap();
        assert!(!registry.as_folder(m3u.as_ref()));
        assert!(registry.as_folder(cue.as_ref()));
    }

    #[test]
    fn test_default_capabilities() {
        let plugin = StaticPlugin {
            name: "pls",
            suffixes: &["pls"],
            as_folder: true,
        };
        assert!(plugin.supports_stream());
    }
}
