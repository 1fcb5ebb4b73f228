//! Dangling playlist tracks
//!
//! After a pass, a playlist track may point at a song that no longer
//! exists. Such tracks are removed; tracks that do resolve mark their
//! target with `in_playlist`.

use core_library::{uri, DirectoryId};

use crate::walk::UpdateWalk;

impl UpdateWalk {
    /// Prune unresolvable tracks from every playlist directory at or below
    /// `directory`.
    ///
    /// Absolute and URL targets are not tree-local and are left alone.
    pub fn purge_dangling_from_playlists(&mut self, directory: DirectoryId) {
        let mut tree = self.db.lock();

        for id in tree.descendants(directory) {
            if !tree.get(id).is_some_and(|node| node.is_playlist()) {
                continue;
            }

            // removal-safe: the file names are copied out first
            for filename in tree.song_filenames(id) {
                let target = match tree.lookup_song(id, &filename) {
                    Some(song)
                        if song.has_target() && !uri::is_absolute_or_has_scheme(&song.target) =>
                    {
                        song.target.clone()
                    }
                    _ => continue,
                };

                match tree.lookup_target_song_mut(id, &target) {
                    Some(target) => target.in_playlist = true,
                    None => {
                        if self.editor.delete_song(&mut tree, id, &filename).is_some() {
                            self.modified = true;
                        }
                    }
                }
            }
        }
    }
}
