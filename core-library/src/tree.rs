//! Directory tree
//!
//! The tree owns every [`Directory`] in a map keyed by [`DirectoryId`].
//! Parent and child links are ids, so removing a subtree never leaves a
//! dangling reference behind: a stale id simply fails to resolve.
//!
//! Songs are owned by their directory in a container keyed by file name,
//! which enforces the unique-filename invariant.

use std::collections::{BTreeMap, HashMap};

use crate::error::{LibraryError, Result};
use crate::models::{DirectoryId, DirectoryKind, PlaylistVector, Song};
use crate::uri;

/// A node of the directory tree
#[derive(Debug, Clone)]
pub struct Directory {
    id: DirectoryId,
    /// Path segment of this directory (empty for the root)
    pub name: String,
    parent: Option<DirectoryId>,
    children: Vec<DirectoryId>,
    songs: BTreeMap<String, Song>,
    /// Playlist files in this directory that were not expanded
    pub playlists: PlaylistVector,
    pub kind: DirectoryKind,
    /// Modification time (Unix seconds) of the file or directory this node mirrors
    pub mtime: i64,
}

impl Directory {
    fn new(name: impl Into<String>, parent: Option<DirectoryId>, kind: DirectoryKind) -> Self {
        Self {
            id: DirectoryId::new(),
            name: name.into(),
            parent,
            children: Vec::new(),
            songs: BTreeMap::new(),
            playlists: PlaylistVector::new(),
            kind,
            mtime: 0,
        }
    }

    pub fn id(&self) -> DirectoryId {
        self.id
    }

    pub fn parent(&self) -> Option<DirectoryId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child directories in insertion order
    pub fn children(&self) -> &[DirectoryId] {
        &self.children
    }

    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.values()
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn find_song(&self, filename: &str) -> Option<&Song> {
        self.songs.get(filename)
    }

    pub fn find_song_mut(&mut self, filename: &str) -> Option<&mut Song> {
        self.songs.get_mut(filename)
    }

    /// Is this a virtual directory representing a playlist file?
    pub fn is_playlist(&self) -> bool {
        self.kind == DirectoryKind::Playlist
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.songs.is_empty() && self.playlists.is_empty()
    }
}

/// Outcome of [`DirectoryTree::lookup_directory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupResult<'a> {
    /// Deepest directory matched by a prefix of the path
    pub directory: DirectoryId,
    /// Unmatched remainder, `None` if the whole path named a directory
    pub rest: Option<&'a str>,
}

/// The hierarchical music database
#[derive(Debug, Clone)]
pub struct DirectoryTree {
    root: DirectoryId,
    nodes: HashMap<DirectoryId, Directory>,
}

impl Default for DirectoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTree {
    /// Create a tree holding only an empty root directory
    pub fn new() -> Self {
        let root = Directory::new("", None, DirectoryKind::Regular);
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            root: root_id,
            nodes,
        }
    }

    pub fn root(&self) -> DirectoryId {
        self.root
    }

    pub fn contains(&self, id: DirectoryId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of directories, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes.get(&self.root).map_or(true, Directory::is_empty)
    }

    pub fn get(&self, id: DirectoryId) -> Option<&Directory> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: DirectoryId) -> Option<&mut Directory> {
        self.nodes.get_mut(&id)
    }

    pub fn directory(&self, id: DirectoryId) -> Result<&Directory> {
        self.nodes
            .get(&id)
            .ok_or_else(|| LibraryError::directory_not_found(id))
    }

    pub fn directory_mut(&mut self, id: DirectoryId) -> Result<&mut Directory> {
        self.nodes
            .get_mut(&id)
            .ok_or_else(|| LibraryError::directory_not_found(id))
    }

    /// URI of a directory relative to the root (empty for the root)
    pub fn path(&self, id: DirectoryId) -> Result<String> {
        let mut segments = Vec::new();
        let mut current = self.directory(id)?;
        while let Some(parent) = current.parent {
            segments.push(current.name.as_str());
            current = self.directory(parent)?;
        }
        segments.reverse();
        Ok(segments.join("/"))
    }

    pub fn find_child(&self, parent: DirectoryId, name: &str) -> Option<DirectoryId> {
        self.nodes.get(&parent)?.children.iter().copied().find(|child| {
            self.nodes
                .get(child)
                .is_some_and(|directory| directory.name == name)
        })
    }

    /// Create a child directory
    ///
    /// # Errors
    /// Returns error if the parent does not exist or already has a child
    /// with the same name
    pub fn make_child(
        &mut self,
        parent: DirectoryId,
        name: &str,
        kind: DirectoryKind,
        mtime: i64,
    ) -> Result<DirectoryId> {
        if name.is_empty() || name.contains('/') {
            return Err(LibraryError::InvalidInput {
                field: "name".to_string(),
                message: format!("invalid directory name '{}'", name),
            });
        }
        self.directory(parent)?;
        if self.find_child(parent, name).is_some() {
            return Err(LibraryError::Duplicate {
                entity_type: "Directory".to_string(),
                name: name.to_string(),
                directory: parent.to_string(),
            });
        }

        let mut child = Directory::new(name, Some(parent), kind);
        child.mtime = mtime;
        let id = child.id;
        self.nodes.insert(id, child);
        self.directory_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Walk `uri` down from `from` as far as child directories exist
    pub fn lookup_directory<'a>(&self, from: DirectoryId, uri: &'a str) -> LookupResult<'a> {
        let mut directory = from;
        let mut rest = uri;

        while !rest.is_empty() {
            let (segment, remainder) = match rest.find('/') {
                Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
                None => (rest, None),
            };

            match self.find_child(directory, segment) {
                Some(child) => {
                    directory = child;
                    match remainder {
                        Some(remainder) => rest = remainder,
                        None => {
                            return LookupResult {
                                directory,
                                rest: None,
                            }
                        }
                    }
                }
                None => break,
            }
        }

        LookupResult {
            directory,
            rest: (!rest.is_empty()).then_some(rest),
        }
    }

    /// Attach a song to a directory, taking ownership of it
    ///
    /// # Errors
    /// Returns error if the directory does not exist or already owns a song
    /// with the same file name
    pub fn add_song(&mut self, directory: DirectoryId, mut song: Song) -> Result<()> {
        let node = self.directory_mut(directory)?;
        if node.songs.contains_key(&song.filename) {
            return Err(LibraryError::Duplicate {
                entity_type: "Song".to_string(),
                name: song.filename,
                directory: directory.to_string(),
            });
        }

        song.directory = directory;
        node.songs.insert(song.filename.clone(), song);
        Ok(())
    }

    pub fn remove_song(&mut self, directory: DirectoryId, filename: &str) -> Option<Song> {
        self.nodes.get_mut(&directory)?.songs.remove(filename)
    }

    pub fn lookup_song(&self, directory: DirectoryId, filename: &str) -> Option<&Song> {
        self.nodes.get(&directory)?.songs.get(filename)
    }

    pub fn lookup_song_mut(&mut self, directory: DirectoryId, filename: &str) -> Option<&mut Song> {
        self.nodes.get_mut(&directory)?.songs.get_mut(filename)
    }

    /// File names of the songs in a directory, copied out so the caller can
    /// mutate the directory while going through them
    pub fn song_filenames(&self, directory: DirectoryId) -> Vec<String> {
        self.nodes
            .get(&directory)
            .map(|node| node.songs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Resolve a song target relative to `from`.
    ///
    /// Every leading `../` moves one level up; the remainder is looked up as
    /// `directory/.../filename` below the directory reached.
    pub fn resolve_target(&self, from: DirectoryId, target: &str) -> Option<(DirectoryId, String)> {
        let mut directory = from;
        let mut target = target;
        while let Some(rest) = target.strip_prefix("../") {
            directory = self.nodes.get(&directory)?.parent?;
            target = rest;
        }

        let (parent, filename) = uri::split_parent(target);
        if let Some(parent) = parent {
            let lookup = self.lookup_directory(directory, parent);
            if lookup.rest.is_some() {
                return None;
            }
            directory = lookup.directory;
        }

        self.lookup_song(directory, filename)
            .map(|song| (directory, song.filename.clone()))
    }

    pub fn lookup_target_song(&self, from: DirectoryId, target: &str) -> Option<&Song> {
        let (directory, filename) = self.resolve_target(from, target)?;
        self.lookup_song(directory, &filename)
    }

    pub fn lookup_target_song_mut(&mut self, from: DirectoryId, target: &str) -> Option<&mut Song> {
        let (directory, filename) = self.resolve_target(from, target)?;
        self.lookup_song_mut(directory, &filename)
    }

    /// Ids of `from` and everything below it, parents before children
    pub fn descendants(&self, from: DirectoryId) -> Vec<DirectoryId> {
        let mut result = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            result.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        result
    }

    /// Unlink a directory from its parent and remove its whole subtree.
    ///
    /// Returns the removed nodes, children before their parents.
    ///
    /// # Errors
    /// Returns error for the root or an unknown id
    pub fn detach(&mut self, id: DirectoryId) -> Result<Vec<Directory>> {
        let parent = self
            .directory(id)?
            .parent
            .ok_or_else(|| LibraryError::InvalidInput {
                field: "directory".to_string(),
                message: "the root directory cannot be removed".to_string(),
            })?;

        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }

        let mut removed = Vec::new();
        for node_id in self.descendants(id).into_iter().rev() {
            if let Some(node) = self.nodes.remove(&node_id) {
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// Songs of a directory as presented to clients.
    ///
    /// With `hide_playlist_targets`, songs some playlist resolves to are
    /// left out, since they are reachable through the playlist directory.
    pub fn visible_songs(&self, directory: DirectoryId, hide_playlist_targets: bool) -> Vec<&Song> {
        self.nodes
            .get(&directory)
            .map(|node| {
                node.songs
                    .values()
                    .filter(|song| !(hide_playlist_targets && song.in_playlist))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (DirectoryTree, DirectoryId, DirectoryId) {
        let mut tree = DirectoryTree::new();
        let root = tree.root();
        let music = tree.make_child(root, "music", DirectoryKind::Regular, 0).unwrap();
        let sub = tree.make_child(music, "sub", DirectoryKind::Regular, 0).unwrap();
        tree.add_song(music, Song::new("a.mp3", music)).unwrap();
        tree.add_song(sub, Song::new("song.mp3", sub)).unwrap();
        (tree, music, sub)
    }

    #[test]
    fn test_new_tree() {
        let tree = DirectoryTree::new();
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.path(tree.root()).unwrap(), "");
        assert!(tree.get(tree.root()).unwrap().is_root());
    }

    #[test]
    fn test_paths() {
        let (tree, music, sub) = sample_tree();
        assert_eq!(tree.path(music).unwrap(), "music");
        assert_eq!(tree.path(sub).unwrap(), "music/sub");
    }

    #[test]
    fn test_make_child_duplicate() {
        let (mut tree, music, _) = sample_tree();
        let result = tree.make_child(music, "sub", DirectoryKind::Playlist, 0);
        assert!(matches!(result, Err(LibraryError::Duplicate { .. })));

        let result = tree.make_child(music, "a/b", DirectoryKind::Regular, 0);
        assert!(matches!(result, Err(LibraryError::InvalidInput { .. })));
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut tree = DirectoryTree::new();
        let root = tree.root();
        let z = tree.make_child(root, "z", DirectoryKind::Regular, 0).unwrap();
        let a = tree.make_child(root, "a", DirectoryKind::Regular, 0).unwrap();
        assert_eq!(tree.get(root).unwrap().children(), &[z, a]);
    }

    #[test]
    fn test_add_song_rejects_duplicate_filename() {
        let (mut tree, music, _) = sample_tree();
        let result = tree.add_song(music, Song::new("a.mp3", music));
        assert!(matches!(result, Err(LibraryError::Duplicate { .. })));
        assert_eq!(tree.get(music).unwrap().song_count(), 1);
    }

    #[test]
    fn test_add_song_sets_owner() {
        let (mut tree, music, sub) = sample_tree();
        tree.add_song(sub, Song::new("b.mp3", music)).unwrap();
        assert_eq!(tree.lookup_song(sub, "b.mp3").unwrap().directory, sub);
    }

    #[test]
    fn test_lookup_directory() {
        let (tree, music, sub) = sample_tree();
        let root = tree.root();

        let lr = tree.lookup_directory(root, "music/sub");
        assert_eq!(lr, LookupResult { directory: sub, rest: None });

        let lr = tree.lookup_directory(root, "music/sub/song.mp3");
        assert_eq!(lr.directory, sub);
        assert_eq!(lr.rest, Some("song.mp3"));

        let lr = tree.lookup_directory(root, "music/missing/x.mp3");
        assert_eq!(lr.directory, music);
        assert_eq!(lr.rest, Some("missing/x.mp3"));
    }

    #[test]
    fn test_resolve_target_sibling_and_parent() {
        let (mut tree, music, _) = sample_tree();
        let pl = tree.make_child(music, "pl.m3u", DirectoryKind::Playlist, 0).unwrap();
        tree.add_song(pl, Song::new("track0001", pl)).unwrap();

        assert!(tree.lookup_target_song(pl, "track0001").is_some());
        assert_eq!(
            tree.lookup_target_song(pl, "../a.mp3").unwrap().filename,
            "a.mp3"
        );
        assert_eq!(
            tree.lookup_target_song(pl, "../sub/song.mp3").unwrap().filename,
            "song.mp3"
        );
        assert!(tree.lookup_target_song(pl, "../missing.mp3").is_none());
        assert!(tree.lookup_target_song(pl, "../sub").is_none());
        assert!(tree.lookup_target_song(pl, "../sub/").is_none());
        assert!(tree.lookup_target_song(pl, "../nowhere/song.mp3").is_none());
        assert!(tree.lookup_target_song(pl, "../../../../a.mp3").is_none());
    }

    #[test]
    fn test_lookup_target_song_mut() {
        let (mut tree, music, _) = sample_tree();
        let pl = tree.make_child(music, "pl.m3u", DirectoryKind::Playlist, 0).unwrap();
        tree.lookup_target_song_mut(pl, "../a.mp3").unwrap().in_playlist = true;
        assert!(tree.lookup_song(music, "a.mp3").unwrap().in_playlist);
    }

    #[test]
    fn test_detach_removes_subtree() {
        let (mut tree, music, sub) = sample_tree();
        let removed = tree.detach(music).unwrap();

        assert_eq!(removed.len(), 2);
        // children come before parents
        assert_eq!(removed[0].id(), sub);
        assert_eq!(removed[1].id(), music);
        assert!(!tree.contains(music));
        assert!(!tree.contains(sub));
        assert!(tree.get(tree.root()).unwrap().children().is_empty());
    }

    #[test]
    fn test_detach_root_fails() {
        let mut tree = DirectoryTree::new();
        let root = tree.root();
        assert!(tree.detach(root).is_err());
        assert!(tree.contains(root));
    }

    #[test]
    fn test_stale_id_does_not_resolve() {
        let (mut tree, music, sub) = sample_tree();
        tree.detach(music).unwrap();
        assert!(tree.lookup_song(sub, "song.mp3").is_none());
        assert!(tree.remove_song(sub, "song.mp3").is_none());
        assert!(tree.add_song(sub, Song::new("x.mp3", sub)).is_err());
    }

    #[test]
    fn test_descendants_pre_order() {
        let (mut tree, music, sub) = sample_tree();
        let other = tree.make_child(music, "other", DirectoryKind::Regular, 0).unwrap();
        let root = tree.root();
        assert_eq!(tree.descendants(root), vec![root, music, sub, other]);
    }

    #[test]
    fn test_visible_songs_hides_playlist_targets() {
        let (mut tree, music, _) = sample_tree();
        tree.add_song(music, Song::new("b.mp3", music)).unwrap();
        tree.lookup_song_mut(music, "a.mp3").unwrap().in_playlist = true;

        assert_eq!(tree.visible_songs(music, false).len(), 2);
        let visible = tree.visible_songs(music, true);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].filename, "b.mp3");
    }

    #[test]
    fn test_song_filenames_snapshot() {
        let (mut tree, music, _) = sample_tree();
        tree.add_song(music, Song::new("b.mp3", music)).unwrap();

        for filename in tree.song_filenames(music) {
            tree.remove_song(music, &filename);
        }
        assert_eq!(tree.get(music).unwrap().song_count(), 0);
    }
}
