//! Database lock
//!
//! The directory tree is shared between the update worker and every reader
//! (search, playback, listing). All access goes through [`Database::lock`],
//! which hands out a scoped guard; the lock is released when the guard is
//! dropped, on every exit path.
//!
//! ```ignore
//! use core_library::Database;
//!
//! let db = Database::new();
//! {
//!     let mut tree = db.lock();
//!     let root = tree.root();
//!     tree.make_child(root, "music", DirectoryKind::Regular, 0)?;
//! } // released here
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

use crate::models::DirectoryId;
use crate::tree::DirectoryTree;

/// Scoped hold on the database lock
pub type DatabaseGuard<'a> = MutexGuard<'a, DirectoryTree>;

/// The in-memory music database
#[derive(Debug, Default)]
pub struct Database {
    tree: Mutex<DirectoryTree>,
}

impl Database {
    /// Create a database holding an empty root directory
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tree(tree: DirectoryTree) -> Self {
        Self {
            tree: Mutex::new(tree),
        }
    }

    /// Acquire the database lock
    ///
    /// Every mutation is completed before its guard is dropped, so a
    /// poisoned lock still protects a consistent tree and is recovered.
    pub fn lock(&self) -> DatabaseGuard<'_> {
        self.tree.lock().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned database lock");
            poisoned.into_inner()
        })
    }

    pub fn root(&self) -> DirectoryId {
        self.lock().root()
    }

    /// Consume the database, returning the tree
    pub fn into_inner(self) -> DirectoryTree {
        self.tree.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DirectoryKind, Song};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_lock_released_at_scope_end() {
        let db = Database::new();
        let root = db.root();
        {
            let mut tree = db.lock();
            tree.make_child(root, "music", DirectoryKind::Regular, 0).unwrap();
        }
        // would deadlock if the first guard were still held
        assert!(db.lock().find_child(root, "music").is_some());
    }

    #[test]
    fn test_concurrent_mutations_are_serialized() {
        let db = Arc::new(Database::new());
        let root = db.root();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    let mut tree = db.lock();
                    tree.add_song(root, Song::new(format!("{}.mp3", i), root))
                        .unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(db.lock().get(root).unwrap().song_count(), 8);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let db = Arc::new(Database::new());
        let poisoner = Arc::clone(&db);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison the lock");
        })
        .join();

        let root = db.root();
        assert!(db.lock().contains(root));
    }

    #[test]
    fn test_into_inner() {
        let db = Database::new();
        let root = db.root();
        let tree = db.into_inner();
        assert_eq!(tree.root(), root);
    }
}
