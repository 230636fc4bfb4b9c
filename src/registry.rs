//! Capacity-bounded profile registry with one-shot garbage collection.
//!
//! The registry maps an opaque foreign key (normally the absolute path) to
//! a [`FileProfile`] it owns by value. Its deletion mode is fixed at
//! construction: under [`DeletionMode::Extended`], disk-scoped erases and
//! garbage collection also unlink the backing file — an irreversible side
//! effect that only ever happens through an explicit call, never on drop.

use std::collections::HashMap;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use log::{debug, warn};
use crate::error::FsError;
use crate::model::{DeletionMode, FileProfile, MAX_REGISTRY_CAPACITY};

/// Outcome of one garbage-collection sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcReport {
    /// In-memory entries removed
    pub entries_cleared: usize,

    /// Backing files unlinked from disk (Extended mode only)
    pub files_deleted: usize,

    /// Unlink attempts that failed; logged, never raised
    pub unlink_failures: usize,
}

/// A bounded mapping from foreign key to owned [`FileProfile`].
///
/// Not internally synchronized; the controller wraps one registry in a
/// mutex. Garbage collection runs at most once per instance: the latch is
/// set on the first call and never reverts, so later sweeps (and erases)
/// are no-ops.
#[derive(Debug)]
pub struct ProfileRegistry<K = std::path::PathBuf> {
    entries: HashMap<K, FileProfile>,
    capacity: usize,
    mode: DeletionMode,
    gc_done: bool,
}

impl<K: Eq + Hash> ProfileRegistry<K> {
    /// Registry with the engine-wide default capacity.
    pub fn new(mode: DeletionMode) -> Self {
        Self::with_capacity(MAX_REGISTRY_CAPACITY, mode)
    }

    /// Registry with an explicit capacity; inserts are rejected once
    /// `len() + 1 >= capacity`.
    pub fn with_capacity(capacity: usize, mode: DeletionMode) -> Self {
        ProfileRegistry {
            entries: HashMap::new(),
            capacity,
            mode,
            gc_done: false,
        }
    }

    /// Number of tracked profiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no profiles are tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The capacity bound fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The deletion mode fixed at construction.
    pub fn mode(&self) -> DeletionMode {
        self.mode
    }

    /// True once garbage collection has run.
    pub fn gc_done(&self) -> bool {
        self.gc_done
    }

    /// Store a profile under the given key, taking ownership of both.
    ///
    /// First writer wins: a key already present is left untouched and the
    /// call answers `Ok(false)`. Empty profiles are never stored
    /// (`Ok(false)`).
    ///
    /// # Errors
    /// `FsError::CapacityExceeded` when storing would reach the bound; the
    /// registry is unchanged.
    pub fn insert(&mut self, key: K, profile: FileProfile) -> Result<bool, FsError> {
        if profile.is_empty() {
            return Ok(false);
        }
        if self.entries.contains_key(&key) {
            return Ok(false);
        }
        if self.entries.len() + 1 >= self.capacity {
            return Err(FsError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.entries.insert(key, profile);
        Ok(true)
    }

    /// Fetch a profile by value, or `None` when the key is absent.
    /// Never mutates state.
    pub fn get(&self, key: &K) -> Option<FileProfile> {
        self.entries.get(key).cloned()
    }

    /// Remove the entry for `key`. A no-op (`Ok(false)`) once garbage
    /// collection has run or when the key is absent.
    pub fn erase_local(&mut self, key: &K) -> bool {
        if self.gc_done {
            return false;
        }
        self.entries.remove(key).is_some()
    }
}

impl<K: Eq + Hash + AsRef<Path>> ProfileRegistry<K> {
    /// Remove the entry for `key`, optionally reaching through to disk.
    ///
    /// When `global_scope` is true, the mode is `Extended` and the keyed
    /// path still exists, the real file is unlinked. Returns whether an
    /// in-memory entry was removed; a no-op after garbage collection.
    ///
    /// # Errors
    /// `FsError::Io` when the unlink fails; the in-memory entry is gone
    /// regardless.
    pub fn erase(&mut self, key: &K, global_scope: bool) -> Result<bool, FsError> {
        if self.gc_done {
            return Ok(false);
        }
        let removed = self.entries.remove(key).is_some();
        if removed && global_scope && self.mode == DeletionMode::Extended {
            let path = key.as_ref();
            if path.exists() {
                fs::remove_file(path).map_err(|e| FsError::io("unlink", path, e))?;
                debug!("erase unlinked {}", path.display());
            }
        }
        Ok(removed)
    }

    /// Sweep every remaining entry, exactly once per registry instance.
    ///
    /// Under `Extended` mode each swept entry's backing file is unlinked
    /// from disk. Unlink failures do not abort the sweep; they are logged
    /// and counted in the report. Any call after the first returns an empty
    /// report and touches nothing, in memory or on disk.
    pub fn garbage_collect(&mut self) -> GcReport {
        if self.gc_done {
            return GcReport::default();
        }
        self.gc_done = true;

        let mut report = GcReport::default();
        for (key, _) in self.entries.drain() {
            report.entries_cleared += 1;
            if self.mode == DeletionMode::Extended {
                let path = key.as_ref();
                if path.exists() {
                    match fs::remove_file(path) {
                        Ok(()) => report.files_deleted += 1,
                        Err(e) => {
                            warn!("gc failed to unlink {}: {}", path.display(), e);
                            report.unlink_failures += 1;
                        }
                    }
                }
            }
        }
        debug!(
            "gc cleared {} entries, deleted {} files",
            report.entries_cleared, report.files_deleted
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn profile(path: &str, bytes: &[u8]) -> FileProfile {
        FileProfile::new(path, bytes.to_vec())
    }

    fn registry(capacity: usize, mode: DeletionMode) -> ProfileRegistry<PathBuf> {
        ProfileRegistry::with_capacity(capacity, mode)
    }

    #[test]
    fn test_insert_and_get() {
        let mut reg = registry(10, DeletionMode::Restricted);
        let stored = reg
            .insert("/tmp/a".into(), profile("/tmp/a", b"abc"))
            .expect("insert should succeed");
        assert!(stored);
        assert_eq!(reg.len(), 1);

        let got = reg.get(&"/tmp/a".into()).expect("key should be present");
        assert_eq!(got.content, b"abc");
        assert_eq!(got.size, 3);

        assert!(reg.get(&"/tmp/missing".into()).is_none());
    }

    #[test]
    fn test_first_writer_wins() {
        let mut reg = registry(10, DeletionMode::Restricted);
        reg.insert("/tmp/a".into(), profile("/tmp/a", b"first"))
            .expect("insert should succeed");
        let stored = reg
            .insert("/tmp/a".into(), profile("/tmp/a", b"second"))
            .expect("duplicate insert is a no-op, not an error");
        assert!(!stored);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(&"/tmp/a".into()).unwrap().content, b"first");
    }

    #[test]
    fn test_empty_profile_never_stored() {
        let mut reg = registry(10, DeletionMode::Restricted);
        let stored = reg
            .insert("/tmp/a".into(), FileProfile::empty("/tmp/a"))
            .expect("empty insert is a no-op");
        assert!(!stored);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_capacity_boundary_holds_capacity_minus_one() {
        let capacity = 5;
        let mut reg = registry(capacity, DeletionMode::Restricted);
        for i in 0..capacity - 1 {
            let key = format!("/tmp/f{}", i);
            assert!(reg
                .insert(key.clone().into(), profile(&key, b"x"))
                .expect("inserts below the bound succeed"));
        }
        assert_eq!(reg.len(), capacity - 1);

        let result = reg.insert("/tmp/over".into(), profile("/tmp/over", b"x"));
        assert!(matches!(result, Err(FsError::CapacityExceeded { .. })));
        assert_eq!(reg.len(), capacity - 1);
    }

    #[test]
    fn test_size_matches_retrievable_keys_after_mixed_ops() {
        let mut reg = registry(100, DeletionMode::Restricted);
        let keys: Vec<PathBuf> = (0..10).map(|i| format!("/tmp/k{}", i).into()).collect();
        for key in &keys {
            reg.insert(key.clone(), profile(&key.to_string_lossy(), b"y"))
                .expect("insert should succeed");
        }
        for key in keys.iter().step_by(2) {
            reg.erase(key, false).expect("erase should succeed");
        }
        let retrievable = keys.iter().filter(|k| reg.get(k).is_some()).count();
        assert_eq!(reg.len(), retrievable);
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn test_erase_restricted_keeps_file_on_disk() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("kept.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Restricted);
        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should succeed");

        let removed = reg.erase(&path, true).expect("erase should succeed");
        assert!(removed);
        assert!(reg.get(&path).is_none());
        assert!(path.exists(), "Restricted mode must leave the file on disk");
    }

    #[test]
    fn test_erase_extended_global_unlinks_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("gone.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Extended);
        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should succeed");

        reg.erase(&path, true).expect("erase should succeed");
        assert!(!path.exists(), "Extended global erase must unlink the file");
    }

    #[test]
    fn test_erase_extended_local_scope_keeps_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("local.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Extended);
        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should succeed");

        reg.erase(&path, false).expect("erase should succeed");
        assert!(path.exists(), "local-scope erase must not touch disk");
    }

    #[test]
    fn test_gc_restricted_clears_memory_only() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("survives.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Restricted);
        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should succeed");

        let report = reg.garbage_collect();
        assert_eq!(report.entries_cleared, 1);
        assert_eq!(report.files_deleted, 0);
        assert!(reg.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_gc_extended_deletes_tracked_files() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        std::fs::write(&a, b"a").expect("Failed to seed a");
        std::fs::write(&b, b"b").expect("Failed to seed b");

        let mut reg = registry(10, DeletionMode::Extended);
        reg.insert(a.clone(), profile(&a.to_string_lossy(), b"a"))
            .expect("insert should succeed");
        reg.insert(b.clone(), profile(&b.to_string_lossy(), b"b"))
            .expect("insert should succeed");

        let report = reg.garbage_collect();
        assert_eq!(report.entries_cleared, 2);
        assert_eq!(report.files_deleted, 2);
        assert!(!a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn test_gc_runs_at_most_once() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("later.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Extended);
        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should succeed");

        let first = reg.garbage_collect();
        assert_eq!(first.entries_cleared, 1);
        assert!(!path.exists());

        // Re-seed and re-register between the two calls; the second sweep
        // must touch nothing on disk or in memory.
        std::fs::write(&path, b"again").expect("Failed to re-seed");
        let second = reg.garbage_collect();
        assert_eq!(second, GcReport::default());
        assert!(path.exists(), "second gc must not alter on-disk state");
    }

    #[test]
    fn test_erase_after_gc_is_noop() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("post.txt");
        std::fs::write(&path, b"data").expect("Failed to seed");

        let mut reg = registry(10, DeletionMode::Extended);
        reg.garbage_collect();

        reg.insert(path.clone(), profile(&path.to_string_lossy(), b"data"))
            .expect("insert should still work after gc");
        let removed = reg.erase(&path, true).expect("erase after gc is a no-op");
        assert!(!removed);
        assert!(path.exists());
    }

    #[test]
    fn test_generic_string_keys() {
        let mut reg: ProfileRegistry<String> =
            ProfileRegistry::with_capacity(10, DeletionMode::Restricted);
        reg.insert("alpha".to_string(), profile("/tmp/alpha", b"1"))
            .expect("insert should succeed");
        assert!(reg.get(&"alpha".to_string()).is_some());
        assert!(reg.erase_local(&"alpha".to_string()));
        assert!(reg.is_empty());
    }
}
