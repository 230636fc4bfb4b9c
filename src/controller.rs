//! Controller facade over the profile registry and file operations.
//!
//! A `FileController` owns exactly one mutex-guarded [`ProfileRegistry`]
//! keyed by path, plus a process-unique instance identifier. Registry
//! operations from different threads against the same controller are
//! totally ordered; the critical section covers only the map mutation,
//! never file I/O. Mapped reads and writes are deliberately not serialized
//! here: two threads touching the same path race at the operating-system
//! level, and callers needing exclusion must provide it themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;
use crate::aggregate;
use crate::backup;
use crate::error::FsError;
use crate::fs_ops;
use crate::mapped;
use crate::model::{BackupOptions, BackupReport, DeletionMode, DirEntryInfo, FileProfile};
use crate::registry::{GcReport, ProfileRegistry};

/// Facade owning one bounded profile registry and exposing the engine's
/// grouped operations.
#[derive(Debug)]
pub struct FileController {
    registry: Mutex<ProfileRegistry<PathBuf>>,
    instance_id: Uuid,
}

impl FileController {
    /// Controller with the engine-wide default registry capacity.
    pub fn new(mode: DeletionMode) -> Self {
        FileController {
            registry: Mutex::new(ProfileRegistry::new(mode)),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Controller with an explicit registry capacity.
    pub fn with_capacity(capacity: usize, mode: DeletionMode) -> Self {
        FileController {
            registry: Mutex::new(ProfileRegistry::with_capacity(capacity, mode)),
            instance_id: Uuid::new_v4(),
        }
    }

    /// Process-unique identifier of this controller instance.
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    /// The deletion mode fixed at construction.
    pub fn deletion_mode(&self) -> DeletionMode {
        self.lock_registry().mode()
    }

    // A poisoned mutex only means another thread panicked mid-call; the
    // registry's map stays structurally valid, so the guard is recovered.
    fn lock_registry(&self) -> MutexGuard<'_, ProfileRegistry<PathBuf>> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Mapped I/O ──────────────────────────────────────────────────────

    /// Read a whole file into a profile; see [`mapped::read_file`].
    pub fn read(&self, path: &Path, create_missing: bool) -> Result<FileProfile, FsError> {
        mapped::read_file(path, create_missing)
    }

    /// Replace a file's content; see [`mapped::write_file`].
    pub fn write(&self, path: &Path, buffer: &[u8], create_missing: bool) -> Result<(), FsError> {
        mapped::write_file(path, buffer, create_missing)
    }

    // ── Filesystem operations ───────────────────────────────────────────

    /// Truncate-create a file with the given content.
    pub fn create_file(&self, path: &Path, content: &[u8]) -> Result<(), FsError> {
        fs_ops::create_file(path, content)
    }

    /// Create a directory, including missing parents.
    pub fn create_directory(&self, path: &Path) -> Result<(), FsError> {
        fs_ops::create_directory(path)
    }

    /// Unlink a file.
    pub fn delete_file(&self, path: &Path) -> Result<(), FsError> {
        fs_ops::delete_file(path)
    }

    /// Recursively enumerate a directory tree.
    pub fn collect_directory_entries(&self, path: &Path) -> Result<Vec<DirEntryInfo>, FsError> {
        fs_ops::collect_directory_entries(path)
    }

    /// Total byte size of every regular file under `path`.
    pub fn directory_size(&self, path: &Path) -> Result<u64, FsError> {
        fs_ops::directory_size(path)
    }

    /// Remove every entry under `path`, keeping the directory itself.
    pub fn wipe_directory(&self, path: &Path) -> Result<usize, FsError> {
        fs_ops::wipe_directory(path)
    }

    /// Aggregate every non-empty regular file under `path`.
    pub fn aggregate_directory(
        &self,
        path: &Path,
    ) -> Result<HashMap<PathBuf, FileProfile>, FsError> {
        aggregate::aggregate_directory(path)
    }

    /// Mirror `source` into `destination` and verify the result, converting
    /// every internal error into `false`.
    ///
    /// This is the historical contract of the backup operation: it never
    /// propagates, so callers cannot tell which step failed. Use
    /// [`Self::backup_directory_report`] when the distinction matters.
    pub fn backup_directory(
        &self,
        source: &Path,
        destination: &Path,
        options: &BackupOptions,
    ) -> bool {
        match backup::run_backup(source, destination, options) {
            Ok(report) => report.verified,
            Err(_) => false,
        }
    }

    /// Mirror `source` into `destination`, propagating errors and returning
    /// the full report.
    pub fn backup_directory_report(
        &self,
        source: &Path,
        destination: &Path,
        options: &BackupOptions,
    ) -> Result<BackupReport, FsError> {
        backup::run_backup(source, destination, options)
    }

    // ── Registry operations ─────────────────────────────────────────────

    /// Register a profile under its own path, taking ownership.
    ///
    /// Empty profiles and duplicate keys answer `Ok(false)`.
    ///
    /// # Errors
    /// `FsError::CapacityExceeded` when the registry is at its bound.
    pub fn register_profile(&self, profile: FileProfile) -> Result<bool, FsError> {
        let key = profile.path.clone();
        self.lock_registry().insert(key, profile)
    }

    /// Register a batch of profiles; returns how many were stored.
    ///
    /// Stops at the first capacity rejection; profiles registered before
    /// the rejection stay registered.
    pub fn register_profiles(
        &self,
        profiles: impl IntoIterator<Item = FileProfile>,
    ) -> Result<usize, FsError> {
        let mut registry = self.lock_registry();
        let mut stored = 0;
        for profile in profiles {
            let key = profile.path.clone();
            if registry.insert(key, profile)? {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// Fetch a registered profile by value.
    pub fn get_profile(&self, key: &Path) -> Option<FileProfile> {
        self.lock_registry().get(&key.to_path_buf())
    }

    /// Remove a registered profile; with `global_scope` under Extended mode
    /// the backing file is unlinked too. No-op after garbage collection.
    pub fn delete_profile(&self, key: &Path, global_scope: bool) -> Result<bool, FsError> {
        self.lock_registry().erase(&key.to_path_buf(), global_scope)
    }

    /// Number of registered profiles.
    pub fn registry_size(&self) -> usize {
        self.lock_registry().len()
    }

    /// Run the registry's one-shot garbage collection.
    ///
    /// Under Extended mode this unlinks every remaining tracked file from
    /// disk — an irreversible sweep that only ever runs through this
    /// explicit call, at most once per controller.
    pub fn garbage_collect(&self) -> GcReport {
        self.lock_registry().garbage_collect()
    }
}
