//! Core data model for the profile engine.
//!
//! This module defines the main data structures shared across modules:
//! - FileProfile: a file's content, path and size as an owned value
//! - DeletionMode: whether erase/GC also touch the real file on disk
//! - DirEntryInfo: one entry from a recursive directory enumeration
//! - BackupOptions, VerifyMode, BackupReport: backup policy and result

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::checksums::ChecksumAlgorithm;

/// Hard ceiling on path length accepted anywhere in the engine.
pub const MAX_PATH_LENGTH: usize = 200;

/// Hard ceiling on the number of entries a profile registry may track.
pub const MAX_REGISTRY_CAPACITY: usize = 100_000;

/// An in-memory record of one file: its absolute path, its content bytes
/// and its size.
///
/// A profile is a plain value. Whoever holds it owns the buffer; inserting
/// it into a registry is an ordinary Rust move. A profile whose `size` is 0
/// is treated as empty/invalid and is never stored in a registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileProfile {
    /// Full (normally absolute) path the content was read from
    pub path: PathBuf,

    /// The file's bytes; empty for zero-size files
    pub content: Vec<u8>,

    /// File size in bytes at read time; equals `content.len()` when the
    /// profile was populated by a read
    pub size: u64,
}

impl FileProfile {
    /// Build a profile with no content for the given path.
    pub fn empty(path: impl AsRef<Path>) -> Self {
        FileProfile {
            path: path.as_ref().to_path_buf(),
            content: Vec::new(),
            size: 0,
        }
    }

    /// Build a populated profile; `size` is derived from the buffer.
    pub fn new(path: impl AsRef<Path>, content: Vec<u8>) -> Self {
        let size = content.len() as u64;
        FileProfile {
            path: path.as_ref().to_path_buf(),
            content,
            size,
        }
    }

    /// True if this profile carries no content.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drop the content and path, resetting size to 0.
    pub fn clear(&mut self) {
        self.content.clear();
        self.path.clear();
        self.size = 0;
    }
}

/// What erase and garbage collection do beyond the in-memory entry.
///
/// The mode is fixed when a registry (or controller) is constructed; there
/// is no runtime toggle that retroactively changes what previously
/// registered entries mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionMode {
    /// Only the in-memory entry is removed
    Restricted,
    /// Disk-scoped erases additionally unlink the backing file
    Extended,
}

impl std::fmt::Display for DeletionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionMode::Restricted => write!(f, "Restricted"),
            DeletionMode::Extended => write!(f, "Extended"),
        }
    }
}

/// One entry found during recursive directory enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// Full path of the entry
    pub path: PathBuf,

    /// True if this entry is a directory
    pub is_dir: bool,

    /// File size in bytes (0 for directories)
    pub size: u64,
}

/// How a finished backup is checked against its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyMode {
    /// Compare the aggregate byte totals of the two trees.
    ///
    /// This is a byte-count comparison, not a content or file-count
    /// comparison: two differing trees with equal aggregate size pass. The
    /// behavior is retained as documented; use `Checksum` when that is not
    /// acceptable.
    Size,
    /// Compare per-file checksums of every copied file
    Checksum(ChecksumAlgorithm),
}

/// Policy switches for a directory backup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupOptions {
    /// Create the destination directory when it does not exist
    pub create_destination: bool,

    /// Accept a destination directory that already exists. When false, a
    /// pre-existing destination fails the backup (the behavior of earlier
    /// revisions of this engine).
    pub allow_existing_destination: bool,

    /// Overwrite files already present at the destination; skip them
    /// otherwise
    pub overwrite_existing: bool,

    /// Copy zero-byte files; skip them otherwise
    pub copy_empty_files: bool,

    /// Post-walk verification strategy
    pub verify: VerifyMode,
}

impl Default for BackupOptions {
    fn default() -> Self {
        BackupOptions {
            create_destination: false,
            allow_existing_destination: true,
            overwrite_existing: false,
            copy_empty_files: false,
            verify: VerifyMode::Size,
        }
    }
}

/// Result of one backup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReport {
    /// When the walk started
    pub started_at: DateTime<Utc>,

    /// When verification finished
    pub finished_at: DateTime<Utc>,

    /// Directories created under the destination
    pub dirs_created: usize,

    /// Regular files copied
    pub files_copied: usize,

    /// Regular files skipped (existing or empty, per policy)
    pub files_skipped: usize,

    /// Bytes written to the destination
    pub bytes_copied: u64,

    /// Whether the verification pass succeeded
    pub verified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_new_derives_size() {
        let p = FileProfile::new("/tmp/a", b"hello".to_vec());
        assert_eq!(p.size, 5);
        assert_eq!(p.content, b"hello");
        assert!(!p.is_empty());
    }

    #[test]
    fn test_profile_clear_empties_everything() {
        let mut p = FileProfile::new("/tmp/a", b"data".to_vec());
        p.clear();
        assert!(p.content.is_empty());
        assert_eq!(p.path, PathBuf::new());
        assert_eq!(p.size, 0);
        assert!(p.is_empty());
    }

    #[test]
    fn test_empty_profile_is_default() {
        assert_eq!(FileProfile::empty(""), FileProfile::default());
    }

    #[test]
    fn test_backup_options_default_policy() {
        let opts = BackupOptions::default();
        assert!(!opts.create_destination);
        assert!(opts.allow_existing_destination);
        assert!(!opts.overwrite_existing);
        assert!(!opts.copy_empty_files);
        assert_eq!(opts.verify, VerifyMode::Size);
    }
}
