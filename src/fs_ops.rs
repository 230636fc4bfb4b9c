//! Low-level filesystem operations.
//!
//! This module provides:
//! - Path validation against the engine-wide length/format bounds
//! - Existence and type predicates (these never raise)
//! - File and directory creation/deletion
//! - Recursive enumeration, byte totals and directory wiping
//! - Copying files with metadata preservation

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use crate::error::FsError;
use crate::model::{DirEntryInfo, MAX_PATH_LENGTH};

/// Check a path against the engine-wide bounds: non-empty, at most
/// [`MAX_PATH_LENGTH`] characters, no space characters.
///
/// # Errors
/// Returns `FsError::InvalidPath` describing the first violated bound.
pub fn validate_path(path: &Path) -> Result<(), FsError> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(FsError::invalid(path, "path is empty"));
    }
    if text.len() > MAX_PATH_LENGTH {
        return Err(FsError::invalid(
            path,
            format!("path exceeds {} characters", MAX_PATH_LENGTH),
        ));
    }
    if text.contains(' ') {
        return Err(FsError::invalid(path, "path contains a space"));
    }
    Ok(())
}

/// Like [`validate_path`], additionally requiring an absolute path.
/// Directory-scoped operations (aggregation, backup, wipe) use this form.
pub fn validate_dir_path(path: &Path) -> Result<(), FsError> {
    validate_path(path)?;
    if !path.is_absolute() {
        return Err(FsError::invalid(path, "path must be absolute"));
    }
    Ok(())
}

/// True if `path` satisfies the bounds and exists on disk.
///
/// Predicates never raise; any invalid or ambiguous input answers `false`.
pub fn path_exists(path: &Path) -> bool {
    validate_path(path).is_ok() && path.exists()
}

/// True if every path in `paths` exists. An empty set answers `false`.
pub fn all_exist(paths: &HashSet<PathBuf>) -> bool {
    !paths.is_empty() && paths.iter().all(|p| path_exists(p))
}

/// True if `path` is a regular file.
pub fn is_regular_file(path: &Path) -> bool {
    validate_path(path).is_ok() && path.is_file()
}

/// True if `path` is a directory.
pub fn is_directory(path: &Path) -> bool {
    validate_path(path).is_ok() && path.is_dir()
}

/// True if `path` is a symbolic link.
pub fn is_symlink(path: &Path) -> bool {
    validate_path(path).is_ok() && path.is_symlink()
}

/// True if `path` is a regular file with any execute permission bit set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    if !is_regular_file(path) {
        return false;
    }
    match fs::metadata(path) {
        Ok(meta) => meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

/// True if `path` is a regular file (execute bits are a Unix concept).
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    is_regular_file(path)
}

/// Create (truncate-create) a file at `path` with the given content.
///
/// # Errors
/// Returns `FsError::InvalidPath` for out-of-bounds paths and `FsError::Io`
/// when the create or write fails.
pub fn create_file(path: &Path, content: &[u8]) -> Result<(), FsError> {
    validate_path(path)?;
    fs::write(path, content).map_err(|e| FsError::io("create", path, e))
}

/// Create a directory at `path`, including missing parents.
pub fn create_directory(path: &Path) -> Result<(), FsError> {
    validate_path(path)?;
    fs::create_dir_all(path).map_err(|e| FsError::io("create directory", path, e))
}

/// Unlink the file at `path`.
///
/// # Errors
/// `FsError::NotFound` when the file is absent, `FsError::Io` on unlink
/// failure.
pub fn delete_file(path: &Path) -> Result<(), FsError> {
    validate_path(path)?;
    if !path.exists() {
        return Err(FsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    fs::remove_file(path).map_err(|e| FsError::io("unlink", path, e))
}

/// Enumerate a directory tree and return every file and subdirectory.
///
/// The listing is depth-first; directories appear before their content.
///
/// # Errors
/// Returns an error for invalid/relative paths and when enumeration fails
/// at any level.
pub fn collect_directory_entries(root: &Path) -> Result<Vec<DirEntryInfo>, FsError> {
    validate_dir_path(root)?;
    if !root.is_dir() {
        return Err(FsError::invalid(root, "not a directory"));
    }

    fn recurse(dir: &Path, items: &mut Vec<DirEntryInfo>) -> Result<(), FsError> {
        let entries = fs::read_dir(dir).map_err(|e| FsError::io("enumerate", dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| FsError::io("enumerate", dir, e))?;
            let meta = entry
                .metadata()
                .map_err(|e| FsError::io("stat", &entry.path(), e))?;
            let path = entry.path();
            if meta.is_dir() {
                items.push(DirEntryInfo {
                    path: path.clone(),
                    is_dir: true,
                    size: 0,
                });
                recurse(&path, items)?;
            } else {
                items.push(DirEntryInfo {
                    path,
                    is_dir: false,
                    size: meta.len(),
                });
            }
        }
        Ok(())
    }

    let mut items = Vec::new();
    recurse(root, &mut items)?;
    Ok(items)
}

/// Total byte size of every regular file under `root`, recursively.
pub fn directory_size(root: &Path) -> Result<u64, FsError> {
    let items = collect_directory_entries(root)?;
    Ok(items.iter().filter(|i| !i.is_dir).map(|i| i.size).sum())
}

/// Remove every entry under `root`; the directory itself survives.
///
/// Returns the number of removed top-level entries.
pub fn wipe_directory(root: &Path) -> Result<usize, FsError> {
    validate_dir_path(root)?;
    if !root.is_dir() {
        return Err(FsError::invalid(root, "not a directory"));
    }

    let entries = fs::read_dir(root).map_err(|e| FsError::io("enumerate", root, e))?;
    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io("enumerate", root, e))?;
        let path = entry.path();
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| FsError::io("remove directory", &path, e))?;
        } else {
            fs::remove_file(&path).map_err(|e| FsError::io("unlink", &path, e))?;
        }
        removed += 1;
    }
    Ok(removed)
}

/// Copy a file from source to destination, preserving the modification
/// time when available.
///
/// # Returns
/// Number of bytes copied
///
/// # Errors
/// Returns `FsError::Io` when the read, write or parent-directory creation
/// fails.
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, FsError> {
    ensure_parent_dir_exists(dst)?;

    let mut src_file = fs::File::open(src).map_err(|e| FsError::io("read", src, e))?;
    let src_mtime = src_file.metadata().ok().and_then(|m| m.modified().ok());

    let mut dst_file = fs::File::create(dst).map_err(|e| FsError::io("write", dst, e))?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            FsError::io("write", dst, e)
        } else {
            FsError::io("read", src, e)
        }
    })?;

    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }

    Ok(bytes_copied)
}

/// Ensure the parent directory of a path exists, creating it if necessary.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), FsError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    match fs::metadata(parent) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(FsError::invalid(
            parent,
            "parent path exists but is not a directory",
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => fs::create_dir_all(parent)
            .map_err(|e| FsError::io("create directory", parent, e)),
        Err(e) => Err(FsError::io("stat", parent, e)),
    }
}
