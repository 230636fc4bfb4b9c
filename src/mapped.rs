//! Memory-mapped file read and write.
//!
//! Both operations load or store the whole file in one shot: a read maps
//! the file private/read-only and copies the bytes into an owned buffer; a
//! write resizes the file to the exact buffer length, maps it shared and
//! copies the buffer in. There is no partial or streaming access and no
//! append mode.
//!
//! Lifetime contract: the mapping and the descriptor are both scoped to a
//! single call. Bindings are declared file-then-map so drop order unmaps
//! before closing, on every exit path including errors. Nothing mapped
//! survives a return.
//!
//! Two threads invoking read/write on the same path race at the operating
//! system level; this module adds no cross-call ordering. Callers needing
//! exclusion must serialize externally.

use std::fs::{File, OpenOptions};
use std::path::Path;
use log::debug;
use memmap2::{Mmap, MmapMut};
use crate::error::FsError;
use crate::fs_ops;
use crate::model::FileProfile;

/// Read the whole file at `path` into an owned [`FileProfile`].
///
/// # Arguments
/// * `path` - File to read
/// * `create_missing` - Create an empty file first when `path` is absent
///
/// # Errors
/// `FsError::NotFound` when the file is absent and creation was not
/// requested; `FsError::Io` when open, stat or the mapping fails. The
/// descriptor never outlives the call, on success or failure.
pub fn read_file(path: &Path, create_missing: bool) -> Result<FileProfile, FsError> {
    ensure_present(path, create_missing, &[])?;

    let file = File::open(path).map_err(|e| FsError::io("open", path, e))?;
    let meta = file.metadata().map_err(|e| FsError::io("stat", path, e))?;
    let size = meta.len();

    let mut profile = FileProfile::empty(path);
    if size > 0 {
        // SAFETY: the mapping is private and dropped before this function
        // returns; the file is not written through while mapped.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| FsError::io("map", path, e))?;
        profile.content = map.to_vec();
        profile.size = size;
        debug!("read_file path={} size={}", path.display(), size);
        // map unmaps here, then file closes
    }
    Ok(profile)
}

/// Replace the contents of `path` with `buffer`.
///
/// The file is resized to exactly `buffer.len()` bytes before the copy, so
/// every write fully replaces the previous content. A failure after the
/// resize leaves the file truncated; callers must treat it as corrupted and
/// rewrite.
///
/// # Errors
/// Same precheck as [`read_file`]; `FsError::Io` when open, resize, the
/// mapping or the final flush fails.
pub fn write_file(path: &Path, buffer: &[u8], create_missing: bool) -> Result<(), FsError> {
    ensure_present(path, create_missing, &[])?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| FsError::io("open", path, e))?;

    let len = buffer.len() as u64;
    file.set_len(len)
        .map_err(|e| FsError::io("resize", path, e))?;
    debug!("write_file path={} size={}", path.display(), len);

    // A zero-length mapping is invalid; the resize above already truncated.
    if buffer.is_empty() {
        return Ok(());
    }

    // SAFETY: the shared mapping is exclusive to this call and dropped
    // before return; no other alias of the region exists in-process.
    let mut map = unsafe { MmapMut::map_mut(&file) }.map_err(|e| FsError::io("map", path, e))?;
    map.copy_from_slice(buffer);
    // msync; unmap/close failures surface here rather than silently on drop
    map.flush().map_err(|e| FsError::io("sync", path, e))?;
    Ok(())
}

/// Shared existence precheck: create the file (with `initial` content) when
/// requested, otherwise report the absence.
fn ensure_present(path: &Path, create_missing: bool, initial: &[u8]) -> Result<(), FsError> {
    fs_ops::validate_path(path)?;
    if path.exists() {
        return Ok(());
    }
    if create_missing {
        fs_ops::create_file(path, initial)
    } else {
        Err(FsError::NotFound {
            path: path.to_path_buf(),
        })
    }
}
