//! Recursive directory backup with post-walk verification.
//!
//! The walk mirrors the source tree under the destination, honoring the
//! skip/overwrite and empty-file policies in [`BackupOptions`]. Verification
//! then runs per [`VerifyMode`]:
//!
//! - `Size` compares the aggregate byte totals of the two trees. This is
//!   the historical behavior and it is knowingly weak: two differing trees
//!   with equal total size verify as equal. The weakness is preserved as
//!   documented and demonstrated in the tests below.
//! - `Checksum` compares every source file against its mirrored copy.

use std::fs;
use std::path::Path;
use chrono::Utc;
use log::debug;
use crate::checksums::{self, ChecksumAlgorithm};
use crate::error::FsError;
use crate::fs_ops;
use crate::model::{BackupOptions, BackupReport, VerifyMode};

/// Mirror `source` into `destination` and verify the result.
///
/// # Errors
/// `FsError::InvalidPath` when `source` is not a directory or the
/// destination is rejected by policy; `FsError::Io` when any step of the
/// walk fails. Callers wanting the original boolean contract use
/// [`crate::controller::FileController::backup_directory`], which converts
/// every error into `false`.
pub fn run_backup(
    source: &Path,
    destination: &Path,
    options: &BackupOptions,
) -> Result<BackupReport, FsError> {
    let started_at = Utc::now();

    fs_ops::validate_dir_path(source)?;
    fs_ops::validate_dir_path(destination)?;
    if !source.is_dir() {
        return Err(FsError::invalid(source, "source is not a directory"));
    }

    if destination.is_dir() {
        if !options.allow_existing_destination {
            return Err(FsError::invalid(
                destination,
                "destination already exists and existing destinations are not accepted",
            ));
        }
    } else if destination.exists() {
        return Err(FsError::invalid(destination, "destination is not a directory"));
    } else if options.create_destination {
        fs::create_dir_all(destination)
            .map_err(|e| FsError::io("create directory", destination, e))?;
    } else {
        return Err(FsError::NotFound {
            path: destination.to_path_buf(),
        });
    }

    let mut report = BackupReport {
        started_at,
        finished_at: started_at,
        dirs_created: 0,
        files_copied: 0,
        files_skipped: 0,
        bytes_copied: 0,
        verified: false,
    };

    mirror(source, destination, options, &mut report)?;
    report.verified = match options.verify {
        VerifyMode::Size => verify_by_size(source, destination)?,
        VerifyMode::Checksum(algorithm) => {
            verify_by_checksum(source, destination, options, algorithm)?
        }
    };
    report.finished_at = Utc::now();
    debug!(
        "backup {} -> {}: copied {} files ({} bytes), skipped {}, verified={}",
        source.display(),
        destination.display(),
        report.files_copied,
        report.bytes_copied,
        report.files_skipped,
        report.verified
    );
    Ok(report)
}

fn mirror(
    src_dir: &Path,
    dst_dir: &Path,
    options: &BackupOptions,
    report: &mut BackupReport,
) -> Result<(), FsError> {
    let entries = fs::read_dir(src_dir).map_err(|e| FsError::io("enumerate", src_dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io("enumerate", src_dir, e))?;
        let meta = entry
            .metadata()
            .map_err(|e| FsError::io("stat", &entry.path(), e))?;
        let src_path = entry.path();
        let dst_path = dst_dir.join(entry.file_name());

        if meta.is_dir() {
            if !dst_path.is_dir() {
                fs::create_dir(&dst_path)
                    .map_err(|e| FsError::io("create directory", &dst_path, e))?;
                report.dirs_created += 1;
            }
            mirror(&src_path, &dst_path, options, report)?;
        } else if meta.is_file() {
            if meta.len() == 0 && !options.copy_empty_files {
                report.files_skipped += 1;
                continue;
            }
            if dst_path.exists() && !options.overwrite_existing {
                report.files_skipped += 1;
                continue;
            }
            let copied = fs_ops::copy_file_with_metadata(&src_path, &dst_path)?;
            report.files_copied += 1;
            report.bytes_copied += copied;
        }
    }
    Ok(())
}

/// Compare the aggregate byte totals of two trees.
///
/// This answers `true` for any two trees whose regular files sum to the
/// same size, regardless of names or content.
pub fn verify_by_size(source: &Path, destination: &Path) -> Result<bool, FsError> {
    let src_total = fs_ops::directory_size(source)?;
    let dst_total = fs_ops::directory_size(destination)?;
    Ok(src_total == dst_total)
}

/// Compare every source file against its mirrored destination by checksum.
///
/// A destination file may legitimately be absent only when the source file
/// is empty and empty files were excluded by policy.
pub fn verify_by_checksum(
    source: &Path,
    destination: &Path,
    options: &BackupOptions,
    algorithm: ChecksumAlgorithm,
) -> Result<bool, FsError> {
    for item in fs_ops::collect_directory_entries(source)? {
        if item.is_dir {
            continue;
        }
        let relative = item
            .path
            .strip_prefix(source)
            .map_err(|_| FsError::invalid(&item.path, "entry escapes the source tree"))?;
        let mirrored = destination.join(relative);
        if !mirrored.exists() {
            if item.size == 0 && !options.copy_empty_files {
                continue;
            }
            return Ok(false);
        }
        if !checksums::verify_copy(&item.path, &mirrored, algorithm)? {
            return Ok(false);
        }
    }
    Ok(true)
}
