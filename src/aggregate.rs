//! Recursive directory aggregation.
//!
//! Walks a directory tree and reads every regular file through the mapped
//! engine, collecting non-empty results into a map keyed by path.
//! Directories never appear in the output; zero-size files are silently
//! skipped.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use crate::error::FsError;
use crate::fs_ops;
use crate::mapped;
use crate::model::FileProfile;

/// Aggregate every non-empty regular file under `root`.
///
/// # Arguments
/// * `root` - Absolute directory to descend from
///
/// # Errors
/// `FsError::InvalidPath` for relative or out-of-bounds paths, `FsError::Io`
/// when enumeration or a file read fails.
pub fn aggregate_directory(root: &Path) -> Result<HashMap<PathBuf, FileProfile>, FsError> {
    fs_ops::validate_dir_path(root)?;
    if !root.is_dir() {
        return Err(FsError::invalid(root, "not a directory"));
    }

    let mut result = HashMap::new();
    recurse(root, &mut result)?;
    Ok(result)
}

fn recurse(dir: &Path, result: &mut HashMap<PathBuf, FileProfile>) -> Result<(), FsError> {
    let entries = fs::read_dir(dir).map_err(|e| FsError::io("enumerate", dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io("enumerate", dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            recurse(&path, result)?;
        } else if path.is_file() {
            let profile = mapped::read_file(&path, false)?;
            if !profile.is_empty() {
                result.insert(path, profile);
            }
        }
        // other entry kinds (dangling symlinks, sockets) are skipped
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregation_skips_empty_files_and_directories() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("agg");
        fs::create_dir(&root).expect("Failed to create root");

        fs::write(root.join("empty.txt"), b"").expect("Failed to write empty");
        fs::write(root.join("ten.txt"), b"0123456789").expect("Failed to write ten");
        fs::create_dir(root.join("subdir")).expect("Failed to create subdir");

        let result = aggregate_directory(&root).expect("Failed to aggregate");
        assert_eq!(result.len(), 1, "only the 10-byte file should remain");

        let key = root.join("ten.txt");
        let profile = result.get(&key).expect("expected the 10-byte file keyed by path");
        assert_eq!(profile.size, 10);
        assert_eq!(profile.content, b"0123456789");
    }

    #[test]
    fn test_aggregation_descends_into_subdirectories() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path().join("tree");
        let deep = root.join("a").join("b");
        fs::create_dir_all(&deep).expect("Failed to create tree");

        fs::write(root.join("top.txt"), b"top").expect("Failed to write top");
        fs::write(deep.join("deep.txt"), b"deep").expect("Failed to write deep");

        let result = aggregate_directory(&root).expect("Failed to aggregate");
        assert_eq!(result.len(), 2);
        assert!(result.contains_key(&root.join("top.txt")));
        assert!(result.contains_key(&deep.join("deep.txt")));
    }

    #[test]
    fn test_relative_path_is_invalid() {
        let result = aggregate_directory(Path::new("some/relative/dir"));
        assert!(matches!(result, Err(FsError::InvalidPath { .. })));
    }

    #[test]
    fn test_overlong_path_is_invalid() {
        let long = format!("/{}", "d".repeat(crate::model::MAX_PATH_LENGTH + 10));
        let result = aggregate_directory(Path::new(&long));
        assert!(matches!(result, Err(FsError::InvalidPath { .. })));
    }

    #[test]
    fn test_empty_directory_yields_empty_map() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = aggregate_directory(temp_dir.path()).expect("Failed to aggregate");
        assert!(result.is_empty());
    }
}
