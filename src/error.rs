//! Error types for the profile engine.
//!
//! The primary error type is `FsError`. Predicate-style queries (exists,
//! is-directory, ...) never return it; they answer `false` on any invalid
//! input. Mutating operations raise on first failure, with no retry.

use std::fmt::{Display, self};
use std::path::{Path, PathBuf};
use std::io;
use std::error::Error;

/// Errors raised by mutating filesystem and registry operations.
///
/// Backup is the one exception to normal propagation: the controller-level
/// backup call catches every `FsError` and reports a boolean result.
#[derive(Debug)]
pub enum FsError {
    /// Target path does not exist and creation was not requested
    NotFound { path: PathBuf },

    /// Empty, oversized or space-containing path, or a relative path where
    /// an absolute one is required
    InvalidPath { path: PathBuf, reason: String },

    /// Registry insert would exceed the configured maximum
    CapacityExceeded { capacity: usize },

    /// An underlying open/stat/map/resize/unlink syscall failed
    Io {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "File does not exist: {}", path.display())
            }
            Self::InvalidPath { path, reason } => {
                write!(f, "Invalid path: {} ({})", path.display(), reason)
            }
            Self::CapacityExceeded { capacity } => {
                write!(f, "Profile registry is full (capacity {})", capacity)
            }
            Self::Io { op, path, source } => {
                write!(f, "Failed to {} {}: {}", op, path.display(), source)
            }
        }
    }
}

impl Error for FsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FsError {
    /// Wrap a syscall failure with the operation name and the path it hit.
    pub fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        FsError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Build an `InvalidPath` error with a human-readable reason.
    pub fn invalid(path: &Path, reason: impl Into<String>) -> Self {
        FsError::InvalidPath {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<u32> {
        match self {
            Self::Io { source, .. } => source.raw_os_error().map(|e| e as u32),
            _ => None,
        }
    }
}
