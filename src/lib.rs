//! # profilefs - Memory-Mapped File Profile Engine
//!
//! A headless engine for whole-file memory-mapped I/O, a bounded in-memory
//! profile registry, directory aggregation and verified directory backup.
//!
//! ## Overview
//!
//! The engine reads and writes files through `mmap`, caches their content as
//! [`FileProfile`] values inside a capacity-bounded registry, and offers
//! directory-level operations on top:
//! - Whole-file mapped reads and writes with strict mapping lifetimes
//! - A mutex-guarded, generically keyed profile registry with one-shot
//!   garbage collection
//! - Recursive directory enumeration and aggregation
//! - Directory mirroring with size- or checksum-based verification
//!
//! ## Basic Usage
//!
//! ```no_run
//! use std::path::Path;
//! use profilefs::{DeletionMode, FileController};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = FileController::new(DeletionMode::Restricted);
//!
//! // Read a file through the mapped engine and register its profile
//! let profile = controller.read(Path::new("/tmp/data.bin"), false)?;
//! controller.register_profile(profile)?;
//!
//! // Fetch it back later by path
//! if let Some(profile) = controller.get_profile(Path::new("/tmp/data.bin")) {
//!     println!("{} bytes cached", profile.size);
//! }
//!
//! // Explicit one-shot cleanup
//! let report = controller.garbage_collect();
//! println!("cleared {} entries", report.entries_cleared);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (FileProfile, DeletionMode, options)
//! - **error**: Error types and handling
//! - **fs_ops**: Low-level filesystem operations and path validation
//! - **mapped**: Memory-mapped whole-file read and write
//! - **registry**: Bounded profile registry with one-shot garbage collection
//! - **aggregate**: Recursive directory aggregation
//! - **checksums**: Checksum computation and verification
//! - **backup**: Directory mirroring and verification
//! - **controller**: Facade combining the registry with the file operations

pub mod model;
pub mod error;
pub mod fs_ops;
pub mod mapped;
pub mod registry;
pub mod aggregate;
pub mod checksums;
pub mod backup;
pub mod controller;

// Re-export main types and functions
pub use model::{
    BackupOptions, BackupReport, DeletionMode, DirEntryInfo, FileProfile, VerifyMode,
    MAX_PATH_LENGTH, MAX_REGISTRY_CAPACITY,
};
pub use error::FsError;
pub use mapped::{read_file, write_file};
pub use registry::{GcReport, ProfileRegistry};
pub use aggregate::aggregate_directory;
pub use checksums::{compute_file_checksum, verify_copy, ChecksumAlgorithm, ChecksumValue};
pub use backup::run_backup;
pub use controller::FileController;
