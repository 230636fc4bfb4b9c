//! Checksum computation for backup verification.
//!
//! This module provides:
//! - Multiple checksum algorithms (CRC32, MD5, SHA-256, BLAKE3)
//! - File-level checksum computation
//! - Source/destination copy verification

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::error::FsError;

/// Supported checksum algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumAlgorithm {
    /// CRC32 (fast, 32-bit)
    Crc32,
    /// MD5 (deprecated, but included for compatibility)
    Md5,
    /// SHA-256 (cryptographic, 256-bit)
    Sha256,
    /// BLAKE3 (modern, fast, 256-bit)
    Blake3,
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crc32 => write!(f, "crc32"),
            Self::Md5 => write!(f, "md5"),
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// A computed checksum value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumValue {
    algorithm: ChecksumAlgorithm,
    hex: String,
}

impl ChecksumValue {
    /// Get the algorithm
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    /// Get the hex string representation
    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for ChecksumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Trait for incrementally computing a checksum
trait ChecksumHasher {
    fn update(&mut self, data: &[u8]);
    fn finalize(self: Box<Self>) -> ChecksumValue;
}

struct Crc32Hasher {
    crc: u32,
}

impl ChecksumHasher for Crc32Hasher {
    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let mut crc = self.crc ^ byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 == 1 {
                    (crc >> 1) ^ 0xedb8_8320
                } else {
                    crc >> 1
                };
            }
            self.crc = crc;
        }
    }

    fn finalize(self: Box<Self>) -> ChecksumValue {
        ChecksumValue {
            algorithm: ChecksumAlgorithm::Crc32,
            hex: format!("{:08x}", self.crc ^ 0xffff_ffff),
        }
    }
}

struct Md5Hasher {
    context: md5::Context,
}

impl ChecksumHasher for Md5Hasher {
    fn update(&mut self, data: &[u8]) {
        self.context.consume(data);
    }

    fn finalize(self: Box<Self>) -> ChecksumValue {
        ChecksumValue {
            algorithm: ChecksumAlgorithm::Md5,
            hex: format!("{:x}", self.context.compute()),
        }
    }
}

struct Sha256Hasher {
    hasher: sha2::Sha256,
}

impl ChecksumHasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) {
        use sha2::Digest;
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> ChecksumValue {
        use sha2::Digest;
        ChecksumValue {
            algorithm: ChecksumAlgorithm::Sha256,
            hex: format!("{:x}", self.hasher.finalize()),
        }
    }
}

struct Blake3Hasher {
    hasher: blake3::Hasher,
}

impl ChecksumHasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn finalize(self: Box<Self>) -> ChecksumValue {
        ChecksumValue {
            algorithm: ChecksumAlgorithm::Blake3,
            hex: self.hasher.finalize().to_hex().to_string(),
        }
    }
}

fn create_hasher(algorithm: ChecksumAlgorithm) -> Box<dyn ChecksumHasher> {
    match algorithm {
        ChecksumAlgorithm::Crc32 => Box::new(Crc32Hasher { crc: 0xffff_ffff }),
        ChecksumAlgorithm::Md5 => Box::new(Md5Hasher {
            context: md5::Context::new(),
        }),
        ChecksumAlgorithm::Sha256 => Box::new(Sha256Hasher {
            hasher: sha2::Sha256::default(),
        }),
        ChecksumAlgorithm::Blake3 => Box::new(Blake3Hasher {
            hasher: blake3::Hasher::new(),
        }),
    }
}

/// Compute the checksum of a file, streaming its content in chunks.
///
/// # Errors
/// Returns `FsError::Io` when the file cannot be opened or read.
pub fn compute_file_checksum(
    path: &Path,
    algorithm: ChecksumAlgorithm,
) -> Result<ChecksumValue, FsError> {
    let mut file = File::open(path).map_err(|e| FsError::io("open", path, e))?;
    let mut hasher = create_hasher(algorithm);
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| FsError::io("read", path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Compare a source file against its copy by checksum.
///
/// Returns `true` when both files hash to the same value.
pub fn verify_copy(
    src: &Path,
    dst: &Path,
    algorithm: ChecksumAlgorithm,
) -> Result<bool, FsError> {
    let src_sum = compute_file_checksum(src, algorithm)?;
    let dst_sum = compute_file_checksum(dst, algorithm)?;
    Ok(src_sum == dst_sum)
}
