//! # Evidence Digest
//!
//! Defines `EvidenceDigest` and `DigestAlgorithm`, the integrity record
//! stored for every evidence file.
//!
//! A digest is a pure function of file bytes: the same content always
//! produces the same 64-character lowercase hex string. Files are hashed by
//! streaming them through the hasher, so large images are never held in
//! memory whole.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PackError;

/// The hash algorithm used to produce an evidence digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A digest of an evidence file's full byte content, with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl EvidenceDigest {
    /// Create a digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    ///
    /// This is the form substituted into document templates.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for EvidenceDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

fn finish(hasher: Sha256) -> EvidenceDigest {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    EvidenceDigest::new(DigestAlgorithm::Sha256, bytes)
}

/// Compute the SHA-256 digest of an in-memory byte slice.
pub fn digest_bytes(data: &[u8]) -> EvidenceDigest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    finish(hasher)
}

/// Compute the SHA-256 digest of a file's full content.
///
/// Any read failure (missing file, permission error) is returned as
/// [`PackError::Io`] naming the path.
pub fn digest_file(path: &Path) -> Result<EvidenceDigest, PackError> {
    let mut file = File::open(path).map_err(|e| PackError::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| PackError::io(path, e))?;
    Ok(finish(hasher))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vector_hello() {
        let digest = digest_bytes(b"hello");
        assert_eq!(
            digest.to_hex(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(digest.algorithm, DigestAlgorithm::Sha256);
    }

    #[test]
    fn known_vector_empty() {
        assert_eq!(
            digest_bytes(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn display_carries_algorithm_prefix() {
        let s = digest_bytes(b"abc").to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn file_digest_matches_bytes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        let content: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
        std::fs::write(&path, &content).unwrap();

        assert_eq!(digest_file(&path).unwrap(), digest_bytes(&content));
    }

    #[test]
    fn file_digest_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();
        assert_eq!(digest_file(&path).unwrap(), digest_file(&path).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = digest_file(&dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
        assert!(format!("{err}").contains("absent.png"));
    }

    #[test]
    fn hex_is_lowercase() {
        let hex = digest_bytes(b"UPPER").to_hex();
        assert!(hex.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn digest_algorithm_display() {
        assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
    }
}
