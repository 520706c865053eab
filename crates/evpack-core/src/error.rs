//! # Error Types
//!
//! Structured errors for evidence discovery, digest computation, and
//! template rendering. Precondition failures are reported before any file
//! is hashed; I/O faults abort the whole render pass.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the evidence packager.
#[derive(Error, Debug)]
pub enum PackError {
    /// The evidence directory does not exist.
    #[error("evidence directory not found: {}", .0.display())]
    MissingEvidenceDir(PathBuf),

    /// The evidence path exists but is not a directory.
    #[error("evidence path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The evidence directory holds no regular files.
    #[error("evidence directory contains no files: {}", .0.display())]
    EmptyEvidenceDir(PathBuf),

    /// An evidence filename cannot be expressed as a placeholder.
    #[error("evidence filename is not valid UTF-8: {}", .0.display())]
    InvalidFileName(PathBuf),

    /// A metadata key does not match `[A-Z][A-Z0-9_]*` or collides with
    /// the digest placeholder prefix.
    #[error("invalid metadata key {0:?}: expected [A-Z][A-Z0-9_]* not starting with SHA256_OF_")]
    InvalidMetadataKey(String),

    /// A template references evidence files that were not found.
    #[error("unresolved placeholders in {document}: {}", .placeholders.join(", "))]
    UnresolvedPlaceholder {
        /// Name of the document being rendered.
        document: String,
        /// The literal placeholder tokens left unresolved.
        placeholders: Vec<String>,
    },

    /// I/O error while reading evidence or writing rendered output.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl PackError {
    /// Wrap an I/O error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for failures caused by absent or unusable input, as
    /// opposed to faults raised while processing it.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::MissingEvidenceDir(_) | Self::NotADirectory(_) | Self::EmptyEvidenceDir(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_display_names_path() {
        let err = PackError::MissingEvidenceDir(PathBuf::from("/tmp/nope"));
        assert!(format!("{err}").contains("/tmp/nope"));
        assert!(err.is_precondition());
    }

    #[test]
    fn unresolved_display_lists_placeholders() {
        let err = PackError::UnresolvedPlaceholder {
            document: "EVIDENCE.md".to_string(),
            placeholders: vec![
                "<SHA256_OF_a.png>".to_string(),
                "<SHA256_OF_b.png>".to_string(),
            ],
        };
        let msg = format!("{err}");
        assert!(msg.contains("EVIDENCE.md"));
        assert!(msg.contains("<SHA256_OF_a.png>, <SHA256_OF_b.png>"));
        assert!(!err.is_precondition());
    }

    #[test]
    fn io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PackError::io("/evidence/x.png", io_err);
        let msg = format!("{err}");
        assert!(msg.contains("/evidence/x.png"));
        assert!(msg.contains("denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn invalid_metadata_key_display() {
        let err = PackError::InvalidMetadataKey("lower".to_string());
        assert!(format!("{err}").contains("\"lower\""));
    }
}
