//! # Publishing Error Types

use std::path::PathBuf;

use evpack_core::PackError;
use thiserror::Error;

/// Errors from staging, committing, and publishing an evidence package.
#[derive(Error, Debug)]
pub enum PublishError {
    /// An external program could not be started.
    #[error("required tool `{program}` is not available: {source}")]
    ToolMissing {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program exited unsuccessfully.
    #[error("`{program} {}` failed ({status}): {stderr}", .args.join(" "))]
    CommandFailed {
        program: String,
        args: Vec<String>,
        status: String,
        stderr: String,
    },

    /// The working directory is already a repository.
    #[error("working directory already contains a repository: {}", .0.display())]
    WorkdirIsRepository(PathBuf),

    /// Rendering the documents failed.
    #[error(transparent)]
    Pack(#[from] PackError),

    /// I/O error while preparing the working tree.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PublishError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
