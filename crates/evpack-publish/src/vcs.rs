//! # Version Control
//!
//! The [`VersionControl`] boundary and its `git` implementation. Every call
//! names the repository directory explicitly (`git -C <dir>`); the process
//! working directory is never changed.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::command::run;
use crate::error::PublishError;

/// Identifier of a created commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitId(pub String);

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Local version-control operations needed to build an evidence package.
pub trait VersionControl {
    /// Check that the tool is usable.
    fn preflight(&self) -> Result<(), PublishError>;

    /// Create a new repository in `dir` with `default_branch` checked out.
    fn init(&self, dir: &Path, default_branch: &str) -> Result<(), PublishError>;

    /// Create and switch to a new branch.
    fn create_branch(&self, dir: &Path, branch: &str) -> Result<(), PublishError>;

    /// Stage paths, given relative to `dir`.
    fn stage(&self, dir: &Path, paths: &[PathBuf]) -> Result<(), PublishError>;

    /// Commit the staged changes.
    fn commit(&self, dir: &Path, message: &str) -> Result<CommitId, PublishError>;

    /// Push `branch` to `remote`, setting upstream.
    fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), PublishError>;
}

/// [`VersionControl`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build a `git -C <dir> <args>` command with prompts disabled.
    pub fn command<I, S>(&self, dir: &Path, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(dir).args(args);
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }
}

impl VersionControl for GitCli {
    fn preflight(&self) -> Result<(), PublishError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--version");
        let version = run(cmd)?;
        tracing::debug!(%version, "git available");
        Ok(())
    }

    fn init(&self, dir: &Path, default_branch: &str) -> Result<(), PublishError> {
        run(self.command(dir, ["init", "--initial-branch", default_branch]))?;
        Ok(())
    }

    fn create_branch(&self, dir: &Path, branch: &str) -> Result<(), PublishError> {
        run(self.command(dir, ["checkout", "-b", branch]))?;
        Ok(())
    }

    fn stage(&self, dir: &Path, paths: &[PathBuf]) -> Result<(), PublishError> {
        let mut cmd = self.command(dir, ["add", "--"]);
        cmd.args(paths);
        run(cmd)?;
        Ok(())
    }

    fn commit(&self, dir: &Path, message: &str) -> Result<CommitId, PublishError> {
        run(self.command(dir, ["commit", "--quiet", "-m", message]))?;
        let head = run(self.command(dir, ["rev-parse", "HEAD"]))?;
        Ok(CommitId(head))
    }

    fn push(&self, dir: &Path, remote: &str, branch: &str) -> Result<(), PublishError> {
        run(self.command(dir, ["push", "--set-upstream", remote, branch]))?;
        Ok(())
    }
}
