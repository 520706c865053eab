//! # Repository Hosting
//!
//! The [`RepoHost`] boundary and its GitHub implementation over the `gh`
//! CLI. The host creates the remote repository from a local one and opens
//! review requests (pull requests) against it.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::command::run;
use crate::error::PublishError;

/// Remote repository visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Internal,
}

impl Visibility {
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Private => "--private",
            Self::Public => "--public",
            Self::Internal => "--internal",
        }
    }
}

/// The remote repository to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSpec {
    /// `name` or `owner/name`.
    pub name: String,
    pub visibility: Visibility,
    pub description: Option<String>,
}

/// A published remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHandle {
    pub name: String,
    /// Git remote name configured in the local repository.
    pub remote: String,
    /// Web URL reported by the host, when it printed one.
    pub url: Option<String>,
}

/// A change-review request to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    pub base: String,
    pub head: String,
    pub title: String,
    pub body: String,
}

/// An opened review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewHandle {
    pub url: Option<String>,
}

/// Remote repository hosting operations.
pub trait RepoHost {
    /// Check that the host tool is installed and authenticated.
    fn preflight(&self) -> Result<(), PublishError>;

    /// Create the remote repository from `local_repo` and push its current
    /// branch.
    fn publish(&self, local_repo: &Path, repo: &RepoSpec) -> Result<RemoteHandle, PublishError>;

    /// Open a review request from `request.head` into `request.base`.
    fn open_review(
        &self,
        local_repo: &Path,
        request: &ReviewRequest,
    ) -> Result<ReviewHandle, PublishError>;
}

/// [`RepoHost`] backed by the GitHub `gh` CLI.
#[derive(Debug, Clone)]
pub struct GhCli {
    program: String,
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new("gh")
    }
}

/// Name of the remote `gh repo create --source` configures.
pub const DEFAULT_REMOTE: &str = "origin";

impl GhCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build `gh repo create` for `repo`, sourcing from `local_repo`.
    pub fn repo_create_command(&self, local_repo: &Path, repo: &RepoSpec) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["repo", "create", repo.name.as_str(), repo.visibility.as_flag()])
            .arg("--source")
            .arg(local_repo)
            .args(["--remote", DEFAULT_REMOTE, "--push"]);
        if let Some(description) = &repo.description {
            cmd.args(["--description", description.as_str()]);
        }
        cmd.env("GH_PROMPT_DISABLED", "1");
        cmd
    }

    /// Build `gh pr create` for `request`, run inside `local_repo`.
    pub fn pr_create_command(&self, local_repo: &Path, request: &ReviewRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(local_repo)
            .args(["pr", "create"])
            .args(["--base", request.base.as_str()])
            .args(["--head", request.head.as_str()])
            .args(["--title", request.title.as_str()])
            .args(["--body", request.body.as_str()]);
        cmd.env("GH_PROMPT_DISABLED", "1");
        cmd
    }
}

/// The last line of `gh` output that looks like a URL.
fn last_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with("https://") || l.starts_with("http://"))
        .map(str::to_string)
}

impl RepoHost for GhCli {
    fn preflight(&self) -> Result<(), PublishError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["auth", "status"]);
        run(cmd)?;
        Ok(())
    }

    fn publish(&self, local_repo: &Path, repo: &RepoSpec) -> Result<RemoteHandle, PublishError> {
        let stdout = run(self.repo_create_command(local_repo, repo))?;
        Ok(RemoteHandle {
            name: repo.name.clone(),
            remote: DEFAULT_REMOTE.to_string(),
            url: last_url(&stdout),
        })
    }

    fn open_review(
        &self,
        local_repo: &Path,
        request: &ReviewRequest,
    ) -> Result<ReviewHandle, PublishError> {
        let stdout = run(self.pr_create_command(local_repo, request))?;
        Ok(ReviewHandle {
            url: last_url(&stdout),
        })
    }
}
