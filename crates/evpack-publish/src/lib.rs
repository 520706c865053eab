//! # evpack-publish — Version Control and Hosting Collaborators
//!
//! Turns rendered evidence documents into a published repository with an
//! open pull request. External tools are modelled as narrow traits so the
//! workflow can be exercised without git or network access:
//!
//! - [`VersionControl`]: init, branch, stage, commit, push. [`GitCli`]
//!   implements it over the system `git`.
//! - [`RepoHost`]: preflight, publish, open review. [`GhCli`] implements it
//!   over the GitHub `gh` CLI.
//! - [`Publisher`]: the ordered workflow over both.

mod command;
pub mod error;
pub mod host;
pub mod publisher;
pub mod vcs;

pub use error::PublishError;
pub use host::{GhCli, RemoteHandle, RepoHost, RepoSpec, ReviewHandle, ReviewRequest, Visibility};
pub use publisher::{PublishPlan, PublishReport, Publisher, EVIDENCE_SUBDIR};
pub use vcs::{CommitId, GitCli, VersionControl};
