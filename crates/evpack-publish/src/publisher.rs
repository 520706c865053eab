//! # Publisher Workflow
//!
//! Drives the complete packaging run against injected collaborators:
//!
//! 1. Preflight: evidence directory, `VersionControl` and `RepoHost` tools,
//!    and a working directory that is not already a repository.
//! 2. Render every document. This happens before anything is written, so
//!    a failed render leaves the filesystem untouched.
//! 3. Initialise the repository on the base branch and commit the static
//!    documents.
//! 4. Publish the repository to the host (creates the remote, pushes base).
//! 5. Branch, copy evidence into `evidence/`, write the rendered documents,
//!    and commit.
//! 6. Push the branch and open a review request into the base branch.

use std::path::{Path, PathBuf};

use evpack_core::{
    render_with, DocumentTemplate, EvidenceSet, RenderOptions, RenderedDocument,
};

use crate::error::PublishError;
use crate::host::{RemoteHandle, RepoHost, RepoSpec, ReviewHandle, ReviewRequest};
use crate::vcs::{CommitId, VersionControl};

/// Subdirectory of the working tree that receives the evidence files.
pub const EVIDENCE_SUBDIR: &str = "evidence";

/// Everything one publishing run needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct PublishPlan {
    pub evidence_dir: PathBuf,
    /// Directory the local repository is built in.
    pub workdir: PathBuf,
    pub templates: Vec<DocumentTemplate>,
    /// Documents committed on the base branch without substitution.
    pub static_documents: Vec<RenderedDocument>,
    pub render_options: RenderOptions,
    pub repo: RepoSpec,
    pub base_branch: String,
    pub branch: String,
    pub initial_commit_message: String,
    pub commit_message: String,
    pub review_title: String,
    pub review_body: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub remote: RemoteHandle,
    pub review: ReviewHandle,
    pub base_commit: CommitId,
    pub evidence_commit: CommitId,
    /// Paths written into the working tree, relative to it.
    pub files: Vec<PathBuf>,
}

/// Publishing workflow over a version-control system and a repository host.
#[derive(Debug)]
pub struct Publisher<V, H> {
    vcs: V,
    host: H,
}

impl<V: VersionControl, H: RepoHost> Publisher<V, H> {
    pub fn new(vcs: V, host: H) -> Self {
        Self { vcs, host }
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Execute the plan end to end.
    pub fn run(&self, plan: &PublishPlan) -> Result<PublishReport, PublishError> {
        let evidence = EvidenceSet::scan(&plan.evidence_dir)?;
        self.vcs.preflight()?;
        self.host.preflight()?;
        if plan.workdir.join(".git").exists() {
            return Err(PublishError::WorkdirIsRepository(plan.workdir.clone()));
        }

        let outcome = render_with(&plan.templates, &evidence, &plan.render_options)?;
        tracing::info!(
            documents = outcome.documents.len(),
            evidence = evidence.len(),
            "rendered documents"
        );

        let workdir = plan.workdir.as_path();
        create_dir(workdir)?;
        self.vcs.init(workdir, &plan.base_branch)?;

        let base_files = write_documents(workdir, &plan.static_documents)?;
        self.vcs.stage(workdir, &base_files)?;
        let base_commit = self.vcs.commit(workdir, &plan.initial_commit_message)?;
        tracing::info!(commit = %base_commit, branch = %plan.base_branch, "committed base documents");

        let remote = self.host.publish(workdir, &plan.repo)?;
        tracing::info!(repo = %remote.name, url = ?remote.url, "published repository");

        self.vcs.create_branch(workdir, &plan.branch)?;
        let mut evidence_files = copy_evidence(workdir, &evidence)?;
        evidence_files.extend(write_documents(workdir, &outcome.documents)?);
        self.vcs.stage(workdir, &evidence_files)?;
        let evidence_commit = self.vcs.commit(workdir, &plan.commit_message)?;
        tracing::info!(commit = %evidence_commit, branch = %plan.branch, "committed evidence");

        self.vcs.push(workdir, &remote.remote, &plan.branch)?;
        let review = self.host.open_review(
            workdir,
            &ReviewRequest {
                base: plan.base_branch.clone(),
                head: plan.branch.clone(),
                title: plan.review_title.clone(),
                body: plan.review_body.clone(),
            },
        )?;
        tracing::info!(url = ?review.url, "opened review request");

        let mut files = base_files;
        files.extend(evidence_files);
        Ok(PublishReport {
            remote,
            review,
            base_commit,
            evidence_commit,
            files,
        })
    }
}

fn create_dir(path: &Path) -> Result<(), PublishError> {
    std::fs::create_dir_all(path).map_err(|e| PublishError::io(path, e))
}

/// Write documents at the working tree root; returns relative paths.
fn write_documents(
    workdir: &Path,
    documents: &[RenderedDocument],
) -> Result<Vec<PathBuf>, PublishError> {
    let mut written = Vec::with_capacity(documents.len());
    for doc in documents {
        let path = workdir.join(&doc.name);
        std::fs::write(&path, &doc.text).map_err(|e| PublishError::io(&path, e))?;
        written.push(PathBuf::from(&doc.name));
    }
    Ok(written)
}

/// Copy each evidence file byte-for-byte into `evidence/`; returns
/// relative paths.
fn copy_evidence(workdir: &Path, evidence: &EvidenceSet) -> Result<Vec<PathBuf>, PublishError> {
    let target = workdir.join(EVIDENCE_SUBDIR);
    create_dir(&target)?;
    let mut copied = Vec::with_capacity(evidence.len());
    for file in evidence {
        let dest = target.join(&file.name);
        std::fs::copy(&file.path, &dest).map_err(|e| PublishError::io(&file.path, e))?;
        copied.push(Path::new(EVIDENCE_SUBDIR).join(&file.name));
    }
    Ok(copied)
}
