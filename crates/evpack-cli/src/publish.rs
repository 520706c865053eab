//! # Publish Subcommand
//!
//! Builds the evidence repository in a working directory, publishes it
//! through `gh`, and opens a pull request from the evidence branch.
//!
//! ```bash
//! evpack publish --evidence ./evidence --workdir ./pkg --repo octo/evidence-checkout
//! evpack --config evpack.yaml publish --evidence ./evidence --workdir ./pkg --public
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use evpack_core::builtin_static_documents;
use evpack_publish::{GhCli, GitCli, PublishPlan, Publisher, RepoSpec, Visibility};

use crate::config::PackConfig;
use crate::{load_templates, parse_meta, policy, render_options};

/// Arguments for `evpack publish`.
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Evidence directory.
    #[arg(long)]
    pub evidence: PathBuf,

    /// Directory to build the local repository in. Must not already be a
    /// repository.
    #[arg(long)]
    pub workdir: PathBuf,

    /// Remote repository name (`name` or `owner/name`). Overrides config.
    #[arg(long)]
    pub repo: Option<String>,

    /// Create a public repository instead of the configured visibility.
    #[arg(long)]
    pub public: bool,

    /// Evidence branch name. Overrides config.
    #[arg(long)]
    pub branch: Option<String>,

    /// Pull request title. Overrides config.
    #[arg(long)]
    pub title: Option<String>,

    /// Template file. Repeatable. Defaults to the built-in document set.
    #[arg(long = "template")]
    pub templates: Vec<PathBuf>,

    /// Metadata value for a `<KEY>` token. Repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, String)>,

    /// Fail when a placeholder names no evidence file.
    #[arg(long)]
    pub strict: bool,
}

/// Assemble the publishing plan from arguments and configuration.
pub fn build_plan(args: &PublishArgs, config: &PackConfig) -> Result<PublishPlan> {
    let name = args
        .repo
        .clone()
        .or_else(|| config.repo.clone())
        .context("a repository name is required: pass --repo or set `repo` in config")?;
    let visibility = if args.public {
        Visibility::Public
    } else {
        config.visibility
    };

    Ok(PublishPlan {
        evidence_dir: args.evidence.clone(),
        workdir: args.workdir.clone(),
        templates: load_templates(&args.templates, config)?,
        static_documents: builtin_static_documents(),
        render_options: render_options(config, &args.meta, policy(args.strict, config))?,
        repo: RepoSpec {
            name,
            visibility,
            description: config.description.clone(),
        },
        base_branch: config.base_branch.clone(),
        branch: args.branch.clone().unwrap_or_else(|| config.branch.clone()),
        initial_commit_message: "Initial commit".to_string(),
        commit_message: config.commit_message.clone(),
        review_title: args.title.clone().unwrap_or_else(|| config.pr_title.clone()),
        review_body: config.pr_body.clone(),
    })
}

/// Execute `evpack publish`.
pub fn run_publish(args: &PublishArgs, config: &PackConfig) -> Result<u8> {
    let plan = build_plan(args, config)?;
    let publisher = Publisher::new(
        GitCli::new(&config.git_program),
        GhCli::new(&config.gh_program),
    );
    let report = publisher
        .run(&plan)
        .with_context(|| format!("publishing evidence package to {}", plan.repo.name))?;

    println!("Evidence package published:");
    println!("  repository:   {}", report.remote.name);
    if let Some(url) = &report.remote.url {
        println!("  url:          {url}");
    }
    println!("  base commit:  {}", report.base_commit);
    println!("  evidence:     {} ({})", report.evidence_commit, plan.branch);
    println!("  files:        {}", report.files.len());
    match &report.review.url {
        Some(url) => println!("  pull request: {url}"),
        None => println!("  pull request: opened"),
    }
    Ok(0)
}
