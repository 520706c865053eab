//! # Render and Check Subcommands
//!
//! `evpack render` writes rendered documents to an output directory (or
//! prints them with `--dry-run`). `evpack check` renders in memory and
//! exits 1 when any digest placeholder is left unresolved.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use evpack_core::{render_with, write_rendered, EvidenceSet, RenderOptions, UnresolvedPolicy};

use crate::config::PackConfig;
use crate::{load_templates, parse_meta, policy, render_options};

/// Arguments for `evpack render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Evidence directory.
    #[arg(long)]
    pub evidence: PathBuf,

    /// Output directory for rendered documents.
    #[arg(long, required_unless_present = "dry_run")]
    pub out: Option<PathBuf>,

    /// Template file. Repeatable. Defaults to the built-in document set.
    #[arg(long = "template")]
    pub templates: Vec<PathBuf>,

    /// Metadata value for a `<KEY>` token. Repeatable.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub meta: Vec<(String, String)>,

    /// Fail when a placeholder names no evidence file.
    #[arg(long)]
    pub strict: bool,

    /// Print rendered documents to stdout instead of writing them.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `evpack check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Evidence directory.
    #[arg(long)]
    pub evidence: PathBuf,

    /// Template file. Repeatable. Defaults to the built-in document set.
    #[arg(long = "template")]
    pub templates: Vec<PathBuf>,
}

fn scan(dir: &Path) -> Result<EvidenceSet> {
    EvidenceSet::scan(dir).with_context(|| format!("scanning evidence in {}", dir.display()))
}

/// Execute `evpack render`.
pub fn run_render(args: &RenderArgs, config: &PackConfig) -> Result<u8> {
    let templates = load_templates(&args.templates, config)?;
    let options = render_options(config, &args.meta, policy(args.strict, config))?;
    let evidence = scan(&args.evidence)?;

    let outcome = render_with(&templates, &evidence, &options)?;

    if args.dry_run {
        for doc in &outcome.documents {
            println!("==> {} <==", doc.name);
            println!("{}", doc.text);
        }
        return Ok(0);
    }

    // clap enforces --out unless --dry-run.
    let out = args
        .out
        .as_deref()
        .context("--out is required unless --dry-run is set")?;
    let written = write_rendered(&outcome.documents, out)?;
    for path in &written {
        println!("  wrote: {}", path.display());
    }
    if !outcome.is_fully_resolved() {
        println!(
            "  warning: {} document(s) contain unresolved placeholders",
            outcome.unresolved.len()
        );
    }
    Ok(0)
}

/// Execute `evpack check`.
pub fn run_check(args: &CheckArgs, config: &PackConfig) -> Result<u8> {
    let templates = load_templates(&args.templates, config)?;
    let evidence = scan(&args.evidence)?;
    let outcome = render_with(
        &templates,
        &evidence,
        &RenderOptions::new(UnresolvedPolicy::PassThrough),
    )?;

    if outcome.is_fully_resolved() {
        println!(
            "  OK: {} template(s) resolved against {} evidence file(s)",
            templates.len(),
            evidence.len()
        );
        return Ok(0);
    }

    for entry in &outcome.unresolved {
        eprintln!("  {}:", entry.document);
        for p in &entry.placeholders {
            eprintln!("    - {p}");
        }
    }
    Ok(1)
}
