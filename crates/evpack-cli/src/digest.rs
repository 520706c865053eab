//! # Digest Subcommand
//!
//! Prints the SHA-256 digest of every file in an evidence directory, either
//! as a `sha256sum`-compatible listing or as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use evpack_core::{manifest, EvidenceSet};

/// Arguments for `evpack digest`.
#[derive(Args, Debug)]
pub struct DigestArgs {
    /// Evidence directory.
    pub dir: PathBuf,

    /// Emit a JSON array of {file, sha256, bytes} instead of a listing.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DigestEntry<'a> {
    file: &'a str,
    sha256: String,
    bytes: u64,
}

/// Format the digest output for an evidence set.
pub fn format_digests(set: &EvidenceSet, json: bool) -> Result<String> {
    if !json {
        return Ok(manifest(set));
    }
    let entries: Vec<DigestEntry<'_>> = set
        .iter()
        .map(|f| DigestEntry {
            file: &f.name,
            sha256: f.digest.to_hex(),
            bytes: f.len,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)? + "\n")
}

/// Execute `evpack digest`.
pub fn run_digest(args: &DigestArgs) -> Result<u8> {
    let set = EvidenceSet::scan(&args.dir)
        .with_context(|| format!("digesting evidence in {}", args.dir.display()))?;
    print!("{}", format_digests(&set, args.json)?);
    Ok(0)
}
