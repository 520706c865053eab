//! # evpack-cli — Evidence Package Command-Line Interface
//!
//! Provides the `evpack` binary.
//!
//! ## Subcommands
//!
//! - `evpack digest` — SHA-256 manifest of an evidence directory.
//! - `evpack render` — Render document templates with evidence digests.
//! - `evpack check` — Report placeholders that name no evidence file.
//! - `evpack publish` — Build the repository, publish it, open a pull request.
//!
//! ```bash
//! evpack digest ./evidence
//! evpack render --evidence ./evidence --out ./docs --meta TITLE="Checkout error"
//! evpack check --evidence ./evidence
//! evpack publish --evidence ./evidence --workdir ./pkg --repo octo/evidence
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing and configuration live here; digesting and rendering
//!   are delegated to `evpack-core`, tool invocation to `evpack-publish`.
//! - The clock is read here (default `<DATE>`), never in the render step.

pub mod config;
pub mod digest;
pub mod publish;
pub mod render;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use evpack_core::{builtin_templates, DocumentTemplate, RenderOptions, UnresolvedPolicy};

use crate::config::PackConfig;

/// Resolve a path that may be relative to `base`.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `base` is joined to it; otherwise it is left relative to the current
/// directory.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let based = base.join(path);
    if based.exists() {
        based
    } else {
        path.to_path_buf()
    }
}

/// Parse a `KEY=VALUE` metadata argument.
pub fn parse_meta(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    evpack_core::template::validate_metadata_key(key).map_err(|e| e.to_string())?;
    Ok((key.to_string(), value.to_string()))
}

/// Load templates from `paths`, falling back to the configured templates
/// and then to the built-in set.
pub fn load_templates(paths: &[PathBuf], config: &PackConfig) -> Result<Vec<DocumentTemplate>> {
    let chosen: &[PathBuf] = if paths.is_empty() {
        &config.templates
    } else {
        paths
    };
    if chosen.is_empty() {
        return Ok(builtin_templates());
    }
    let templates = chosen
        .iter()
        .map(|p| {
            DocumentTemplate::load(p)
                .with_context(|| format!("loading template: {}", p.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
        bail!("two templates render to the same document name: {}", dup[0]);
    }
    Ok(templates)
}

/// Build render options: config metadata, then `--meta` values, with
/// `DATE` defaulting to today's UTC date.
pub fn render_options(
    config: &PackConfig,
    meta: &[(String, String)],
    policy: UnresolvedPolicy,
) -> Result<RenderOptions> {
    let mut options = RenderOptions::new(policy);
    if !config.metadata.contains_key("DATE") && !meta.iter().any(|(k, _)| k == "DATE") {
        options = options.with_metadata("DATE", chrono::Utc::now().format("%Y-%m-%d").to_string())?;
    }
    for (key, value) in config.metadata.iter().chain(meta.iter().map(|(k, v)| (k, v))) {
        options = options
            .with_metadata(key.as_str(), value.as_str())
            .with_context(|| format!("metadata key {key:?}"))?;
    }
    Ok(options)
}

/// Pick the unresolved-placeholder policy from `--strict` and config.
pub fn policy(strict_flag: bool, config: &PackConfig) -> UnresolvedPolicy {
    if strict_flag || config.strict {
        UnresolvedPolicy::Strict
    } else {
        UnresolvedPolicy::Warn
    }
}
