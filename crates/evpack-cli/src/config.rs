//! # Configuration
//!
//! Optional YAML configuration for `evpack`. Every field has a default, so
//! an absent file and an empty file behave the same. Command-line flags
//! override file values; `EVPACK_GIT` and `EVPACK_GH` override the tool
//! programs.
//!
//! ```yaml
//! templates:
//!   - templates/EVIDENCE.md.tmpl
//!   - templates/CHECKSUMS.md.tmpl
//! metadata:
//!   TITLE: Checkout page error
//!   SUBMITTED_BY: qa-team
//! strict: true
//! repo: octo/evidence-checkout
//! visibility: private
//! branch: evidence/checkout
//! pr_title: Add checkout evidence
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use evpack_publish::Visibility;

use crate::resolve_path;

/// Environment variable overriding the `git` program.
pub const GIT_PROGRAM_ENV: &str = "EVPACK_GIT";
/// Environment variable overriding the `gh` program.
pub const GH_PROGRAM_ENV: &str = "EVPACK_GH";

/// Settings loaded from `--config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackConfig {
    /// Template files. Empty means the built-in document set.
    pub templates: Vec<PathBuf>,
    /// Values for `<KEY>` metadata tokens.
    pub metadata: BTreeMap<String, String>,
    /// Fail on placeholders that name no evidence file.
    pub strict: bool,
    pub repo: Option<String>,
    pub visibility: Visibility,
    pub description: Option<String>,
    pub base_branch: String,
    pub branch: String,
    pub commit_message: String,
    pub pr_title: String,
    pub pr_body: String,
    pub git_program: String,
    pub gh_program: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            templates: Vec::new(),
            metadata: BTreeMap::new(),
            strict: false,
            repo: None,
            visibility: Visibility::Private,
            description: None,
            base_branch: "main".to_string(),
            branch: "evidence/submission".to_string(),
            commit_message: "Add evidence package".to_string(),
            pr_title: "Add evidence package".to_string(),
            pr_body: "Evidence files with recorded SHA-256 checksums. See CHECKSUMS.md."
                .to_string(),
            git_program: "git".to_string(),
            gh_program: "gh".to_string(),
        }
    }
}

impl PackConfig {
    /// Load from `path`, or return defaults when no path is given.
    ///
    /// Relative template paths are resolved against the config file's
    /// directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let mut config = Self::parse(&content)
            .with_context(|| format!("parsing config: {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.templates = config
            .templates
            .iter()
            .map(|t| resolve_path(t, base))
            .collect();
        tracing::debug!(config = %path.display(), templates = config.templates.len(), "loaded config");
        Ok(config)
    }

    /// Parse YAML content. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `EVPACK_GIT` / `EVPACK_GH` overrides via `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(git) = lookup(GIT_PROGRAM_ENV) {
            self.git_program = git;
        }
        if let Some(gh) = lookup(GH_PROGRAM_ENV) {
            self.gh_program = gh;
        }
    }
}
