//! # Document Templates
//!
//! A [`DocumentTemplate`] is plain text carrying two kinds of token:
//!
//! - digest placeholders `<SHA256_OF_{filename}>`, resolved against an
//!   [`EvidenceSet`](crate::EvidenceSet);
//! - metadata tokens `<KEY>` with `KEY` matching `[A-Z][A-Z0-9_]*`,
//!   resolved against caller-supplied values.
//!
//! There is no nesting, escaping, or control flow. Everything outside a
//! resolved token is copied through byte-for-byte.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PackError;

/// Prefix shared by every digest placeholder.
pub const PLACEHOLDER_PREFIX: &str = "<SHA256_OF_";

/// Build the digest placeholder token for an evidence filename.
pub fn placeholder(file_name: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{file_name}>")
}

/// A named text template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    /// Output document name, e.g. `EVIDENCE.md`.
    pub name: String,
    /// Template body.
    pub text: String,
}

impl DocumentTemplate {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Load a template from disk. The document name is the file's basename
    /// with a trailing `.tmpl` extension removed.
    pub fn load(path: &Path) -> Result<Self, PackError> {
        let text = std::fs::read_to_string(path).map_err(|e| PackError::io(path, e))?;
        let base = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PackError::InvalidFileName(path.to_path_buf()))?;
        let name = base.strip_suffix(".tmpl").unwrap_or(base);
        Ok(Self::new(name, text))
    }

    /// The distinct digest placeholders in this template, in order of first
    /// appearance.
    pub fn placeholders(&self) -> Vec<String> {
        find_placeholders(&self.text)
    }

    /// The evidence filenames this template refers to.
    pub fn referenced_files(&self) -> Vec<String> {
        self.placeholders()
            .into_iter()
            .filter_map(|p| {
                p.strip_prefix(PLACEHOLDER_PREFIX)
                    .and_then(|rest| rest.strip_suffix('>'))
                    .map(str::to_string)
            })
            .collect()
    }
}

/// Find the distinct digest placeholders in `text`, in order of first
/// appearance. A placeholder runs from `<SHA256_OF_` to the next `>`.
pub fn find_placeholders(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(PLACEHOLDER_PREFIX) {
        let after = &rest[start + PLACEHOLDER_PREFIX.len()..];
        let Some(end) = after.find('>') else {
            break;
        };
        let token = &rest[start..start + PLACEHOLDER_PREFIX.len() + end + 1];
        if !found.iter().any(|t| t == token) {
            found.push(token.to_string());
        }
        rest = &after[end + 1..];
    }
    found
}

/// Check a metadata key against `[A-Z][A-Z0-9_]*`. Keys that would shadow
/// digest placeholders are rejected.
pub fn validate_metadata_key(key: &str) -> Result<(), PackError> {
    let mut chars = key.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && !key.starts_with("SHA256_OF_");
    if valid {
        Ok(())
    } else {
        Err(PackError::InvalidMetadataKey(key.to_string()))
    }
}

/// Replace `<KEY>` tokens with their metadata values in a single left to
/// right pass. Substituted values are not rescanned; unknown keys are kept.
pub fn substitute_metadata(text: &str, metadata: &BTreeMap<String, String>) -> String {
    if metadata.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];
        let key_len = candidate
            .find(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
            .unwrap_or(candidate.len());
        let key = &candidate[..key_len];
        let closed = candidate[key_len..].starts_with('>');
        match metadata.get(key) {
            Some(value) if closed && !key.is_empty() => {
                out.push_str(value);
                rest = &candidate[key_len + 1..];
            }
            _ => {
                out.push('<');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    out
}
