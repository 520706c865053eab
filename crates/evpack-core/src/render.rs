//! # Rendering
//!
//! Single-pass, stateless transform from templates plus an evidence set to
//! final documents. Each digest placeholder is replaced globally with the
//! matching file's lowercase hex digest; metadata tokens are then resolved
//! from caller-supplied values.
//!
//! ## Unresolved placeholders
//!
//! A placeholder naming a file absent from the evidence set is handled
//! according to [`UnresolvedPolicy`]. The bare [`render()`] entry point
//! uses [`UnresolvedPolicy::PassThrough`]: the literal placeholder text is
//! left in the output.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::evidence::EvidenceSet;
use crate::template::{
    substitute_metadata, validate_metadata_key, DocumentTemplate, PLACEHOLDER_PREFIX,
};

/// How to treat digest placeholders that name no evidence file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    /// Leave the placeholder text in the output silently.
    #[default]
    PassThrough,
    /// Leave the placeholder text and log a warning for each one.
    Warn,
    /// Fail the render with [`PackError::UnresolvedPlaceholder`].
    Strict,
}

/// A fully rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub name: String,
    pub text: String,
}

/// Placeholders left in one rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub document: String,
    pub placeholders: Vec<String>,
}

/// Options for [`render_with()`].
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    metadata: BTreeMap<String, String>,
    policy: UnresolvedPolicy,
}

impl RenderOptions {
    pub fn new(policy: UnresolvedPolicy) -> Self {
        Self {
            metadata: BTreeMap::new(),
            policy,
        }
    }

    /// Add a metadata value for `<KEY>` tokens.
    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, PackError> {
        let key = key.into();
        validate_metadata_key(&key)?;
        self.metadata.insert(key, value.into());
        Ok(self)
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}

/// The result of [`render_with()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    /// Rendered documents, in template order.
    pub documents: Vec<RenderedDocument>,
    /// Documents that still contain digest placeholders. Always empty under
    /// [`UnresolvedPolicy::Strict`].
    pub unresolved: Vec<Unresolved>,
}

impl RenderOutcome {
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace digest placeholders in one left to right pass.
///
/// At each `<SHA256_OF_` the longest evidence filename followed by `>` is
/// taken, so a file named `a>b.png` is not shadowed by a file named `a`.
/// Positions that match no file are copied through unchanged. Returns the
/// resolved text and the distinct placeholders left in it, in order of first
/// appearance.
pub fn resolve_digests(text: &str, evidence: &EvidenceSet) -> (String, Vec<String>) {
    let mut out = String::with_capacity(text.len());
    let mut leftover: Vec<String> = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(PLACEHOLDER_PREFIX) {
        out.push_str(&rest[..start]);
        let after = &rest[start + PLACEHOLDER_PREFIX.len()..];
        let matched = evidence
            .iter()
            .filter(|f| {
                after
                    .strip_prefix(f.name.as_str())
                    .is_some_and(|tail| tail.starts_with('>'))
            })
            .max_by_key(|f| f.name.len());
        match matched {
            Some(file) => {
                out.push_str(&file.digest.to_hex());
                rest = &after[file.name.len() + 1..];
            }
            None => {
                if let Some(end) = after.find('>') {
                    let token = &rest[start..start + PLACEHOLDER_PREFIX.len() + end + 1];
                    if !leftover.iter().any(|t| t == token) {
                        leftover.push(token.to_string());
                    }
                }
                out.push_str(PLACEHOLDER_PREFIX);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    (out, leftover)
}

/// Render one template, returning the document and the digest placeholders
/// the template left unresolved. Metadata values are inserted after the
/// unresolved set is taken, so a value that looks like a placeholder is
/// never reported.
fn render_document(
    template: &DocumentTemplate,
    evidence: &EvidenceSet,
    metadata: &BTreeMap<String, String>,
) -> (RenderedDocument, Vec<String>) {
    let (text, leftover) = resolve_digests(&template.text, evidence);
    let doc = RenderedDocument {
        name: template.name.clone(),
        text: substitute_metadata(&text, metadata),
    };
    (doc, leftover)
}

/// Render one template against an evidence set and metadata.
///
/// Never fails: unresolved placeholders are passed through.
pub fn render_template(
    template: &DocumentTemplate,
    evidence: &EvidenceSet,
    metadata: &BTreeMap<String, String>,
) -> RenderedDocument {
    render_document(template, evidence, metadata).0
}

/// Render templates against an already-scanned evidence set.
pub fn render_with(
    templates: &[DocumentTemplate],
    evidence: &EvidenceSet,
    options: &RenderOptions,
) -> Result<RenderOutcome, PackError> {
    let mut documents = Vec::with_capacity(templates.len());
    let mut unresolved = Vec::new();

    for template in templates {
        let (doc, leftover) = render_document(template, evidence, &options.metadata);
        if !leftover.is_empty() {
            match options.policy {
                UnresolvedPolicy::Strict => {
                    return Err(PackError::UnresolvedPlaceholder {
                        document: doc.name,
                        placeholders: leftover,
                    });
                }
                UnresolvedPolicy::Warn => {
                    for p in &leftover {
                        tracing::warn!(
                            document = %doc.name,
                            placeholder = %p,
                            "placeholder has no matching evidence file"
                        );
                    }
                }
                UnresolvedPolicy::PassThrough => {}
            }
            unresolved.push(Unresolved {
                document: doc.name.clone(),
                placeholders: leftover,
            });
        }
        tracing::debug!(document = %doc.name, bytes = doc.text.len(), "rendered document");
        documents.push(doc);
    }

    Ok(RenderOutcome {
        documents,
        unresolved,
    })
}

/// Render `templates` against the files directly under `evidence_dir`.
///
/// The directory must exist and be non-empty. Unmatched placeholders are
/// left in the output unchanged.
pub fn render(
    templates: &[DocumentTemplate],
    evidence_dir: &Path,
) -> Result<Vec<RenderedDocument>, PackError> {
    let evidence = EvidenceSet::scan(evidence_dir)?;
    let outcome = render_with(templates, &evidence, &RenderOptions::default())?;
    Ok(outcome.documents)
}

/// Write rendered documents into `out_dir`, creating it if needed.
///
/// Returns the written paths in document order.
pub fn write_rendered(
    documents: &[RenderedDocument],
    out_dir: &Path,
) -> Result<Vec<PathBuf>, PackError> {
    std::fs::create_dir_all(out_dir).map_err(|e| PackError::io(out_dir, e))?;
    let mut written = Vec::with_capacity(documents.len());
    for doc in documents {
        let path = out_dir.join(&doc.name);
        std::fs::write(&path, &doc.text).map_err(|e| PackError::io(&path, e))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HELLO_HEX: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn evidence_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn renders_hello_scenario() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let docs = render(
            &[DocumentTemplate::new("T.md", "hash: <SHA256_OF_a.png>")],
            dir.path(),
        )
        .unwrap();
        assert_eq!(docs[0].text, format!("hash: {HELLO_HEX}"));
    }

    #[test]
    fn missing_evidence_dir_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let err = render(
            &[DocumentTemplate::new("T.md", "<SHA256_OF_a.png>")],
            &dir.path().join("gone"),
        )
        .unwrap_err();
        assert!(matches!(err, PackError::MissingEvidenceDir(_)));
    }

    #[test]
    fn unmatched_placeholder_passes_through() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let docs = render(
            &[DocumentTemplate::new("T.md", "x <SHA256_OF_missing.png> y")],
            dir.path(),
        )
        .unwrap();
        assert_eq!(docs[0].text, "x <SHA256_OF_missing.png> y");
    }

    #[test]
    fn strict_policy_names_unresolved_placeholder() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let err = render_with(
            &[DocumentTemplate::new("T.md", "<SHA256_OF_a.png> <SHA256_OF_missing.png>")],
            &set,
            &RenderOptions::new(UnresolvedPolicy::Strict),
        )
        .unwrap_err();
        match err {
            PackError::UnresolvedPlaceholder {
                document,
                placeholders,
            } => {
                assert_eq!(document, "T.md");
                assert_eq!(placeholders, vec!["<SHA256_OF_missing.png>"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn warn_policy_reports_and_keeps_text() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let outcome = render_with(
            &[
                DocumentTemplate::new("OK.md", "<SHA256_OF_a.png>"),
                DocumentTemplate::new("BAD.md", "<SHA256_OF_b.png>"),
            ],
            &set,
            &RenderOptions::new(UnresolvedPolicy::Warn),
        )
        .unwrap();
        assert!(!outcome.is_fully_resolved());
        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].document, "BAD.md");
        assert_eq!(outcome.documents[1].text, "<SHA256_OF_b.png>");
        assert_eq!(outcome.documents[0].text, HELLO_HEX);
    }

    #[test]
    fn metadata_is_substituted_after_digests() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let options = RenderOptions::default()
            .with_metadata("SUBMITTED_BY", "octocat")
            .unwrap();
        let outcome = render_with(
            &[DocumentTemplate::new("T.md", "<SUBMITTED_BY>: <SHA256_OF_a.png>")],
            &set,
            &options,
        )
        .unwrap();
        assert_eq!(outcome.documents[0].text, format!("octocat: {HELLO_HEX}"));
    }

    #[test]
    fn invalid_metadata_key_rejected() {
        assert!(RenderOptions::default().with_metadata("bad key", "v").is_err());
    }

    #[test]
    fn render_is_idempotent() {
        let dir = evidence_dir(&[("a.png", "hello"), ("b.png", "world")]);
        let templates = [DocumentTemplate::new(
            "T.md",
            "<SHA256_OF_a.png>\n<SHA256_OF_b.png>\n",
        )];
        let first = render(&templates, dir.path()).unwrap();
        let second = render(&templates, dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn write_rendered_creates_out_dir() {
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("nested").join("docs");
        let docs = vec![RenderedDocument {
            name: "CHECKSUMS.md".to_string(),
            text: "body".to_string(),
        }];
        let written = write_rendered(&docs, &target).unwrap();
        assert_eq!(written, vec![target.join("CHECKSUMS.md")]);
        assert_eq!(std::fs::read_to_string(&written[0]).unwrap(), "body");
    }

    #[test]
    fn digest_substitution_is_global_and_exact() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let (text, leftover) =
            resolve_digests("<SHA256_OF_a.png> <SHA256_OF_A.png> <SHA256_OF_a.png>", &set);
        assert_eq!(text, format!("{HELLO_HEX} <SHA256_OF_A.png> {HELLO_HEX}"));
        assert_eq!(leftover, vec!["<SHA256_OF_A.png>"]);
    }

    #[cfg(unix)]
    #[test]
    fn longest_filename_wins_at_a_placeholder() {
        let dir = evidence_dir(&[("a", "hello"), ("a>b.png", "world")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let long_hex = set.get("a>b.png").unwrap().digest.to_hex();

        let (text, leftover) = resolve_digests("<SHA256_OF_a>b.png> <SHA256_OF_a>", &set);
        assert_eq!(text, format!("{long_hex} {HELLO_HEX}"));
        assert!(leftover.is_empty());
    }

    #[test]
    fn metadata_value_resembling_placeholder_is_not_unresolved() {
        let dir = evidence_dir(&[("a.png", "hello")]);
        let set = EvidenceSet::scan(dir.path()).unwrap();
        let options = RenderOptions::new(UnresolvedPolicy::Strict)
            .with_metadata("TITLE", "literal <SHA256_OF_x> example")
            .unwrap();
        let outcome = render_with(
            &[DocumentTemplate::new("T.md", "<TITLE> <SHA256_OF_a.png>")],
            &set,
            &options,
        )
        .unwrap();
        assert!(outcome.is_fully_resolved());
        assert_eq!(
            outcome.documents[0].text,
            format!("literal <SHA256_OF_x> example {HELLO_HEX}")
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_evidence_file_aborts_render() {
        use std::os::unix::fs::PermissionsExt;

        let dir = evidence_dir(&[("a.png", "hello"), ("locked.png", "secret")]);
        let locked = dir.path().join("locked.png");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        if std::fs::File::open(&locked).is_ok() {
            // Permission bits are not enforced (running as root).
            return;
        }

        let err = render(
            &[DocumentTemplate::new("T.md", "<SHA256_OF_a.png>")],
            dir.path(),
        )
        .unwrap_err();
        match err {
            PackError::Io { path, .. } => assert_eq!(path, locked),
            other => panic!("unexpected error: {other}"),
        }
    }

    proptest! {
        #[test]
        fn surrounding_text_is_preserved(
            prefix in "[a-zA-Z0-9 \n#|]{0,40}",
            suffix in "[a-zA-Z0-9 \n#|]{0,40}",
        ) {
            let dir = evidence_dir(&[("a.png", "hello")]);
            let set = EvidenceSet::scan(dir.path()).unwrap();
            let text = format!("{prefix}<SHA256_OF_a.png>{suffix}");
            let template = DocumentTemplate::new("T.md", text);
            let doc = render_template(&template, &set, &BTreeMap::new());
            prop_assert_eq!(doc.text, format!("{prefix}{HELLO_HEX}{suffix}"));
        }

        #[test]
        fn all_placeholders_resolve_when_every_file_present(count in 1usize..6) {
            let dir = tempfile::tempdir().unwrap();
            let mut text = String::new();
            for i in 0..count {
                let name = format!("screenshot-{i:03}.png");
                std::fs::write(dir.path().join(&name), format!("content {i}")).unwrap();
                text.push_str(&format!("- {name}: <SHA256_OF_{name}>\n"));
            }
            let set = EvidenceSet::scan(dir.path()).unwrap();
            let outcome = render_with(
                &[DocumentTemplate::new("T.md", text)],
                &set,
                &RenderOptions::new(UnresolvedPolicy::Strict),
            ).unwrap();
            prop_assert!(!outcome.documents[0].text.contains("<SHA256_OF_"));
        }
    }
}
