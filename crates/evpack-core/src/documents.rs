//! # Built-in Document Set
//!
//! The fixed markdown documents shipped with every evidence package: two
//! templates that carry digest placeholders for the three standard
//! screenshots, and a static README that is written as-is.

use crate::render::RenderedDocument;
use crate::template::DocumentTemplate;

/// Names of the standard evidence files the built-in templates reference.
pub const STANDARD_EVIDENCE_FILES: &[&str] = &[
    "screenshot-001.png",
    "screenshot-002.png",
    "screenshot-003.png",
];

const EVIDENCE_TEMPLATE: &str = include_str!("../templates/EVIDENCE.md.tmpl");
const CHECKSUMS_TEMPLATE: &str = include_str!("../templates/CHECKSUMS.md.tmpl");
const README: &str = include_str!("../templates/README.md");

/// The two built-in templates: `EVIDENCE.md` and `CHECKSUMS.md`.
pub fn builtin_templates() -> Vec<DocumentTemplate> {
    vec![
        DocumentTemplate::new("EVIDENCE.md", EVIDENCE_TEMPLATE),
        DocumentTemplate::new("CHECKSUMS.md", CHECKSUMS_TEMPLATE),
    ]
}

/// Documents written without substitution.
pub fn builtin_static_documents() -> Vec<RenderedDocument> {
    vec![RenderedDocument {
        name: "README.md".to_string(),
        text: README.to_string(),
    }]
}
