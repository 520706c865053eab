//! # evpack-core — Evidence Packager
//!
//! Computes a SHA-256 digest for every file in an evidence directory and
//! substitutes those digests into markdown document templates.
//!
//! ```text
//! evidence/                      templates
//!   screenshot-001.png  ──┐        EVIDENCE.md.tmpl   "<SHA256_OF_screenshot-001.png>"
//!   screenshot-002.png  ──┼──▶  render  ──▶  EVIDENCE.md  "9f86d081884c7d65..."
//!   screenshot-003.png  ──┘        CHECKSUMS.md.tmpl
//! ```
//!
//! ## Crate Policy
//!
//! - Rendering is a pure function of file bytes, template text, and
//!   caller-supplied metadata. No clock or randomness is read here.
//! - Nothing in this crate spawns processes or touches version control;
//!   staging and publishing belong to `evpack-publish`.
//! - Precondition failures are reported before any file is hashed.

pub mod digest;
pub mod documents;
pub mod error;
pub mod evidence;
pub mod render;
pub mod template;

pub use digest::{digest_bytes, digest_file, DigestAlgorithm, EvidenceDigest};
pub use documents::{builtin_static_documents, builtin_templates, STANDARD_EVIDENCE_FILES};
pub use error::PackError;
pub use evidence::{manifest, EvidenceFile, EvidenceSet};
pub use render::{
    render, render_template, render_with, resolve_digests, write_rendered, RenderOptions,
    RenderOutcome, RenderedDocument, Unresolved, UnresolvedPolicy,
};
pub use template::{placeholder, DocumentTemplate, PLACEHOLDER_PREFIX};
