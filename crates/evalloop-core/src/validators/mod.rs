//! Artifact validators.
//!
//! Every validator is pure and deterministic: it reads the artifact payload,
//! evaluates each of its rules, and returns one [`ValidationCheck`] per rule.
//! Malformed or empty payloads yield failing checks, never panics or errors.
//!
//! # Module layout
//!
//! - [`outline`]: `OutlineValidator`, `OutlineRules`
//! - [`document`]: `DocumentValidator`, `DocumentRules`
//! - [`script`]: `ScriptValidator`, `ScriptRules`
//! - [`consistency`]: `ConsistencyValidator`, `TallyRecord`
//!
//! [`ValidationCheck`]: crate::domain::ValidationCheck

pub mod consistency;
pub mod document;
pub mod outline;
pub mod script;

use crate::domain::{Artifact, ValidationResult};

pub use consistency::{ConsistencyValidator, TallyEntry, TallyRecord};
pub use document::{DocumentRules, DocumentValidator};
pub use outline::{OutlineRules, OutlineValidator};
pub use script::{ScriptRules, ScriptValidator};

/// Structural validator for one artifact kind.
///
/// Implementations must be side-effect free so a single instance can be
/// shared across concurrently running loops.
pub trait ArtifactValidator: Send + Sync {
    /// Stable validator name used in logs.
    fn name(&self) -> &str;

    fn validate(&self, artifact: &Artifact) -> ValidationResult;
}

/// Read a string field from a JSON object, treating blank strings as absent.
pub(crate) fn non_blank_str<'a>(value: &'a serde_json::Value, field: &str) -> Option<&'a str> {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
