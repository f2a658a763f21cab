//! Generated artifacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content kind of an artifact; selects the validator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Sectioned outline with title and summary.
    Outline,
    /// Long-form Markdown document.
    Document,
    /// Timed scene-by-scene script.
    Script,
    /// Structured tally records extracted from a source.
    Extraction,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outline => "outline",
            Self::Document => "document",
            Self::Script => "script",
            Self::Extraction => "extraction",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One generated attempt's output.
///
/// Immutable once produced; the next attempt supersedes it with a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// 1-based attempt number that produced this artifact.
    pub attempt: u32,
    /// Opaque generated payload.
    pub payload: serde_json::Value,
    pub produced_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, attempt: u32, payload: serde_json::Value) -> Self {
        Self {
            kind,
            attempt,
            payload,
            produced_at: Utc::now(),
        }
    }
}
