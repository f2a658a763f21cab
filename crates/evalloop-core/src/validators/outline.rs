//! Outline validator.
//!
//! Expected payload:
//!
//! ```json
//! { "title": "...", "summary": "...", "sections": [ { "heading": "..." } ] }
//! ```

use serde::{Deserialize, Serialize};

use super::{non_blank_str, ArtifactValidator};
use crate::domain::{Artifact, ConfigError, ValidationCheck, ValidationResult};

pub const CHECK_SECTION_COUNT: &str = "section_count";
pub const CHECK_REQUIRED_MARKERS: &str = "required_markers";

/// Outline policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineRules {
    /// Minimum number of entries in `sections`.
    pub min_sections: usize,
    /// Top-level fields that must be present and non-blank.
    pub required_markers: Vec<String>,
}

impl Default for OutlineRules {
    fn default() -> Self {
        Self {
            min_sections: 3,
            required_markers: vec!["title".to_string(), "summary".to_string()],
        }
    }
}

impl OutlineRules {
    pub fn with_min_sections(mut self, min_sections: usize) -> Self {
        self.min_sections = min_sections;
        self
    }
}

/// Validates section count and required top-level markers.
#[derive(Debug, Clone, Default)]
pub struct OutlineValidator {
    rules: OutlineRules,
}

impl OutlineValidator {
    pub fn new(rules: OutlineRules) -> Result<Self, ConfigError> {
        if rules.min_sections == 0 {
            return Err(ConfigError::InvalidRules(
                "outline min_sections must be at least 1".to_string(),
            ));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &OutlineRules {
        &self.rules
    }

    fn check_section_count(&self, payload: &serde_json::Value) -> ValidationCheck {
        let count = payload
            .get("sections")
            .and_then(|s| s.as_array())
            .map(|s| s.len())
            .unwrap_or(0);
        ValidationCheck::from_bool(
            CHECK_SECTION_COUNT,
            count >= self.rules.min_sections,
            format!(
                "outline has {count} sections, at least {} required",
                self.rules.min_sections
            ),
        )
    }

    fn check_required_markers(&self, payload: &serde_json::Value) -> ValidationCheck {
        let missing: Vec<&str> = self
            .rules
            .required_markers
            .iter()
            .map(String::as_str)
            .filter(|marker| non_blank_str(payload, marker).is_none())
            .collect();
        ValidationCheck::from_bool(
            CHECK_REQUIRED_MARKERS,
            missing.is_empty(),
            format!("missing required markers: {}", missing.join(", ")),
        )
    }
}

impl ArtifactValidator for OutlineValidator {
    fn name(&self) -> &str {
        "outline"
    }

    fn validate(&self, artifact: &Artifact) -> ValidationResult {
        let payload = &artifact.payload;
        ValidationResult::from_checks(vec![
            self.check_section_count(payload),
            self.check_required_markers(payload),
        ])
    }
}
