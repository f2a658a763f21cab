//! Long-form document validator.
//!
//! The payload is either a JSON string holding Markdown, or an object with a
//! `body` (or `content`) field.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ArtifactValidator;
use crate::domain::{Artifact, ConfigError, ValidationCheck, ValidationResult};

pub const CHECK_MIN_LENGTH: &str = "min_length";
pub const CHECK_DOMAIN_REFERENCES: &str = "domain_references";
pub const CHECK_STRUCTURE_MARKERS: &str = "structure_markers";

const HEADING_PATTERN: &str = r"(?m)^[ ]{0,3}#{1,6}[ \t]+\S";

/// Document policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRules {
    /// Minimum whitespace-separated word count.
    pub min_words: usize,
    /// At least one of these terms must occur (case-insensitive, whole word).
    pub domain_terms: Vec<String>,
}

impl Default for DocumentRules {
    fn default() -> Self {
        Self {
            min_words: 150,
            domain_terms: Vec::new(),
        }
    }
}

impl DocumentRules {
    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }

    pub fn with_domain_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain_terms = terms.into_iter().map(Into::into).collect();
        self
    }
}

/// Whole-word pattern for one term.
///
/// A `\b` anchor only works next to a word character, so symbol edges
/// (`C++`, `.NET`) are guarded by "not preceded/followed by a word character"
/// instead.
fn term_pattern(term: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if term.starts_with(is_word) { r"\b" } else { r"(?:^|\W)" };
    let trail = if term.ends_with(is_word) { r"\b" } else { r"(?:\W|$)" };
    format!("{lead}{}{trail}", regex::escape(term))
}

/// Validates length, domain vocabulary and heading structure.
#[derive(Debug, Clone)]
pub struct DocumentValidator {
    rules: DocumentRules,
    heading: Regex,
    terms: Option<Regex>,
}

impl DocumentValidator {
    pub fn new(rules: DocumentRules) -> Result<Self, ConfigError> {
        let heading = Regex::new(HEADING_PATTERN)
            .map_err(|e| ConfigError::InvalidRules(format!("heading pattern: {e}")))?;

        let terms: Vec<String> = rules
            .domain_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(term_pattern)
            .collect();
        let terms = if terms.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)(?:{})", terms.join("|"));
            Some(
                Regex::new(&pattern)
                    .map_err(|e| ConfigError::InvalidRules(format!("domain terms: {e}")))?,
            )
        };

        Ok(Self {
            rules,
            heading,
            terms,
        })
    }

    pub fn rules(&self) -> &DocumentRules {
        &self.rules
    }

    fn body(payload: &serde_json::Value) -> &str {
        match payload {
            serde_json::Value::String(s) => s.as_str(),
            other => other
                .get("body")
                .or_else(|| other.get("content"))
                .and_then(|v| v.as_str())
                .unwrap_or(""),
        }
    }

    fn check_length(&self, text: &str) -> ValidationCheck {
        let words = text.split_whitespace().count();
        ValidationCheck::from_bool(
            CHECK_MIN_LENGTH,
            words >= self.rules.min_words,
            format!(
                "document has {words} words, at least {} required",
                self.rules.min_words
            ),
        )
    }

    fn check_domain_references(&self, text: &str) -> ValidationCheck {
        let Some(terms) = &self.terms else {
            return ValidationCheck::not_applicable(
                CHECK_DOMAIN_REFERENCES,
                "no domain terms configured",
            );
        };
        let hits = terms.find_iter(text).count();
        ValidationCheck::from_bool(
            CHECK_DOMAIN_REFERENCES,
            hits > 0,
            format!(
                "no references to required domain terms: {}",
                self.rules.domain_terms.join(", ")
            ),
        )
    }

    fn check_structure(&self, text: &str) -> ValidationCheck {
        ValidationCheck::from_bool(
            CHECK_STRUCTURE_MARKERS,
            self.heading.is_match(text),
            "document has no headings",
        )
    }
}

impl ArtifactValidator for DocumentValidator {
    fn name(&self) -> &str {
        "document"
    }

    fn validate(&self, artifact: &Artifact) -> ValidationResult {
        let text = Self::body(&artifact.payload);
        ValidationResult::from_checks(vec![
            self.check_length(text),
            self.check_domain_references(text),
            self.check_structure(text),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactKind;

    fn doc(payload: serde_json::Value) -> Artifact {
        Artifact::new(ArtifactKind::Document, 1, payload)
    }

    fn validator(min_words: usize, terms: &[&str]) -> DocumentValidator {
        DocumentValidator::new(
            DocumentRules::default()
                .with_min_words(min_words)
                .with_domain_terms(terms.iter().copied()),
        )
        .expect("valid rules")
    }

    #[test]
    fn well_formed_document_passes() {
        let text = "# Borrowing\n\nThe borrow checker enforces ownership rules at compile time.";
        let result = validator(5, &["ownership"]).validate(&doc(serde_json::json!(text)));
        assert!(result.overall, "{:?}", result.checks);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn body_field_is_read_from_objects() {
        let result = validator(2, &[]).validate(&doc(serde_json::json!({
            "body": "## Intro\nsome words here"
        })));
        assert!(result.overall);
        let refs = result.check(CHECK_DOMAIN_REFERENCES).expect("check");
        assert!(!refs.applicable);
    }

    #[test]
    fn symbol_terms_match_as_whole_words() {
        let validator = validator(3, &["C++", "C#", ".NET"]);
        for text in [
            "# Intro\nThis guide covers C++ templates in depth.",
            "# Intro\nWritten in C#, naturally.",
            "# Intro\n.NET runtimes everywhere",
        ] {
            let result = validator.validate(&doc(serde_json::json!(text)));
            let check = result.check(CHECK_DOMAIN_REFERENCES).expect("check");
            assert!(check.passed, "{text:?}: {:?}", check.message);
        }

        let result = validator.validate(&doc(serde_json::json!("# Intro\nCopy and paste")));
        assert!(!result.check(CHECK_DOMAIN_REFERENCES).expect("check").passed);
    }

    #[test]
    fn word_terms_do_not_match_inside_words() {
        let validator = validator(1, &["rust"]);
        let result = validator.validate(&doc(serde_json::json!("# T\nthe trust model")));
        assert!(!result.check(CHECK_DOMAIN_REFERENCES).expect("check").passed);
        let result = validator.validate(&doc(serde_json::json!("# T\nRust, mostly")));
        assert!(result.check(CHECK_DOMAIN_REFERENCES).expect("check").passed);
    }

    #[test]
    fn short_document_fails_length() {
        let result = validator(50, &[]).validate(&doc(serde_json::json!("# T\nshort")));
        let check = result.check(CHECK_MIN_LENGTH).expect("check");
        assert!(!check.passed);
        assert!(check.message.as_deref().unwrap_or("").contains("3 words"));
    }

    #[test]
    fn domain_terms_match_whole_words_case_insensitively() {
        let v = validator(1, &["Lifetime"]);
        let hit = v.validate(&doc(serde_json::json!("# x\nlifetimes and a LIFETIME")));
        assert!(hit.check(CHECK_DOMAIN_REFERENCES).expect("check").passed);

        let miss = v.validate(&doc(serde_json::json!("# x\nlifetimes only")));
        assert!(!miss.check(CHECK_DOMAIN_REFERENCES).expect("check").passed);
    }

    #[test]
    fn missing_headings_fail_structure() {
        let result = validator(1, &[]).validate(&doc(serde_json::json!("plain text #not-a-heading")));
        assert!(!result.check(CHECK_STRUCTURE_MARKERS).expect("check").passed);
    }

    #[test]
    fn empty_artifact_produces_failing_checks() {
        let result = validator(1, &["rust"]).validate(&doc(serde_json::Value::Null));
        assert_eq!(result.checks.len(), 3);
        assert_eq!(result.score, 0.0);
        assert!(!result.overall);
    }
}
