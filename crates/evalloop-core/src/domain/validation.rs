//! Validation outcomes.
//!
//! A [`ValidationResult`] is always derived from its checks through
//! [`ValidationResult::from_checks`], which keeps `overall` and `score`
//! consistent with the check list:
//!
//! - `score = passed_applicable / applicable`, or `1.0` when no check is
//!   applicable.
//! - `overall` is true iff every applicable check passed.
//!
//! Not-applicable checks stay in the list for diagnostics but never count.

use serde::{Deserialize, Serialize};

fn default_applicable() -> bool {
    true
}

/// A single named rule outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// False when the rule's preconditions do not hold for this input.
    #[serde(default = "default_applicable")]
    pub applicable: bool,
}

impl ValidationCheck {
    pub fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: None,
            applicable: true,
        }
    }

    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(message.into()),
            applicable: true,
        }
    }

    /// A check whose rule does not apply; excluded from score and overall.
    pub fn not_applicable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: Some(reason.into()),
            applicable: false,
        }
    }

    /// Pass or fail depending on `ok`; the message is kept only on failure.
    pub fn from_bool(name: impl Into<String>, ok: bool, failure: impl Into<String>) -> Self {
        if ok {
            Self::pass(name)
        } else {
            Self::fail(name, failure)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Applicable and not passed.
    pub fn is_failure(&self) -> bool {
        self.applicable && !self.passed
    }
}

/// Aggregated outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub overall: bool,
    pub checks: Vec<ValidationCheck>,
    /// Always within `0.0..=1.0`.
    pub score: f64,
}

impl ValidationResult {
    /// Derive `overall` and `score` from an ordered check list.
    pub fn from_checks(checks: Vec<ValidationCheck>) -> Self {
        let applicable = checks.iter().filter(|c| c.applicable).count();
        let passed = checks.iter().filter(|c| c.applicable && c.passed).count();
        let score = if applicable == 0 {
            1.0
        } else {
            passed as f64 / applicable as f64
        };
        Self {
            overall: passed == applicable,
            checks,
            score,
        }
    }

    /// Merge several results into one, preserving check order.
    pub fn merge<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ValidationResult>,
    {
        let checks = results.into_iter().flat_map(|r| r.checks).collect();
        Self::from_checks(checks)
    }

    /// Number of checks that count toward the score.
    pub fn applicable_count(&self) -> usize {
        self.checks.iter().filter(|c| c.applicable).count()
    }

    /// Number of applicable checks that passed.
    pub fn passed_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.applicable && c.passed)
            .count()
    }

    /// Applicable checks that failed, in order.
    pub fn failing_checks(&self) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(|c| c.is_failure())
    }

    pub fn first_failure(&self) -> Option<&ValidationCheck> {
        self.failing_checks().next()
    }

    pub fn check(&self, name: &str) -> Option<&ValidationCheck> {
        self.checks.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_counts_only_applicable_checks() {
        let result = ValidationResult::from_checks(vec![
            ValidationCheck::pass("a"),
            ValidationCheck::fail("b", "nope"),
            ValidationCheck::not_applicable("c", "missing field"),
        ]);
        assert_eq!(result.applicable_count(), 2);
        assert_eq!(result.passed_count(), 1);
        assert!((result.score - 0.5).abs() < f64::EPSILON);
        assert!(!result.overall);
    }

    #[test]
    fn no_applicable_checks_scores_one() {
        let result =
            ValidationResult::from_checks(vec![ValidationCheck::not_applicable("x", "n/a")]);
        assert_eq!(result.score, 1.0);
        assert!(result.overall);

        let empty = ValidationResult::from_checks(Vec::new());
        assert_eq!(empty.score, 1.0);
    }

    #[test]
    fn merge_preserves_order_and_recomputes() {
        let a = ValidationResult::from_checks(vec![ValidationCheck::fail("first", "bad")]);
        let b = ValidationResult::from_checks(vec![
            ValidationCheck::pass("second"),
            ValidationCheck::pass("third"),
        ]);
        let merged = ValidationResult::merge([a, b]);
        let names: Vec<&str> = merged.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
        assert!(!merged.overall);
        assert!((merged.score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(merged.first_failure().map(|c| c.name.as_str()), Some("first"));
    }

    #[test]
    fn not_applicable_check_is_never_a_failure() {
        let check = ValidationCheck::not_applicable("sum", "field c absent");
        assert!(!check.is_failure());
    }

    #[test]
    fn applicable_defaults_to_true_when_absent() {
        let check: ValidationCheck =
            serde_json::from_str(r#"{"name":"n","passed":true}"#).expect("deserialize");
        assert!(check.applicable);
        assert!(check.message.is_none());
    }
}
