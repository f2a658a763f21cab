//! Evaluation record contract shared by emitters and sinks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Kind of metric carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    /// Numeric score in `0.0..=1.0`.
    Score,
    /// Free-form category string.
    Categorical,
}

/// Pass/fail assessment attached to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    Pass,
    Fail,
}

impl Assessment {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Assessment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a record: a number for scores, a string for categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

/// One emitted quality-metric datum.
///
/// # Invariants
///
/// `label` is unique within one execution context. `metric_type == Score`
/// always pairs with `MetricValue::Number`; `Categorical` with `Text`. Use the
/// [`EvaluationRecord::score`] and [`EvaluationRecord::categorical`]
/// constructors to keep the pairing consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub label: String,
    pub metric_type: MetricType,
    pub value: MetricValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl EvaluationRecord {
    /// Numeric score record. The value is clamped into `0.0..=1.0`.
    pub fn score(label: impl Into<String>, value: f64) -> Self {
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            metric_type: MetricType::Score,
            value: MetricValue::Number(value),
            assessment: None,
            reasoning: None,
            tags: BTreeMap::new(),
        }
    }

    /// Categorical record.
    pub fn categorical(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            metric_type: MetricType::Categorical,
            value: MetricValue::Text(value.into()),
            assessment: None,
            reasoning: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_assessment(mut self, assessment: Assessment) -> Self {
        self.assessment = Some(assessment);
        self
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags = tags;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped() {
        assert_eq!(EvaluationRecord::score("s", 1.7).value.as_f64(), Some(1.0));
        assert_eq!(EvaluationRecord::score("s", -0.2).value.as_f64(), Some(0.0));
        assert_eq!(
            EvaluationRecord::score("s", f64::NAN).value.as_f64(),
            Some(0.0)
        );
    }

    #[test]
    fn categorical_serializes_snake_case_fields() {
        let record = EvaluationRecord::categorical("outcome_0", "fail")
            .with_assessment(Assessment::Fail)
            .with_reasoning("too short");
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["metric_type"], "categorical");
        assert_eq!(json["value"], "fail");
        assert_eq!(json["assessment"], "fail");
        assert_eq!(json["reasoning"], "too short");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(EvaluationRecord::score("q", 0.5)).expect("serialize");
        assert!(json.get("assessment").is_none());
        assert!(json.get("reasoning").is_none());
        assert_eq!(json["value"], 0.5);
    }

    #[test]
    fn assessment_from_passed() {
        assert_eq!(Assessment::from_passed(true), Assessment::Pass);
        assert_eq!(Assessment::from_passed(false).as_str(), "fail");
    }
}
