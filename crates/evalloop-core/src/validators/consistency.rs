//! Numeric consistency checks over extracted tally records.
//!
//! Rules, evaluated in this order:
//!
//! 1. `sum_consistency`: `total == a + b + c`. Not applicable unless all four
//!    fields are present.
//! 2. `non_empty_results`: the `results` collection has at least one entry.
//! 3. `non_negative_values`: every numeric value present is `>= 0`. Not
//!    applicable when the record carries no numbers at all.

use serde::{Deserialize, Serialize};

use super::ArtifactValidator;
use crate::domain::{Artifact, ValidationCheck, ValidationResult};

pub const CHECK_RECORD_SHAPE: &str = "record_shape";
pub const CHECK_SUM_CONSISTENCY: &str = "sum_consistency";
pub const CHECK_NON_EMPTY_RESULTS: &str = "non_empty_results";
pub const CHECK_NON_NEGATIVE: &str = "non_negative_values";

/// One named count in a tally's result collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyEntry {
    pub name: String,
    pub count: i64,
}

/// A tally record whose sub-counts must add up to the stated total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRecord {
    pub total: Option<i64>,
    pub a: Option<i64>,
    pub b: Option<i64>,
    pub c: Option<i64>,
    #[serde(default)]
    pub results: Vec<TallyEntry>,
}

impl TallyRecord {
    /// Record with all four tally fields set and no results.
    pub fn with_counts(total: i64, a: i64, b: i64, c: i64) -> Self {
        Self {
            total: Some(total),
            a: Some(a),
            b: Some(b),
            c: Some(c),
            results: Vec::new(),
        }
    }

    pub fn with_result(mut self, name: impl Into<String>, count: i64) -> Self {
        self.results.push(TallyEntry {
            name: name.into(),
            count,
        });
        self
    }

    /// Every numeric value present, paired with its field name.
    fn numeric_fields(&self) -> Vec<(String, i64)> {
        let mut fields: Vec<(String, i64)> = [
            ("total", self.total),
            ("a", self.a),
            ("b", self.b),
            ("c", self.c),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.map(|v| (name.to_string(), v)))
        .collect();
        fields.extend(
            self.results
                .iter()
                .map(|r| (format!("results.{}", r.name), r.count)),
        );
        fields
    }
}

/// Validates tally records for sum consistency, non-emptiness and sign.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsistencyValidator;

impl ConsistencyValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_record(&self, record: &TallyRecord) -> ValidationResult {
        ValidationResult::from_checks(vec![
            Self::check_sum(record),
            Self::check_non_empty(record),
            Self::check_non_negative(record),
        ])
    }

    /// Validate several sub-records independently, preserving order.
    pub fn validate_records(&self, records: &[TallyRecord]) -> Vec<ValidationResult> {
        records.iter().map(|r| self.validate_record(r)).collect()
    }

    fn check_sum(record: &TallyRecord) -> ValidationCheck {
        let (Some(total), Some(a), Some(b), Some(c)) = (record.total, record.a, record.b, record.c)
        else {
            let missing: Vec<&str> = [
                ("total", record.total),
                ("a", record.a),
                ("b", record.b),
                ("c", record.c),
            ]
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();
            return ValidationCheck::not_applicable(
                CHECK_SUM_CONSISTENCY,
                format!("missing fields: {}", missing.join(", ")),
            );
        };

        let sum = i128::from(a) + i128::from(b) + i128::from(c);
        ValidationCheck::from_bool(
            CHECK_SUM_CONSISTENCY,
            i128::from(total) == sum,
            format!("mismatch: total({total}) != a+b+c({sum})"),
        )
    }

    fn check_non_empty(record: &TallyRecord) -> ValidationCheck {
        ValidationCheck::from_bool(
            CHECK_NON_EMPTY_RESULTS,
            !record.results.is_empty(),
            "record has no results",
        )
    }

    fn check_non_negative(record: &TallyRecord) -> ValidationCheck {
        let fields = record.numeric_fields();
        if fields.is_empty() {
            return ValidationCheck::not_applicable(CHECK_NON_NEGATIVE, "no numeric values");
        }
        let negative: Vec<String> = fields
            .iter()
            .filter(|(_, v)| *v < 0)
            .map(|(name, v)| format!("{name}({v})"))
            .collect();
        ValidationCheck::from_bool(
            CHECK_NON_NEGATIVE,
            negative.is_empty(),
            format!("negative values: {}", negative.join(", ")),
        )
    }
}

impl ArtifactValidator for ConsistencyValidator {
    fn name(&self) -> &str {
        "consistency"
    }

    fn validate(&self, artifact: &Artifact) -> ValidationResult {
        match serde_json::from_value::<TallyRecord>(artifact.payload.clone()) {
            Ok(record) => self.validate_record(&record),
            Err(e) => ValidationResult::from_checks(vec![ValidationCheck::fail(
                CHECK_RECORD_SHAPE,
                format!("payload is not a tally record: {e}"),
            )]),
        }
    }
}
