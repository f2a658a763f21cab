//! Evaluation emitter.
//!
//! Turns a [`ValidationResult`] into exactly three [`EvaluationRecord`]s and
//! forwards them to an [`EvaluationSink`]:
//!
//! 1. `{prefix}_outcome_{unit}`: categorical `pass`/`fail`, assessment mirrors
//!    the value, reasoning is the first failing check's message.
//! 2. `{prefix}_check_type_{unit}`: categorical name of the first failing
//!    check, `all_checks` when the result passed, or `unclassified` for a
//!    failed result that names no failing check.
//! 3. `{prefix}_score_{unit}`: numeric score in `0.0..=1.0`.
//!
//! Labels depend only on the config and `unit_index`, so repeated submissions
//! for the same `(context, unit_index)` reuse them and the sink can dedupe.
//!
//! Emission never fails the caller: a missing context, sink error or timeout
//! is logged and reported as an [`EmissionOutcome`].

use std::collections::BTreeMap;
use std::sync::Arc;

use evalloop_sink::{
    Assessment, ContextSource, EvaluationRecord, EvaluationSink, ExecutionContext,
};
use tokio::task::JoinHandle;

use crate::config::EmitterConfig;
use crate::domain::ValidationResult;
use crate::metrics::METRICS;
use crate::obs;

/// Check-type value reported when every check passed.
pub const ALL_CHECKS: &str = "all_checks";
/// Check-type value for a failed result with no failing applicable check.
pub const UNCLASSIFIED: &str = "unclassified";
/// Outcome reasoning reported when every check passed.
pub const SUCCESS_REASONING: &str = "all validation checks passed";

pub const TAG_FEATURE: &str = "feature";
pub const TAG_UNIT_INDEX: &str = "unit_index";

/// What happened to one emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmissionOutcome {
    /// No execution context; the sink was not contacted.
    Skipped,
    /// The sink accepted the batch.
    Sent { records: usize },
    /// The sink failed or timed out; logged and dropped.
    Failed { reason: String },
}

/// The three labels used for one `unit_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionLabels {
    pub outcome: String,
    pub check_type: String,
    pub score: String,
}

/// Emits evaluation records for validation results.
#[derive(Clone)]
pub struct EvaluationEmitter {
    sink: Arc<dyn EvaluationSink>,
    config: EmitterConfig,
}

impl std::fmt::Debug for EvaluationEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationEmitter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EvaluationEmitter {
    pub fn new(sink: Arc<dyn EvaluationSink>, config: EmitterConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// Deterministic labels: `base_label + "_" + unit_index`.
    pub fn labels(&self, unit_index: u32) -> EmissionLabels {
        let prefix = &self.config.label_prefix;
        EmissionLabels {
            outcome: format!("{prefix}_outcome_{unit_index}"),
            check_type: format!("{prefix}_check_type_{unit_index}"),
            score: format!("{prefix}_score_{unit_index}"),
        }
    }

    /// Build the three records for one result without sending them.
    pub fn build_records(
        &self,
        unit_index: u32,
        result: &ValidationResult,
        extra_tags: &BTreeMap<String, String>,
    ) -> Vec<EvaluationRecord> {
        let labels = self.labels(unit_index);

        let mut tags = extra_tags.clone();
        tags.insert(TAG_FEATURE.to_string(), self.config.feature.clone());
        tags.insert(TAG_UNIT_INDEX.to_string(), unit_index.to_string());

        let first_failure = if result.overall {
            None
        } else {
            result.first_failure()
        };
        let assessment = Assessment::from_passed(result.overall);
        let reasoning = match first_failure {
            Some(check) => check
                .message
                .clone()
                .unwrap_or_else(|| format!("{} failed", check.name)),
            None if result.overall => SUCCESS_REASONING.to_string(),
            None => "validation failed".to_string(),
        };
        let check_type = match first_failure {
            Some(check) => check.name.clone(),
            None if result.overall => ALL_CHECKS.to_string(),
            None => UNCLASSIFIED.to_string(),
        };

        vec![
            EvaluationRecord::categorical(labels.outcome, assessment.as_str())
                .with_assessment(assessment)
                .with_reasoning(reasoning)
                .with_tags(tags.clone()),
            EvaluationRecord::categorical(labels.check_type, check_type).with_tags(tags.clone()),
            EvaluationRecord::score(labels.score, result.score).with_tags(tags),
        ]
    }

    /// Emit the three records for `result` under `context`.
    pub async fn submit(
        &self,
        context: Option<&ExecutionContext>,
        unit_index: u32,
        result: &ValidationResult,
    ) -> EmissionOutcome {
        self.submit_with_tags(context, unit_index, result, BTreeMap::new())
            .await
    }

    /// Like [`submit`](Self::submit), adding caller tags to every record.
    ///
    /// `feature` and `unit_index` tags always win over caller tags.
    pub async fn submit_with_tags(
        &self,
        context: Option<&ExecutionContext>,
        unit_index: u32,
        result: &ValidationResult,
        extra_tags: BTreeMap<String, String>,
    ) -> EmissionOutcome {
        let Some(context) = context else {
            obs::emit_emission_skipped(unit_index);
            METRICS.inc_emissions_skipped();
            return EmissionOutcome::Skipped;
        };

        let records = self.build_records(unit_index, result, &extra_tags);
        let context_key = context.key();

        let sent = tokio::time::timeout(
            self.config.timeout,
            self.sink.submit_batch(context, &records),
        )
        .await;

        match sent {
            Ok(Ok(())) => {
                obs::emit_emission_sent(&context_key, unit_index, records.len());
                METRICS.inc_emissions_sent();
                EmissionOutcome::Sent {
                    records: records.len(),
                }
            }
            Ok(Err(e)) => {
                obs::emit_emission_failed(&context_key, unit_index, &e);
                METRICS.inc_emissions_failed();
                EmissionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                let reason = format!("sink timed out after {:?}", self.config.timeout);
                obs::emit_emission_failed(&context_key, unit_index, &reason);
                METRICS.inc_emissions_failed();
                EmissionOutcome::Failed { reason }
            }
        }
    }

    /// Resolve the current context from `source` (once) and submit.
    pub async fn submit_current(
        &self,
        source: &dyn ContextSource,
        unit_index: u32,
        result: &ValidationResult,
    ) -> EmissionOutcome {
        let context = source.export_current_context();
        self.submit(context.as_ref(), unit_index, result).await
    }

    /// Fire-and-forget submission on the tokio runtime.
    pub fn spawn_submit(
        &self,
        context: Option<ExecutionContext>,
        unit_index: u32,
        result: ValidationResult,
    ) -> JoinHandle<EmissionOutcome> {
        let emitter = self.clone();
        tokio::spawn(async move { emitter.submit(context.as_ref(), unit_index, &result).await })
    }

    /// Submit several sub-items that share one context, concurrently.
    ///
    /// Each item keeps its own `unit_index` suffix, so labels never collide.
    pub async fn submit_batch(
        &self,
        context: Option<&ExecutionContext>,
        items: &[(u32, ValidationResult)],
    ) -> Vec<EmissionOutcome> {
        futures::future::join_all(
            items
                .iter()
                .map(|(unit_index, result)| self.submit(context, *unit_index, result)),
        )
        .await
    }
}
