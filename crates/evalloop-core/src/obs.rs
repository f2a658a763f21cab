//! Structured observability hooks for the generation loop.
//!
//! This module provides:
//! - Unit-scoped tracing spans via the `UnitSpan` RAII guard
//! - Emission functions for key lifecycle events: run start, attempt finish,
//!   run finish, and evaluation emission outcomes
//!
//! Events are emitted at `info!` level, warnings at `warn!`. For JSON output,
//! set `EVALLOOP_LOG_FORMAT=json` and use `telemetry::init_tracing_from_env`.

use tracing::{info, warn};

use crate::domain::{ArtifactKind, LoopStatus, StopReason};

/// RAII guard that enters a unit-scoped tracing span.
///
/// # Example
///
/// ```ignore
/// let _span = UnitSpan::enter("run-12345", ArtifactKind::Outline);
/// // All tracing calls are now associated with run_id = "run-12345"
/// ```
pub struct UnitSpan {
    _span: tracing::span::EnteredSpan,
}

impl UnitSpan {
    /// Create and enter a span tagged with the run id and artifact kind.
    pub fn enter(run_id: &str, kind: ArtifactKind) -> Self {
        Self {
            _span: run_span(run_id, kind).entered(),
        }
    }
}

/// Span for one loop run. Async code attaches it with `Instrument`, since an
/// entered span guard cannot be held across `.await`.
pub fn run_span(run_id: &str, kind: ArtifactKind) -> tracing::Span {
    tracing::info_span!("evalloop.run", run_id = %run_id, kind = %kind)
}

/// Emit event: loop run started.
pub fn emit_run_started(run_id: &str, kind: ArtifactKind, max_attempts: u32) {
    info!(
        event = "run.started",
        run_id = %run_id,
        kind = %kind,
        max_attempts = max_attempts,
    );
}

/// Emit event: one attempt completed (generated and validated, or failed to generate).
pub fn emit_attempt_finished(run_id: &str, attempt: u32, passed: bool, score: f64) {
    info!(
        event = "run.attempt_finished",
        run_id = %run_id,
        attempt = attempt,
        passed = passed,
        score = score,
    );
}

/// Emit event: generator failure absorbed into the attempt budget (warning level).
pub fn emit_generation_failed(run_id: &str, attempt: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "run.generation_failed",
        run_id = %run_id,
        attempt = attempt,
        error = %error,
    );
}

/// Emit event: loop run reached a terminal state.
pub fn emit_run_finished(
    run_id: &str,
    status: LoopStatus,
    stop_reason: StopReason,
    attempts: u32,
    score: f64,
) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        status = status.as_str(),
        stop_reason = ?stop_reason,
        attempts = attempts,
        score = score,
    );
}

/// Emit event: no execution context, so evaluation was not sent (warning level).
pub fn emit_emission_skipped(unit_index: u32) {
    warn!(
        event = "evaluation.skipped",
        unit_index = unit_index,
        "no active execution context; evaluation not emitted"
    );
}

/// Emit event: evaluation batch accepted by the sink.
pub fn emit_emission_sent(context: &str, unit_index: u32, records: usize) {
    info!(
        event = "evaluation.sent",
        context = %context,
        unit_index = unit_index,
        records = records,
    );
}

/// Emit event: evaluation sink failed or timed out (warning level).
pub fn emit_emission_failed(context: &str, unit_index: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "evaluation.failed",
        context = %context,
        unit_index = unit_index,
        error = %error,
    );
}
