//! Evaluation sink trait.
//!
//! Sinks receive batches of [`EvaluationRecord`]s scoped to one
//! [`ExecutionContext`]. The emitter guarantees labels are deterministic per
//! `(context, unit_index)`, so a sink can enforce idempotence by keying on
//! `(context.key(), label)`.
//!
//! In-memory fakes live in the `fakes` module; the remote implementation is
//! `http::HttpEvaluationSink`.

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::error::SinkError;
use crate::record::EvaluationRecord;

/// Result type for sink operations
pub type SinkResult<T> = std::result::Result<T, SinkError>;

/// Remote evaluation sink.
///
/// Guarantees expected from implementations:
/// - A batch is accepted or rejected as a whole.
/// - Re-submitting a record with the same `(context, label)` either
///   overwrites the previous record or is rejected; it never creates a
///   second distinct record.
#[async_trait]
pub trait EvaluationSink: Send + Sync {
    /// Submit a batch of records for one execution context.
    async fn submit_batch(
        &self,
        context: &ExecutionContext,
        records: &[EvaluationRecord],
    ) -> SinkResult<()>;
}
