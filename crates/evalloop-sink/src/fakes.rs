//! In-memory fakes for the sink trait (testing only)
//!
//! Provides `MemoryEvaluationSink`, `UnavailableSink` and `StallingSink`
//! that satisfy the [`EvaluationSink`] contract without any network access.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::context::ExecutionContext;
use crate::error::SinkError;
use crate::record::EvaluationRecord;
use crate::sink::{EvaluationSink, SinkResult};

// ---------------------------------------------------------------------------
// MemoryEvaluationSink
// ---------------------------------------------------------------------------

/// One observed `submit_batch` call.
#[derive(Debug, Clone)]
pub struct SinkCall {
    pub context: ExecutionContext,
    pub records: Vec<EvaluationRecord>,
    pub received_at: DateTime<Utc>,
}

/// In-memory sink that upserts records keyed by `(context key, label)`.
///
/// Every call is also kept in an ordered call log so tests can assert on
/// exactly what the emitter sent.
#[derive(Debug, Default)]
pub struct MemoryEvaluationSink {
    records: Mutex<BTreeMap<(String, String), EvaluationRecord>>,
    calls: Mutex<Vec<SinkCall>>,
}

impl MemoryEvaluationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `submit_batch` calls observed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Snapshot of the call log in arrival order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Labels sent in every call, flattened in arrival order.
    pub fn observed_labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .flat_map(|c| c.records.iter().map(|r| r.label.clone()))
            .collect()
    }

    /// Distinct stored records for a context, ordered by label.
    pub fn records_for(&self, context: &ExecutionContext) -> Vec<EvaluationRecord> {
        let key = context.key();
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|((ctx, _), _)| *ctx == key)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Look up one stored record.
    pub fn get(&self, context: &ExecutionContext, label: &str) -> Option<EvaluationRecord> {
        self.records
            .lock()
            .unwrap()
            .get(&(context.key(), label.to_string()))
            .cloned()
    }

    /// Total number of distinct stored records across all contexts.
    pub fn stored_len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl EvaluationSink for MemoryEvaluationSink {
    async fn submit_batch(
        &self,
        context: &ExecutionContext,
        records: &[EvaluationRecord],
    ) -> SinkResult<()> {
        {
            let mut store = self.records.lock().unwrap();
            for record in records {
                store.insert((context.key(), record.label.clone()), record.clone());
            }
        }
        self.calls.lock().unwrap().push(SinkCall {
            context: context.clone(),
            records: records.to_vec(),
            received_at: Utc::now(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// UnavailableSink
// ---------------------------------------------------------------------------

/// Sink that refuses every batch, for exercising degrade-silently paths.
#[derive(Debug, Default)]
pub struct UnavailableSink {
    attempts: Mutex<usize>,
}

impl UnavailableSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submissions attempted against this sink.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl EvaluationSink for UnavailableSink {
    async fn submit_batch(
        &self,
        _context: &ExecutionContext,
        _records: &[EvaluationRecord],
    ) -> SinkResult<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(SinkError::Unavailable("sink is offline".to_string()))
    }
}

// ---------------------------------------------------------------------------
// StallingSink
// ---------------------------------------------------------------------------

/// Sink that sleeps before accepting, for exercising emission timeouts.
#[derive(Debug)]
pub struct StallingSink {
    delay: Duration,
}

impl StallingSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl EvaluationSink for StallingSink {
    async fn submit_batch(
        &self,
        _context: &ExecutionContext,
        _records: &[EvaluationRecord],
    ) -> SinkResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_upserts_by_context_and_label() {
        let sink = MemoryEvaluationSink::new();
        let ctx = ExecutionContext::new("t", "u");

        sink.submit_batch(&ctx, &[EvaluationRecord::score("q_0", 0.2)])
            .await
            .unwrap();
        sink.submit_batch(&ctx, &[EvaluationRecord::score("q_0", 0.9)])
            .await
            .unwrap();

        assert_eq!(sink.call_count(), 2);
        assert_eq!(sink.stored_len(), 1);
        let stored = sink.get(&ctx, "q_0").expect("stored");
        assert_eq!(stored.value.as_f64(), Some(0.9));
    }

    #[tokio::test]
    async fn memory_sink_scopes_labels_per_context() {
        let sink = MemoryEvaluationSink::new();
        let a = ExecutionContext::new("t", "a");
        let b = ExecutionContext::new("t", "b");
        let record = EvaluationRecord::categorical("outcome_0", "pass");

        sink.submit_batch(&a, &[record.clone()]).await.unwrap();
        sink.submit_batch(&b, &[record]).await.unwrap();

        assert_eq!(sink.stored_len(), 2);
        assert_eq!(sink.records_for(&a).len(), 1);
    }

    #[tokio::test]
    async fn unavailable_sink_counts_attempts() {
        let sink = UnavailableSink::new();
        let ctx = ExecutionContext::new("t", "u");
        let err = sink.submit_batch(&ctx, &[]).await.unwrap_err();
        assert!(matches!(err, SinkError::Unavailable(_)));
        assert_eq!(sink.attempts(), 1);
    }
}
