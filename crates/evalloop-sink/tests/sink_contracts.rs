//! Contract tests for `EvaluationSink` implementations.
//!
//! These use the in-memory fakes. Any conforming sink must accept a batch for
//! a context, treat `(context, label)` as the upsert key, and surface
//! failures as `SinkError` rather than panicking.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use evalloop_sink::fakes::{MemoryEvaluationSink, StallingSink, UnavailableSink};
use evalloop_sink::{
    Assessment, EvaluationRecord, EvaluationSink, ExecutionContext, HttpEvaluationSink,
    HttpSinkConfig, SinkError,
};

fn batch(score: f64) -> Vec<EvaluationRecord> {
    let mut tags = BTreeMap::new();
    tags.insert("feature".to_string(), "contract".to_string());
    vec![
        EvaluationRecord::categorical("gen_outcome_0", "pass")
            .with_assessment(Assessment::Pass)
            .with_tags(tags.clone()),
        EvaluationRecord::score("gen_score_0", score).with_tags(tags),
    ]
}

// ===========================================================================
// MemoryEvaluationSink
// ===========================================================================

#[tokio::test]
async fn memory_sink_accepts_batch_through_trait_object() {
    let memory = Arc::new(MemoryEvaluationSink::new());
    let sink: Arc<dyn EvaluationSink> = memory.clone();
    let ctx = ExecutionContext::new("trace", "unit");

    sink.submit_batch(&ctx, &batch(0.4)).await.unwrap();

    assert_eq!(memory.call_count(), 1);
    assert_eq!(memory.records_for(&ctx).len(), 2);
    let calls = memory.calls();
    assert_eq!(calls[0].context, ctx);
    assert_eq!(calls[0].records.len(), 2);
}

#[tokio::test]
async fn memory_sink_resubmission_overwrites_not_duplicates() {
    let sink = MemoryEvaluationSink::new();
    let ctx = ExecutionContext::new("trace", "unit");

    sink.submit_batch(&ctx, &batch(0.4)).await.unwrap();
    sink.submit_batch(&ctx, &batch(1.0)).await.unwrap();

    assert_eq!(sink.stored_len(), 2);
    let score = sink.get(&ctx, "gen_score_0").expect("stored");
    assert_eq!(score.value.as_f64(), Some(1.0));
    assert_eq!(score.tags["feature"], "contract");
}

#[tokio::test]
async fn memory_sink_keeps_contexts_apart() {
    let sink = MemoryEvaluationSink::new();
    let a = ExecutionContext::generate();
    let b = ExecutionContext::generate();

    sink.submit_batch(&a, &batch(0.1)).await.unwrap();
    sink.submit_batch(&b, &batch(0.9)).await.unwrap();

    assert_eq!(sink.stored_len(), 4);
    assert_eq!(
        sink.get(&a, "gen_score_0").and_then(|r| r.value.as_f64()),
        Some(0.1)
    );
    assert_eq!(
        sink.get(&b, "gen_score_0").and_then(|r| r.value.as_f64()),
        Some(0.9)
    );
}

// ===========================================================================
// Failing sinks
// ===========================================================================

#[tokio::test]
async fn unavailable_sink_reports_error() {
    let sink = UnavailableSink::new();
    let err = sink
        .submit_batch(&ExecutionContext::generate(), &batch(0.5))
        .await
        .unwrap_err();

    assert!(matches!(err, SinkError::Unavailable(_)));
    assert_eq!(sink.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn stalling_sink_eventually_accepts() {
    let sink = StallingSink::new(Duration::from_secs(5));
    let started = tokio::time::Instant::now();
    sink.submit_batch(&ExecutionContext::generate(), &batch(0.5))
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test]
async fn http_sink_surfaces_transport_errors() {
    let sink = HttpEvaluationSink::new(
        HttpSinkConfig::new("http://127.0.0.1:9").with_request_timeout(Duration::from_secs(2)),
    )
    .expect("client");

    let err = sink
        .submit_batch(&ExecutionContext::generate(), &batch(0.5))
        .await
        .unwrap_err();
    assert!(matches!(err, SinkError::Transport(_)));
}

// ===========================================================================
// Record wire shape
// ===========================================================================

#[test]
fn records_serialize_with_snake_case_fields() {
    let json = serde_json::to_value(&batch(0.25)).unwrap();
    assert_eq!(json[0]["label"], "gen_outcome_0");
    assert_eq!(json[0]["metric_type"], "categorical");
    assert_eq!(json[0]["value"], "pass");
    assert_eq!(json[0]["assessment"], "pass");
    assert_eq!(json[1]["metric_type"], "score");
    assert_eq!(json[1]["value"], 0.25);
}
