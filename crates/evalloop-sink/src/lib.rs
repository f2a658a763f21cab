//! Evalloop-Sink: evaluation transport for evalloop
//!
//! This crate owns everything that crosses the boundary between the
//! generation loop and the remote evaluation backend.
//!
//! ## Layer 0 - Transport
//!
//! Focus: a stable record contract, deterministic labels, and sinks that can
//! be swapped for in-memory fakes in tests.
//!
//! ## Key Components
//!
//! - `ExecutionContext`: opaque unit-of-work handle passed by value
//! - `EvaluationRecord`: one categorical or numeric quality datum
//! - `EvaluationSink`: async batch submission trait
//! - `HttpEvaluationSink`: `reqwest`-backed remote sink

pub mod context;
mod error;
pub mod fakes;
pub mod http;
pub mod record;
pub mod sink;

pub use context::{ContextSource, ExecutionContext, FixedContext, NoContext};
pub use error::SinkError;
pub use http::{HttpEvaluationSink, HttpSinkConfig};
pub use record::{Assessment, EvaluationRecord, MetricType, MetricValue};
pub use sink::{EvaluationSink, SinkResult};
