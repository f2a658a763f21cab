//! evalloop core library
//!
//! Bounded generate/validate/retry loop for generated artifacts, the
//! structural and consistency validators it runs, and the emitter that turns
//! validation results into evaluation records.

pub mod audit;
pub mod config;
pub mod controller;
pub mod domain;
pub mod emitter;
pub mod feedback;
pub mod generator;
pub mod metrics;
pub mod obs;
pub mod registry;
pub mod telemetry;
pub mod validators;

pub use domain::{
    Artifact, ArtifactKind, ConfigError, EvalLoopError, FinalResult, GenerationAttempt,
    GenerationError, LoopPhase, LoopStatus, Result, StopReason, ValidationCheck,
    ValidationResult,
};

pub use audit::{read_attempt_log, write_attempt_log};
pub use config::{EmitterConfig, LoopConfig};
pub use controller::{GenerationLoopController, RunOptions, RunRequest, CHECK_GENERATION};
pub use emitter::{EmissionLabels, EmissionOutcome, EvaluationEmitter};
pub use generator::{GenerationRequest, Generator};
pub use registry::ValidatorRegistry;
pub use validators::{
    ArtifactValidator, ConsistencyValidator, DocumentRules, DocumentValidator, OutlineRules,
    OutlineValidator, ScriptRules, ScriptValidator, TallyEntry, TallyRecord,
};

pub use evalloop_sink::{ContextSource, EvaluationSink, ExecutionContext};

pub use metrics::METRICS;
pub use obs::{emit_run_finished, emit_run_started, UnitSpan};
pub use telemetry::init_tracing;

/// evalloop version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
