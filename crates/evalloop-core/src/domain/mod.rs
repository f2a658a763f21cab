//! Domain models for evalloop.
//!
//! Canonical definitions for the core entities:
//! - `Artifact`: one generated attempt's payload
//! - `ValidationCheck` / `ValidationResult`: rule outcomes and their aggregate
//! - `GenerationAttempt` / `FinalResult`: the attempt log of one loop run

pub mod artifact;
pub mod attempt;
pub mod error;
pub mod validation;

// Re-export main types and errors
pub use artifact::{Artifact, ArtifactKind};
pub use attempt::{FinalResult, GenerationAttempt, LoopPhase, LoopStatus, StopReason};
pub use error::{ConfigError, EvalLoopError, GenerationError, Result};
pub use validation::{ValidationCheck, ValidationResult};
