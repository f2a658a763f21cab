//! Domain-level error taxonomy for evalloop.
//!
//! Only [`ConfigError`] ever escapes a loop run. Generation failures are
//! absorbed into the attempt budget, validation failures are data, and sink
//! failures are logged at the emitter boundary.

use std::time::Duration;

use crate::domain::artifact::ArtifactKind;

/// Misconfiguration detected at setup time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no validators registered for kind {kind}")]
    NoValidators { kind: ArtifactKind },

    #[error("max_attempts must be at least 1, got {0}")]
    InvalidMaxAttempts(u32),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("invalid validator rules: {0}")]
    InvalidRules(String),
}

/// Failure of a single generation call.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("generator returned malformed output: {0}")]
    Malformed(String),

    #[error("generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Evalloop errors outside the loop itself (audit artifacts, setup).
#[derive(Debug, thiserror::Error)]
pub enum EvalLoopError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("digest mismatch: expected {expected}, got {actual}")]
    DigestMismatch { expected: String, actual: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for evalloop operations.
pub type Result<T> = std::result::Result<T, EvalLoopError>;
