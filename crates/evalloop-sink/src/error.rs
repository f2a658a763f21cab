//! Error types for evalloop-sink

use thiserror::Error;

/// Errors that can occur while handing records to an evaluation sink
#[derive(Error, Debug)]
pub enum SinkError {
    /// Network or connection level failure
    #[error("Sink transport failed: {0}")]
    Transport(String),

    /// The sink answered but refused the batch
    #[error("Sink rejected batch with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Sink is not reachable or not configured
    #[error("Sink unavailable: {0}")]
    Unavailable(String),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Sink configuration is unusable
    #[error("Invalid sink configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialization(err.to_string())
    }
}
