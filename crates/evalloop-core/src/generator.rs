//! Generator boundary.
//!
//! The generative model is an external collaborator. The controller hands it
//! a [`GenerationRequest`] per attempt and receives an [`Artifact`] back.
//! Any error is transient from the loop's point of view and consumes one
//! attempt from the budget.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Artifact, ArtifactKind, GenerationError};

/// Input for one generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub kind: ArtifactKind,
    /// Caller-supplied generation parameters, passed through untouched.
    pub params: serde_json::Value,
    /// Corrective feedback from the previous attempt; `None` on attempt 1.
    pub feedback: Option<String>,
    /// 1-based attempt number.
    pub attempt: u32,
}

/// External artifact generator.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact, GenerationError>;
}
