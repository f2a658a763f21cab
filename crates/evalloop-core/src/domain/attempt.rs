//! Attempt log and loop outcome.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::artifact::{Artifact, ArtifactKind};
use crate::domain::validation::ValidationResult;

/// Terminal status of a loop run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    Accepted,
    Exhausted,
}

impl LoopStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Accepted,
    BudgetExhausted,
    Cancelled,
    DeadlineExceeded,
}

/// State-machine phases, recorded in the order they were entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Init,
    Generating,
    Validating,
    Retrying,
    Accepted,
    Exhausted,
}

/// One completed attempt. Never mutated after it is appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    /// 1-based attempt index.
    pub index: u32,
    /// `None` when the generator failed for this attempt.
    pub artifact: Option<Artifact>,
    pub result: ValidationResult,
    /// Corrective feedback handed to the generator for this attempt.
    pub feedback: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one `run`: status plus the full attempt log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub run_id: String,
    pub kind: ArtifactKind,
    pub status: LoopStatus,
    pub stop_reason: StopReason,
    pub attempts: Vec<GenerationAttempt>,
    pub phases: Vec<LoopPhase>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl FinalResult {
    /// The last completed attempt.
    pub fn final_attempt(&self) -> Option<&GenerationAttempt> {
        self.attempts.last()
    }

    /// Validation result of the last attempt.
    pub fn result(&self) -> Option<&ValidationResult> {
        self.final_attempt().map(|a| &a.result)
    }

    /// The artifact handed back to the caller.
    ///
    /// This is the last attempt's artifact; when the last attempt failed to
    /// generate, the most recent artifact any attempt produced.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.attempts.iter().rev().find_map(|a| a.artifact.as_ref())
    }

    /// True when the returned artifact is not fully validated.
    pub fn is_degraded(&self) -> bool {
        self.status != LoopStatus::Accepted
    }

    pub fn attempts_used(&self) -> u32 {
        self.attempts.len() as u32
    }
}
