//! Unit-of-work execution context.
//!
//! The core never looks the current context up from ambient state. A
//! collaborator creates an [`ExecutionContext`] at the start of a unit of
//! work and it is handed to the emitter explicitly. [`ContextSource`] is the
//! seam for callers that still expose a "current context" accessor.

use serde::{Deserialize, Serialize};

/// Opaque handle identifying the current unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Reference to the enclosing trace.
    pub trace_ref: String,
    /// Reference to the unit of work inside the trace.
    pub unit_ref: String,
}

impl ExecutionContext {
    pub fn new(trace_ref: impl Into<String>, unit_ref: impl Into<String>) -> Self {
        Self {
            trace_ref: trace_ref.into(),
            unit_ref: unit_ref.into(),
        }
    }

    /// Generate a fresh context with random trace and unit references.
    pub fn generate() -> Self {
        Self {
            trace_ref: uuid::Uuid::new_v4().to_string(),
            unit_ref: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Stable key used by sinks to scope labels (`trace_ref/unit_ref`).
    pub fn key(&self) -> String {
        format!("{}/{}", self.trace_ref, self.unit_ref)
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.trace_ref, self.unit_ref)
    }
}

/// Source of the currently active unit-of-work handle.
///
/// Called once per emission and never cached across emissions.
pub trait ContextSource: Send + Sync {
    fn export_current_context(&self) -> Option<ExecutionContext>;
}

/// A source with no active unit of work.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContext;

impl ContextSource for NoContext {
    fn export_current_context(&self) -> Option<ExecutionContext> {
        None
    }
}

/// A source that always reports the same context.
#[derive(Debug, Clone)]
pub struct FixedContext(pub ExecutionContext);

impl ContextSource for FixedContext {
    fn export_current_context(&self) -> Option<ExecutionContext> {
        Some(self.0.clone())
    }
}

impl<F> ContextSource for F
where
    F: Fn() -> Option<ExecutionContext> + Send + Sync,
{
    fn export_current_context(&self) -> Option<ExecutionContext> {
        self()
    }
}
