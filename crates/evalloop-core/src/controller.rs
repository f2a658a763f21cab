//! Generation loop controller.
//!
//! Drives one artifact through `generate -> validate -> retry` until it is
//! accepted or the attempt budget runs out. The loop is an explicit state
//! machine; every phase it enters is recorded on the [`FinalResult`].
//!
//! Only configuration problems are returned as `Err`. Generator failures use
//! up attempts, validation failures are data, and emission failures are
//! logged by the emitter.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Instrument;

use evalloop_sink::ExecutionContext;

use crate::config::LoopConfig;
use crate::domain::{
    Artifact, ArtifactKind, ConfigError, FinalResult, GenerationAttempt, GenerationError,
    LoopPhase, LoopStatus, StopReason, ValidationCheck, ValidationResult,
};
use crate::emitter::EvaluationEmitter;
use crate::feedback;
use crate::generator::{GenerationRequest, Generator};
use crate::metrics::METRICS;
use crate::obs;
use crate::registry::ValidatorRegistry;

/// Name of the synthetic check recorded when the generator fails.
pub const CHECK_GENERATION: &str = "generation";

/// Per-run options beyond kind, params and budget.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Execution context for evaluation emission. `None` skips emission.
    pub context: Option<ExecutionContext>,
    /// Sub-item index used to suffix evaluation labels.
    pub unit_index: u32,
    /// Cooperative cancel flag, checked between attempts.
    pub cancel: Option<watch::Receiver<bool>>,
    /// Wall-clock deadline, checked between attempts.
    pub deadline: Option<Instant>,
}

impl RunOptions {
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_unit_index(mut self, unit_index: u32) -> Self {
        self.unit_index = unit_index;
        self
    }

    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Reason to stop before the next attempt, if any.
    fn interruption(&self) -> Option<StopReason> {
        if self.cancel.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::DeadlineExceeded);
        }
        None
    }
}

/// One independent run for [`GenerationLoopController::run_all`].
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub kind: ArtifactKind,
    pub params: serde_json::Value,
    pub max_attempts: u32,
    pub options: RunOptions,
}

impl RunRequest {
    pub fn new(kind: ArtifactKind, params: serde_json::Value, max_attempts: u32) -> Self {
        Self {
            kind,
            params,
            max_attempts,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }
}

enum LoopState {
    Init,
    Generating {
        attempt: u32,
        feedback: Option<String>,
    },
    Validating {
        attempt: u32,
        feedback: Option<String>,
        artifact: Artifact,
    },
    Retrying {
        next_attempt: u32,
        feedback: String,
    },
    Accepted,
    Exhausted(StopReason),
}

impl LoopState {
    fn phase(&self) -> LoopPhase {
        match self {
            Self::Init => LoopPhase::Init,
            Self::Generating { .. } => LoopPhase::Generating,
            Self::Validating { .. } => LoopPhase::Validating,
            Self::Retrying { .. } => LoopPhase::Retrying,
            Self::Accepted => LoopPhase::Accepted,
            Self::Exhausted(_) => LoopPhase::Exhausted,
        }
    }
}

/// Bounded generate/validate/retry loop.
#[derive(Clone)]
pub struct GenerationLoopController {
    generator: Arc<dyn Generator>,
    registry: ValidatorRegistry,
    emitter: Option<EvaluationEmitter>,
    config: LoopConfig,
}

impl std::fmt::Debug for GenerationLoopController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationLoopController")
            .field("registry", &self.registry)
            .field("emitter", &self.emitter)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GenerationLoopController {
    pub fn new(generator: Arc<dyn Generator>, registry: ValidatorRegistry) -> Self {
        Self {
            generator,
            registry,
            emitter: None,
            config: LoopConfig::default(),
        }
    }

    /// Emit evaluation records after every run.
    pub fn with_emitter(mut self, emitter: EvaluationEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    pub fn with_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Fail fast if `kind` has no validators.
    pub fn ensure_kind(&self, kind: ArtifactKind) -> Result<(), ConfigError> {
        self.registry.validators_for(kind).map(|_| ())
    }

    /// Run the loop with default options.
    pub async fn run(
        &self,
        kind: ArtifactKind,
        params: serde_json::Value,
        max_attempts: u32,
    ) -> Result<FinalResult, ConfigError> {
        self.run_with(kind, params, max_attempts, RunOptions::default())
            .await
    }

    /// Run the loop with the configured attempt budget
    /// (`LoopConfig::max_attempts`, `EVALLOOP_MAX_ATTEMPTS`).
    pub async fn run_default(
        &self,
        kind: ArtifactKind,
        params: serde_json::Value,
        options: RunOptions,
    ) -> Result<FinalResult, ConfigError> {
        self.run_with(kind, params, self.config.max_attempts, options)
            .await
    }

    /// Run the loop until acceptance, budget exhaustion or interruption.
    pub async fn run_with(
        &self,
        kind: ArtifactKind,
        params: serde_json::Value,
        max_attempts: u32,
        options: RunOptions,
    ) -> Result<FinalResult, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(max_attempts));
        }
        self.ensure_kind(kind)?;

        let run_id = uuid::Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, kind);
        let final_result = self
            .drive(run_id, kind, params, max_attempts, &options)
            .instrument(span.clone())
            .await?;

        if let (Some(emitter), Some(result)) = (&self.emitter, final_result.result()) {
            let mut tags = BTreeMap::new();
            tags.insert("kind".to_string(), kind.to_string());
            tags.insert(
                "status".to_string(),
                final_result.status.as_str().to_string(),
            );
            tags.insert(
                "attempts".to_string(),
                final_result.attempts_used().to_string(),
            );
            emitter
                .submit_with_tags(options.context.as_ref(), options.unit_index, result, tags)
                .instrument(span)
                .await;
        }

        Ok(final_result)
    }

    /// Run independent requests concurrently. Results keep request order.
    pub async fn run_all(
        &self,
        requests: Vec<RunRequest>,
    ) -> Vec<Result<FinalResult, ConfigError>> {
        futures::future::join_all(requests.into_iter().map(|req| {
            self.run_with(req.kind, req.params, req.max_attempts, req.options)
        }))
        .await
    }

    async fn drive(
        &self,
        run_id: String,
        kind: ArtifactKind,
        params: serde_json::Value,
        max_attempts: u32,
        options: &RunOptions,
    ) -> Result<FinalResult, ConfigError> {
        let started_at = Utc::now();
        let mut attempts: Vec<GenerationAttempt> = Vec::new();
        let mut phases: Vec<LoopPhase> = Vec::new();
        let mut state = LoopState::Init;

        obs::emit_run_started(&run_id, kind, max_attempts);

        let stop_reason = loop {
            phases.push(state.phase());
            state = match state {
                LoopState::Init => LoopState::Generating {
                    attempt: 1,
                    feedback: None,
                },
                LoopState::Generating { attempt, feedback } => {
                    METRICS.inc_attempts();
                    let request = GenerationRequest {
                        kind,
                        params: params.clone(),
                        feedback,
                        attempt,
                    };
                    match self.generate(&request).await {
                        Ok(artifact) => LoopState::Validating {
                            attempt,
                            feedback: request.feedback,
                            artifact,
                        },
                        Err(e) => {
                            METRICS.inc_generation_failures();
                            obs::emit_generation_failed(&run_id, attempt, &e);
                            let result = ValidationResult::from_checks(vec![
                                ValidationCheck::fail(CHECK_GENERATION, e.to_string()),
                            ]);
                            obs::emit_attempt_finished(&run_id, attempt, false, result.score);
                            attempts.push(GenerationAttempt {
                                index: attempt,
                                artifact: None,
                                result,
                                feedback: request.feedback,
                                timestamp: Utc::now(),
                            });
                            next_after_failure(
                                attempt,
                                max_attempts,
                                options,
                                feedback::for_generation_error(attempt, &e),
                            )
                        }
                    }
                }
                LoopState::Validating {
                    attempt,
                    feedback,
                    artifact,
                } => {
                    let result = self.registry.validate(&artifact)?;
                    let passed = result.overall;
                    obs::emit_attempt_finished(&run_id, attempt, passed, result.score);
                    let retry_feedback =
                        (!passed).then(|| feedback::for_failed_checks(attempt, &result));
                    attempts.push(GenerationAttempt {
                        index: attempt,
                        artifact: Some(artifact),
                        result,
                        feedback,
                        timestamp: Utc::now(),
                    });
                    match retry_feedback {
                        None => LoopState::Accepted,
                        Some(fb) => next_after_failure(attempt, max_attempts, options, fb),
                    }
                }
                LoopState::Retrying {
                    next_attempt,
                    feedback,
                } => LoopState::Generating {
                    attempt: next_attempt,
                    feedback: Some(feedback),
                },
                LoopState::Accepted => break StopReason::Accepted,
                LoopState::Exhausted(reason) => break reason,
            };
        };

        let status = if stop_reason == StopReason::Accepted {
            METRICS.inc_runs_accepted();
            LoopStatus::Accepted
        } else {
            METRICS.inc_runs_exhausted();
            LoopStatus::Exhausted
        };

        let final_result = FinalResult {
            run_id,
            kind,
            status,
            stop_reason,
            attempts,
            phases,
            started_at,
            finished_at: Utc::now(),
        };
        obs::emit_run_finished(
            &final_result.run_id,
            status,
            stop_reason,
            final_result.attempts_used(),
            final_result.result().map_or(0.0, |r| r.score),
        );
        Ok(final_result)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<Artifact, GenerationError> {
        let artifact = match self.config.generation_timeout {
            Some(limit) => tokio::time::timeout(limit, self.generator.generate(request))
                .await
                .map_err(|_| GenerationError::TimedOut(limit))??,
            None => self.generator.generate(request).await?,
        };
        if artifact.kind != request.kind {
            return Err(GenerationError::Malformed(format!(
                "expected {} artifact, got {}",
                request.kind, artifact.kind
            )));
        }
        Ok(artifact)
    }
}

/// Transition after a failed attempt: retry, or stop on budget/interruption.
fn next_after_failure(
    attempt: u32,
    max_attempts: u32,
    options: &RunOptions,
    feedback: String,
) -> LoopState {
    if attempt >= max_attempts {
        return LoopState::Exhausted(StopReason::BudgetExhausted);
    }
    if let Some(reason) = options.interruption() {
        return LoopState::Exhausted(reason);
    }
    LoopState::Retrying {
        next_attempt: attempt + 1,
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct Counting {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Generator for Counting {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<Artifact, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Artifact::new(
                request.kind,
                request.attempt,
                serde_json::json!({"sections": []}),
            ))
        }
    }

    fn controller() -> (Arc<Counting>, GenerationLoopController) {
        let generator = Arc::new(Counting {
            calls: AtomicU32::new(0),
        });
        let registry = ValidatorRegistry::standard().expect("default rules");
        (generator.clone(), GenerationLoopController::new(generator, registry))
    }

    #[tokio::test]
    async fn zero_budget_is_rejected_before_generation() {
        let (generator, controller) = controller();
        let err = controller
            .run(ArtifactKind::Outline, serde_json::json!({}), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxAttempts(0)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_before_generation() {
        let generator = Arc::new(Counting {
            calls: AtomicU32::new(0),
        });
        let controller = GenerationLoopController::new(generator.clone(), ValidatorRegistry::new());
        let err = controller
            .run(ArtifactKind::Script, serde_json::json!({}), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoValidators { .. }));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
        assert!(controller.ensure_kind(ArtifactKind::Script).is_err());
    }

    #[tokio::test]
    async fn phases_follow_the_state_machine() {
        let (_, controller) = controller();
        let result = controller
            .run(ArtifactKind::Outline, serde_json::json!({}), 2)
            .await
            .expect("configured");
        assert_eq!(
            result.phases,
            vec![
                LoopPhase::Init,
                LoopPhase::Generating,
                LoopPhase::Validating,
                LoopPhase::Retrying,
                LoopPhase::Generating,
                LoopPhase::Validating,
                LoopPhase::Exhausted,
            ]
        );
        assert_eq!(result.stop_reason, StopReason::BudgetExhausted);
    }

    #[tokio::test]
    async fn run_default_uses_configured_budget() {
        let (generator, controller) = controller();
        let controller = controller.with_config(LoopConfig::default().with_max_attempts(4));
        let result = controller
            .run_default(ArtifactKind::Outline, serde_json::json!({}), RunOptions::default())
            .await
            .expect("configured");
        assert_eq!(result.attempts_used(), 4);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 4);

        let controller = controller.with_config(LoopConfig::default().with_max_attempts(0));
        let err = controller
            .run_default(ArtifactKind::Outline, serde_json::json!({}), RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxAttempts(0)));
    }

    #[test]
    fn last_attempt_never_retries() {
        let options = RunOptions::default();
        assert!(matches!(
            next_after_failure(3, 3, &options, String::new()),
            LoopState::Exhausted(StopReason::BudgetExhausted)
        ));
        assert!(matches!(
            next_after_failure(1, 3, &options, "fb".to_string()),
            LoopState::Retrying { next_attempt: 2, .. }
        ));
    }

    #[test]
    fn cancel_flag_interrupts_retry() {
        let (tx, rx) = watch::channel(false);
        let options = RunOptions::default().with_cancel(rx);
        assert_eq!(options.interruption(), None);
        tx.send(true).expect("receiver alive");
        assert!(matches!(
            next_after_failure(1, 3, &options, String::new()),
            LoopState::Exhausted(StopReason::Cancelled)
        ));
    }
}
