//! Timed-script validator.
//!
//! Expected payload:
//!
//! ```json
//! {
//!   "target_duration_secs": 60,
//!   "scenes": [
//!     { "duration_secs": 20, "narration": "...", "visual": "..." },
//!     { "start_secs": 20, "end_secs": 60, "narration": "..." }
//!   ]
//! }
//! ```
//!
//! A scene's timing is `duration_secs`, or `end_secs - start_secs` when no
//! duration is given. Scenes without a usable timing contribute nothing.
//! A payload that does not decode into this shape yields a single failing
//! `script_shape` check carrying the decode error.

use serde::{Deserialize, Serialize};

use super::ArtifactValidator;
use crate::domain::{Artifact, ConfigError, ValidationCheck, ValidationResult};

pub const CHECK_TIMING_COVERAGE: &str = "timing_coverage";
pub const CHECK_SCENE_FIELDS: &str = "scene_fields";
pub const CHECK_SCRIPT_SHAPE: &str = "script_shape";

/// Script policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRules {
    /// Fallback target when the payload does not declare one.
    pub target_duration_secs: Option<f64>,
    /// Allowed absolute deviation from the target, in seconds.
    pub tolerance_secs: f64,
}

impl Default for ScriptRules {
    fn default() -> Self {
        Self {
            target_duration_secs: None,
            tolerance_secs: 2.0,
        }
    }
}

impl ScriptRules {
    pub fn with_target(mut self, secs: f64) -> Self {
        self.target_duration_secs = Some(secs);
        self
    }

    pub fn with_tolerance(mut self, secs: f64) -> Self {
        self.tolerance_secs = secs;
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct ScriptPayload {
    target_duration_secs: Option<f64>,
    #[serde(default)]
    scenes: Vec<Scene>,
}

#[derive(Debug, Default, Deserialize)]
struct Scene {
    duration_secs: Option<f64>,
    start_secs: Option<f64>,
    end_secs: Option<f64>,
    narration: Option<String>,
    #[serde(alias = "visual_description")]
    visual: Option<String>,
}

impl Scene {
    fn timing(&self) -> Option<f64> {
        let secs = match (self.duration_secs, self.start_secs, self.end_secs) {
            (Some(d), _, _) => d,
            (None, Some(start), Some(end)) => end - start,
            _ => return None,
        };
        (secs.is_finite() && secs >= 0.0).then_some(secs)
    }

    fn has_text(field: &Option<String>) -> bool {
        field.as_deref().map(str::trim).is_some_and(|s| !s.is_empty())
    }

    fn lacks_both_fields(&self) -> bool {
        !Self::has_text(&self.narration) && !Self::has_text(&self.visual)
    }
}

/// Validates timing coverage and per-scene content.
#[derive(Debug, Clone, Default)]
pub struct ScriptValidator {
    rules: ScriptRules,
}

impl ScriptValidator {
    pub fn new(rules: ScriptRules) -> Result<Self, ConfigError> {
        if !rules.tolerance_secs.is_finite() || rules.tolerance_secs < 0.0 {
            return Err(ConfigError::InvalidRules(format!(
                "script tolerance must be a non-negative number, got {}",
                rules.tolerance_secs
            )));
        }
        if let Some(target) = rules.target_duration_secs {
            if !target.is_finite() || target <= 0.0 {
                return Err(ConfigError::InvalidRules(format!(
                    "script target duration must be positive, got {target}"
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &ScriptRules {
        &self.rules
    }

    fn check_timing(&self, script: &ScriptPayload) -> ValidationCheck {
        let declared = script.target_duration_secs;
        let target = declared
            .filter(|t| t.is_finite() && *t > 0.0)
            .or(self.rules.target_duration_secs);
        let Some(target) = target else {
            let message = match declared {
                Some(t) => format!("declared target duration {t}s is not positive"),
                None => "no target duration declared".to_string(),
            };
            return ValidationCheck::fail(CHECK_TIMING_COVERAGE, message);
        };
        if script.scenes.is_empty() {
            return ValidationCheck::fail(CHECK_TIMING_COVERAGE, "script has no scenes");
        }

        let covered: f64 = script.scenes.iter().filter_map(Scene::timing).sum();
        let untimed = script.scenes.iter().filter(|s| s.timing().is_none()).count();
        let deviation = (covered - target).abs();
        let mut message = format!(
            "scenes cover {covered:.1}s of {target:.1}s target (tolerance ±{:.1}s)",
            self.rules.tolerance_secs
        );
        if untimed > 0 {
            message.push_str(&format!(", {untimed} scene(s) without timing"));
        }
        ValidationCheck::from_bool(
            CHECK_TIMING_COVERAGE,
            deviation <= self.rules.tolerance_secs,
            message,
        )
    }

    fn check_scene_fields(&self, script: &ScriptPayload) -> ValidationCheck {
        if script.scenes.is_empty() {
            return ValidationCheck::fail(CHECK_SCENE_FIELDS, "script has no scenes");
        }
        let bare: Vec<String> = script
            .scenes
            .iter()
            .enumerate()
            .filter(|(_, s)| s.lacks_both_fields())
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        ValidationCheck::from_bool(
            CHECK_SCENE_FIELDS,
            bare.is_empty(),
            format!(
                "scene(s) {} have neither narration nor visual description",
                bare.join(", ")
            ),
        )
    }
}

impl ArtifactValidator for ScriptValidator {
    fn name(&self) -> &str {
        "script"
    }

    fn validate(&self, artifact: &Artifact) -> ValidationResult {
        let script: ScriptPayload = match serde_json::from_value(artifact.payload.clone()) {
            Ok(script) => script,
            Err(e) => {
                return ValidationResult::from_checks(vec![ValidationCheck::fail(
                    CHECK_SCRIPT_SHAPE,
                    format!("payload is not a timed script: {e}"),
                )])
            }
        };
        ValidationResult::from_checks(vec![
            self.check_timing(&script),
            self.check_scene_fields(&script),
        ])
    }
}
