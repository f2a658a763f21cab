//! Runtime configuration.
//!
//! Every config struct has a `Default`, builder-style setters, and a
//! `from_env()` constructor. `from_env()` delegates to `from_lookup()` so the
//! parsing rules can be tested without touching the process environment.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ConfigError;

pub const MAX_ATTEMPTS_ENV: &str = "EVALLOOP_MAX_ATTEMPTS";
pub const GENERATION_TIMEOUT_ENV: &str = "EVALLOOP_GENERATION_TIMEOUT_MS";
pub const EMIT_TIMEOUT_ENV: &str = "EVALLOOP_EMIT_TIMEOUT_MS";
pub const LABEL_PREFIX_ENV: &str = "EVALLOOP_LABEL_PREFIX";
pub const FEATURE_ENV: &str = "EVALLOOP_FEATURE";

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Generation loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Attempt budget used by `GenerationLoopController::run_default`.
    pub max_attempts: u32,
    /// Upper bound on a single generator call; `None` waits indefinitely.
    pub generation_timeout: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            generation_timeout: None,
        }
    }
}

impl LoopConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    /// Load from `EVALLOOP_MAX_ATTEMPTS` and `EVALLOOP_GENERATION_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(max_attempts) = parse_var::<u32, _>(&lookup, MAX_ATTEMPTS_ENV)? {
            if max_attempts == 0 {
                return Err(ConfigError::InvalidMaxAttempts(0));
            }
            config.max_attempts = max_attempts;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, GENERATION_TIMEOUT_ENV)? {
            config.generation_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        Ok(config)
    }
}

/// Evaluation emitter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Prefix of the three per-emission base labels.
    pub label_prefix: String,
    /// Value of the shared `feature` tag.
    pub feature: String,
    /// Upper bound on a single sink submission.
    pub timeout: Duration,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            label_prefix: "generation".to_string(),
            feature: "content_generation".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl EmitterConfig {
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `EVALLOOP_LABEL_PREFIX`, `EVALLOOP_FEATURE` and
    /// `EVALLOOP_EMIT_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(prefix) = lookup(LABEL_PREFIX_ENV) {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(ConfigError::InvalidEnv {
                    var: LABEL_PREFIX_ENV.to_string(),
                    value: prefix.to_string(),
                });
            }
            config.label_prefix = prefix.to_string();
        }
        if let Some(feature) = lookup(FEATURE_ENV).filter(|f| !f.trim().is_empty()) {
            config.feature = feature.trim().to_string();
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, EMIT_TIMEOUT_ENV)? {
            if ms == 0 {
                return Err(ConfigError::InvalidEnv {
                    var: EMIT_TIMEOUT_ENV.to_string(),
                    value: ms.to_string(),
                });
            }
            config.timeout = Duration::from_millis(ms);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loop_defaults_without_env() {
        let config = LoopConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, LoopConfig::default());
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn loop_reads_attempts_and_timeout() {
        let config = LoopConfig::from_lookup(lookup_from(&[
            (MAX_ATTEMPTS_ENV, "5"),
            (GENERATION_TIMEOUT_ENV, "1500"),
        ]))
        .expect("valid");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.generation_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn loop_rejects_malformed_and_zero_attempts() {
        let err = LoopConfig::from_lookup(lookup_from(&[(MAX_ATTEMPTS_ENV, "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));

        let err = LoopConfig::from_lookup(lookup_from(&[(MAX_ATTEMPTS_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMaxAttempts(0)));
    }

    #[test]
    fn zero_generation_timeout_disables_it() {
        let config =
            LoopConfig::from_lookup(lookup_from(&[(GENERATION_TIMEOUT_ENV, "0")])).expect("valid");
        assert_eq!(config.generation_timeout, None);
    }

    #[test]
    fn emitter_reads_prefix_feature_timeout() {
        let config = EmitterConfig::from_lookup(lookup_from(&[
            (LABEL_PREFIX_ENV, "outline_check"),
            (FEATURE_ENV, "course_builder"),
            (EMIT_TIMEOUT_ENV, "250"),
        ]))
        .expect("valid");
        assert_eq!(config.label_prefix, "outline_check");
        assert_eq!(config.feature, "course_builder");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn emitter_rejects_blank_prefix_and_zero_timeout() {
        assert!(EmitterConfig::from_lookup(lookup_from(&[(LABEL_PREFIX_ENV, " ")])).is_err());
        assert!(EmitterConfig::from_lookup(lookup_from(&[(EMIT_TIMEOUT_ENV, "0")])).is_err());
    }
}
