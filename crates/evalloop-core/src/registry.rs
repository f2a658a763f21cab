//! Validator registry.
//!
//! An explicit, ordered `kind -> [validator]` table built once and injected
//! into the controller. Registration order is the order checks appear in a
//! merged [`ValidationResult`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{Artifact, ArtifactKind, ConfigError, ValidationResult};
use crate::validators::{
    ArtifactValidator, ConsistencyValidator, DocumentRules, DocumentValidator, OutlineRules,
    OutlineValidator, ScriptRules, ScriptValidator,
};

/// Ordered validator sets per artifact kind.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: BTreeMap<ArtifactKind, Vec<Arc<dyn ArtifactValidator>>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, validators) in &self.validators {
            let names: Vec<&str> = validators.iter().map(|v| v.name()).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator to `kind`'s set.
    pub fn register(mut self, kind: ArtifactKind, validator: Arc<dyn ArtifactValidator>) -> Self {
        self.validators.entry(kind).or_default().push(validator);
        self
    }

    /// Registry with one validator per kind using the given rules.
    pub fn with_rules(
        outline: OutlineRules,
        document: DocumentRules,
        script: ScriptRules,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new()
            .register(ArtifactKind::Outline, Arc::new(OutlineValidator::new(outline)?))
            .register(ArtifactKind::Document, Arc::new(DocumentValidator::new(document)?))
            .register(ArtifactKind::Script, Arc::new(ScriptValidator::new(script)?))
            .register(ArtifactKind::Extraction, Arc::new(ConsistencyValidator::new())))
    }

    /// Registry with default rules for every kind.
    pub fn standard() -> Result<Self, ConfigError> {
        Self::with_rules(
            OutlineRules::default(),
            DocumentRules::default(),
            ScriptRules::default(),
        )
    }

    /// Validators registered for `kind`, in registration order.
    pub fn validators_for(
        &self,
        kind: ArtifactKind,
    ) -> Result<&[Arc<dyn ArtifactValidator>], ConfigError> {
        match self.validators.get(&kind) {
            Some(v) if !v.is_empty() => Ok(v.as_slice()),
            _ => Err(ConfigError::NoValidators { kind }),
        }
    }

    pub fn contains(&self, kind: ArtifactKind) -> bool {
        self.validators.get(&kind).is_some_and(|v| !v.is_empty())
    }

    pub fn kinds(&self) -> impl Iterator<Item = ArtifactKind> + '_ {
        self.validators.keys().copied()
    }

    /// Run every validator for the artifact's kind and merge the checks.
    ///
    /// No short-circuiting: a failing validator never suppresses later ones.
    pub fn validate(&self, artifact: &Artifact) -> Result<ValidationResult, ConfigError> {
        let validators = self.validators_for(artifact.kind)?;
        Ok(ValidationResult::merge(
            validators.iter().map(|v| v.validate(artifact)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationCheck;

    struct Fixed(&'static str, bool);

    impl ArtifactValidator for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn validate(&self, _artifact: &Artifact) -> ValidationResult {
            ValidationResult::from_checks(vec![ValidationCheck::from_bool(
                self.0, self.1, "fixed failure",
            )])
        }
    }

    #[test]
    fn unknown_kind_is_a_config_error() {
        let registry = ValidatorRegistry::new();
        let Err(err) = registry.validators_for(ArtifactKind::Script) else {
            panic!("expected NoValidators");
        };
        assert!(matches!(
            err,
            ConfigError::NoValidators {
                kind: ArtifactKind::Script
            }
        ));
    }

    #[test]
    fn all_validators_run_in_registration_order() {
        let registry = ValidatorRegistry::new()
            .register(ArtifactKind::Extraction, Arc::new(Fixed("structural", false)))
            .register(ArtifactKind::Extraction, Arc::new(Fixed("consistency", true)));
        let artifact = Artifact::new(ArtifactKind::Extraction, 1, serde_json::json!({}));
        let result = registry.validate(&artifact).expect("registered");
        let names: Vec<&str> = result.checks.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["structural", "consistency"]);
        assert!(!result.overall);
        assert!((result.score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn standard_registry_covers_every_kind() {
        let registry = ValidatorRegistry::standard().expect("default rules are valid");
        for kind in [
            ArtifactKind::Outline,
            ArtifactKind::Document,
            ArtifactKind::Script,
            ArtifactKind::Extraction,
        ] {
            assert!(registry.contains(kind), "missing {kind}");
        }
        assert_eq!(registry.kinds().count(), 4);
    }

    #[test]
    fn debug_lists_validator_names() {
        let registry = ValidatorRegistry::new()
            .register(ArtifactKind::Outline, Arc::new(Fixed("outline", true)));
        assert!(format!("{registry:?}").contains("outline"));
    }
}
