//! Corrective feedback handed to the generator on retry.

use crate::domain::ValidationResult;

/// Feedback for an attempt whose artifact failed validation.
///
/// Lists every failing applicable check in result order.
pub fn for_failed_checks(attempt: u32, result: &ValidationResult) -> String {
    let mut out = format!("Attempt {attempt} failed validation. Fix the following issues:");
    for check in result.failing_checks() {
        out.push_str("\n- ");
        out.push_str(&check.name);
        out.push_str(": ");
        out.push_str(check.message.as_deref().unwrap_or("check failed"));
    }
    out
}

/// Feedback for an attempt where the generator itself failed.
pub fn for_generation_error(attempt: u32, error: &dyn std::fmt::Display) -> String {
    format!("Attempt {attempt} failed to generate: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationCheck;

    #[test]
    fn lists_each_failing_check() {
        let result = ValidationResult::from_checks(vec![
            ValidationCheck::fail("section_count", "outline has 2 sections, at least 3 required"),
            ValidationCheck::pass("required_markers"),
            ValidationCheck::not_applicable("sum_consistency", "missing fields: c"),
            ValidationCheck {
                name: "bare".to_string(),
                passed: false,
                message: None,
                applicable: true,
            },
        ]);
        assert_eq!(
            for_failed_checks(1, &result),
            "Attempt 1 failed validation. Fix the following issues:\n\
             - section_count: outline has 2 sections, at least 3 required\n\
             - bare: check failed"
        );
    }

    #[test]
    fn generation_error_feedback() {
        assert_eq!(
            for_generation_error(2, &"model overloaded"),
            "Attempt 2 failed to generate: model overloaded"
        );
    }
}
