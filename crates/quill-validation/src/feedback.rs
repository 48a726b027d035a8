//! Feedback-augmented prompt construction
//!
//! Turns a failed validation into a revised instruction: the original
//! prompt, the enumerated errors, the enumerated corrections, and the
//! serialized context, with an explicit demand that the next generation
//! fix every listed error.

use quill_core::ValidationResult;
use serde_json::Value;

/// Build the prompt for a retry after a validation failure
///
/// Returns the original prompt unchanged when the result is valid.
pub fn build_feedback_prompt(
    original_prompt: &str,
    result: &ValidationResult,
    context: Option<&Value>,
) -> String {
    if result.is_valid {
        return original_prompt.to_string();
    }

    let mut prompt = String::new();
    prompt.push_str(original_prompt);
    prompt.push_str("\n\nVALIDATION ERRORS DETECTED:\n");
    for (i, error) in result.errors.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, error));
    }

    prompt.push_str("\nREQUIRED CORRECTIONS:\n");
    for (i, suggestion) in result.suggestions.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, suggestion));
    }

    prompt.push_str(
        "\nPlease regenerate the response ensuring ALL validation errors are fixed.\n\
         The response must include all required fields with appropriate content.\n",
    );

    if let Some(context) = context {
        let rendered =
            serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
        prompt.push_str(&format!("Context provided: {}\n", rendered));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_result_returns_prompt_unchanged() {
        let result = ValidationResult::valid();
        let prompt = build_feedback_prompt("Write a hero section", &result, None);
        assert_eq!(prompt, "Write a hero section");
    }

    #[test]
    fn test_errors_and_suggestions_enumerated() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec![
                "Missing required field: headline".to_string(),
                "Field \"cta\" is too long (maximum 50 characters/items)".to_string(),
            ],
            suggestions: vec![
                "Please generate content for the \"headline\" field".to_string(),
                "Shorten \"cta\" to maximum 50 characters/items".to_string(),
            ],
        };

        let prompt = build_feedback_prompt("Write a hero section", &result, None);

        assert!(prompt.starts_with("Write a hero section"));
        assert!(prompt.contains("VALIDATION ERRORS DETECTED:"));
        assert!(prompt.contains("1. Missing required field: headline"));
        assert!(prompt.contains("2. Field \"cta\" is too long"));
        assert!(prompt.contains("REQUIRED CORRECTIONS:"));
        assert!(prompt.contains("2. Shorten \"cta\""));
        assert!(prompt.contains("ALL validation errors are fixed"));
    }

    #[test]
    fn test_context_serialized_into_prompt() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec!["Missing required field: name".to_string()],
            suggestions: vec!["Please generate content for the \"name\" field".to_string()],
        };
        let context = json!({"business": "bakery", "tone": "warm"});

        let prompt = build_feedback_prompt("Describe the business", &result, Some(&context));
        assert!(prompt.contains("Context provided:"));
        assert!(prompt.contains("\"business\": \"bakery\""));
    }
}
