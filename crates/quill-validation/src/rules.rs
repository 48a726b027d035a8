//! Rule evaluation over parsed responses
//!
//! Pure functions: every rule is evaluated independently, failures never
//! short-circuit each other, and the aggregate result collects every
//! error with a matching corrective suggestion.

use quill_core::{ValidationResult, ValidationRule, ValueKind};
use regex::Regex;
use serde_json::Value;

/// Validate a parsed response against a rule set
pub fn validate(response: &Value, rules: &[ValidationRule]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut suggestions = Vec::new();

    for rule in rules {
        let value = get_field_value(response, &rule.field);

        // Required field check
        let missing = match value {
            None => true,
            Some(Value::Null) => true,
            Some(Value::String(s)) if s.is_empty() => true,
            Some(_) => false,
        };
        if rule.required && missing {
            errors.push(format!("Missing required field: {}", rule.field));
            suggestions.push(format!(
                "Please generate content for the \"{}\" field",
                rule.field
            ));
            continue;
        }

        // Optional fields that are absent or null skip the remaining checks
        let value = match value {
            Some(Value::Null) | None => continue,
            Some(v) => v,
        };

        // Type check
        if let Some(expected) = rule.expected {
            let actual = ValueKind::of(value);
            if actual != expected {
                errors.push(format!(
                    "Field \"{}\" should be of type {}, got {}",
                    rule.field, expected, actual
                ));
                suggestions.push(format!("Convert \"{}\" to {} type", rule.field, expected));
            }
        }

        // Length checks for strings and arrays
        let length = match value {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(a) => Some(a.len()),
            _ => None,
        };
        if let Some(length) = length {
            if let Some(min) = rule.min_length {
                if length < min {
                    errors.push(format!(
                        "Field \"{}\" is too short (minimum {} characters/items)",
                        rule.field, min
                    ));
                    suggestions.push(format!(
                        "Expand \"{}\" to at least {} characters/items",
                        rule.field, min
                    ));
                }
            }
            if let Some(max) = rule.max_length {
                if length > max {
                    errors.push(format!(
                        "Field \"{}\" is too long (maximum {} characters/items)",
                        rule.field, max
                    ));
                    suggestions.push(format!(
                        "Shorten \"{}\" to maximum {} characters/items",
                        rule.field, max
                    ));
                }
            }
        }

        // Pattern check for strings
        if let (Some(pattern), Value::String(s)) = (&rule.pattern, value) {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(s) {
                        errors.push(rule.error_message.clone().unwrap_or_else(|| {
                            format!("Field \"{}\" doesn't match required pattern", rule.field)
                        }));
                        suggestions.push(format!(
                            "Adjust \"{}\" to match the required format",
                            rule.field
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(field = %rule.field, error = %e, "invalid rule pattern");
                    errors.push(format!(
                        "Field \"{}\" has an invalid validation pattern",
                        rule.field
                    ));
                    suggestions.push(format!("Fix the pattern declared for \"{}\"", rule.field));
                }
            }
        }

        // Named predicate check
        if let Some(predicate) = &rule.predicate {
            if !predicate.check(value) {
                errors.push(rule.error_message.clone().unwrap_or_else(|| {
                    format!("Field \"{}\" failed custom validation", rule.field)
                }));
                suggestions.push(format!(
                    "Review and correct the content of \"{}\"",
                    rule.field
                ));
            }
        }
    }

    ValidationResult {
        is_valid: errors.is_empty(),
        errors,
        suggestions,
    }
}

/// Resolve a dot-path through nested objects
///
/// Any absent intermediate segment resolves the whole path to absent.
fn get_field_value<'a>(value: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = value;
    for part in field.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
