//! Core type definitions for Quill generation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Runtime type tags for validation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl ValueKind {
    /// Determine the kind of a parsed value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::Null => Self::Null,
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Object => write!(f, "object"),
            Self::Array => write!(f, "array"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// Named predicates for custom rule checks
///
/// A closed set rather than arbitrary callbacks so that rules stay
/// serializable and carry no executable payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Value is an array
    IsArray,
    /// Value is an array with at least one element
    NonEmptyArray,
    /// Value is an object other than null
    NonNullObject,
    /// Value is an array with at least N elements
    MinItems(usize),
    /// Value is a string equal to one of the listed alternatives
    OneOf(Vec<String>),
}

impl Predicate {
    /// Evaluate the predicate against a resolved field value
    pub fn check(&self, value: &Value) -> bool {
        match self {
            Self::IsArray => value.is_array(),
            Self::NonEmptyArray => value.as_array().is_some_and(|a| !a.is_empty()),
            Self::NonNullObject => value.is_object(),
            Self::MinItems(n) => value.as_array().is_some_and(|a| a.len() >= *n),
            Self::OneOf(options) => value
                .as_str()
                .is_some_and(|s| options.iter().any(|o| o == s)),
        }
    }
}

/// Declarative constraint on one field of a parsed response
///
/// Authored once by a caller, immutable, reused across many requests.
/// Field names use dot notation to reach nested values
/// (e.g., `metadata.title`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Dot-path to the field being checked
    pub field: String,
    /// Whether the field must be present and non-empty
    #[serde(default)]
    pub required: bool,
    /// Expected runtime type, if any
    #[serde(default)]
    pub expected: Option<ValueKind>,
    /// Minimum length for strings, element count for arrays
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length for strings, element count for arrays
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Regex the value must match (strings only), compiled at validation time
    #[serde(default)]
    pub pattern: Option<String>,
    /// Named predicate check
    #[serde(default)]
    pub predicate: Option<Predicate>,
    /// Message used instead of the default for pattern/predicate failures
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ValidationRule {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            required: false,
            expected: None,
            min_length: None,
            max_length: None,
            pattern: None,
            predicate: None,
            error_message: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn expect(mut self, kind: ValueKind) -> Self {
        self.expected = Some(kind);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }
}

/// Outcome of validating a parsed response against a rule set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff no errors were produced
    pub is_valid: bool,
    /// One entry per failed check, in rule order
    pub errors: Vec<String>,
    /// One corrective suggestion per error, in the same order
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    /// Result with no errors
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

/// One generation request, exclusively owned by a single orchestrator call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Short identifier for log correlation
    pub id: String,
    /// Instruction sent to the provider
    pub prompt: String,
    /// Structured context merged into the prompt, if any
    #[serde(default)]
    pub context: Option<Value>,
    /// Whether the response must parse as structured data
    #[serde(default)]
    pub structured: bool,
    /// Retry budget
    pub max_attempts: u32,
    /// Rules the parsed response must satisfy, if validation is enabled
    #[serde(default)]
    pub rules: Option<Vec<ValidationRule>>,
    /// Whether to run validation against `rules`
    #[serde(default)]
    pub validate: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            id: format!("req-{}", &Uuid::new_v4().to_string()[..8]),
            prompt: prompt.into(),
            context: None,
            structured: false,
            max_attempts: 3,
            rules: None,
            validate: false,
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn structured(mut self) -> Self {
        self.structured = true;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_rules(mut self, rules: Vec<ValidationRule>) -> Self {
        self.rules = Some(rules);
        self.validate = true;
        self
    }
}

/// Record of one generation attempt within a request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt number
    pub attempt: u32,
    /// Failure reason, if the attempt failed
    pub reason: Option<String>,
    /// When the attempt resolved
    pub timestamp: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn failed(attempt: u32, reason: impl Into<String>) -> Self {
        Self {
            attempt,
            reason: Some(reason.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Result of a successful generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenerationOutput {
    /// Raw provider text, returned when structured output was not requested
    Text(String),
    /// Sanitized parsed value
    Structured(Value),
}

impl GenerationOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured(v) => Some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_of() {
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
    }

    #[test]
    fn test_predicate_checks() {
        assert!(Predicate::IsArray.check(&json!([1])));
        assert!(!Predicate::IsArray.check(&json!({})));

        assert!(Predicate::NonEmptyArray.check(&json!([1])));
        assert!(!Predicate::NonEmptyArray.check(&json!([])));

        assert!(Predicate::NonNullObject.check(&json!({"a": 1})));
        assert!(!Predicate::NonNullObject.check(&json!(null)));

        assert!(Predicate::MinItems(2).check(&json!([1, 2])));
        assert!(!Predicate::MinItems(2).check(&json!([1])));

        let one_of = Predicate::OneOf(vec!["hero".into(), "about".into()]);
        assert!(one_of.check(&json!("hero")));
        assert!(!one_of.check(&json!("footer")));
    }

    #[test]
    fn test_rule_builder() {
        let rule = ValidationRule::new("metadata.title")
            .required()
            .expect(ValueKind::String)
            .min_length(10)
            .max_length(150);

        assert_eq!(rule.field, "metadata.title");
        assert!(rule.required);
        assert_eq!(rule.expected, Some(ValueKind::String));
        assert_eq!(rule.min_length, Some(10));
        assert_eq!(rule.max_length, Some(150));
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("write a tagline");
        assert!(request.id.starts_with("req-"));
        assert_eq!(request.max_attempts, 3);
        assert!(!request.structured);
        assert!(!request.validate);
    }

    #[test]
    fn test_with_rules_enables_validation() {
        let request = GenerationRequest::new("describe the market")
            .with_rules(vec![ValidationRule::new("summary").required()]);
        assert!(request.validate);
        assert!(request.rules.is_some());
    }
}
