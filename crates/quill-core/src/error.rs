//! Unified error types for Quill

use crate::types::AttemptRecord;
use thiserror::Error;

/// Unified error type for all Quill operations
#[derive(Error, Debug)]
pub enum QuillError {
    // Provider errors
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider returned no content")]
    EmptyContent,

    #[error("Authentication error: {0}")]
    Auth(String),

    // Sanitizer errors
    #[error("Failed to parse generated content: {last_error}")]
    Unparsable {
        last_error: String,
        original_snippet: String,
        cleaned_snippet: String,
    },

    // Validation errors
    #[error("Generated content failed validation: {}", .0.join("; "))]
    Validation(Vec<String>),

    // Orchestrator terminal errors
    #[error("Generation exhausted after {} attempts: {last_error}", .attempts.len())]
    Exhausted {
        attempts: Vec<AttemptRecord>,
        last_error: String,
    },

    #[error("Regeneration exhausted after {attempts} attempts: {last_error}")]
    RegenerationExhausted { attempts: u32, last_error: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using QuillError
pub type Result<T> = std::result::Result<T, QuillError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttemptRecord;

    #[test]
    fn test_exhausted_display_counts_attempts() {
        let err = QuillError::Exhausted {
            attempts: vec![
                AttemptRecord::failed(1, "timeout"),
                AttemptRecord::failed(2, "empty content"),
                AttemptRecord::failed(3, "empty content"),
            ],
            last_error: "empty content".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("empty content"));
    }

    #[test]
    fn test_validation_display_joins_errors() {
        let err = QuillError::Validation(vec![
            "Missing required field: name".to_string(),
            "Field \"title\" is too short".to_string(),
        ]);
        assert!(err.to_string().contains("Missing required field: name"));
    }
}
