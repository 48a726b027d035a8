//! Generation retry loop
//!
//! One `generate` call drives up to `max_attempts` sequential provider
//! calls. Every per-attempt failure (provider error, empty content,
//! unparsable output, failed validation) is recorded and retried after
//! an exponential backoff; validation failures additionally rewrite the
//! prompt with feedback for the next attempt. Only the terminal
//! exhaustion error crosses this boundary.

use crate::prompt::enhance_prompt;
use quill_core::{
    AttemptRecord, GenerationConfig, GenerationOutput, GenerationRequest, QuillError, Result,
    ValidationResult,
};
use quill_provider::TextGenerator;
use quill_sanitizer::sanitize_and_parse;
use quill_validation::{build_feedback_prompt, validate};
use serde_json::Value;
use tracing::{debug, info, warn};

const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional content generator. Follow the instructions precisely \
     and produce complete, well-structured output.";

/// Drives generation attempts against a provider
pub struct Orchestrator<P: TextGenerator> {
    provider: P,
    config: GenerationConfig,
    system_prompt: String,
}

/// Why one attempt failed, kept local to the loop
struct AttemptFailure {
    reason: String,
    validation: Option<ValidationResult>,
}

impl AttemptFailure {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            validation: None,
        }
    }

    fn invalid(result: ValidationResult) -> Self {
        Self {
            reason: format!("Validation failed: {}", result.errors.join("; ")),
            validation: Some(result),
        }
    }
}

impl<P: TextGenerator> Orchestrator<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            config: GenerationConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Create a request seeded with this orchestrator's configured budget
    pub fn new_request(&self, prompt: impl Into<String>) -> GenerationRequest {
        GenerationRequest::new(prompt).with_max_attempts(self.config.max_attempts)
    }

    /// Run the retry loop for one request
    ///
    /// Returns the first successful result. If the budget is exhausted,
    /// fails with the last concrete failure and the full attempt history.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutput> {
        let enhanced = enhance_prompt(request);
        let mut prompt = enhanced.clone();
        let max_attempts = request.max_attempts.max(1);

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut last_error = String::from("generation failed");

        for attempt in 1..=max_attempts {
            info!(
                request = %request.id,
                attempt,
                max_attempts,
                "generation attempt"
            );

            match self.attempt(&prompt, request).await {
                Ok(output) => {
                    info!(request = %request.id, attempt, "generation succeeded");
                    return Ok(output);
                }
                Err(failure) => {
                    warn!(
                        request = %request.id,
                        attempt,
                        reason = %failure.reason,
                        "generation attempt failed"
                    );
                    last_error = failure.reason.clone();
                    attempts.push(AttemptRecord::failed(attempt, &failure.reason));

                    // Validation feedback rewrites the prompt for the
                    // next attempt; other failures retry as-is
                    if let Some(result) = failure.validation {
                        prompt =
                            build_feedback_prompt(&enhanced, &result, request.context.as_ref());
                    }

                    if attempt < max_attempts {
                        let delay = self.config.backoff_delay(attempt);
                        debug!(request = %request.id, ?delay, "backing off before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        warn!(request = %request.id, "generation budget exhausted");
        Err(QuillError::Exhausted {
            attempts,
            last_error,
        })
    }

    /// One provider call, piped through the sanitizer and validator
    async fn attempt(
        &self,
        prompt: &str,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationOutput, AttemptFailure> {
        let response = match self.provider.send(prompt, &self.system_prompt).await {
            Ok(response) => response,
            Err(e) => return Err(AttemptFailure::new(e.to_string())),
        };

        if !response.success {
            return Err(AttemptFailure::new(
                response
                    .error
                    .unwrap_or_else(|| "AI generation failed".to_string()),
            ));
        }

        let content = match response.content {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Err(AttemptFailure::new("No content generated")),
        };

        let output = if request.structured {
            match sanitize_and_parse(&content) {
                Ok(value) => GenerationOutput::Structured(value),
                Err(e) => return Err(AttemptFailure::new(e.to_string())),
            }
        } else {
            GenerationOutput::Text(content)
        };

        if request.validate {
            if let Some(rules) = &request.rules {
                let value = match &output {
                    GenerationOutput::Structured(value) => value.clone(),
                    GenerationOutput::Text(text) => Value::String(text.clone()),
                };
                let result = validate(&value, rules);
                if !result.is_valid {
                    return Err(AttemptFailure::invalid(result));
                }
            }
        }

        Ok(output)
    }
}
