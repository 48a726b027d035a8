//! Regeneration wrapper for caller-parsed structured results
//!
//! Wraps `generate` with structured output forced, applies the caller's
//! parser, and retries the whole call when parsing fails or the value is
//! an empty shell. Retries wait a flat delay (distinct from the per-call
//! exponential backoff) and tell the model it is being retried.

use crate::generator::Orchestrator;
use crate::prompt::append_retry_note;
use quill_core::{GenerationOutput, GenerationRequest, QuillError, Result};
use quill_provider::TextGenerator;
use serde_json::{json, Value};
use tracing::{info, warn};

impl<P: TextGenerator> Orchestrator<P> {
    /// Generate structured output and parse it into a typed result
    ///
    /// Each regeneration pass annotates the request context with
    /// `attemptNumber` and `isRegeneration` and appends a retry note to
    /// the prompt, so the model knows its previous answer was rejected.
    pub async fn generate_with_regeneration<T, F>(
        &self,
        request: &GenerationRequest,
        parser: F,
        regeneration_attempts: u32,
    ) -> Result<T>
    where
        F: Fn(&Value) -> Result<T>,
    {
        let total = regeneration_attempts.max(1);
        let mut last_error = String::from("regeneration failed");

        for attempt in 1..=total {
            let mut attempt_request = request.clone();
            attempt_request.structured = true;

            if attempt > 1 {
                let mut context = match attempt_request.context.take() {
                    Some(Value::Object(map)) => map,
                    _ => serde_json::Map::new(),
                };
                context.insert("attemptNumber".to_string(), json!(attempt));
                context.insert("isRegeneration".to_string(), json!(true));
                attempt_request.context = Some(Value::Object(context));
                attempt_request.prompt =
                    append_retry_note(&request.prompt, attempt, &last_error);
            }

            info!(
                request = %request.id,
                attempt,
                total,
                "regeneration pass"
            );

            match self.run_pass(&attempt_request, &parser).await {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    warn!(
                        request = %request.id,
                        attempt,
                        error = %e,
                        "regeneration pass failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < total {
                tokio::time::sleep(self.config().regeneration_delay()).await;
            }
        }

        Err(QuillError::RegenerationExhausted {
            attempts: total,
            last_error,
        })
    }

    async fn run_pass<T, F>(&self, request: &GenerationRequest, parser: &F) -> Result<T>
    where
        F: Fn(&Value) -> Result<T>,
    {
        let output = self.generate(request).await?;

        let value = match output {
            GenerationOutput::Structured(value) => value,
            GenerationOutput::Text(text) => Value::String(text),
        };

        // An empty shell parses but carries nothing worth keeping
        let hollow = value.is_null() || value.as_object().is_some_and(|o| o.is_empty());
        if hollow {
            return Err(QuillError::Other(
                "Generated content is empty or invalid".to_string(),
            ));
        }

        parser(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::{fast_config, ScriptedProvider};
    use quill_provider::ProviderResponse;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_parser_success_on_first_pass() {
        let provider =
            ScriptedProvider::new(vec![ProviderResponse::ok(r#"{"name": "Acme"}"#)]);
        let prompts = provider.prompt_log();
        let orchestrator = Orchestrator::new(provider).with_config(fast_config());

        let request = GenerationRequest::new("Describe the business");
        let name: String = orchestrator
            .generate_with_regeneration(
                &request,
                |value| {
                    value["name"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| QuillError::Other("missing name".to_string()))
                },
                2,
            )
            .await
            .unwrap();

        assert_eq!(name, "Acme");
        assert_eq!(prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_parser_failure_triggers_annotated_retry() {
        let provider = ScriptedProvider::new(vec![
            ProviderResponse::ok(r#"{"wrong": true}"#),
            ProviderResponse::ok(r#"{"name": "Acme"}"#),
        ]);
        let prompts = provider.prompt_log();
        let orchestrator = Orchestrator::new(provider).with_config(fast_config());

        let request = GenerationRequest::new("Describe the business");
        let calls = AtomicU32::new(0);

        let name: String = orchestrator
            .generate_with_regeneration(
                &request,
                |value| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    value["name"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| QuillError::Other("missing name".to_string()))
                },
                2,
            )
            .await
            .unwrap();

        assert_eq!(name, "Acme");
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The second pass carried the regeneration context and retry note
        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("\"attemptNumber\": 2"));
        assert!(prompts[1].contains("\"isRegeneration\": true"));
        assert!(prompts[1].contains("retry attempt 2"));
        assert!(prompts[1].contains("missing name"));
    }

    #[tokio::test]
    async fn test_empty_object_is_a_regeneration_failure() {
        let provider = ScriptedProvider::new(vec![
            ProviderResponse::ok("{}"),
            ProviderResponse::ok(r#"{"name": "Acme"}"#),
        ]);
        let prompts = provider.prompt_log();
        let orchestrator = Orchestrator::new(provider).with_config(fast_config());

        let request = GenerationRequest::new("Describe the business");
        let name: String = orchestrator
            .generate_with_regeneration(
                &request,
                |value| {
                    value["name"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| QuillError::Other("missing name".to_string()))
                },
                2,
            )
            .await
            .unwrap();

        assert_eq!(name, "Acme");
        assert_eq!(prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_names_last_error() {
        let provider = ScriptedProvider::new(vec![
            ProviderResponse::ok(r#"{"wrong": 1}"#),
            ProviderResponse::ok(r#"{"wrong": 2}"#),
        ]);
        let orchestrator = Orchestrator::new(provider).with_config(fast_config());

        let request = GenerationRequest::new("Describe the business");
        let err = orchestrator
            .generate_with_regeneration::<String, _>(
                &request,
                |_| Err(QuillError::Other("parser rejected payload".to_string())),
                2,
            )
            .await
            .unwrap_err();

        match err {
            QuillError::RegenerationExhausted {
                attempts,
                last_error,
            } => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("parser rejected payload"));
            }
            other => panic!("expected RegenerationExhausted, got {:?}", other),
        }
    }
}
