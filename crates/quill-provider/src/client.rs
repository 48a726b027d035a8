//! Chat-completions client for the Mistral API
//!
//! The client maps every failure mode into an unsuccessful
//! `ProviderResponse` rather than propagating transport errors; the
//! orchestrator's retry loop is the single place that decides what a
//! failure means.

use crate::auth;
use crate::contract::{ProviderResponse, TextGenerator};
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use async_trait::async_trait;
use quill_core::Result;

const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
const DEFAULT_MODEL: &str = "mistral-large-latest";
const DEFAULT_MAX_TOKENS: usize = 4000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Client for the Mistral chat-completions endpoint
#[derive(Debug, Clone)]
pub struct MistralClient {
    model: String,
    max_tokens: usize,
    temperature: f32,
    json_mode: bool,
    api_url: String,
}

impl MistralClient {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            json_mode: false,
            api_url: MISTRAL_API_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask the API for a JSON object response
    pub fn with_json_mode(mut self) -> Self {
        self.json_mode = true;
        self
    }

    /// Override the endpoint URL, for self-hosted gateways and tests
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

impl Default for MistralClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MistralClient {
    async fn send(&self, prompt: &str, system_prompt: &str) -> Result<ProviderResponse> {
        let api_key = auth::get_api_key()?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
            response_format: self.json_mode.then(ResponseFormat::json_object),
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "sending chat request");

        let client = reqwest::Client::new();
        let response = match client
            .post(&self.api_url)
            .bearer_auth(&api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed to send");
                return Ok(ProviderResponse::err(format!(
                    "Failed to send request: {}",
                    e
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown".to_string());
            tracing::warn!(%status, "chat API returned an error");
            return Ok(ProviderResponse::err(format!(
                "API error {}: {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(ProviderResponse::err(format!(
                    "Failed to parse response: {}",
                    e
                )))
            }
        };

        match chat_response.choices.into_iter().next() {
            Some(choice) if !choice.message.content.is_empty() => {
                tracing::debug!(
                    chars = choice.message.content.len(),
                    "chat response received"
                );
                Ok(ProviderResponse::ok(choice.message.content))
            }
            _ => Ok(ProviderResponse::err("No content in response")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = MistralClient::new()
            .with_model("mistral-small-latest")
            .with_max_tokens(8000)
            .with_temperature(0.3)
            .with_json_mode();

        assert_eq!(client.model, "mistral-small-latest");
        assert_eq!(client.max_tokens, 8000);
        assert!(client.json_mode);
    }

    #[tokio::test]
    async fn test_send_never_reports_false_success() {
        // Without a key this fails auth; with a stray key from the
        // environment the request itself fails. Neither may claim success.
        let client = MistralClient::new().with_api_url("http://127.0.0.1:9/unreachable");
        match client.send("test prompt", "system").await {
            Err(_) => {}
            Ok(response) => assert!(!response.success),
        }
    }
}
