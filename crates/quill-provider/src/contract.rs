//! Provider contract required by the orchestrator
//!
//! A provider exposes one operation: send a prompt with a system prompt
//! and report success or failure in-band. Transport errors never cross
//! this boundary as panics or raw errors; they arrive as unsuccessful
//! responses the retry loop can act on.

use async_trait::async_trait;
use quill_core::Result;
use serde::{Deserialize, Serialize};

/// Outcome of one provider call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub success: bool,
    pub content: Option<String>,
    pub error: Option<String>,
}

impl ProviderResponse {
    /// Successful response carrying generated text
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// Failed response carrying the provider's error description
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }
}

/// A text-generation backend
///
/// Implementations are shared across concurrent `generate` calls and
/// must not hold per-request state.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and return the provider's response
    async fn send(&self, prompt: &str, system_prompt: &str) -> Result<ProviderResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_constructors() {
        let ok = ProviderResponse::ok("generated text");
        assert!(ok.success);
        assert_eq!(ok.content.as_deref(), Some("generated text"));
        assert!(ok.error.is_none());

        let err = ProviderResponse::err("rate limited");
        assert!(!err.success);
        assert!(err.content.is_none());
        assert_eq!(err.error.as_deref(), Some("rate limited"));
    }
}
