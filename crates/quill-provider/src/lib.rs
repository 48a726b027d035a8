//! # quill-provider
//!
//! The text-generation backend contract used by the orchestrator, plus a
//! concrete chat-completions client for the Mistral API.
//!
//! The contract is deliberately minimal: one `send` operation returning
//! `{success, content, error}`. Everything about reliability (retries,
//! backoff, sanitization, validation) lives above this boundary.

mod auth;
mod client;
mod contract;
mod types;

pub use auth::get_api_key;
pub use client::MistralClient;
pub use contract::{ProviderResponse, TextGenerator};
pub use types::{ChatChoice, ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
