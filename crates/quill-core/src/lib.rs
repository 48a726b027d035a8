//! # quill-core
//!
//! Core types for the Quill content-generation reliability engine.
//!
//! Quill drives an unreliable text-generation provider toward dependable
//! structured results: every call gets a retry budget, failed attempts are
//! recorded, noisy output is recovered by a multi-tier sanitizer, and
//! validation feedback steers the next attempt.
//!
//! This crate holds the types shared across the engine:
//!
//! - Requests, attempt records, and generation output
//! - Validation rules and results
//! - The unified error enum and retry configuration

mod config;
mod error;
mod types;

pub use config::GenerationConfig;
pub use error::{QuillError, Result};
pub use types::*;
