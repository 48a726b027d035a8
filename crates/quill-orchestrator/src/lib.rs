//! # quill-orchestrator
//!
//! The retry loop that turns an unreliable text-generation provider
//! into a dependable source of structured results.
//!
//! A `generate` call runs sequential attempts against the provider,
//! pipes structured output through the sanitizer, checks it against the
//! request's validation rules, and folds validation feedback into the
//! next attempt's prompt. Failed attempts back off exponentially;
//! exhaustion surfaces one terminal error carrying the full attempt
//! history. `generate_with_regeneration` layers caller-side parsing with
//! its own flat-delay retry pass on top.
//!
//! Attempts within one call are strictly sequential (attempt N's prompt
//! can depend on attempt N-1's feedback); independent calls are safe to
//! run concurrently.

mod generator;
mod prompt;
mod regeneration;

pub use generator::Orchestrator;
pub use prompt::{append_retry_note, enhance_prompt};
