//! # quill-sanitizer
//!
//! Recovers structured data from noisy generated text.
//!
//! Four ordered tiers are attempted in sequence; the first to succeed
//! wins and its output is deep-sanitized unless the caller opts out:
//!
//! 1. **Direct**: parse the input exactly as given
//! 2. **Extracted**: strip code fences, pull out the top-level
//!    structure, repair common syntax defects
//! 3. **Lenient**: additionally quote bare keys and normalize quoting
//! 4. **Tolerant**: parse under a hand-rolled permissive grammar
//!    (bare keys, single quotes, trailing commas)
//!
//! Either exactly one tier succeeds or the pipeline fails with a
//! diagnostic carrying the last error and truncated input snippets.

mod deep;
mod sanitize;
mod tolerant;

pub use deep::{deep_sanitize, sanitize_text};
pub use sanitize::{sanitize_and_parse, sanitize_and_parse_with, SanitizationOutcome, Tier};
pub use tolerant::TolerantParseError;
