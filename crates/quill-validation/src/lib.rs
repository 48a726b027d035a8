//! # quill-validation
//!
//! Declarative validation of generated responses.
//!
//! Rules are dot-path constraints (required, type, length, pattern,
//! named predicate) evaluated independently over a parsed value; the
//! result aggregates every error with a matching corrective suggestion.
//! A failed result can be folded back into the prompt for the next
//! attempt via [`build_feedback_prompt`].

mod feedback;
mod rules;

pub use feedback::build_feedback_prompt;
pub use rules::validate;
