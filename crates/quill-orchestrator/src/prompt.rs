//! Prompt construction for generation attempts
//!
//! The enhanced prompt carries everything the model needs in one shot:
//! serialized context first, then the caller's instruction, then the
//! structured-output demand when the response must parse.

use quill_core::GenerationRequest;

/// Build the enhanced prompt for a request's first attempt
pub fn enhance_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::new();

    if let Some(context) = &request.context {
        let rendered =
            serde_json::to_string_pretty(context).unwrap_or_else(|_| context.to_string());
        prompt.push_str("Context:\n");
        prompt.push_str(&rendered);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&request.prompt);

    if request.structured {
        prompt.push_str(
            "\n\nIMPORTANT: Respond with valid JSON only. \
             No markdown, no explanations, just the JSON object.",
        );
    }

    prompt
}

/// Append the regeneration note reminding the model this is a retry
pub fn append_retry_note(prompt: &str, attempt: u32, last_error: &str) -> String {
    format!(
        "{}\n\nNote: This is retry attempt {}. The previous attempt failed: {}.\n\
         Respond with exactly the structure requested.",
        prompt, attempt, last_error
    )
}
