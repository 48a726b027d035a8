//! API key lookup for the chat-completions client

use quill_core::{QuillError, Result};
use std::env;

const API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Read the Mistral API key from the environment
///
/// Placeholder or obviously truncated keys are rejected up front so a
/// misconfigured deployment fails before its first generation attempt.
pub fn get_api_key() -> Result<String> {
    match env::var(API_KEY_ENV) {
        Ok(key) if key != "placeholder" && key.len() >= 10 => Ok(key),
        Ok(_) => Err(QuillError::Auth(format!(
            "{} is set but looks like a placeholder",
            API_KEY_ENV
        ))),
        Err(_) => Err(QuillError::Auth(format!(
            "No API key found. Set {}=... in the environment.",
            API_KEY_ENV
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to prevent concurrent env var modifications
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_var<F, R>(value: Option<&str>, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap();
        let original = env::var(API_KEY_ENV).ok();

        match value {
            Some(v) => env::set_var(API_KEY_ENV, v),
            None => env::remove_var(API_KEY_ENV),
        }

        let result = f();

        match original {
            Some(v) => env::set_var(API_KEY_ENV, v),
            None => env::remove_var(API_KEY_ENV),
        }

        result
    }

    #[test]
    fn test_valid_key() {
        with_env_var(Some("sk-test-key-1234567890"), || {
            assert_eq!(get_api_key().unwrap(), "sk-test-key-1234567890");
        });
    }

    #[test]
    fn test_placeholder_rejected() {
        with_env_var(Some("placeholder"), || {
            assert!(get_api_key().is_err());
        });
    }

    #[test]
    fn test_short_key_rejected() {
        with_env_var(Some("short"), || {
            assert!(get_api_key().is_err());
        });
    }

    #[test]
    fn test_missing_key() {
        with_env_var(None, || {
            assert!(get_api_key().is_err());
        });
    }
}
