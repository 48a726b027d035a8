//! Configuration for generation retry behavior
//!
//! Covers the attempt budget, backoff timing, and regeneration defaults.
//! All values are caller-supplied; nothing is persisted by the engine.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;

/// Retry and backoff configuration for the orchestrator
///
/// Loaded from a TOML file when one is provided, otherwise defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Maximum generation attempts per request
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Maximum regeneration passes in `generate_with_regeneration`
    #[serde(default = "default_regeneration_attempts")]
    pub regeneration_attempts: u32,

    /// One backoff time unit in milliseconds; the delay before attempt
    /// N+1 is `2^N` units
    #[serde(default = "default_backoff_unit_ms")]
    pub backoff_unit_ms: u64,

    /// Flat delay between regeneration passes, in milliseconds
    #[serde(default = "default_regeneration_delay_ms")]
    pub regeneration_delay_ms: u64,
}

// Default value providers
fn default_max_attempts() -> u32 {
    3
}

fn default_regeneration_attempts() -> u32 {
    2
}

fn default_backoff_unit_ms() -> u64 {
    1000
}

fn default_regeneration_delay_ms() -> u64 {
    2000
}

impl GenerationConfig {
    /// Load configuration from a TOML file, or use defaults if it is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = toml::from_str(&content).map_err(|e| {
                crate::QuillError::Other(format!("Failed to parse config file: {}", e))
            })?;
            tracing::debug!(path = %path.display(), "loaded generation config");
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Exponential backoff delay inserted after a failed attempt
    ///
    /// Attempt-indexed: after attempt N fails, the caller waits `2^N`
    /// units before attempt N+1. No jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(2u64.saturating_pow(attempt) * self.backoff_unit_ms)
    }

    /// Flat delay between regeneration passes
    pub fn regeneration_delay(&self) -> Duration {
        Duration::from_millis(self.regeneration_delay_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            regeneration_attempts: default_regeneration_attempts(),
            backoff_unit_ms: default_backoff_unit_ms(),
            regeneration_delay_ms: default_regeneration_delay_ms(),
        }
    }
}
