//! AI configuration from environment variables.

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default OpenRouter base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default spacing between calls in milliseconds.
pub const DEFAULT_RATE_LIMIT_MS: u64 = 100;

/// Default upper bound for one completion, queueing and retries included.
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Minimum spacing between calls across all requests.
    pub rate_limit_ms: u64,
    /// Hard bound on a single completion. Covers waiting for a rate-limit
    /// slot, the HTTP exchange and any retries.
    pub timeout: Duration,
}

impl AiConfig {
    /// Defaults for everything except the key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `OPENROUTER_API_KEY`
    ///
    /// Optional:
    /// - `MEALFINDER_AI_MODEL` (default: "openai/gpt-4o-mini")
    /// - `MEALFINDER_AI_BASE_URL` (default: "https://openrouter.ai/api/v1")
    /// - `MEALFINDER_AI_RATE_LIMIT_MS` (default: 100)
    /// - `MEALFINDER_AI_TIMEOUT_SECS` (default: 8)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let mut config = Self::new(api_key);

        if let Ok(model) = env::var("MEALFINDER_AI_MODEL") {
            config.model = model;
        }
        if let Ok(base_url) = env::var("MEALFINDER_AI_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(ms) = parse_var("MEALFINDER_AI_RATE_LIMIT_MS") {
            config.rate_limit_ms = ms;
        }
        if let Some(secs) = parse_var("MEALFINDER_AI_TIMEOUT_SECS").filter(|secs| *secs > 0) {
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
