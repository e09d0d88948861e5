//! LLM backend for keyword expansion and translation, via OpenRouter.
//!
//! # Configuration
//!
//! - `OPENROUTER_API_KEY` (required): OpenRouter API key
//! - `MEALFINDER_AI_MODEL` (optional): model name, e.g. "openai/gpt-4o-mini"
//! - `MEALFINDER_AI_BASE_URL` (optional): API base URL
//! - `MEALFINDER_AI_RATE_LIMIT_MS` (optional): delay between requests in ms
//! - `MEALFINDER_AI_TIMEOUT_SECS` (optional): hard bound on one call in seconds
//!
//! When the key is missing the callers inject the identity expander and the
//! passthrough translator instead of an AI-backed one.

mod client;
mod config;
mod fake;
pub mod prompts;
mod types;

pub use client::{AiClient, AiError, OpenRouterClient};
pub use config::{AiConfig, ConfigError};
pub use fake::FakeAiClient;
pub use types::{ChatRequest, ChatResponse, Usage};
