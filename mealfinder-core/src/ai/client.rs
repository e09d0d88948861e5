//! AI client implementation using OpenRouter (OpenAI-compatible API).

use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat},
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

use super::config::AiConfig;
use super::types::{ChatRequest, ChatResponse, Usage};
use crate::http::RateLimiter;

/// Rate limiter key shared by every call to the backend.
const RATE_LIMIT_KEY: &str = "openrouter";

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("AI call timed out after {0:?}")]
    Timeout(Duration),

    #[error("AI call queue is longer than the {0:?} budget")]
    RateLimited(Duration),

    #[error("Configuration error: {0}")]
    Config(#[from] super::config::ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Trait for AI clients.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Complete a chat request. `prompt_name` labels the call in logs.
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError>;
}

/// OpenRouter client with shared request spacing and a hard per-call deadline.
pub struct OpenRouterClient {
    client: Client<OpenAIConfig>,
    config: AiConfig,
    limiter: RateLimiter,
}

impl OpenRouterClient {
    pub fn from_env() -> Result<Self, AiError> {
        Self::new(AiConfig::from_env()?)
    }

    pub fn new(config: AiConfig) -> Result<Self, AiError> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        // async-openai retries 429s; keep those retries inside the deadline.
        let backoff = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(config.timeout))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            limiter: RateLimiter::new(Duration::from_millis(config.rate_limit_ms)),
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn send(&self, prompt_name: &str, request: ChatRequest) -> Result<ChatResponse, AiError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(request.prompt)
            .build()
            .map_err(|e| AiError::Api(format!("Failed to build user message: {}", e)))?;

        let mut req_builder = CreateChatCompletionRequestArgs::default();
        req_builder
            .model(&self.config.model)
            .messages(vec![message.into()]);

        if let Some(max_tokens) = request.max_tokens {
            req_builder.max_completion_tokens(max_tokens);
        }

        if let Some(temperature) = request.temperature {
            req_builder.temperature(temperature);
        }

        if request.json_response {
            req_builder.response_format(ResponseFormat::JsonObject);
        }

        let openai_request = req_builder
            .build()
            .map_err(|e| AiError::Api(e.to_string()))?;

        tracing::debug!(
            prompt_name = prompt_name,
            model = &self.config.model,
            "Calling AI API"
        );

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(|e| AiError::Api(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        tracing::debug!(
            prompt_name = prompt_name,
            total_tokens = usage.total_tokens,
            "AI API call finished"
        );

        Ok(ChatResponse { content, usage })
    }
}

#[async_trait]
impl AiClient for OpenRouterClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        let budget = self.config.timeout;
        let deadline = Instant::now() + budget;

        if !self.limiter.wait_within(RATE_LIMIT_KEY, budget).await {
            tracing::warn!(prompt_name, "AI call queue over budget, skipping");
            return Err(AiError::RateLimited(budget));
        }

        match tokio::time::timeout_at(deadline, self.send(prompt_name, request)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(prompt_name, timeout = ?budget, "AI call timed out");
                Err(AiError::Timeout(budget))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// A backend that accepts connections and never answers.
    async fn silent_backend() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{}/api/v1", addr)
    }

    fn config(base_url: String, timeout: Duration) -> AiConfig {
        AiConfig {
            base_url,
            rate_limit_ms: 0,
            timeout,
            ..AiConfig::new("test-key")
        }
    }

    #[tokio::test]
    async fn test_stalled_backend_fails_within_timeout() {
        let base_url = silent_backend().await;
        let client =
            OpenRouterClient::new(config(base_url, Duration::from_millis(200))).unwrap();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.complete("keyword_expansion", ChatRequest::new("닭고기")),
        )
        .await
        .expect("complete() must return before the outer guard");

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_past_timeout_is_rate_limited() {
        let config = AiConfig {
            rate_limit_ms: 1_000,
            timeout: Duration::from_millis(1_500),
            ..AiConfig::new("test-key")
        };
        let client = std::sync::Arc::new(OpenRouterClient::new(config).unwrap());

        // Three queued callers hold the 0 s, 1 s and 2 s slots.
        for _ in 0..3 {
            let client = client.clone();
            tokio::spawn(async move { client.limiter.wait(RATE_LIMIT_KEY).await });
        }
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        let err = client
            .complete("translate", ChatRequest::new("Chicken"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::RateLimited(_)));
    }
}
