//! HTTP client trait and implementations.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::FetchError;

use super::rate_limiter::RateLimiter;

const USER_AGENT: &str = concat!("mealfinder/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP clients, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET a URL and return the body as text. Non-2xx statuses are errors.
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Configuration for ReqwestClient.
#[derive(Clone)]
pub struct ReqwestClientBuilder {
    rate_limit_ms: u64,
    timeout: Duration,
}

impl Default for ReqwestClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestClientBuilder {
    /// Defaults: 10 second timeout, no rate limiting.
    pub fn new() -> Self {
        Self {
            rate_limit_ms: 0,
            timeout: Duration::from_secs(10),
        }
    }

    /// Minimum delay between requests to the same host. 0 disables rate limiting.
    pub fn rate_limit_ms(mut self, ms: u64) -> Self {
        self.rate_limit_ms = ms;
        self
    }

    /// Upper bound for a single request, connect through body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<ReqwestClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(ReqwestClient {
            inner: Arc::new(inner),
            rate_limiter: RateLimiter::new(Duration::from_millis(self.rate_limit_ms)),
        })
    }
}

/// Production HTTP client: pooled reqwest connections with per-host spacing.
pub struct ReqwestClient {
    inner: Arc<reqwest::Client>,
    rate_limiter: RateLimiter,
}

impl ReqwestClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        ReqwestClientBuilder::new().build()
    }

    pub fn builder() -> ReqwestClientBuilder {
        ReqwestClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        if let Some(host) = parsed.host_str() {
            self.rate_limiter.wait(host).await;
        }

        tracing::debug!(url, "network: fetching");
        let response = self.inner.get(parsed).send().await?;
        let status = response.status();

        if !status.is_success() {
            tracing::debug!(url, status = %status, "network: request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        tracing::debug!(url, bytes = body.len(), "network: fetched successfully");
        Ok(body)
    }
}

/// Mock response for testing.
#[derive(Clone)]
pub enum MockResponse {
    Body(String),
    Status(u16),
    Error(String),
}

/// Mock HTTP client for testing. Records every URL it is asked for.
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_response(mut self, url: &str, response: MockResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn with_body(self, url: &str, body: &str) -> Self {
        self.with_response(url, MockResponse::Body(body.to_string()))
    }

    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, MockResponse::Status(status))
    }

    pub fn with_error(self, url: &str, error: &str) -> Self {
        self.with_response(url, MockResponse::Error(error.to_string()))
    }

    /// URLs requested so far, in call order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut urls) = self.requests.lock() {
            urls.push(url.to_string());
        }

        match self.responses.get(url) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Some(MockResponse::Error(e)) => Err(FetchError::Transport(e.clone())),
            None => Err(FetchError::Transport(format!(
                "No mock response for URL: {}",
                url
            ))),
        }
    }
}
