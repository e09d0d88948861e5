//! Fake AI client for tests.
//!
//! Responses are matched by checking whether the rendered prompt contains a
//! registered substring, so tests run without network access or API costs.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::client::{AiClient, AiError};
use super::types::{ChatRequest, ChatResponse, Usage};

#[derive(Debug, Default)]
pub struct FakeAiClient {
    /// (prompt substring, response) in registration order; first match wins.
    responses: RwLock<Vec<(String, String)>>,
    default_response: Option<String>,
    calls: AtomicUsize,
}

impl FakeAiClient {
    /// A client with no responses: every call fails.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let client = Self::new();
        client.add_response(prompt_contains, response);
        client
    }

    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        if let Ok(mut responses) = self.responses.write() {
            responses.push((prompt_contains.to_string(), response.to_string()));
        }
    }

    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }

    /// Number of completions requested so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiClient for FakeAiClient {
    async fn complete(
        &self,
        prompt_name: &str,
        request: ChatRequest,
    ) -> Result<ChatResponse, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let prompt = request.prompt.to_lowercase();
        let matched = self
            .responses
            .read()
            .ok()
            .and_then(|responses| {
                responses
                    .iter()
                    .find(|(pattern, _)| prompt.contains(&pattern.to_lowercase()))
                    .map(|(_, response)| response.clone())
            })
            .or_else(|| self.default_response.clone());

        match matched {
            Some(content) => Ok(ChatResponse {
                content,
                usage: Usage::default(),
            }),
            None => Err(AiError::Api(format!(
                "FakeAiClient: no response configured for {}",
                prompt_name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> ChatRequest {
        ChatRequest::new(text)
    }

    #[tokio::test]
    async fn test_matches_case_insensitively() {
        let client = FakeAiClient::with_response("HELLO", "world");
        let response = client.complete("test", request("hello there")).await.unwrap();
        assert_eq!(response.content, "world");
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_match_without_default_is_error() {
        let client = FakeAiClient::new();
        assert!(client.complete("test", request("anything")).await.is_err());
    }

    #[tokio::test]
    async fn test_falls_back_to_default() {
        let client = FakeAiClient::new().with_default_response("{}");
        let response = client.complete("test", request("anything")).await.unwrap();
        assert_eq!(response.content, "{}");
    }
}
