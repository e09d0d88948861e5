//! Keyword expansion: one query term to a primary search term plus a few
//! related alternatives.
//!
//! Expansion never fails. Any backend problem yields the identity expansion,
//! and the pipeline only relies on `primary` being non-empty when the input
//! was.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai::prompts::{render_keyword_expansion_prompt, KEYWORD_EXPANSION_PROMPT_NAME};
use crate::ai::{AiClient, AiError, ChatRequest};
use crate::cache::{MemoCache, DEFAULT_CAPACITY};
use crate::types::QueryKind;

/// Upper bound on alternatives kept from a backend answer.
pub const MAX_ALTERNATIVES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    pub original: String,
    pub primary: String,
    pub alternatives: Vec<String>,
}

impl Expansion {
    pub fn identity(term: &str) -> Self {
        Self {
            original: term.to_string(),
            primary: term.trim().to_string(),
            alternatives: Vec::new(),
        }
    }

    /// Search keywords in evaluation order: primary first, then alternatives.
    /// Blank entries and case-insensitive repeats are dropped.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for candidate in std::iter::once(&self.primary).chain(self.alternatives.iter()) {
            let candidate = candidate.trim();
            if candidate.is_empty()
                || keywords.iter().any(|k| k.eq_ignore_ascii_case(candidate))
            {
                continue;
            }
            keywords.push(candidate.to_string());
        }
        keywords
    }
}

#[async_trait]
pub trait KeywordExpander: Send + Sync {
    async fn expand(&self, term: &str, kind: QueryKind) -> Expansion;
}

/// Expander used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityExpander;

#[async_trait]
impl KeywordExpander for IdentityExpander {
    async fn expand(&self, term: &str, _kind: QueryKind) -> Expansion {
        Expansion::identity(term)
    }
}

/// True when `term` has letters outside the Latin script, i.e. it cannot be
/// sent to the English-only provider as is.
pub fn needs_translation(term: &str) -> bool {
    term.chars()
        .any(|c| c.is_alphabetic() && !is_latin_letter(c))
}

fn is_latin_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(c, '\u{00C0}'..='\u{024F}' | '\u{1E00}'..='\u{1EFF}')
}

/// Response format from the AI.
#[derive(Debug, Deserialize)]
struct ExpansionResponse {
    primary: String,
    #[serde(default)]
    alternatives: Vec<String>,
}

/// LLM-backed expander, memoized per `(kind, term)`.
pub struct LlmKeywordExpander {
    ai_client: Arc<dyn AiClient>,
    cache: MemoCache<(QueryKind, String), Expansion>,
}

impl LlmKeywordExpander {
    pub fn new(ai_client: Arc<dyn AiClient>) -> Self {
        Self::with_cache_capacity(ai_client, DEFAULT_CAPACITY)
    }

    /// Keep at most `max_entries` expansions.
    pub fn with_cache_capacity(ai_client: Arc<dyn AiClient>, max_entries: u64) -> Self {
        Self {
            ai_client,
            cache: MemoCache::with_capacity(max_entries),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    async fn ask_backend(&self, term: &str, kind: QueryKind) -> Result<Expansion, AiError> {
        let request = ChatRequest::new(render_keyword_expansion_prompt(term, kind))
            .json()
            .max_tokens(200)
            .temperature(0.2);

        let response = self
            .ai_client
            .complete(KEYWORD_EXPANSION_PROMPT_NAME, request)
            .await?;

        let parsed: ExpansionResponse = serde_json::from_str(strip_code_fence(&response.content))
            .map_err(|e| AiError::ParseError(format!("Failed to parse expansion: {}", e)))?;

        let primary = parsed.primary.trim().to_string();
        if primary.is_empty() {
            return Err(AiError::ParseError("Expansion has empty primary".to_string()));
        }

        let mut alternatives: Vec<String> = Vec::new();
        for alternative in parsed.alternatives {
            let alternative = alternative.trim();
            if alternative.is_empty()
                || alternative.eq_ignore_ascii_case(&primary)
                || alternatives.iter().any(|a| a.eq_ignore_ascii_case(alternative))
            {
                continue;
            }
            alternatives.push(alternative.to_string());
            if alternatives.len() == MAX_ALTERNATIVES {
                break;
            }
        }

        Ok(Expansion {
            original: term.to_string(),
            primary,
            alternatives,
        })
    }
}

#[async_trait]
impl KeywordExpander for LlmKeywordExpander {
    async fn expand(&self, term: &str, kind: QueryKind) -> Expansion {
        let trimmed = term.trim();
        if trimmed.is_empty() || !needs_translation(trimmed) {
            return Expansion::identity(term);
        }

        let key = (kind, trimmed.to_string());
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(term = trimmed, kind = %kind, "keyword expansion cache hit");
            return cached;
        }

        match self.ask_backend(trimmed, kind).await {
            Ok(expansion) => {
                tracing::debug!(
                    term = trimmed,
                    kind = %kind,
                    primary = %expansion.primary,
                    alternatives = ?expansion.alternatives,
                    "keyword expansion"
                );
                self.cache.insert(key, expansion.clone());
                expansion
            }
            Err(e) => {
                tracing::warn!(term = trimmed, kind = %kind, error = %e, "keyword expansion failed, using term as is");
                Expansion::identity(term)
            }
        }
    }
}

/// Models sometimes wrap JSON in a markdown fence despite instructions.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;

    fn llm_expander(fake: FakeAiClient) -> (LlmKeywordExpander, Arc<FakeAiClient>) {
        let fake = Arc::new(fake);
        (LlmKeywordExpander::new(fake.clone()), fake)
    }

    #[test]
    fn test_keywords_dedupe_and_skip_blanks() {
        let expansion = Expansion {
            original: "닭".to_string(),
            primary: "chicken".to_string(),
            alternatives: vec![
                "Chicken".to_string(),
                " ".to_string(),
                "chicken breast".to_string(),
            ],
        };
        assert_eq!(expansion.keywords(), vec!["chicken", "chicken breast"]);
    }

    #[test]
    fn test_script_detection() {
        assert!(!needs_translation("chicken"));
        assert!(!needs_translation("crème brûlée"));
        assert!(!needs_translation("7 spice"));
        assert!(needs_translation("닭고기"));
        assert!(needs_translation("寿司"));
        assert!(needs_translation("курица"));
    }

    #[tokio::test]
    async fn test_identity_expander_keeps_term() {
        let expansion = IdentityExpander.expand(" beef ", QueryKind::Ingredient).await;
        assert_eq!(expansion.primary, "beef");
        assert_eq!(expansion.original, " beef ");
        assert!(expansion.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_latin_terms_skip_the_backend() {
        let (expander, fake) = llm_expander(FakeAiClient::new());
        let expansion = expander.expand("chicken", QueryKind::Ingredient).await;
        assert_eq!(expansion, Expansion::identity("chicken"));
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_answer_is_cleaned_and_capped() {
        let (expander, _) = llm_expander(FakeAiClient::with_response(
            "닭고기",
            r#"```json
            {"primary": " chicken ", "alternatives": ["CHICKEN", "chicken breast", "", "chicken thighs", "chicken wings", "poultry"]}
            ```"#,
        ));

        let expansion = expander.expand("닭고기", QueryKind::Ingredient).await;

        assert_eq!(expansion.original, "닭고기");
        assert_eq!(expansion.primary, "chicken");
        assert!(expansion.alternatives.len() <= MAX_ALTERNATIVES);
        assert!(!expansion.alternatives.iter().any(|a| a.eq_ignore_ascii_case("chicken")));
        assert!(expansion.alternatives.iter().all(|a| !a.is_empty()));
    }

    #[tokio::test]
    async fn test_repeated_terms_hit_the_cache() {
        let (expander, fake) = llm_expander(FakeAiClient::with_response(
            "한식",
            r#"{"primary": "Korean", "alternatives": []}"#,
        ));

        expander.expand("한식", QueryKind::Cuisine).await;
        expander.expand("한식", QueryKind::Cuisine).await;

        assert_eq!(fake.call_count(), 1);
        assert_eq!(expander.cached_entries(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_is_identity() {
        let (expander, _) = llm_expander(FakeAiClient::new());
        let expansion = expander.expand("소고기", QueryKind::Ingredient).await;
        assert_eq!(expansion, Expansion::identity("소고기"));
        assert_eq!(expander.cached_entries(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_answer_is_identity() {
        let (expander, _) = llm_expander(FakeAiClient::new().with_default_response("beef, I think"));
        let expansion = expander.expand("소고기", QueryKind::Ingredient).await;
        assert_eq!(expansion.primary, "소고기");
        assert!(expansion.alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_cache_is_bounded_under_many_distinct_terms() {
        let fake = Arc::new(FakeAiClient::new().with_default_response(r#"{"primary": "chicken"}"#));
        let expander = LlmKeywordExpander::with_cache_capacity(fake.clone(), 10);

        for n in 0..50 {
            expander.expand(&format!("닭고기{}", n), QueryKind::Ingredient).await;
        }

        assert_eq!(fake.call_count(), 50);
        assert!(expander.cached_entries() <= 10);
    }

    #[test]
    fn test_strips_fences() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }
}
