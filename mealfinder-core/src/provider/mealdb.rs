//! TheMealDB client.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::env;
use std::time::Duration;

use super::types::{RawDetail, RawSummary};
use super::RecipeProvider;
use crate::error::{FetchError, ProviderError};
use crate::http::{HttpClient, ReqwestClient};

/// Public v1 API with the shared test key.
pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Provider connection settings.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Minimum spacing between requests, 0 disables.
    pub rate_limit_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rate_limit_ms: 0,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// - `MEALFINDER_PROVIDER_BASE_URL`: API root (default: TheMealDB public v1)
    /// - `MEALFINDER_HTTP_TIMEOUT_SECS`: per-request timeout (default: 10)
    /// - `MEALFINDER_HTTP_RATE_LIMIT_MS`: spacing between requests (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("MEALFINDER_PROVIDER_BASE_URL").unwrap_or(defaults.base_url);

        let timeout = env::var("MEALFINDER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let rate_limit_ms = env::var("MEALFINDER_HTTP_RATE_LIMIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_ms);

        Self {
            base_url,
            timeout,
            rate_limit_ms,
        }
    }
}

/// `RecipeProvider` over TheMealDB's JSON API.
pub struct MealDbProvider<C: HttpClient = ReqwestClient> {
    client: C,
    base_url: String,
}

impl MealDbProvider<ReqwestClient> {
    pub fn from_config(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .rate_limit_ms(config.rate_limit_ms)
            .build()?;
        Ok(Self::new(client, &config.base_url))
    }
}

impl<C: HttpClient> MealDbProvider<C> {
    pub fn new(client: C, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn endpoint(&self, path: &str, param: Option<(&str, &str)>) -> Result<String, ProviderError> {
        let mut url = url::Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if let Some((key, value)) = param {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url.into())
    }

    /// Fetch a `{"meals": [...]}` envelope.
    ///
    /// A body that is not JSON is an error. `meals: null`, a missing key or
    /// a non-array value all mean "no results".
    async fn fetch_meals(&self, url: &str) -> Result<Vec<Map<String, Value>>, ProviderError> {
        let body = self.client.get_text(url).await?;

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| ProviderError::Malformed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let meals = match payload.get("meals") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect(),
            _ => Vec::new(),
        };

        tracing::debug!(url, count = meals.len(), "provider: meals received");
        Ok(meals)
    }

    async fn filter_summaries(
        &self,
        key: &str,
        term: &str,
    ) -> Result<Vec<RawSummary>, ProviderError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("filter.php", Some((key, term)))?;
        let meals = self.fetch_meals(&url).await?;
        Ok(meals.iter().filter_map(RawSummary::from_record).collect())
    }

    async fn first_detail(&self, url: &str) -> Result<Option<RawDetail>, ProviderError> {
        let meals = self.fetch_meals(url).await?;
        Ok(meals.iter().find_map(RawDetail::from_record))
    }
}

#[async_trait]
impl<C: HttpClient> RecipeProvider for MealDbProvider<C> {
    async fn filter_by_ingredient(
        &self,
        ingredient: &str,
    ) -> Result<Vec<RawSummary>, ProviderError> {
        self.filter_summaries("i", ingredient).await
    }

    async fn filter_by_category(&self, category: &str) -> Result<Vec<RawSummary>, ProviderError> {
        self.filter_summaries("c", category).await
    }

    async fn filter_by_area(&self, area: &str) -> Result<Vec<RawSummary>, ProviderError> {
        self.filter_summaries("a", area).await
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<RawDetail>, ProviderError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("search.php", Some(("s", name)))?;
        let meals = self.fetch_meals(&url).await?;
        Ok(meals.iter().filter_map(RawDetail::from_record).collect())
    }

    async fn lookup(&self, id: &str) -> Result<Option<RawDetail>, ProviderError> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let url = self.endpoint("lookup.php", Some(("i", id)))?;
        self.first_detail(&url).await
    }

    async fn random_one(&self) -> Result<Option<RawDetail>, ProviderError> {
        let url = self.endpoint("random.php", None)?;
        self.first_detail(&url).await
    }
}
