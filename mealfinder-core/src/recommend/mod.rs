//! Recipe resolution pipeline.
//!
//! Turns a loose query into a bounded, deduplicated list of normalized
//! recipes. The fallback chain is an explicit state machine:
//!
//! ```text
//! select ─┬─ filter given ─> search ─┬─ candidates ─> fetch_details ─┬─ details ─> normalize
//!         │                          └─ none ──────> search_by_name ─┼─ hits ────> normalize
//!         └─ no filter ──────────────────────────────────────────────┴─ none ────> random_final ─> normalize
//! ```
//!
//! A failure in any stage before `random_final` is logged and turned into a
//! jump to `random_final`. Only a failure of `random_final` itself reaches the
//! caller. Dropping the returned future aborts every in-flight request.

mod query;

pub use query::{ResolutionQuery, ValidatedQuery, DEFAULT_LIMIT, MAX_LIMIT};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{info_span, Instrument};

use crate::ai::{AiClient, OpenRouterClient};
use crate::error::{FetchError, ProviderError, RecommendError};
use crate::expansion::{IdentityExpander, KeywordExpander, LlmKeywordExpander};
use crate::normalize::normalize;
use crate::provider::{MealDbProvider, ProviderConfig, RawDetail, RawSummary, RecipeProvider};
use crate::translation::{
    localize_recipes, Language, LlmTranslator, PassthroughTranslator, Translator,
};
use crate::types::{NormalizedRecipe, QueryKind, ResolutionResult, ResolutionStrategy};

/// Pipeline stage names, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    SearchByName,
    FetchDetails,
    RandomFinal,
    Normalize,
    Lookup,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::SearchByName => "search_by_name",
            Stage::FetchDetails => "fetch_details",
            Stage::RandomFinal => "random_final",
            Stage::Normalize => "normalize",
            Stage::Lookup => "lookup",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline state with the data each stage needs.
enum Step {
    Search { kind: QueryKind, term: String },
    SearchByName { term: String },
    FetchDetails { candidates: Vec<RawSummary> },
    RandomFinal,
    Normalize {
        raw: Vec<RawDetail>,
        strategy: ResolutionStrategy,
    },
}

impl Step {
    fn stage(&self) -> Stage {
        match self {
            Step::Search { .. } => Stage::Search,
            Step::SearchByName { .. } => Stage::SearchByName,
            Step::FetchDetails { .. } => Stage::FetchDetails,
            Step::RandomFinal => Stage::RandomFinal,
            Step::Normalize { .. } => Stage::Normalize,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommenderConfig {
    /// Calls to the single-random endpoint allowed per request.
    pub random_attempts: usize,
    /// Unique random recipes wanted, before applying the caller's limit.
    pub random_target_cap: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            random_attempts: 20,
            random_target_cap: 10,
        }
    }
}

pub struct RecommenderBuilder {
    provider: Arc<dyn RecipeProvider>,
    expander: Arc<dyn KeywordExpander>,
    translator: Arc<dyn Translator>,
    config: RecommenderConfig,
}

impl RecommenderBuilder {
    pub fn expander(mut self, expander: Arc<dyn KeywordExpander>) -> Self {
        self.expander = expander;
        self
    }

    pub fn translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn config(mut self, config: RecommenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Recommender {
        Recommender {
            provider: self.provider,
            expander: self.expander,
            translator: self.translator,
            config: self.config,
        }
    }
}

/// Entry point shared by the HTTP handlers and the CLI.
pub struct Recommender {
    provider: Arc<dyn RecipeProvider>,
    expander: Arc<dyn KeywordExpander>,
    translator: Arc<dyn Translator>,
    config: RecommenderConfig,
}

impl Recommender {
    /// Start building with identity expansion and no translation.
    pub fn builder(provider: Arc<dyn RecipeProvider>) -> RecommenderBuilder {
        RecommenderBuilder {
            provider,
            expander: Arc::new(IdentityExpander),
            translator: Arc::new(PassthroughTranslator),
            config: RecommenderConfig::default(),
        }
    }

    /// Wire the production services from environment variables.
    ///
    /// The provider always comes from `ProviderConfig::from_env`. Keyword
    /// expansion and translation are AI-backed only when `use_ai` is set and
    /// an OpenRouter key is configured; otherwise they are identity and
    /// passthrough.
    pub fn from_env(use_ai: bool) -> Result<Self, reqwest::Error> {
        let provider = MealDbProvider::from_config(&ProviderConfig::from_env())?;
        let builder = Self::builder(Arc::new(provider));

        if !use_ai {
            tracing::info!("AI services disabled, using identity expansion and no translation");
            return Ok(builder.build());
        }

        match OpenRouterClient::from_env() {
            Ok(client) => {
                tracing::info!(model = client.model(), "AI keyword expansion and translation enabled");
                let ai: Arc<dyn AiClient> = Arc::new(client);
                Ok(builder
                    .expander(Arc::new(LlmKeywordExpander::new(Arc::clone(&ai))))
                    .translator(Arc::new(LlmTranslator::new(ai)))
                    .build())
            }
            Err(e) => {
                tracing::info!(reason = %e, "AI services not configured, using identity expansion and no translation");
                Ok(builder.build())
            }
        }
    }

    pub fn source_name(&self) -> &'static str {
        self.provider.source_name()
    }

    /// Validate `query` and resolve it to recipes.
    pub async fn recommend(
        &self,
        query: &ResolutionQuery,
    ) -> Result<ResolutionResult, RecommendError> {
        let validated = query.validate()?;
        let span = info_span!(
            "recommend",
            kind = validated.selection.as_ref().map(|(kind, _)| kind.as_str()),
            limit = validated.limit,
            language = %validated.language,
        );
        self.resolve(&validated).instrument(span).await
    }

    /// Run the fallback chain for an already validated query.
    pub async fn resolve(
        &self,
        query: &ValidatedQuery,
    ) -> Result<ResolutionResult, RecommendError> {
        let limit = query.limit;
        let mut step = match &query.selection {
            Some((kind, term)) => Step::Search {
                kind: *kind,
                term: term.clone(),
            },
            None => Step::RandomFinal,
        };

        loop {
            let stage = step.stage();
            let outcome = match step {
                Step::Search { kind, term } => self.search(kind, &term, limit).await,
                Step::SearchByName { term } => self.search_by_name(&term, limit).await,
                Step::FetchDetails { candidates } => self.fetch_details(candidates, limit).await,
                Step::RandomFinal => {
                    let raw = self.random_batch(limit).await.map_err(|source| {
                        tracing::error!(error = %source, "random fallback failed");
                        RecommendError::ProviderUnavailable {
                            stage: Stage::RandomFinal.as_str(),
                            source,
                        }
                    })?;
                    Ok(Step::Normalize {
                        raw,
                        strategy: ResolutionStrategy::Random,
                    })
                }
                Step::Normalize { raw, strategy } => {
                    return Ok(self.finish(raw, strategy, query).await);
                }
            };

            step = outcome.unwrap_or_else(|e| {
                tracing::warn!(stage = %stage, error = %e, "stage failed, degrading to random recommendations");
                Step::RandomFinal
            });
            tracing::debug!(from = %stage, to = %step.stage(), "pipeline transition");
        }
    }

    /// Full normalized detail for one recipe id.
    pub async fn lookup(
        &self,
        id: &str,
        language: &Language,
    ) -> Result<Option<NormalizedRecipe>, RecommendError> {
        let raw = self
            .provider
            .lookup(id)
            .await
            .map_err(|source| RecommendError::ProviderUnavailable {
                stage: Stage::Lookup.as_str(),
                source,
            })?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        let recipes =
            localize_recipes(Arc::clone(&self.translator), vec![normalize(&raw)], language).await;
        Ok(recipes.into_iter().next())
    }

    /// Query the provider once per expanded keyword, merging by id in
    /// first-seen order, until at least `limit` candidates exist.
    async fn search(
        &self,
        kind: QueryKind,
        term: &str,
        limit: usize,
    ) -> Result<Step, ProviderError> {
        let expansion = self.expander.expand(term, kind).await;
        let keywords = expansion.keywords();

        let mut seen: HashSet<String> = HashSet::new();
        let mut candidates: Vec<RawSummary> = Vec::new();

        for keyword in &keywords {
            let results = self.provider.filter(kind, keyword).await?;
            tracing::debug!(kind = %kind, keyword = %keyword, hits = results.len(), "filter");

            for summary in results {
                if seen.insert(summary.id.clone()) {
                    candidates.push(summary);
                }
            }
            if candidates.len() >= limit {
                break;
            }
        }

        if candidates.is_empty() {
            Ok(Step::SearchByName {
                term: expansion.primary,
            })
        } else {
            Ok(Step::FetchDetails { candidates })
        }
    }

    async fn search_by_name(&self, term: &str, limit: usize) -> Result<Step, ProviderError> {
        let mut seen: HashSet<String> = HashSet::new();
        let raw: Vec<RawDetail> = self
            .provider
            .search_by_name(term)
            .await?
            .into_iter()
            .filter(|detail| seen.insert(detail.id.clone()))
            .take(limit)
            .collect();

        if raw.is_empty() {
            return Ok(Step::RandomFinal);
        }

        Ok(Step::Normalize {
            raw,
            strategy: ResolutionStrategy::NameSearch,
        })
    }

    /// Fetch details for the first `limit` candidates concurrently, keeping
    /// candidate order. Unknown ids are skipped.
    async fn fetch_details(
        &self,
        candidates: Vec<RawSummary>,
        limit: usize,
    ) -> Result<Step, ProviderError> {
        let mut tasks = JoinSet::new();
        for (position, summary) in candidates.into_iter().take(limit).enumerate() {
            let provider = Arc::clone(&self.provider);
            tasks.spawn(async move { (position, provider.lookup(&summary.id).await) });
        }

        let mut fetched: Vec<(usize, RawDetail)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let (position, result) = joined.map_err(|e| {
                FetchError::Transport(format!("detail fetch task failed: {}", e))
            })?;
            if let Some(detail) = result? {
                fetched.push((position, detail));
            }
        }
        fetched.sort_by_key(|(position, _)| *position);

        if fetched.is_empty() {
            return Ok(Step::RandomFinal);
        }

        Ok(Step::Normalize {
            raw: fetched.into_iter().map(|(_, detail)| detail).collect(),
            strategy: ResolutionStrategy::Filter,
        })
    }

    /// Collect unique random recipes with a bounded number of attempts.
    ///
    /// Fewer than requested is fine. An error is returned only when nothing
    /// was collected and at least one call failed.
    async fn random_batch(&self, limit: usize) -> Result<Vec<RawDetail>, ProviderError> {
        let target = limit.min(self.config.random_target_cap);
        let mut seen: HashSet<String> = HashSet::new();
        let mut collected: Vec<RawDetail> = Vec::new();
        let mut last_error: Option<ProviderError> = None;
        let mut attempts = 0;

        while collected.len() < target && attempts < self.config.random_attempts {
            attempts += 1;
            match self.provider.random_one().await {
                Ok(Some(detail)) => {
                    if seen.insert(detail.id.clone()) {
                        collected.push(detail);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::debug!(attempt = attempts, error = %e, "random recipe call failed");
                    last_error = Some(e);
                }
            }
        }

        if collected.len() < target {
            tracing::debug!(
                wanted = target,
                got = collected.len(),
                attempts,
                "random batch came up short"
            );
        }

        match last_error {
            Some(e) if collected.is_empty() => Err(e),
            _ => Ok(collected),
        }
    }

    async fn finish(
        &self,
        raw: Vec<RawDetail>,
        strategy: ResolutionStrategy,
        query: &ValidatedQuery,
    ) -> ResolutionResult {
        let recipes: Vec<NormalizedRecipe> = raw.iter().take(query.limit).map(normalize).collect();
        let recipes = localize_recipes(Arc::clone(&self.translator), recipes, &query.language).await;

        tracing::info!(
            strategy = ?strategy,
            count = recipes.len(),
            "recommendation resolved"
        );

        ResolutionResult {
            recipes,
            source: self.provider.source_name().to_string(),
            strategy,
        }
    }
}
