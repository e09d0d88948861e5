//! Recipe provider abstraction.
//!
//! The provider is the public recipe database the pipeline searches. Each
//! operation is a single outbound request. "No matches" comes back as an empty
//! vec or `None`; only transport-class failures are errors, and nothing here
//! retries.

mod mealdb;
mod types;

pub use mealdb::{MealDbProvider, ProviderConfig, DEFAULT_BASE_URL};
pub use types::{IngredientSlot, RawDetail, RawSummary, INGREDIENT_SLOTS};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::types::QueryKind;

/// Name reported in every `ResolutionResult::source`.
pub const SOURCE_NAME: &str = "TheMealDB";

#[async_trait]
pub trait RecipeProvider: Send + Sync {
    async fn filter_by_ingredient(&self, ingredient: &str)
        -> Result<Vec<RawSummary>, ProviderError>;

    async fn filter_by_category(&self, category: &str) -> Result<Vec<RawSummary>, ProviderError>;

    async fn filter_by_area(&self, area: &str) -> Result<Vec<RawSummary>, ProviderError>;

    /// Free-text name search. The provider returns full records here.
    async fn search_by_name(&self, name: &str) -> Result<Vec<RawDetail>, ProviderError>;

    /// Full detail for one id, `None` if the id is unknown.
    async fn lookup(&self, id: &str) -> Result<Option<RawDetail>, ProviderError>;

    async fn random_one(&self) -> Result<Option<RawDetail>, ProviderError>;

    fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Dispatch a structured filter on the query kind. Cuisine maps to area.
    async fn filter(&self, kind: QueryKind, term: &str) -> Result<Vec<RawSummary>, ProviderError> {
        match kind {
            QueryKind::Ingredient => self.filter_by_ingredient(term).await,
            QueryKind::Category => self.filter_by_category(term).await,
            QueryKind::Cuisine => self.filter_by_area(term).await,
        }
    }
}
