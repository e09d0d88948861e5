//! Public recipe shapes returned to callers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which structured field a query searches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Ingredient,
    Category,
    Cuisine,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Ingredient => "ingredient",
            QueryKind::Category => "category",
            QueryKind::Cuisine => "cuisine",
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One non-empty ingredient line. `measure` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientItem {
    pub ingredient: String,
    pub measure: String,
}

/// Provider-independent recipe shape. This is the only recipe type callers see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecipe {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub tags: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    pub video_url: Option<String>,
    pub ingredients: Vec<IngredientItem>,
}

/// Which fallback produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Structured filter by ingredient, category or cuisine.
    Filter,
    /// Free-text name search after the filters came back empty.
    NameSearch,
    /// Random recommendations.
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolutionResult {
    pub recipes: Vec<NormalizedRecipe>,
    /// Name of the upstream recipe database.
    pub source: String,
    pub strategy: ResolutionStrategy,
}
