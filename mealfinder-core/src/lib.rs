pub mod ai;
pub mod cache;
pub mod error;
pub mod expansion;
pub mod extract;
pub mod http;
pub mod normalize;
pub mod provider;
pub mod recommend;
pub mod translation;
pub mod types;

pub use error::{FetchError, ProviderError, RecommendError};
pub use expansion::{Expansion, IdentityExpander, KeywordExpander, LlmKeywordExpander};
pub use extract::extract_ingredients;
pub use http::{HttpClient, MockClient, MockResponse, ReqwestClient, ReqwestClientBuilder};
pub use normalize::{normalize, split_tags};
pub use provider::{
    IngredientSlot, MealDbProvider, ProviderConfig, RawDetail, RawSummary, RecipeProvider,
    INGREDIENT_SLOTS, SOURCE_NAME,
};
pub use recommend::{
    Recommender, RecommenderBuilder, RecommenderConfig, ResolutionQuery, Stage, ValidatedQuery,
    DEFAULT_LIMIT, MAX_LIMIT,
};
pub use translation::{Language, LlmTranslator, PassthroughTranslator, Translator};
pub use types::{
    IngredientItem, NormalizedRecipe, QueryKind, ResolutionResult, ResolutionStrategy,
};
