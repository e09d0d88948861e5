//! Inbound query shape and its validation.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::RecommendError;
use crate::translation::Language;
use crate::types::QueryKind;

/// Result count used when the caller gives none.
pub const DEFAULT_LIMIT: usize = 5;

/// Largest accepted result count.
pub const MAX_LIMIT: usize = 10;

/// A recommendation request.
///
/// At most one filter governs the search: the first non-blank of
/// `ingredient`, `category`, `cuisine`, in that order. With none, the answer
/// is random.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolutionQuery {
    /// Main ingredient, e.g. "chicken" or "닭고기".
    pub ingredient: Option<String>,
    /// Dish category, e.g. "Dessert".
    pub category: Option<String>,
    /// Cuisine or region, e.g. "Japanese".
    pub cuisine: Option<String>,
    /// Number of recipes, 1-10. Defaults to 5.
    pub limit: Option<i64>,
    /// Language code for the returned text. Defaults to "en".
    pub language: Option<String>,
}

impl ResolutionQuery {
    pub fn with_ingredient(mut self, ingredient: &str) -> Self {
        self.ingredient = Some(ingredient.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_cuisine(mut self, cuisine: &str) -> Self {
        self.cuisine = Some(cuisine.to_string());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    /// The governing filter, if any, by priority.
    pub fn selection(&self) -> Option<(QueryKind, String)> {
        [
            (QueryKind::Ingredient, &self.ingredient),
            (QueryKind::Category, &self.category),
            (QueryKind::Cuisine, &self.cuisine),
        ]
        .into_iter()
        .find_map(|(kind, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (kind, v.to_string()))
        })
    }

    /// Check the request before it enters the pipeline.
    ///
    /// A missing limit defaults to 5; a limit outside 1..=10 is rejected,
    /// never clamped.
    pub fn validate(&self) -> Result<ValidatedQuery, RecommendError> {
        let limit = match self.limit {
            None => DEFAULT_LIMIT,
            Some(limit) if (1..=MAX_LIMIT as i64).contains(&limit) => limit as usize,
            Some(limit) => {
                return Err(RecommendError::InvalidInput(format!(
                    "limit must be between 1 and {}, got {}",
                    MAX_LIMIT, limit
                )))
            }
        };

        let language = Language::from_param(self.language.as_deref())?;

        Ok(ValidatedQuery {
            selection: self.selection(),
            limit,
            language,
        })
    }
}

/// A query that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuery {
    pub selection: Option<(QueryKind, String)>,
    pub limit: usize,
    pub language: Language,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_wins_over_category() {
        let query = ResolutionQuery::default()
            .with_category("Dessert")
            .with_ingredient("chicken");
        assert_eq!(
            query.selection(),
            Some((QueryKind::Ingredient, "chicken".to_string()))
        );
    }

    #[test]
    fn test_blank_fields_fall_through_to_the_next() {
        let query = ResolutionQuery::default()
            .with_ingredient("   ")
            .with_category("")
            .with_cuisine(" Thai ");
        assert_eq!(query.selection(), Some((QueryKind::Cuisine, "Thai".to_string())));
    }

    #[test]
    fn test_no_filter_selects_nothing() {
        assert_eq!(ResolutionQuery::default().selection(), None);
    }

    #[test]
    fn test_limit_defaults_to_five() {
        let validated = ResolutionQuery::default().validate().unwrap();
        assert_eq!(validated.limit, DEFAULT_LIMIT);
        assert!(validated.language.is_source());
    }

    #[test]
    fn test_out_of_range_limits_are_rejected() {
        for limit in [0, 11, -3] {
            let err = ResolutionQuery::default().with_limit(limit).validate().unwrap_err();
            assert!(matches!(err, RecommendError::InvalidInput(_)), "limit {}", limit);
        }
        assert_eq!(
            ResolutionQuery::default().with_limit(10).validate().unwrap().limit,
            10
        );
    }

    #[test]
    fn test_bad_language_is_rejected() {
        let err = ResolutionQuery::default()
            .with_language("klingon")
            .validate()
            .unwrap_err();
        assert!(matches!(err, RecommendError::InvalidInput(_)));
    }
}
