//! Optional translation of normalized recipes into the caller's language.
//!
//! The provider speaks English. Any other target language sends each distinct
//! piece of recipe text through a `Translator`, concurrently; a failed piece
//! keeps its English text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use utoipa::ToSchema;

use crate::ai::prompts::{render_translate_prompt, TRANSLATE_PROMPT_NAME};
use crate::ai::{AiClient, AiError, ChatRequest};
use crate::cache::{MemoCache, DEFAULT_CAPACITY};
use crate::error::RecommendError;
use crate::types::NormalizedRecipe;

/// A lowercase BCP 47-ish language code such as `en`, `ko` or `pt-br`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Language(String);

impl Language {
    /// Language the provider's text is written in.
    pub const SOURCE_CODE: &'static str = "en";

    /// Parse a code: a 2-3 letter primary subtag, optionally followed by
    /// `-` or `_` and a 2-8 character alphanumeric region/variant.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim().to_ascii_lowercase().replace('_', "-");
        let mut parts = code.splitn(2, '-');
        let primary = parts.next().unwrap_or_default();
        let primary_ok =
            (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase());
        let rest_ok = parts.next().map_or(true, |rest| {
            (2..=8).contains(&rest.len()) && rest.chars().all(|c| c.is_ascii_alphanumeric())
        });

        (primary_ok && rest_ok).then_some(Self(code))
    }

    /// Parse an optional request parameter. Absent or blank means the
    /// source language; anything else must be a valid code.
    pub fn from_param(code: Option<&str>) -> Result<Self, RecommendError> {
        match code.map(str::trim) {
            None | Some("") => Ok(Self::source()),
            Some(code) => Self::parse(code).ok_or_else(|| {
                RecommendError::InvalidInput(format!("unsupported language code: {}", code))
            }),
        }
    }

    pub fn source() -> Self {
        Self(Self::SOURCE_CODE.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }

    /// True when no translation is needed.
    pub fn is_source(&self) -> bool {
        self.0.split('-').next() == Some(Self::SOURCE_CODE)
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Language::parse(&value).ok_or_else(|| format!("unsupported language code: {}", value))
    }
}

impl From<Language> for String {
    fn from(language: Language) -> Self {
        language.0
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error(transparent)]
    Ai(#[from] AiError),

    #[error("Backend returned an empty translation")]
    Empty,
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: &Language) -> Result<String, TranslationError>;

    /// False for translators that return their input unchanged.
    fn translates(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

#[async_trait]
impl Translator for PassthroughTranslator {
    async fn translate(&self, text: &str, _target: &Language) -> Result<String, TranslationError> {
        Ok(text.to_string())
    }

    fn translates(&self) -> bool {
        false
    }
}

/// LLM-backed translator, memoized per `(language, text)`.
pub struct LlmTranslator {
    ai_client: Arc<dyn AiClient>,
    cache: MemoCache<(Language, String), String>,
}

impl LlmTranslator {
    pub fn new(ai_client: Arc<dyn AiClient>) -> Self {
        Self::with_cache_capacity(ai_client, DEFAULT_CAPACITY)
    }

    /// Keep at most `max_entries` translations.
    pub fn with_cache_capacity(ai_client: Arc<dyn AiClient>, max_entries: u64) -> Self {
        Self {
            ai_client,
            cache: MemoCache::with_capacity(max_entries),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(&self, text: &str, target: &Language) -> Result<String, TranslationError> {
        if target.is_source() || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let key = (target.clone(), text.to_string());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let request = ChatRequest::new(render_translate_prompt(text, target.code()))
            .max_tokens(2048)
            .temperature(0.0);

        let response = self
            .ai_client
            .complete(TRANSLATE_PROMPT_NAME, request)
            .await?;

        let translated = response.content.trim().to_string();
        if translated.is_empty() {
            return Err(TranslationError::Empty);
        }

        self.cache.insert(key, translated.clone());
        Ok(translated)
    }
}

/// Translate every text field of `recipes` into `language`.
///
/// Each distinct string is translated once, all of them concurrently. Ids,
/// URLs and list order are untouched.
pub async fn localize_recipes(
    translator: Arc<dyn Translator>,
    recipes: Vec<NormalizedRecipe>,
    language: &Language,
) -> Vec<NormalizedRecipe> {
    if language.is_source() || !translator.translates() || recipes.is_empty() {
        return recipes;
    }

    let mut texts: HashSet<String> = HashSet::new();
    for recipe in &recipes {
        for text in translatable_texts(recipe) {
            if !text.trim().is_empty() {
                texts.insert(text.to_string());
            }
        }
    }

    let mut tasks = JoinSet::new();
    for text in texts {
        let translator = Arc::clone(&translator);
        let language = language.clone();
        tasks.spawn(async move {
            let translated = translator.translate(&text, &language).await;
            (text, translated)
        });
    }

    let mut translations: HashMap<String, String> = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((text, Ok(translated))) => {
                translations.insert(text, translated);
            }
            Ok((text, Err(e))) => {
                tracing::warn!(language = %language, error = %e, chars = text.len(), "translation failed, keeping original text");
            }
            Err(e) => {
                tracing::warn!(error = %e, "translation task did not complete");
            }
        }
    }

    tracing::debug!(
        language = %language,
        translated = translations.len(),
        "localized recipes"
    );

    recipes
        .into_iter()
        .map(|recipe| apply_translations(recipe, &translations))
        .collect()
}

fn translatable_texts(recipe: &NormalizedRecipe) -> Vec<&str> {
    let mut texts = vec![recipe.name.as_str()];
    texts.extend(recipe.category.as_deref());
    texts.extend(recipe.area.as_deref());
    texts.extend(recipe.instructions.as_deref());
    if let Some(tags) = &recipe.tags {
        texts.extend(tags.iter().map(String::as_str));
    }
    for item in &recipe.ingredients {
        texts.push(&item.ingredient);
        texts.push(&item.measure);
    }
    texts
}

fn apply_translations(
    mut recipe: NormalizedRecipe,
    translations: &HashMap<String, String>,
) -> NormalizedRecipe {
    let lookup = |text: &mut String| {
        if let Some(translated) = translations.get(text.as_str()) {
            *text = translated.clone();
        }
    };

    lookup(&mut recipe.name);
    for field in [
        recipe.category.as_mut(),
        recipe.area.as_mut(),
        recipe.instructions.as_mut(),
    ]
    .into_iter()
    .flatten()
    {
        lookup(field);
    }
    if let Some(tags) = recipe.tags.as_mut() {
        tags.iter_mut().for_each(lookup);
    }
    for item in recipe.ingredients.iter_mut() {
        lookup(&mut item.ingredient);
        lookup(&mut item.measure);
    }
    recipe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FakeAiClient;
    use crate::types::IngredientItem;

    fn recipe() -> NormalizedRecipe {
        NormalizedRecipe {
            id: "52772".to_string(),
            name: "Teriyaki Chicken".to_string(),
            category: Some("Chicken".to_string()),
            area: Some("Japanese".to_string()),
            tags: Some(vec!["Meat".to_string()]),
            instructions: Some("Bake.".to_string()),
            thumbnail: Some("https://img/1.jpg".to_string()),
            video_url: None,
            ingredients: vec![IngredientItem {
                ingredient: "Chicken".to_string(),
                measure: String::new(),
            }],
        }
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::parse("KO").unwrap().code(), "ko");
        assert_eq!(Language::parse("pt_BR").unwrap().code(), "pt-br");
        assert!(Language::parse("en-US").unwrap().is_source());
        assert!(Language::parse("").is_none());
        assert!(Language::parse("korean").is_none());
        assert!(Language::parse("ko-").is_none());
    }

    #[test]
    fn test_language_from_param() {
        assert!(Language::from_param(None).unwrap().is_source());
        assert!(Language::from_param(Some("")).unwrap().is_source());
        assert!(Language::from_param(Some("  ")).unwrap().is_source());
        assert_eq!(Language::from_param(Some(" ko ")).unwrap().code(), "ko");
        assert!(matches!(
            Language::from_param(Some("klingon")),
            Err(RecommendError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_english_is_untouched() {
        let fake = Arc::new(FakeAiClient::new());
        let translator = Arc::new(LlmTranslator::new(fake.clone()));
        let recipes = localize_recipes(translator, vec![recipe()], &Language::source()).await;
        assert_eq!(recipes, vec![recipe()]);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_passthrough_spawns_nothing() {
        let language = Language::parse("ko").unwrap();
        let recipes =
            localize_recipes(Arc::new(PassthroughTranslator), vec![recipe()], &language).await;
        assert_eq!(recipes, vec![recipe()]);
    }

    #[tokio::test]
    async fn test_shared_text_is_translated_once() {
        let fake = FakeAiClient::with_response("\n\nChicken", "닭고기")
            .with_default_response("번역");
        let fake = Arc::new(fake);
        let translator = Arc::new(LlmTranslator::new(fake.clone()));
        let language = Language::parse("ko").unwrap();

        let recipes = localize_recipes(translator.clone(), vec![recipe()], &language).await;

        let localized = &recipes[0];
        assert_eq!(localized.id, "52772");
        assert_eq!(localized.thumbnail.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(localized.ingredients[0].measure, "");
        assert_eq!(localized.name, "번역");
        assert_eq!(localized.category.as_deref(), Some("닭고기"));
        assert_eq!(localized.ingredients[0].ingredient, "닭고기");
        // "Chicken" appears twice but is one distinct text; "" is never sent.
        assert_eq!(fake.call_count(), 5);
        assert_eq!(translator.cached_entries(), 5);
    }

    #[tokio::test]
    async fn test_failed_fields_keep_original_text() {
        let language = Language::parse("ja").unwrap();
        let translator = Arc::new(LlmTranslator::new(Arc::new(FakeAiClient::new())));

        let recipes = localize_recipes(translator, vec![recipe()], &language).await;

        assert_eq!(recipes, vec![recipe()]);
    }
}
