//! Keyword expansion prompt: turn one localized search term into provider terms.

use crate::types::QueryKind;

/// Prompt name for logs.
pub const KEYWORD_EXPANSION_PROMPT_NAME: &str = "keyword_expansion";

/// Categories the provider recognizes.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "Beef",
    "Breakfast",
    "Chicken",
    "Dessert",
    "Goat",
    "Lamb",
    "Miscellaneous",
    "Pasta",
    "Pork",
    "Seafood",
    "Side",
    "Starter",
    "Vegan",
    "Vegetarian",
];

/// Areas (cuisines) the provider recognizes.
pub const KNOWN_AREAS: &[&str] = &[
    "American",
    "British",
    "Canadian",
    "Chinese",
    "Croatian",
    "Dutch",
    "Egyptian",
    "Filipino",
    "French",
    "Greek",
    "Indian",
    "Irish",
    "Italian",
    "Jamaican",
    "Japanese",
    "Kenyan",
    "Malaysian",
    "Mexican",
    "Moroccan",
    "Polish",
    "Portuguese",
    "Russian",
    "Spanish",
    "Thai",
    "Tunisian",
    "Turkish",
    "Ukrainian",
    "Uruguayan",
    "Vietnamese",
];

fn vocabulary_hint(kind: QueryKind) -> String {
    match kind {
        QueryKind::Ingredient => {
            "Use common English ingredient names in lowercase, e.g. \"chicken breast\", \"soy sauce\".".to_string()
        }
        QueryKind::Category => format!(
            "Every term MUST be one of these categories: {}.",
            KNOWN_CATEGORIES.join(", ")
        ),
        QueryKind::Cuisine => format!(
            "Every term MUST be one of these cuisines: {}.",
            KNOWN_AREAS.join(", ")
        ),
    }
}

/// Render the keyword expansion prompt for one term.
pub fn render_keyword_expansion_prompt(term: &str, kind: QueryKind) -> String {
    format!(
        r#"You help search an English recipe database. The user searched by {kind} with the term below, possibly in another language.

Term: {term}

Translate it to the single best English search term, then suggest up to 3 closely related English alternatives that would find similar recipes.
{hint}

Respond with JSON only, no other text: {{"primary": "term", "alternatives": ["alt1", "alt2"]}}"#,
        kind = kind.as_str(),
        term = term,
        hint = vocabulary_hint(kind),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_prompt_mentions_term_and_schema() {
        let prompt = render_keyword_expansion_prompt("닭고기", QueryKind::Ingredient);
        assert!(prompt.contains("닭고기"));
        assert!(prompt.contains("by ingredient"));
        assert!(prompt.contains("\"alternatives\""));
    }

    #[test]
    fn test_cuisine_prompt_lists_known_areas() {
        let prompt = render_keyword_expansion_prompt("일식", QueryKind::Cuisine);
        assert!(prompt.contains("Japanese"));
        assert!(prompt.contains("Vietnamese"));
        assert!(!prompt.contains("Seafood"));
    }
}
