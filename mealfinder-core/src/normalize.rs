//! Raw provider record to `NormalizedRecipe`.

use crate::extract::extract_ingredients;
use crate::provider::RawDetail;
use crate::types::NormalizedRecipe;

/// Convert a provider record to the public recipe shape.
///
/// Pure: the same input always yields the same output. Absent or blank
/// optional text becomes `None`.
pub fn normalize(raw: &RawDetail) -> NormalizedRecipe {
    NormalizedRecipe {
        id: raw.id.clone(),
        name: raw.name.trim().to_string(),
        category: non_empty(raw.category.as_deref()),
        area: non_empty(raw.area.as_deref()),
        tags: split_tags(raw.tags.as_deref()),
        instructions: non_empty(raw.instructions.as_deref()),
        thumbnail: non_empty(raw.thumbnail.as_deref()),
        video_url: non_empty(raw.video_url.as_deref()),
        ingredients: extract_ingredients(raw),
    }
}

/// Split a comma-joined tag string into trimmed, non-empty tags.
///
/// `None` in gives `None` out; a present string always gives `Some`, even if
/// every piece is blank.
pub fn split_tags(tags: Option<&str>) -> Option<Vec<String>> {
    tags.map(|joined| {
        joined
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawDetail {
        let mut raw = RawDetail::new("52772", "Teriyaki Chicken Casserole")
            .with_slot(1, "soy sauce", "3/4 cup")
            .with_slot(2, "water", "1/2 cup");
        raw.category = Some("Chicken".to_string());
        raw.area = Some("Japanese".to_string());
        raw.tags = Some("Meat,Casserole".to_string());
        raw.instructions = Some("Preheat oven to 350.".to_string());
        raw.video_url = Some(String::new());
        raw
    }

    #[test]
    fn test_absent_tags_normalize_to_none() {
        let mut raw = sample();
        raw.tags = None;
        assert_eq!(normalize(&raw).tags, None);
    }

    #[test]
    fn test_tags_are_split_trimmed_and_filtered() {
        let mut raw = sample();
        raw.tags = Some("a, b,,c".to_string());
        assert_eq!(
            normalize(&raw).tags,
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let mut raw = sample();
        raw.category = Some("   ".to_string());

        let recipe = normalize(&raw);
        assert_eq!(recipe.category, None);
        assert_eq!(recipe.video_url, None);
        assert_eq!(recipe.thumbnail, None);
        assert_eq!(recipe.area.as_deref(), Some("Japanese"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = sample();
        assert_eq!(normalize(&raw), normalize(&raw));
    }

    #[test]
    fn test_ingredients_come_from_extractor() {
        let recipe = normalize(&sample());
        assert_eq!(recipe.ingredients.len(), 2);
        assert_eq!(recipe.ingredients[0].ingredient, "soy sauce");
    }
}
