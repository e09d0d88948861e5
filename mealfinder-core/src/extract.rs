//! Ingredient extraction from the provider's indexed slots.

use crate::provider::RawDetail;
use crate::types::IngredientItem;

/// Extract non-empty ingredient lines in slot order.
///
/// Names and measures are trimmed. A slot is kept only when its trimmed
/// name is non-empty; a blank measure becomes `""`.
pub fn extract_ingredients(detail: &RawDetail) -> Vec<IngredientItem> {
    detail
        .ingredient_slots
        .iter()
        .filter_map(|slot| {
            let ingredient = slot.name.as_deref().map(str::trim).unwrap_or_default();
            if ingredient.is_empty() {
                return None;
            }

            let measure = slot.measure.as_deref().map(str::trim).unwrap_or_default();
            Some(IngredientItem {
                ingredient: ingredient.to_string(),
                measure: measure.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(ingredient: &str, measure: &str) -> IngredientItem {
        IngredientItem {
            ingredient: ingredient.to_string(),
            measure: measure.to_string(),
        }
    }

    #[test]
    fn test_keeps_slot_order_and_skips_blank_names() {
        let detail = RawDetail::new("1", "Seasoning")
            .with_slot(3, "Salt", "1 tsp")
            .with_slot(7, "", "")
            .with_slot(12, "Pepper", "");

        assert_eq!(
            extract_ingredients(&detail),
            vec![item("Salt", "1 tsp"), item("Pepper", "")]
        );
    }

    #[test]
    fn test_trims_names_and_measures() {
        let detail = RawDetail::new("1", "Toast")
            .with_slot(1, "  Bread ", " 2 slices  ")
            .with_slot(2, "   ", "1 tbsp");

        assert_eq!(extract_ingredients(&detail), vec![item("Bread", "2 slices")]);
    }

    #[test]
    fn test_missing_measure_is_empty_string() {
        let mut detail = RawDetail::new("1", "Water");
        detail.ingredient_slots[0].name = Some("Water".to_string());

        assert_eq!(extract_ingredients(&detail), vec![item("Water", "")]);
    }

    #[test]
    fn test_all_blank_slots_yield_nothing() {
        assert!(extract_ingredients(&RawDetail::new("1", "Nothing")).is_empty());
    }
}
