//! Provider-shaped records. Never handed to callers; see `normalize`.

use serde_json::{Map, Value};

/// Number of indexed ingredient/measure field pairs on a detail record.
pub const INGREDIENT_SLOTS: usize = 20;

/// Minimal identity returned by filter endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSummary {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
}

/// One indexed (ingredient, measure) pair, possibly blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSlot {
    pub name: Option<String>,
    pub measure: Option<String>,
}

/// Full record as the provider sends it. Optional text is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDetail {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    /// Comma-joined tag list.
    pub tags: Option<String>,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    pub video_url: Option<String>,
    /// Slot 1 is index 0.
    pub ingredient_slots: [IngredientSlot; INGREDIENT_SLOTS],
}

impl RawSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thumbnail: None,
        }
    }

    /// Build from one entry of the provider's `meals` array.
    /// Returns `None` when the entry has no usable id.
    pub(crate) fn from_record(record: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            id: record_id(record)?,
            name: text_field(record, "strMeal").unwrap_or_default(),
            thumbnail: text_field(record, "strMealThumb"),
        })
    }
}

impl RawDetail {
    /// A detail with only identity set and every slot blank.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            area: None,
            tags: None,
            instructions: None,
            thumbnail: None,
            video_url: None,
            ingredient_slots: Default::default(),
        }
    }

    /// Set slot `number` (1-based). Numbers outside 1..=20 are ignored.
    pub fn with_slot(mut self, number: usize, name: &str, measure: &str) -> Self {
        if let Some(slot) = number
            .checked_sub(1)
            .and_then(|index| self.ingredient_slots.get_mut(index))
        {
            *slot = IngredientSlot {
                name: Some(name.to_string()),
                measure: Some(measure.to_string()),
            };
        }
        self
    }

    pub(crate) fn from_record(record: &Map<String, Value>) -> Option<Self> {
        let ingredient_slots = std::array::from_fn(|index| {
            let number = index + 1;
            IngredientSlot {
                name: text_field(record, &format!("strIngredient{}", number)),
                measure: text_field(record, &format!("strMeasure{}", number)),
            }
        });

        Some(Self {
            id: record_id(record)?,
            name: text_field(record, "strMeal").unwrap_or_default(),
            category: text_field(record, "strCategory"),
            area: text_field(record, "strArea"),
            tags: text_field(record, "strTags"),
            instructions: text_field(record, "strInstructions"),
            thumbnail: text_field(record, "strMealThumb"),
            video_url: text_field(record, "strYoutube"),
            ingredient_slots,
        })
    }
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    text_field(record, "idMeal")
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// String fields arrive as strings, `null`, or occasionally bare numbers.
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
