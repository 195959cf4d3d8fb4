//! Conversion of a raw dataset row into a [`Recipe`].
//!
//! Every scalar column falls back to a default when missing, blank or
//! unparseable. The two JSON columns degrade to an empty list when they cannot
//! be decoded, and the problem is reported back to the loader instead of
//! dropping the row.

use super::recipe::{
    capitalize, image_url_for, normalize_label, Ingredient, Recipe, ANY, DEFAULT_CUISINE_TYPE,
    DEFAULT_DESCRIPTION, DEFAULT_DIFFICULTY, DEFAULT_DISH_NAME, DEFAULT_MEAL_TYPE, DEFAULT_MOOD,
    DEFAULT_SERVINGS,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One dataset row, keyed by the CSV header names.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct RecipeRow {
    pub dish_name: Option<String>,
    pub description: Option<String>,
    pub ingredients_json: Option<String>,
    pub steps_json: Option<String>,
    pub prep_time_min: Option<String>,
    pub cook_time_min: Option<String>,
    pub servings: Option<String>,
    pub difficulty: Option<String>,
    pub cuisine_type: Option<String>,
    pub meal_type: Option<String>,
    pub tags: Option<String>,
    pub mood: Option<String>,
    pub weather_suggestion: Option<String>,
    pub time_suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodedField {
    Ingredients,
    Steps,
}

impl DecodedField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodedField::Ingredients => "ingredients",
            DecodedField::Steps => "steps",
        }
    }
}

impl std::fmt::Display for DecodedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecodeWarning {
    pub field: DecodedField,
    pub reason: String,
}

#[derive(Debug)]
pub struct ParsedRow {
    pub recipe: Recipe,
    pub warnings: Vec<RowDecodeWarning>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientEntry {
    Structured {
        name: String,
        #[serde(default)]
        qty: Option<Value>,
        #[serde(default)]
        unit: Option<Value>,
        #[serde(default)]
        note: Option<Value>,
    },
    Bare(String),
}

impl From<IngredientEntry> for Ingredient {
    fn from(entry: IngredientEntry) -> Self {
        match entry {
            IngredientEntry::Bare(name) => Ingredient::named(name.trim()),
            IngredientEntry::Structured {
                name,
                qty,
                unit,
                note,
            } => Ingredient {
                name: name.trim().to_owned(),
                qty: qty.and_then(json_scalar_to_string),
                unit: unit.and_then(json_scalar_to_string),
                note: note.and_then(json_scalar_to_string),
            },
        }
    }
}

// Older exports of the dataset wrap every step into a `{"step": "..."}` object.
#[derive(Deserialize)]
#[serde(untagged)]
enum StepEntry {
    Text(String),
    Wrapped { step: String },
}

impl From<StepEntry> for String {
    fn from(entry: StepEntry) -> Self {
        match entry {
            StepEntry::Text(text) => text,
            StepEntry::Wrapped { step } => step,
        }
    }
}

fn json_scalar_to_string(value: Value) -> Option<String> {
    let out = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    };
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn decode_list<E, T>(raw: Option<&str>) -> Result<Vec<T>, serde_json::Error>
where
    E: DeserializeOwned + Into<T>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(vec![]),
        Some(text) => {
            let entries: Vec<E> = serde_json::from_str(text)?;
            Ok(entries.into_iter().map(Into::into).collect())
        }
    }
}

/// Parses the leading unsigned integer of `value`, like "25" or "25 minutes".
/// Negative and non-numeric values are rejected.
pub fn parse_leading_u32(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_len = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if digits_len == 0 {
        return None;
    }
    unsigned[..digits_len].parse().ok()
}

/// Splits a comma-separated list, dropping blanks and repeated entries.
pub fn parse_tags(value: &str) -> Vec<String> {
    let mut tags: Vec<String> = vec![];
    for tag in value.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_owned());
        }
    }
    tags
}

fn text_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_owned()
}

fn label_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .and_then(normalize_label)
        .unwrap_or_else(|| default.to_owned())
}

fn capitalized_or(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .and_then(capitalize)
        .unwrap_or_else(|| default.to_owned())
}

impl RecipeRow {
    pub fn into_recipe(self) -> ParsedRow {
        let mut warnings = vec![];

        let ingredients = match decode_list::<IngredientEntry, Ingredient>(
            self.ingredients_json.as_deref(),
        ) {
            Ok(ingredients) => ingredients,
            Err(err) => {
                warnings.push(RowDecodeWarning {
                    field: DecodedField::Ingredients,
                    reason: err.to_string(),
                });
                vec![]
            }
        };

        let steps = match decode_list::<StepEntry, String>(self.steps_json.as_deref()) {
            Ok(steps) => steps,
            Err(err) => {
                warnings.push(RowDecodeWarning {
                    field: DecodedField::Steps,
                    reason: err.to_string(),
                });
                vec![]
            }
        };

        let recipe = Recipe {
            dish_name: text_or(&self.dish_name, DEFAULT_DISH_NAME),
            description: text_or(&self.description, DEFAULT_DESCRIPTION),
            ingredients,
            steps,
            prep_time_min: self
                .prep_time_min
                .as_deref()
                .and_then(parse_leading_u32)
                .unwrap_or(0),
            cook_time_min: self
                .cook_time_min
                .as_deref()
                .and_then(parse_leading_u32)
                .unwrap_or(0),
            servings: self
                .servings
                .as_deref()
                .and_then(parse_leading_u32)
                .filter(|servings| *servings > 0)
                .unwrap_or(DEFAULT_SERVINGS),
            difficulty: capitalized_or(&self.difficulty, DEFAULT_DIFFICULTY),
            cuisine_type: capitalized_or(&self.cuisine_type, DEFAULT_CUISINE_TYPE),
            meal_type: capitalized_or(&self.meal_type, DEFAULT_MEAL_TYPE),
            tags: self.tags.as_deref().map(parse_tags).unwrap_or_default(),
            mood: label_or(&self.mood, DEFAULT_MOOD),
            weather_suggestion: label_or(&self.weather_suggestion, ANY),
            time_suggestion: label_or(&self.time_suggestion, ANY),
            image_url: image_url_for(self.dish_name.as_deref()),
        };

        ParsedRow { recipe, warnings }
    }
}
