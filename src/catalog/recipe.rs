use serde::{Deserialize, Serialize};

pub const DEFAULT_DISH_NAME: &str = "Unknown Dish";
pub const DEFAULT_DESCRIPTION: &str = "A delicious recipe";
pub const DEFAULT_SERVINGS: u32 = 4;
pub const DEFAULT_DIFFICULTY: &str = "Medium";
pub const DEFAULT_CUISINE_TYPE: &str = "International";
pub const DEFAULT_MEAL_TYPE: &str = "Main";
pub const DEFAULT_MOOD: &str = "happy";

/// Sentinel for weather and time-of-day suggestions that satisfies every filter value.
pub const ANY: &str = "any";

const IMAGE_URL_PREFIX: &str = "https://source.unsplash.com/800x600/?";
const IMAGE_FALLBACK_KEYWORD: &str = "food";

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Ingredient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Ingredient {
    pub fn named<S: Into<String>>(name: S) -> Ingredient {
        Ingredient {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub dish_name: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub prep_time_min: u32,
    pub cook_time_min: u32,
    pub servings: u32,
    pub difficulty: String,
    pub cuisine_type: String,
    pub meal_type: String,
    pub tags: Vec<String>,
    pub mood: String,
    pub weather_suggestion: String,
    pub time_suggestion: String,
    pub image_url: String,
}

/// A recipe built from an empty row: every field holds its fallback value.
impl Default for Recipe {
    fn default() -> Self {
        Recipe {
            dish_name: DEFAULT_DISH_NAME.to_owned(),
            description: DEFAULT_DESCRIPTION.to_owned(),
            ingredients: vec![],
            steps: vec![],
            prep_time_min: 0,
            cook_time_min: 0,
            servings: DEFAULT_SERVINGS,
            difficulty: DEFAULT_DIFFICULTY.to_owned(),
            cuisine_type: DEFAULT_CUISINE_TYPE.to_owned(),
            meal_type: DEFAULT_MEAL_TYPE.to_owned(),
            tags: vec![],
            mood: DEFAULT_MOOD.to_owned(),
            weather_suggestion: ANY.to_owned(),
            time_suggestion: ANY.to_owned(),
            image_url: image_url_for(None),
        }
    }
}

impl Recipe {
    // The `*_lc` arguments are expected to be lower-cased already, the matcher
    // normalizes the query once instead of once per recipe. Mood and the
    // suggestions are stored lower-cased by the loader.

    pub fn has_mood(&self, mood_lc: &str) -> bool {
        self.mood == mood_lc
    }

    pub fn has_cuisine_type(&self, cuisine_type_lc: &str) -> bool {
        lowercase_eq(&self.cuisine_type, cuisine_type_lc)
    }

    pub fn has_meal_type(&self, meal_type_lc: &str) -> bool {
        lowercase_eq(&self.meal_type, meal_type_lc)
    }

    pub fn has_difficulty(&self, difficulty_lc: &str) -> bool {
        lowercase_eq(&self.difficulty, difficulty_lc)
    }

    pub fn suits_weather(&self, weather_lc: &str) -> bool {
        self.weather_suggestion == ANY || self.weather_suggestion == weather_lc
    }

    pub fn suits_time_of_day(&self, time_of_day_lc: &str) -> bool {
        self.time_suggestion == ANY || self.time_suggestion == time_of_day_lc
    }
}

/// Compares `value` lower-cased against `lowercase` without allocating.
fn lowercase_eq(value: &str, lowercase: &str) -> bool {
    value.chars().flat_map(char::to_lowercase).eq(lowercase.chars())
}

/// Upper-cases the first character and lower-cases the rest, after trimming.
/// Returns `None` for blank input so that callers can apply their default.
pub fn capitalize(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    let first = chars.next()?;
    let mut out: String = first.to_uppercase().collect();
    out.push_str(&chars.as_str().to_lowercase());
    Some(out)
}

/// Trims and lower-cases, `None` for blank input.
pub fn normalize_label(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

pub fn image_url_for(dish_name: Option<&str>) -> String {
    let keyword = dish_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(IMAGE_FALLBACK_KEYWORD);
    format!(
        "{}{},{}",
        IMAGE_URL_PREFIX,
        urlencoding::encode(keyword),
        IMAGE_FALLBACK_KEYWORD
    )
}
