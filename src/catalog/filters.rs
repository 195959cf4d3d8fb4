use serde::{Deserialize, Serialize};

use super::recipe::normalize_label;

/// Optional constraints applied on top of the mood match.
///
/// Blank values mean "no constraint" for that facet, they are dropped by
/// [`FilterSet::normalized`] so the matcher only ever sees trimmed, lower-cased
/// values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    pub cuisine_type: Option<String>,
    pub meal_type: Option<String>,
    pub difficulty: Option<String>,
    pub weather: Option<String>,
    pub time_of_day: Option<String>,
}

fn normalize(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(normalize_label)
}

impl FilterSet {
    pub fn with_cuisine_type<S: Into<String>>(mut self, value: S) -> Self {
        self.cuisine_type = Some(value.into());
        self
    }

    pub fn with_meal_type<S: Into<String>>(mut self, value: S) -> Self {
        self.meal_type = Some(value.into());
        self
    }

    pub fn with_difficulty<S: Into<String>>(mut self, value: S) -> Self {
        self.difficulty = Some(value.into());
        self
    }

    pub fn with_weather<S: Into<String>>(mut self, value: S) -> Self {
        self.weather = Some(value.into());
        self
    }

    pub fn with_time_of_day<S: Into<String>>(mut self, value: S) -> Self {
        self.time_of_day = Some(value.into());
        self
    }

    pub fn normalized(self) -> FilterSet {
        FilterSet {
            cuisine_type: normalize(self.cuisine_type),
            meal_type: normalize(self.meal_type),
            difficulty: normalize(self.difficulty),
            weather: normalize(self.weather),
            time_of_day: normalize(self.time_of_day),
        }
    }

    /// True when no facet carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        [
            &self.cuisine_type,
            &self.meal_type,
            &self.difficulty,
            &self.weather,
            &self.time_of_day,
        ]
        .iter()
        .all(|value| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// Categorical dimensions that can be enumerated to build filter controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    CuisineType,
    MealType,
    Difficulty,
    Mood,
}

impl Facet {
    pub const ALL: [Facet; 4] = [
        Facet::CuisineType,
        Facet::MealType,
        Facet::Difficulty,
        Facet::Mood,
    ];
}

/// Distinct facet values, each list sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub cuisine_types: Vec<String>,
    pub meal_types: Vec<String>,
    pub difficulties: Vec<String>,
    pub moods: Vec<String>,
}
