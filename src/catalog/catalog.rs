use super::{Facet, FilterOptions, FilterSet, Recipe};
use std::collections::BTreeSet;

/// The in-memory recipe dataset, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    pub fn new(recipes: Vec<Recipe>) -> Catalog {
        Catalog { recipes }
    }

    pub fn empty() -> Catalog {
        Catalog::default()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn all(&self) -> Vec<&Recipe> {
        self.recipes.iter().collect()
    }

    /// Returns, in catalog order, every recipe whose mood equals `mood` and
    /// that satisfies all the non-blank `filters`. Comparisons are
    /// case-insensitive, weather and time of day also accept the "any"
    /// suggestion.
    pub fn find_by_mood_and_filters(&self, mood: &str, filters: &FilterSet) -> Vec<&Recipe> {
        let mood = mood.trim().to_lowercase();
        let filters = filters.clone().normalized();

        self.recipes
            .iter()
            .filter(|r| r.has_mood(&mood))
            .filter(|r| {
                filters
                    .cuisine_type
                    .as_deref()
                    .map_or(true, |v| r.has_cuisine_type(v))
            })
            .filter(|r| {
                filters
                    .meal_type
                    .as_deref()
                    .map_or(true, |v| r.has_meal_type(v))
            })
            .filter(|r| {
                filters
                    .difficulty
                    .as_deref()
                    .map_or(true, |v| r.has_difficulty(v))
            })
            .filter(|r| filters.weather.as_deref().map_or(true, |v| r.suits_weather(v)))
            .filter(|r| {
                filters
                    .time_of_day
                    .as_deref()
                    .map_or(true, |v| r.suits_time_of_day(v))
            })
            .collect()
    }

    /// Distinct non-empty values of `facet`, sorted ascending.
    pub fn list_distinct(&self, facet: Facet) -> Vec<String> {
        let values: BTreeSet<&str> = self
            .recipes
            .iter()
            .map(|r| match facet {
                Facet::CuisineType => r.cuisine_type.as_str(),
                Facet::MealType => r.meal_type.as_str(),
                Facet::Difficulty => r.difficulty.as_str(),
                Facet::Mood => r.mood.as_str(),
            })
            .filter(|v| !v.is_empty())
            .collect();
        values.into_iter().map(str::to_owned).collect()
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            cuisine_types: self.list_distinct(Facet::CuisineType),
            meal_types: self.list_distinct(Facet::MealType),
            difficulties: self.list_distinct(Facet::Difficulty),
            moods: self.list_distinct(Facet::Mood),
        }
    }
}
