//! Random recipe selection and the fallback policy used when a query is too
//! narrow.
//!
//! The policy relaxes in two stages: all filters, then mood only, then the
//! whole catalog. One recipe is picked uniformly at random from the first
//! non-empty candidate set.

use crate::catalog::{Catalog, FilterSet, Recipe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick_index(&self, len: usize) -> usize;
}

pub type GuardedRandomSource = Arc<dyn RandomSource>;

/// Uses the thread-local generator, different on every call and process.
pub struct ThreadRandomSource;

impl RandomSource for ThreadRandomSource {
    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

/// Reproducible sequence of picks from a fixed seed.
pub struct SeededRandomSource {
    rng: Mutex<StdRng>,
}

impl SeededRandomSource {
    pub fn new(seed: u64) -> SeededRandomSource {
        SeededRandomSource {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandomSource {
    fn pick_index(&self, len: usize) -> usize {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .random_range(0..len)
    }
}

pub fn make_random_source(seed: Option<u64>) -> GuardedRandomSource {
    match seed {
        Some(seed) => Arc::new(SeededRandomSource::new(seed)),
        None => Arc::new(ThreadRandomSource),
    }
}

/// Picks one candidate uniformly at random, `None` when there are none.
/// Out of range indices from the source are wrapped around.
pub fn pick_random<'a>(candidates: &[&'a Recipe], random: &dyn RandomSource) -> Option<&'a Recipe> {
    if candidates.is_empty() {
        return None;
    }
    let index = random.pick_index(candidates.len()) % candidates.len();
    Some(candidates[index])
}

/// How far the query had to be relaxed before candidates were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStage {
    Exact,
    Mood,
    Catalog,
}

impl MatchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStage::Exact => "exact",
            MatchStage::Mood => "mood",
            MatchStage::Catalog => "catalog",
        }
    }
}

#[derive(Debug)]
pub struct Selection<'a> {
    pub recipe: &'a Recipe,
    pub stage: MatchStage,
    pub candidates: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Mood is required and must be a non-empty string")]
    EmptyMood,

    #[error("No recipes available")]
    NoRecipesAvailable,
}

pub fn select_recipe<'a>(
    catalog: &'a Catalog,
    mood: &str,
    filters: &FilterSet,
    random: &dyn RandomSource,
) -> Result<Selection<'a>, SelectionError> {
    let mood = mood.trim();
    if mood.is_empty() {
        return Err(SelectionError::EmptyMood);
    }

    let mut stage = MatchStage::Exact;
    let mut candidates = catalog.find_by_mood_and_filters(mood, filters);

    if candidates.is_empty() && !filters.is_empty() {
        stage = MatchStage::Mood;
        candidates = catalog.find_by_mood_and_filters(mood, &FilterSet::default());
    }

    if candidates.is_empty() {
        stage = MatchStage::Catalog;
        candidates = catalog.all();
    }

    let recipe = pick_random(&candidates, random).ok_or(SelectionError::NoRecipesAvailable)?;
    Ok(Selection {
        recipe,
        stage,
        candidates: candidates.len(),
    })
}
