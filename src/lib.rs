//! Moodplate Recipe Server Library
//!
//! Loads a recipe dataset into memory and suggests recipes by mood plus
//! optional filters. Exposes the internal modules for testing and reuse.

pub mod catalog;
pub mod config;
pub mod selection;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{load_catalog, Catalog, CatalogGate, Facet, FilterSet, Recipe};
pub use selection::{pick_random, select_recipe, RandomSource};
pub use server::{make_app, run_server, RequestsLoggingLevel};
