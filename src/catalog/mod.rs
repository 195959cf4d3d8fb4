mod catalog;
mod filters;
mod gate;
mod load;
mod recipe;
mod row;

pub use catalog::Catalog;
pub use filters::{Facet, FilterOptions, FilterSet};
pub use gate::{CatalogGate, CatalogStatus, GuardedCatalogGate};
pub use load::{load_catalog, CatalogBuildResult, LoadError, Problem as LoadCatalogProblem};
pub use recipe::{Ingredient, Recipe, ANY};
pub use row::{DecodedField, RecipeRow};
