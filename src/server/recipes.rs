//! Recipe generation and filter listing routes, mounted under `/api/recipes`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::api_error::ApiError;
use super::http_cache;
use super::metrics::{record_recipe_selection, record_recipe_selection_miss};
use super::state::ServerState;
use crate::catalog::{Catalog, CatalogStatus, FilterOptions, FilterSet, GuardedCatalogGate};
use crate::selection::{select_recipe, SelectionError};

/// Response header carrying how far the query was relaxed.
pub const MATCH_STAGE_HEADER: &str = "x-moodplate-match";

#[derive(Deserialize, Debug)]
struct GenerateRecipeBody {
    #[serde(default)]
    mood: Option<Value>,
    #[serde(flatten)]
    filters: FilterSet,
}

/// Returns the catalog, or a 503 while it is loading or after a failed load.
fn ready_catalog(gate: &GuardedCatalogGate) -> Result<Arc<Catalog>, ApiError> {
    match gate.ensure_loaded() {
        CatalogStatus::Ready(catalog) => Ok(catalog),
        CatalogStatus::NotLoaded | CatalogStatus::Loading => Err(ApiError::catalog_unavailable(
            "The recipe catalog is still loading, please try again shortly.",
        )),
        CatalogStatus::Failed(_) => Err(ApiError::catalog_unavailable(
            "The recipe catalog could not be loaded, a new attempt is in progress.",
        )),
    }
}

fn required_mood(mood: Option<Value>) -> Result<String, ApiError> {
    match mood {
        Some(Value::String(mood)) if !mood.trim().is_empty() => Ok(mood.trim().to_owned()),
        _ => Err(ApiError::invalid_input(SelectionError::EmptyMood.to_string())),
    }
}

async fn generate_recipe(
    State(state): State<ServerState>,
    body: Result<Json<GenerateRecipeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!("Rejected generate request body: {}", rejection.body_text());
        ApiError::invalid_input(rejection.body_text())
    })?;
    let mood = required_mood(body.mood)?;
    let filters = body.filters.normalized();
    let catalog = ready_catalog(&state.catalog_gate)?;

    info!("Finding recipe for mood: {} with filters: {:?}", mood, filters);

    match select_recipe(&catalog, &mood, &filters, state.random.as_ref()) {
        Ok(selection) => {
            record_recipe_selection(selection.stage.as_str());
            info!(
                "Found recipe: {} ({} match, {} candidates)",
                selection.recipe.dish_name,
                selection.stage.as_str(),
                selection.candidates
            );
            Ok((
                [(MATCH_STAGE_HEADER, selection.stage.as_str())],
                Json(selection.recipe),
            )
                .into_response())
        }
        Err(SelectionError::EmptyMood) => Err(ApiError::invalid_input(
            SelectionError::EmptyMood.to_string(),
        )),
        Err(SelectionError::NoRecipesAvailable) => {
            record_recipe_selection_miss();
            Err(ApiError::no_recipes_found(&mood))
        }
    }
}

async fn get_filters(
    State(gate): State<GuardedCatalogGate>,
) -> Result<Json<FilterOptions>, ApiError> {
    let catalog = ready_catalog(&gate)?;
    Ok(Json(catalog.filter_options()))
}

pub fn make_recipe_routes(state: ServerState) -> Router {
    let filters_routes: Router<ServerState> = Router::new()
        .route("/filters", get(get_filters))
        .layer(middleware::from_fn_with_state(
            state.config.content_cache_age_sec,
            http_cache,
        ));

    Router::new()
        .route("/generate", post(generate_recipe))
        .merge(filters_routes)
        .with_state(state)
}
