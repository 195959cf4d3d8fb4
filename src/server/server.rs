use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use super::api_error::ApiError;
use super::metrics::metrics_handler;
use super::recipes::{make_recipe_routes, MATCH_STAGE_HEADER};
use super::{log_requests, state::*, with_rate_limit, ServerConfig};
use crate::catalog::{CatalogStatus, GuardedCatalogGate};
use crate::selection::GuardedRandomSource;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub catalog: &'static str,
    pub recipes: usize,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn recipes_count(status: &CatalogStatus) -> usize {
    match status {
        CatalogStatus::Ready(catalog) => catalog.len(),
        _ => 0,
    }
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let status = state.catalog_gate.status();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        catalog: status.as_str(),
        recipes: recipes_count(&status),
    };
    Json(stats)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    environment: String,
    timestamp: String,
    catalog: &'static str,
    recipes: usize,
    version: &'static str,
}

fn health_label(status: &CatalogStatus) -> &'static str {
    match status {
        CatalogStatus::Ready(_) => "OK",
        CatalogStatus::NotLoaded | CatalogStatus::Loading => "LOADING",
        CatalogStatus::Failed(_) => "UNAVAILABLE",
    }
}

/// Always answers 200, the catalog state is reported in the body.
async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let status = state.catalog_gate.status();
    Json(HealthResponse {
        status: health_label(&status),
        environment: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        catalog: status.as_str(),
        recipes: recipes_count(&status),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}

fn make_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([HeaderName::from_static(MATCH_STAGE_HEADER)]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

pub fn make_app(
    config: ServerConfig,
    catalog_gate: GuardedCatalogGate,
    random: GuardedRandomSource,
) -> Router {
    let state = ServerState::new(config.clone(), catalog_gate, random);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .nest("/recipes", make_recipe_routes(state.clone()))
        .fallback(route_not_found);

    let home_router: Router = match config.frontend_dir_path {
        Some(ref frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone())
            .fallback(route_not_found),
    };

    let app = home_router.nest("/api", api_routes);
    let app = match config.rate_limit {
        Some(ref limit) => with_rate_limit(app, limit),
        None => app,
    };

    app.layer(make_cors_layer(&config.allowed_origins))
        .layer(middleware::from_fn_with_state(state, log_requests))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    catalog_gate: GuardedCatalogGate,
    random: GuardedRandomSource,
) -> Result<()> {
    let app = make_app(config.clone(), catalog_gate, random);

    let address = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    let metrics_address = format!("{}:{}", config.bind_address, config.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_address)
        .await
        .with_context(|| format!("Failed to bind metrics listener {}", metrics_address))?;

    info!("Ready to serve at {}!", address);
    info!("Metrics available at {}/metrics", metrics_address);

    tokio::select! {
        result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        ) => result.context("HTTP server failed"),
        result = axum::serve(metrics_listener, make_metrics_app()) => {
            result.context("Metrics server failed")
        }
    }
}
