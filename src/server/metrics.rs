use crate::catalog::CatalogBuildResult;
use axum::{http::StatusCode, response::IntoResponse};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all Moodplate metrics
const PREFIX: &str = "moodplate";

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Catalog Metrics
    pub static ref CATALOG_RECIPES: Gauge = Gauge::new(
        format!("{PREFIX}_catalog_recipes"),
        "Number of recipes in the loaded catalog"
    ).expect("Failed to create catalog_recipes metric");

    pub static ref CATALOG_ROW_PROBLEMS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_catalog_row_problems_total"),
            "Dataset rows with decode failures or dropped entirely"
        ),
        &["kind"]
    ).expect("Failed to create catalog_row_problems_total metric");

    pub static ref CATALOG_LOAD_FAILURES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_catalog_load_failures_total"),
        "Catalog loads that failed as a whole"
    ).expect("Failed to create catalog_load_failures_total metric");

    pub static ref CATALOG_LOAD_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_catalog_load_duration_seconds"),
            "Time spent reading and parsing the dataset"
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0])
    ).expect("Failed to create catalog_load_duration_seconds metric");

    // Selection Metrics
    pub static ref RECIPE_SELECTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            format!("{PREFIX}_recipe_selections_total"),
            "Recipes served, by how far the query was relaxed"
        ),
        &["stage"]
    ).expect("Failed to create recipe_selections_total metric");

    pub static ref RECIPE_SELECTION_MISSES_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_recipe_selection_misses_total"),
        "Generation requests answered with no recipe at all"
    ).expect("Failed to create recipe_selection_misses_total metric");

    pub static ref PROCESS_MEMORY_BYTES: Gauge = Gauge::new(
        format!("{PREFIX}_process_memory_bytes"),
        "Process memory usage in bytes"
    ).expect("Failed to create process_memory_bytes metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Already registered metrics are fine, tests call this repeatedly
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_RECIPES.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_ROW_PROBLEMS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_LOAD_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(CATALOG_LOAD_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(RECIPE_SELECTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(RECIPE_SELECTION_MISSES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PROCESS_MEMORY_BYTES.clone()));

    tracing::info!("Metrics system initialized successfully");
}

pub fn record_catalog_loaded(result: &CatalogBuildResult, duration: Duration) {
    CATALOG_RECIPES.set(result.catalog.len() as f64);
    for problem in result.problems.iter() {
        CATALOG_ROW_PROBLEMS_TOTAL
            .with_label_values(&[problem.kind()])
            .inc();
    }
    CATALOG_LOAD_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn record_catalog_load_failure() {
    CATALOG_LOAD_FAILURES_TOTAL.inc();
}

pub fn record_recipe_selection(stage: &str) {
    RECIPE_SELECTIONS_TOTAL.with_label_values(&[stage]).inc();
}

pub fn record_recipe_selection_miss() {
    RECIPE_SELECTION_MISSES_TOTAL.inc();
}

/// Record an HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Maps a request path to a bounded set of labels
pub fn categorize_endpoint(path: &str) -> &'static str {
    match path {
        "/" => "stats",
        "/api/health" => "health",
        "/api/recipes/generate" => "generate",
        "/api/recipes/filters" => "filters",
        _ if path.starts_with("/api/") => "api_other",
        _ => "static",
    }
}

pub fn update_memory_usage() {
    #[cfg(target_os = "linux")]
    {
        if let Ok(status) = std::fs::read_to_string("/proc/self/status") {
            let rss_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<f64>().ok());
            if let Some(kb) = rss_kb {
                PROCESS_MEMORY_BYTES.set(kb * 1024.0);
            }
        }
    }
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    update_memory_usage();

    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_default();
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}
