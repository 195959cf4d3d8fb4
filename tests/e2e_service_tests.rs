//! End-to-end tests for service endpoints and catalog readiness
//!
//! Tests health, stats, unknown routes and the lazy loading gate.

mod common;

use common::{fixture_csv, TestClient, TestServer, FIXTURE_RECIPE_COUNT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

async fn wait_for_health(client: &TestClient, expected: &str) -> Value {
    for _ in 0..100 {
        let health: Value = client.get_health().await.json().await.unwrap();
        if health["status"] == expected {
            return health;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("health never reported {}", expected);
}

// =============================================================================
// Health and Stats
// =============================================================================

#[tokio::test]
async fn test_health_reports_ready_catalog() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let health: Value = response.json().await.unwrap();
    assert_eq!(health["status"], "OK");
    assert_eq!(health["environment"], "development");
    assert_eq!(health["catalog"], "ready");
    assert_eq!(health["recipes"], FIXTURE_RECIPE_COUNT);
    assert!(health["timestamp"].as_str().is_some());
    assert!(health["version"].as_str().is_some());
}

#[tokio::test]
async fn test_stats_report_uptime_and_hash() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_stats().await;
    assert_eq!(response.status(), StatusCode::OK);

    let stats: Value = response.json().await.unwrap();
    assert!(stats["uptime"].as_str().unwrap().starts_with("0d"));
    assert!(stats["hash"].as_str().is_some());
    assert_eq!(stats["recipes"], FIXTURE_RECIPE_COUNT);
}

// =============================================================================
// Unknown Routes
// =============================================================================

#[tokio::test]
async fn test_unknown_routes_return_json_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for path in ["/api/recipes/unknown", "/api/users", "/not-here"] {
        let response = client.get(path).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "path {}", path);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Route not found");
    }
}

// =============================================================================
// Readiness Gate
// =============================================================================

#[tokio::test]
async fn test_missing_dataset_answers_503_until_it_appears() {
    let server = TestServer::spawn_lazy().await;
    let client = TestClient::new(server.base_url.clone());

    // Liveness never fails, even before anything was loaded
    let health: Value = client.get_health().await.json().await.unwrap();
    assert_eq!(health["status"], "LOADING");

    // First request starts the load, which fails: no dataset yet
    let response = client.generate_for_mood("happy").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    wait_for_health(&client, "UNAVAILABLE").await;

    let response = client.get_filters().await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers().get("cache-control").is_none());

    // Once the dataset exists, the next request retries the load
    std::fs::write(&server.dataset_path, fixture_csv()).unwrap();
    let mut status = StatusCode::SERVICE_UNAVAILABLE;
    for _ in 0..100 {
        status = client.generate_for_mood("happy").await.status();
        if status == StatusCode::OK {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, StatusCode::OK);

    let health = wait_for_health(&client, "OK").await;
    assert_eq!(health["recipes"], FIXTURE_RECIPE_COUNT);
    assert!(server.catalog_gate.catalog().is_some());
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_requests_past_the_ip_limit_get_429() {
    // One request is spent by the readiness poll
    let server = TestServer::spawn_rate_limited(3).await;
    let client = TestClient::new(server.base_url.clone());

    for _ in 0..2 {
        let response = client.generate_for_mood("happy").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = client.generate_for_mood("happy").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
