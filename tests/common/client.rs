//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all moodplate-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Recipe Endpoints
    // ========================================================================

    /// POST /api/recipes/generate with an arbitrary JSON body
    pub async fn generate(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/recipes/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// POST /api/recipes/generate with only a mood
    pub async fn generate_for_mood(&self, mood: &str) -> Response {
        self.generate(json!({ "mood": mood })).await
    }

    /// POST /api/recipes/generate with a raw, possibly malformed, body
    pub async fn generate_raw(&self, body: &'static str) -> Response {
        self.client
            .post(format!("{}/api/recipes/generate", self.base_url))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// GET /api/recipes/filters
    pub async fn get_filters(&self) -> Response {
        self.get("/api/recipes/filters").await
    }

    // ========================================================================
    // Service Endpoints
    // ========================================================================

    /// GET /api/health
    pub async fn get_health(&self) -> Response {
        self.get("/api/health").await
    }

    /// GET /
    pub async fn get_stats(&self) -> Response {
        self.get("/").await
    }

    /// GET on any path, for routes without a dedicated helper
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }
}
