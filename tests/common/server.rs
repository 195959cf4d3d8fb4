//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own dataset.

use super::constants::*;
use super::fixtures::{create_test_dataset, fixture_csv};
use moodplate_server::catalog::{CatalogGate, GuardedCatalogGate};
use moodplate_server::selection::make_random_source;
use moodplate_server::server::{make_app, RateLimit, RequestsLoggingLevel, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated dataset
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Path of the dataset backing the catalog, tests may rewrite it
    pub dataset_path: PathBuf,

    /// Catalog gate shared with the server, for inspecting load state
    pub catalog_gate: GuardedCatalogGate,

    // Private fields - keep resources alive until drop
    _temp_dataset_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with the fixture dataset loaded before it starts
    pub async fn spawn() -> Self {
        Self::spawn_with_dataset(&fixture_csv()).await
    }

    /// Spawns a server whose catalog is loaded from `csv` before it starts
    ///
    /// # Panics
    ///
    /// Panics if the dataset cannot be written or loaded, or if the server
    /// doesn't become ready within timeout.
    pub async fn spawn_with_dataset(csv: &str) -> Self {
        let (temp_dir, dataset_path) =
            create_test_dataset(csv).expect("Failed to create test dataset");
        let gate = Arc::new(CatalogGate::from_source(dataset_path.clone()));
        gate.load_now().await.expect("Failed to load test catalog");
        Self::spawn_with_gate(temp_dir, dataset_path, gate, None).await
    }

    /// Spawns a server with the fixture dataset that limits every client IP
    /// to `max_requests` per window. The readiness poll spends one request.
    pub async fn spawn_rate_limited(max_requests: u32) -> Self {
        let (temp_dir, dataset_path) =
            create_test_dataset(&fixture_csv()).expect("Failed to create test dataset");
        let gate = Arc::new(CatalogGate::from_source(dataset_path.clone()));
        gate.load_now().await.expect("Failed to load test catalog");
        let rate_limit = RateLimit {
            max_requests,
            window_sec: RATE_LIMIT_WINDOW_SEC,
        };
        Self::spawn_with_gate(temp_dir, dataset_path, gate, Some(rate_limit)).await
    }

    /// Spawns a server whose dataset does not exist yet, the catalog is only
    /// loaded when a request asks for it.
    pub async fn spawn_lazy() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dataset_path = temp_dir.path().join("recipes.csv");
        let gate = Arc::new(CatalogGate::from_source(dataset_path.clone()));
        Self::spawn_with_gate(temp_dir, dataset_path, gate, None).await
    }

    async fn spawn_with_gate(
        temp_dir: TempDir,
        dataset_path: PathBuf,
        catalog_gate: GuardedCatalogGate,
        rate_limit: Option<RateLimit>,
    ) -> Self {
        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            content_cache_age_sec: 0,
            rate_limit,
            ..Default::default()
        };

        let app = make_app(
            config,
            catalog_gate.clone(),
            make_random_source(Some(SELECTION_SEED)),
        );

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            dataset_path,
            catalog_gate,
            _temp_dataset_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    // Server is ready
                    return;
                }
                _ => {
                    // Server not ready yet, wait and retry
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
