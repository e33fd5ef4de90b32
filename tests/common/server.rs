//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database.

use super::constants::*;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tonearm_server::{
    make_app, seed_demo_library, LibraryStore, RequestsLoggingLevel, ServerConfig,
    SqliteLibraryStore,
};

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store handle for direct database access in tests
    pub store: Arc<dyn LibraryStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with an empty database.
    pub async fn spawn() -> Self {
        Self::spawn_inner(false).await
    }

    /// Spawns a new test server whose database has the demo data loaded.
    pub async fn spawn_seeded() -> Self {
        Self::spawn_inner(true).await
    }

    /// This function:
    /// 1. Creates a temporary database (optionally seeded with demo data)
    /// 2. Binds to a random port (127.0.0.1:0)
    /// 3. Spawns the server in a background task
    /// 4. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Database creation fails
    /// - Port binding fails
    /// - Server doesn't become ready within timeout
    async fn spawn_inner(seed: bool) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_db_dir.path().join("library.db");

        let store: Arc<dyn LibraryStore> =
            Arc::new(SqliteLibraryStore::new(&db_path).expect("Failed to open library store"));

        if seed {
            seed_demo_library(store.as_ref()).expect("Failed to seed demo data");
        }

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
            frontend_dir_path: None,
        };

        let app = make_app(config, store.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
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

            match client
                .get(format!("{}/v1/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
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
        // TempDir is cleaned up automatically
    }
}
