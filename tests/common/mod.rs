//! Common test infrastructure
//!
//! This module provides everything end-to-end tests need: an isolated
//! server per test and a high-level HTTP client for the API. Tests
//! should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestClient, TestServer};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_users() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.list_users().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::*;
pub use server::TestServer;
