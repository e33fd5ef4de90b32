//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all library-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

/// HTTP test client for the library API
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
    // Generic verbs - all endpoints are JSON in, JSON out
    // ========================================================================

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn put(&self, path: &str, body: &Value) -> Response {
        self.client
            .put(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// GET /v1/health
    pub async fn health(&self) -> Response {
        self.get("/v1/health").await
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// GET /v1/users
    pub async fn list_users(&self) -> Response {
        self.get("/v1/users").await
    }

    /// POST /v1/users
    pub async fn create_user(&self, body: &Value) -> Response {
        self.post("/v1/users", body).await
    }

    /// GET /v1/users/{id}
    pub async fn get_user(&self, id: i64) -> Response {
        self.get(&format!("/v1/users/{}", id)).await
    }

    /// PUT /v1/users/{id}
    pub async fn update_user(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/users/{}", id), body).await
    }

    /// DELETE /v1/users/{id}
    pub async fn delete_user(&self, id: i64) -> Response {
        self.delete(&format!("/v1/users/{}", id)).await
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    /// GET /v1/accounts
    pub async fn list_accounts(&self) -> Response {
        self.get("/v1/accounts").await
    }

    /// GET /v1/accounts?userId={user_id}
    pub async fn list_accounts_for_user(&self, user_id: i64) -> Response {
        self.get(&format!("/v1/accounts?userId={}", user_id)).await
    }

    /// POST /v1/accounts
    pub async fn create_account(&self, body: &Value) -> Response {
        self.post("/v1/accounts", body).await
    }

    /// GET /v1/accounts/{id}
    pub async fn get_account(&self, id: i64) -> Response {
        self.get(&format!("/v1/accounts/{}", id)).await
    }

    /// PUT /v1/accounts/{id}
    pub async fn update_account(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/accounts/{}", id), body).await
    }

    /// DELETE /v1/accounts/{id}
    pub async fn delete_account(&self, id: i64) -> Response {
        self.delete(&format!("/v1/accounts/{}", id)).await
    }

    // ========================================================================
    // Tracks
    // ========================================================================

    /// GET /v1/tracks
    pub async fn list_tracks(&self) -> Response {
        self.get("/v1/tracks").await
    }

    /// POST /v1/tracks
    pub async fn create_track(&self, body: &Value) -> Response {
        self.post("/v1/tracks", body).await
    }

    /// GET /v1/tracks/{id}
    pub async fn get_track(&self, id: i64) -> Response {
        self.get(&format!("/v1/tracks/{}", id)).await
    }

    /// PUT /v1/tracks/{id}
    pub async fn update_track(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/tracks/{}", id), body).await
    }

    /// DELETE /v1/tracks/{id}
    pub async fn delete_track(&self, id: i64) -> Response {
        self.delete(&format!("/v1/tracks/{}", id)).await
    }

    // ========================================================================
    // Playlists
    // ========================================================================

    /// GET /v1/playlists
    pub async fn list_playlists(&self) -> Response {
        self.get("/v1/playlists").await
    }

    /// GET /v1/playlists?accountId={account_id}
    pub async fn list_playlists_for_account(&self, account_id: i64) -> Response {
        self.get(&format!("/v1/playlists?accountId={}", account_id))
            .await
    }

    /// POST /v1/playlists
    pub async fn create_playlist(&self, body: &Value) -> Response {
        self.post("/v1/playlists", body).await
    }

    /// GET /v1/playlists/{id}
    pub async fn get_playlist(&self, id: i64) -> Response {
        self.get(&format!("/v1/playlists/{}", id)).await
    }

    /// PUT /v1/playlists/{id}
    pub async fn update_playlist(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/playlists/{}", id), body).await
    }

    /// DELETE /v1/playlists/{id}
    pub async fn delete_playlist(&self, id: i64) -> Response {
        self.delete(&format!("/v1/playlists/{}", id)).await
    }

    /// GET /v1/playlists/{id}/tracks
    pub async fn list_playlist_tracks(&self, id: i64) -> Response {
        self.get(&format!("/v1/playlists/{}/tracks", id)).await
    }

    /// POST /v1/playlists/{id}/tracks
    pub async fn add_playlist_track(&self, id: i64, body: &Value) -> Response {
        self.post(&format!("/v1/playlists/{}/tracks", id), body)
            .await
    }

    /// DELETE /v1/playlists/{id}/tracks/{track_id}
    pub async fn remove_playlist_track(&self, id: i64, track_id: i64) -> Response {
        self.delete(&format!("/v1/playlists/{}/tracks/{}", id, track_id))
            .await
    }

    // ========================================================================
    // Listening events
    // ========================================================================

    /// POST /v1/listening-events
    pub async fn create_listening_event(&self, body: &Value) -> Response {
        self.post("/v1/listening-events", body).await
    }

    /// GET /v1/listening-events/{id}
    pub async fn get_listening_event(&self, id: i64) -> Response {
        self.get(&format!("/v1/listening-events/{}", id)).await
    }

    /// PUT /v1/listening-events/{id}
    pub async fn update_listening_event(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/listening-events/{}", id), body)
            .await
    }

    /// DELETE /v1/listening-events/{id}
    pub async fn delete_listening_event(&self, id: i64) -> Response {
        self.delete(&format!("/v1/listening-events/{}", id)).await
    }

    // ========================================================================
    // Devices
    // ========================================================================

    /// GET /v1/devices
    pub async fn list_devices(&self) -> Response {
        self.get("/v1/devices").await
    }

    /// GET /v1/devices?accountId={account_id}
    pub async fn list_devices_for_account(&self, account_id: i64) -> Response {
        self.get(&format!("/v1/devices?accountId={}", account_id))
            .await
    }

    /// POST /v1/devices
    pub async fn create_device(&self, body: &Value) -> Response {
        self.post("/v1/devices", body).await
    }

    /// GET /v1/devices/{id}
    pub async fn get_device(&self, id: i64) -> Response {
        self.get(&format!("/v1/devices/{}", id)).await
    }

    /// PUT /v1/devices/{id}
    pub async fn update_device(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/devices/{}", id), body).await
    }

    /// DELETE /v1/devices/{id}
    pub async fn delete_device(&self, id: i64) -> Response {
        self.delete(&format!("/v1/devices/{}", id)).await
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// GET /v1/subscriptions
    pub async fn list_subscriptions(&self) -> Response {
        self.get("/v1/subscriptions").await
    }

    /// POST /v1/subscriptions
    pub async fn create_subscription(&self, body: &Value) -> Response {
        self.post("/v1/subscriptions", body).await
    }

    /// GET /v1/subscriptions/{id}
    pub async fn get_subscription(&self, id: i64) -> Response {
        self.get(&format!("/v1/subscriptions/{}", id)).await
    }

    /// PUT /v1/subscriptions/{id}
    pub async fn update_subscription(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/subscriptions/{}", id), body).await
    }

    /// DELETE /v1/subscriptions/{id}
    pub async fn delete_subscription(&self, id: i64) -> Response {
        self.delete(&format!("/v1/subscriptions/{}", id)).await
    }

    // ========================================================================
    // Automation rules
    // ========================================================================

    /// GET /v1/rules
    pub async fn list_rules(&self) -> Response {
        self.get("/v1/rules").await
    }

    /// GET /v1/rules?accountId={account_id}
    pub async fn list_rules_for_account(&self, account_id: i64) -> Response {
        self.get(&format!("/v1/rules?accountId={}", account_id))
            .await
    }

    /// POST /v1/rules
    pub async fn create_rule(&self, body: &Value) -> Response {
        self.post("/v1/rules", body).await
    }

    /// GET /v1/rules/{id}
    pub async fn get_rule(&self, id: i64) -> Response {
        self.get(&format!("/v1/rules/{}", id)).await
    }

    /// PUT /v1/rules/{id}
    pub async fn update_rule(&self, id: i64, body: &Value) -> Response {
        self.put(&format!("/v1/rules/{}", id), body).await
    }

    /// DELETE /v1/rules/{id}
    pub async fn delete_rule(&self, id: i64) -> Response {
        self.delete(&format!("/v1/rules/{}", id)).await
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// GET /v1/settings
    pub async fn list_settings(&self) -> Response {
        self.get("/v1/settings").await
    }

    /// POST /v1/settings
    pub async fn create_setting(&self, body: &Value) -> Response {
        self.post("/v1/settings", body).await
    }

    /// GET /v1/settings/{name}
    pub async fn get_setting(&self, name: &str) -> Response {
        self.get(&format!("/v1/settings/{}", name)).await
    }

    /// PUT /v1/settings/{name}
    pub async fn update_setting(&self, name: &str, body: &Value) -> Response {
        self.put(&format!("/v1/settings/{}", name), body).await
    }

    /// DELETE /v1/settings/{name}
    pub async fn delete_setting(&self, name: &str) -> Response {
        self.delete(&format!("/v1/settings/{}", name)).await
    }

    // ========================================================================
    // Dashboard and reports
    // ========================================================================

    /// GET /v1/dashboard
    pub async fn dashboard(&self) -> Response {
        self.get("/v1/dashboard").await
    }

    /// GET /v1/dashboard?userId={user_id}
    pub async fn dashboard_for_user(&self, user_id: i64) -> Response {
        self.get(&format!("/v1/dashboard?userId={}", user_id)).await
    }

    /// GET /v1/reports/listening
    pub async fn listening_report(&self) -> Response {
        self.get("/v1/reports/listening").await
    }

    /// GET /v1/reports/listening?accountId={account_id}
    pub async fn listening_report_for_account(&self, account_id: i64) -> Response {
        self.get(&format!("/v1/reports/listening?accountId={}", account_id))
            .await
    }
}
