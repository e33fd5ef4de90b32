//! Payload builders and creation helpers shared across end-to-end tests
//!
//! The builders produce valid request bodies with sensible defaults; tests
//! override the fields they care about. The `create_*` helpers POST a
//! payload and return the new row's id, panicking on any non-201 response.

use super::client::TestClient;
use serde_json::{json, Value};

pub fn user_payload(display_name: &str) -> Value {
    json!({ "displayName": display_name })
}

pub fn account_payload(user_id: i64, external_user_id: &str) -> Value {
    json!({
        "externalUserId": external_user_id,
        "displayName": "Linked Account",
        "userId": user_id,
        "accountType": "premium",
        "accessToken": "access-token-xyz",
        "refreshToken": "refresh-token-xyz",
        "tokenExpiresAt": "2026-06-01T00:00:00.000Z",
        "scope": "user-read-private"
    })
}

pub fn track_payload(external_track_id: &str, name: &str) -> Value {
    json!({
        "externalTrackId": external_track_id,
        "name": name,
        "artist": "Test Artist",
        "album": "Test Album",
        "durationMs": 200_000
    })
}

pub fn playlist_payload(account_id: i64, external_playlist_id: &str, name: &str) -> Value {
    json!({
        "externalPlaylistId": external_playlist_id,
        "accountId": account_id,
        "name": name,
        "description": "A playlist for testing",
        "isPublic": true
    })
}

pub fn device_payload(account_id: i64, external_device_id: &str, name: &str) -> Value {
    json!({
        "externalDeviceId": external_device_id,
        "accountId": account_id,
        "name": name,
        "deviceType": "Speaker",
        "isActive": false,
        "volumePercent": 50
    })
}

pub fn subscription_payload(account_id: i64) -> Value {
    json!({
        "accountId": account_id,
        "planName": "Premium Individual",
        "productType": "premium",
        "currency": "USD",
        "nextBillingAmount": 10.99,
        "billingDate": "2026-07-01T00:00:00.000Z"
    })
}

pub fn rule_payload(account_id: i64, name: &str) -> Value {
    json!({
        "accountId": account_id,
        "name": name,
        "ruleType": "auto-add",
        "criteria": { "condition": "recently_liked", "days": 7 }
    })
}

pub fn setting_payload(name: &str, value: &str) -> Value {
    json!({
        "name": name,
        "value": value,
        "description": "A setting for testing"
    })
}

async fn created_id(response: reqwest::Response) -> i64 {
    assert_eq!(
        response.status(),
        reqwest::StatusCode::CREATED,
        "fixture creation failed"
    );
    let body: Value = response.json().await.expect("fixture response not JSON");
    body["id"].as_i64().expect("fixture response missing id")
}

pub async fn create_user(client: &TestClient, display_name: &str) -> i64 {
    created_id(client.create_user(&user_payload(display_name)).await).await
}

pub async fn create_account(client: &TestClient, user_id: i64, external_user_id: &str) -> i64 {
    created_id(
        client
            .create_account(&account_payload(user_id, external_user_id))
            .await,
    )
    .await
}

pub async fn create_track(client: &TestClient, external_track_id: &str, name: &str) -> i64 {
    created_id(
        client
            .create_track(&track_payload(external_track_id, name))
            .await,
    )
    .await
}

pub async fn create_playlist(
    client: &TestClient,
    account_id: i64,
    external_playlist_id: &str,
    name: &str,
) -> i64 {
    created_id(
        client
            .create_playlist(&playlist_payload(account_id, external_playlist_id, name))
            .await,
    )
    .await
}
