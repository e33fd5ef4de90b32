//! End-to-end tests for playlists and the playlist↔track association.

mod common;

use common::*;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn setup(client: &TestClient) -> (i64, i64) {
    let user_id = create_user(client, "Alice").await;
    let account_id = create_account(client, user_id, "spotify_alice").await;
    let playlist_id = create_playlist(client, account_id, "pl_1", "Morning Mix").await;
    (account_id, playlist_id)
}

#[tokio::test]
async fn test_playlist_crud_lifecycle() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let response = client.get_playlist(playlist_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let playlist: Value = response.json().await.unwrap();
    assert_eq!(playlist["name"], "Morning Mix");
    assert_eq!(playlist["isPublic"], true);

    let response = client
        .update_playlist(playlist_id, &json!({"name": "Evening Mix", "isPublic": false}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["name"], "Evening Mix");
    assert_eq!(updated["isPublic"], false);
    assert_eq!(updated["description"], playlist["description"]);

    let response = client.delete_playlist(playlist_id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        client.get_playlist(playlist_id).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_playlist_listing_includes_track_count_and_owner() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (account_id, playlist_id) = setup(&client).await;

    let track_a = create_track(&client, "track_a", "First Song").await;
    let track_b = create_track(&client, "track_b", "Second Song").await;
    for track_id in [track_a, track_b] {
        let response = client
            .add_playlist_track(playlist_id, &json!({"trackId": track_id}))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let playlists: Vec<Value> = client
        .list_playlists_for_account(account_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0]["trackCount"], 2);
    assert_eq!(playlists[0]["externalUserId"], "spotify_alice");
}

#[tokio::test]
async fn test_playlist_tracks_ordered_by_position_then_added_at() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let track_a = create_track(&client, "track_a", "Track A").await;
    let track_b = create_track(&client, "track_b", "Track B").await;
    let track_c = create_track(&client, "track_c", "Track C").await;

    // Positioned entries come first in position order; the position-less
    // entry traverses last regardless of when it was added.
    client
        .add_playlist_track(
            playlist_id,
            &json!({"trackId": track_a, "addedAt": "2026-01-01T10:00:00Z"}),
        )
        .await;
    client
        .add_playlist_track(
            playlist_id,
            &json!({"trackId": track_b, "position": 2, "addedAt": "2026-01-01T11:00:00Z"}),
        )
        .await;
    client
        .add_playlist_track(
            playlist_id,
            &json!({"trackId": track_c, "position": 1, "addedAt": "2026-01-01T12:00:00Z"}),
        )
        .await;

    let rows: Vec<Value> = client
        .list_playlist_tracks(playlist_id)
        .await
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Track C", "Track B", "Track A"]);
    // Entries carry the joined track metadata.
    assert_eq!(rows[0]["externalTrackId"], "track_c");
    assert_eq!(rows[0]["durationMs"], 200_000);
}

#[tokio::test]
async fn test_add_track_to_missing_playlist_is_unprocessable() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let track_id = create_track(&client, "track_a", "Track A").await;

    // Missing either side of the link is a referential failure.
    let response = client
        .add_playlist_track(9999, &json!({"trackId": track_id}))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = client.list_playlist_tracks(9999).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_unknown_track_is_unprocessable() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let response = client
        .add_playlist_track(playlist_id, &json!({"trackId": 9999}))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_remove_playlist_track_removes_all_duplicates() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let track_id = create_track(&client, "track_a", "Track A").await;
    let other = create_track(&client, "track_b", "Track B").await;

    // Same track linked twice; both links go in one delete.
    for _ in 0..2 {
        client
            .add_playlist_track(playlist_id, &json!({"trackId": track_id}))
            .await;
    }
    client
        .add_playlist_track(playlist_id, &json!({"trackId": other}))
        .await;

    let response = client.remove_playlist_track(playlist_id, track_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["removed"], 2);

    let rows: Vec<Value> = client
        .list_playlist_tracks(playlist_id)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Track B");

    // Nothing left to remove.
    let response = client.remove_playlist_track(playlist_id, track_id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_playlist_keeps_tracks() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let track_id = create_track(&client, "track_a", "Track A").await;
    client
        .add_playlist_track(playlist_id, &json!({"trackId": track_id}))
        .await;

    client.delete_playlist(playlist_id).await;

    // The shared catalog entry outlives the playlist that referenced it.
    assert_eq!(
        client.get_track(track_id).await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_deleting_track_removes_its_playlist_entries() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let (_, playlist_id) = setup(&client).await;

    let track_id = create_track(&client, "track_a", "Track A").await;
    client
        .add_playlist_track(playlist_id, &json!({"trackId": track_id}))
        .await;

    client.delete_track(track_id).await;

    let rows: Vec<Value> = client
        .list_playlist_tracks(playlist_id)
        .await
        .json()
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_duplicate_external_track_id_conflicts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    create_track(&client, "track_a", "Track A").await;
    let response = client
        .create_track(&track_payload("track_a", "Track A Again"))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_track_rejects_negative_duration() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let mut payload = track_payload("track_a", "Track A");
    payload["durationMs"] = json!(-5);
    let response = client.create_track(&payload).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
