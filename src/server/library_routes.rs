//! REST surface for the library store: one route per entity-kind CRUD
//! operation plus the playlist↔track association. Handlers are thin; every
//! rule lives in the store.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::library::*;

use super::error::{ApiError, ApiResult};
use super::state::{GuardedLibraryStore, ServerState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UserFilter {
    pub user_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AccountFilter {
    pub account_id: Option<i64>,
}

type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

fn created<T>(record: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(record)))
}

// Users

async fn list_users(State(store): State<GuardedLibraryStore>) -> ApiResult<Vec<User>> {
    Ok(Json(store.list_users()?))
}

async fn create_user(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewUser>,
) -> Created<User> {
    created(store.create_user(input)?)
}

async fn get_user(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<User> {
    Ok(Json(store.get_user(id)?))
}

async fn update_user(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<UserPatch>,
) -> ApiResult<User> {
    Ok(Json(store.update_user(id, patch)?))
}

async fn delete_user(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_user(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Accounts

async fn list_accounts(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<AccountWithOwner>> {
    Ok(Json(store.list_accounts(filter.user_id)?))
}

async fn create_account(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewAccount>,
) -> Created<Account> {
    created(store.create_account(input)?)
}

async fn get_account(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Account> {
    Ok(Json(store.get_account(id)?))
}

async fn update_account(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<AccountPatch>,
) -> ApiResult<Account> {
    Ok(Json(store.update_account(id, patch)?))
}

async fn delete_account(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_account(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Tracks

async fn list_tracks(State(store): State<GuardedLibraryStore>) -> ApiResult<Vec<Track>> {
    Ok(Json(store.list_tracks()?))
}

async fn create_track(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewTrack>,
) -> Created<Track> {
    created(store.create_track(input)?)
}

async fn get_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Track> {
    Ok(Json(store.get_track(id)?))
}

async fn update_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<TrackPatch>,
) -> ApiResult<Track> {
    Ok(Json(store.update_track(id, patch)?))
}

async fn delete_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_track(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Playlists and the playlist↔track association

async fn list_playlists(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Vec<PlaylistWithStats>> {
    Ok(Json(store.list_playlists(filter.account_id)?))
}

async fn create_playlist(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewPlaylist>,
) -> Created<Playlist> {
    created(store.create_playlist(input)?)
}

async fn get_playlist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Playlist> {
    Ok(Json(store.get_playlist(id)?))
}

async fn update_playlist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<PlaylistPatch>,
) -> ApiResult<Playlist> {
    Ok(Json(store.update_playlist(id, patch)?))
}

async fn delete_playlist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_playlist(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_playlist_tracks(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<PlaylistTrackRow>> {
    Ok(Json(store.list_playlist_tracks(id)?))
}

async fn add_playlist_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(input): Json<NewPlaylistEntry>,
) -> Created<PlaylistEntry> {
    created(store.add_playlist_track(id, input)?)
}

async fn remove_playlist_track(
    State(store): State<GuardedLibraryStore>,
    Path((id, track_id)): Path<(i64, i64)>,
) -> ApiResult<serde_json::Value> {
    let removed = store.remove_playlist_track(id, track_id)?;
    Ok(Json(json!({ "removed": removed })))
}

// Listening events

async fn create_listening_event(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewListeningEvent>,
) -> Created<ListeningEvent> {
    created(store.create_listening_event(input)?)
}

async fn get_listening_event(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<ListeningEvent> {
    Ok(Json(store.get_listening_event(id)?))
}

async fn update_listening_event(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<ListeningEventPatch>,
) -> ApiResult<ListeningEvent> {
    Ok(Json(store.update_listening_event(id, patch)?))
}

async fn delete_listening_event(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_listening_event(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Devices

async fn list_devices(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Vec<DeviceWithAccount>> {
    Ok(Json(store.list_devices(filter.account_id)?))
}

async fn create_device(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewDevice>,
) -> Created<Device> {
    created(store.create_device(input)?)
}

async fn get_device(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Device> {
    Ok(Json(store.get_device(id)?))
}

async fn update_device(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<DevicePatch>,
) -> ApiResult<Device> {
    Ok(Json(store.update_device(id, patch)?))
}

async fn delete_device(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_device(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Subscriptions

async fn list_subscriptions(
    State(store): State<GuardedLibraryStore>,
) -> ApiResult<Vec<SubscriptionWithAccount>> {
    Ok(Json(store.list_subscriptions()?))
}

async fn create_subscription(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewSubscription>,
) -> Created<Subscription> {
    created(store.create_subscription(input)?)
}

async fn get_subscription(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<Subscription> {
    Ok(Json(store.get_subscription(id)?))
}

async fn update_subscription(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<SubscriptionPatch>,
) -> ApiResult<Subscription> {
    Ok(Json(store.update_subscription(id, patch)?))
}

async fn delete_subscription(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_subscription(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Automation rules

async fn list_rules(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Vec<RuleWithAccount>> {
    Ok(Json(store.list_rules(filter.account_id)?))
}

async fn create_rule(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewAutomationRule>,
) -> Created<AutomationRule> {
    created(store.create_rule(input)?)
}

async fn get_rule(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> ApiResult<AutomationRule> {
    Ok(Json(store.get_rule(id)?))
}

async fn update_rule(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
    Json(patch): Json<AutomationRulePatch>,
) -> ApiResult<AutomationRule> {
    Ok(Json(store.update_rule(id, patch)?))
}

async fn delete_rule(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    store.delete_rule(id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Settings (keyed by name, not id)

async fn list_settings(State(store): State<GuardedLibraryStore>) -> ApiResult<Vec<Setting>> {
    Ok(Json(store.list_settings()?))
}

async fn create_setting(
    State(store): State<GuardedLibraryStore>,
    Json(input): Json<NewSetting>,
) -> Created<Setting> {
    created(store.create_setting(input)?)
}

async fn get_setting(
    State(store): State<GuardedLibraryStore>,
    Path(name): Path<String>,
) -> ApiResult<Setting> {
    Ok(Json(store.get_setting(&name)?))
}

async fn update_setting(
    State(store): State<GuardedLibraryStore>,
    Path(name): Path<String>,
    Json(patch): Json<SettingPatch>,
) -> ApiResult<Setting> {
    Ok(Json(store.update_setting(&name, patch)?))
}

async fn delete_setting(
    State(store): State<GuardedLibraryStore>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    store.delete_setting(&name)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) fn make_library_routes(state: ServerState) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/users/{id}", put(update_user))
        .route("/users/{id}", delete(delete_user))
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/accounts/{id}", put(update_account))
        .route("/accounts/{id}", delete(delete_account))
        .route("/tracks", get(list_tracks))
        .route("/tracks", post(create_track))
        .route("/tracks/{id}", get(get_track))
        .route("/tracks/{id}", put(update_track))
        .route("/tracks/{id}", delete(delete_track))
        .route("/playlists", get(list_playlists))
        .route("/playlists", post(create_playlist))
        .route("/playlists/{id}", get(get_playlist))
        .route("/playlists/{id}", put(update_playlist))
        .route("/playlists/{id}", delete(delete_playlist))
        .route("/playlists/{id}/tracks", get(list_playlist_tracks))
        .route("/playlists/{id}/tracks", post(add_playlist_track))
        .route(
            "/playlists/{id}/tracks/{track_id}",
            delete(remove_playlist_track),
        )
        .route("/listening-events", post(create_listening_event))
        .route("/listening-events/{id}", get(get_listening_event))
        .route("/listening-events/{id}", put(update_listening_event))
        .route("/listening-events/{id}", delete(delete_listening_event))
        .route("/devices", get(list_devices))
        .route("/devices", post(create_device))
        .route("/devices/{id}", get(get_device))
        .route("/devices/{id}", put(update_device))
        .route("/devices/{id}", delete(delete_device))
        .route("/subscriptions", get(list_subscriptions))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/{id}", get(get_subscription))
        .route("/subscriptions/{id}", put(update_subscription))
        .route("/subscriptions/{id}", delete(delete_subscription))
        .route("/rules", get(list_rules))
        .route("/rules", post(create_rule))
        .route("/rules/{id}", get(get_rule))
        .route("/rules/{id}", put(update_rule))
        .route("/rules/{id}", delete(delete_rule))
        .route("/settings", get(list_settings))
        .route("/settings", post(create_setting))
        .route("/settings/{name}", get(get_setting))
        .route("/settings/{name}", put(update_setting))
        .route("/settings/{name}", delete(delete_setting))
        .with_state(state)
}
