//! Read-only aggregation routes backing the dashboard and reporting views.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::library::{AccountOverview, ListeningReportRow};

use super::error::ApiResult;
use super::library_routes::{AccountFilter, UserFilter};
use super::state::{GuardedLibraryStore, ServerState};

async fn dashboard_overview(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<UserFilter>,
) -> ApiResult<Vec<AccountOverview>> {
    Ok(Json(store.dashboard_overview(filter.user_id)?))
}

async fn listening_report(
    State(store): State<GuardedLibraryStore>,
    Query(filter): Query<AccountFilter>,
) -> ApiResult<Vec<ListeningReportRow>> {
    Ok(Json(store.listening_report(filter.account_id)?))
}

pub(super) fn make_report_routes(state: ServerState) -> Router {
    Router::new()
        .route("/dashboard", get(dashboard_overview))
        .route("/reports/listening", get(listening_report))
        .with_state(state)
}
