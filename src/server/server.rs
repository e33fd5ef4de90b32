use anyhow::Result;
use std::time::Duration;

use tower_http::services::ServeDir;
use tracing::info;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use super::{
    library_routes::make_library_routes, log_requests, report_routes::make_report_routes,
    state::*, ServerConfig,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

pub fn make_app(config: ServerConfig, library_store: GuardedLibraryStore) -> Router {
    let state = ServerState::new(config.clone(), library_store);

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(make_library_routes(state.clone()))
        .merge(make_report_routes(state.clone()));

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(health))
            .with_state(state.clone()),
    };

    home_router
        .nest("/v1", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(config: ServerConfig, library_store: GuardedLibraryStore) -> Result<()> {
    let port = config.port;
    let app = make_app(config, library_store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Listening on 127.0.0.1:{}", port);

    Ok(axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?)
}
