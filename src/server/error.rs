use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::library::StoreError;

/// Wraps [`StoreError`] so handlers can `?` store calls straight into an
/// HTTP response.
pub(super) struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::ConstraintViolation(_) => StatusCode::CONFLICT,
            StoreError::ForeignKeyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Library store failure: {}", self.0);
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub(super) type ApiResult<T> = Result<Json<T>, ApiError>;
