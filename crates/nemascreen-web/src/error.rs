//! HTTP error mapping for handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nemascreen_common::error::NemascreenError;
use tracing::error;

/// Wraps the library error so handlers can use `?` and still produce a
/// sensible status code.
pub struct ApiError(NemascreenError);

impl From<NemascreenError> for ApiError {
    fn from(err: NemascreenError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            NemascreenError::NotFound(_) => StatusCode::NOT_FOUND,
            NemascreenError::InvalidWell(_)
            | NemascreenError::InvalidTile(_)
            | NemascreenError::Config(_) => StatusCode::BAD_REQUEST,
            NemascreenError::PlateExists(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }

        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}
