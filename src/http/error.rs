//! Route-boundary error taxonomy.
//!
//! Every failure is converted to `{error: string}` JSON with an HTTP
//! status here; nothing crosses the route boundary uncaught. Retries have
//! already happened by the time a `FetchError` reaches this layer, so the
//! details are the most recent failure's.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::resilience::FetchError;

/// Message surfaced when every fetch attempt timed out.
pub const TIMEOUT_MESSAGE: &str = "Request timeout - market data temporarily unavailable";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Required input missing from the request body (400).
    #[error("{0}")]
    MissingInput(&'static str),

    /// Lookup target does not exist (404).
    #[error("{0}")]
    NotFound(&'static str),

    /// Credentials rejected (401).
    #[error("Invalid credentials")]
    Unauthorized,

    /// Exhausted upstream fetch: timeout → 503, HTTP error → status
    /// passthrough, transport error → 500.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::MissingInput(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, (*msg).to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Fetch(FetchError::Timeout) => {
                (StatusCode::SERVICE_UNAVAILABLE, TIMEOUT_MESSAGE.to_string())
            }
            ApiError::Fetch(FetchError::Upstream { status, .. }) => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                format!("upstream provider error {status}"),
            ),
            ApiError::Fetch(FetchError::Network(msg)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
