//! Session login/logout route handlers.

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::http::error::ApiError;
use crate::http::server::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = request
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or(ApiError::MissingInput("email is required"))?;
    let password = request
        .password
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingInput("password is required"))?;

    let session = state
        .sessions
        .login(&email, &password)
        .map_err(|_| ApiError::Unauthorized)?;

    Ok(Json(json!({
        "success": true,
        "token": session.token,
        "user": session.user,
    })))
}

/// POST /api/auth/logout
///
/// The session token travels in the Authorization header as a Bearer
/// value; an unknown or malformed token is reported, not an error.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|t| Uuid::parse_str(t.trim()).ok());

    let success = match token {
        Some(token) => state.sessions.logout(&token),
        None => false,
    };

    Json(json!({ "success": success }))
}
