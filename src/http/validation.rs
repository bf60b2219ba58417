//! Cross-source validation route handler.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::validation::{validate_token_data, VALIDATION_VERSION};

#[derive(Debug, Deserialize)]
pub struct CrossSourceRequest {
    #[serde(rename = "tokenId")]
    token_id: Option<String>,
}

/// POST /api/validation/cross-source
pub async fn cross_source(
    State(state): State<AppState>,
    Json(request): Json<CrossSourceRequest>,
) -> Result<Json<Value>, ApiError> {
    let token_id = request
        .token_id
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::MissingInput("Token ID is required"))?;

    let readings = state.source_feed.readings(&token_id).await;
    let sources_checked: Vec<&String> = readings.keys().collect();
    let report = validate_token_data(&token_id, &readings);

    Ok(Json(json!({
        "report": report,
        "metadata": {
            "validation_timestamp": chrono::Utc::now(),
            "sources_checked": sources_checked,
            "validation_version": VALIDATION_VERSION,
        },
    })))
}
