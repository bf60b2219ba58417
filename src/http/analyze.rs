//! Quick risk-scan route handler.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::resolve::alias;

#[derive(Debug, Deserialize)]
pub struct QuickScanRequest {
    #[serde(rename = "tokenSymbol")]
    token_symbol: Option<String>,
}

/// POST /api/analyze/quick
pub async fn quick(
    State(state): State<AppState>,
    Json(request): Json<QuickScanRequest>,
) -> Result<Json<Value>, ApiError> {
    let symbol = request
        .token_symbol
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingInput("Token symbol must be provided"))?;

    // Expand ticker aliases before searching so "btc" scans bitcoin.
    let query = symbol.trim().to_lowercase();
    let query = alias::lookup(&query)
        .map(str::to_string)
        .unwrap_or(query);

    let results = match state.resolver.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "token search failed during quick scan");
            Vec::new()
        }
    };

    let token = results
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound("Token not found"))?;

    let price = state.market.simple_price(&token.id).await.ok().flatten();
    let scan = state.risk_feed.quick_scan(&token, price).await;

    Ok(Json(json!({ "token": token, "scan": scan })))
}
