//! Market-data route handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::{ApiError, TIMEOUT_MESSAGE};
use crate::http::server::AppState;
use crate::resilience::FetchError;
use crate::resolve::resolve_id;

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    #[serde(rename = "tokenId")]
    token_id: Option<String>,
}

/// POST /api/market/price
pub async fn price(
    State(state): State<AppState>,
    Json(request): Json<PriceRequest>,
) -> Result<Response, ApiError> {
    let token_id = request
        .token_id
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::MissingInput("tokenId is required"))?;

    let id = resolve_id(&state.resolver, &token_id).await;

    match state.market.simple_price(&id).await {
        Ok(price) => Ok(Json(json!({ "token_id": id, "price": price })).into_response()),
        // The price endpoint adds a fallback sentinel on timeout so the
        // caller can render a placeholder instead of blocking.
        Err(FetchError::Timeout) => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": TIMEOUT_MESSAGE,
                "fallback_price": null,
            })),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    #[serde(rename = "tokenId")]
    token_id: Option<String>,
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    30
}

/// POST /api/market/history
pub async fn history(
    State(state): State<AppState>,
    Json(request): Json<HistoryRequest>,
) -> Result<Json<Value>, ApiError> {
    let token_id = request
        .token_id
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::MissingInput("tokenId is required"))?;

    let id = resolve_id(&state.resolver, &token_id).await;
    let chart = state.market.market_chart(&id, request.days).await?;

    Ok(Json(json!({
        "token_id": id,
        "days": request.days,
        "prices": chart.prices,
        "volumes": chart.volumes,
    })))
}

#[derive(Debug, Deserialize)]
pub struct DataQuery {
    #[serde(rename = "type", default = "default_kind")]
    kind: String,
    limit: Option<u32>,
}

fn default_kind() -> String {
    "market".to_string()
}

/// GET /api/market/data
///
/// Serves from the TTL cache when fresh; on upstream failure an expired
/// entry is returned as a stale fallback instead of an error.
pub async fn data(
    State(state): State<AppState>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Value>, ApiError> {
    let key = format!("market-data-{}", query.kind);

    if let Some(value) = state.market_cache.fresh(&key) {
        return Ok(Json(flagged(value, true, false)));
    }

    let result = match query.kind.as_str() {
        "global" => state.market.global_summary().await,
        "trending" => state.market.trending_summary().await,
        "top-coins" => state.market.top_coins(query.limit.unwrap_or(10)).await,
        _ => state.market.combined().await,
    };

    match result {
        Ok(value) => {
            state.market_cache.store(&key, value.clone());
            Ok(Json(flagged(value, false, false)))
        }
        Err(e) => match state.market_cache.stale(&key) {
            Some(value) => {
                tracing::warn!(key = %key, error = %e, "serving stale market data after upstream failure");
                Ok(Json(flagged(value, true, true)))
            }
            None => Err(e.into()),
        },
    }
}

/// DELETE /api/market/data
pub async fn clear_cache(State(state): State<AppState>) -> Json<Value> {
    state.market_cache.clear();
    Json(json!({ "message": "Cache cleared" }))
}

fn flagged(mut value: Value, cached: bool, stale: bool) -> Value {
    if let Some(obj) = value.as_object_mut() {
        obj.insert("cached".into(), json!(cached));
        if stale {
            obj.insert("stale".into(), json!(true));
            obj.insert(
                "error".into(),
                json!("Using cached data due to API error"),
            );
        }
        obj.insert(
            "timestamp".into(),
            json!(chrono::Utc::now().timestamp_millis()),
        );
    }
    value
}
