//! Token resolution route handler.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::resolve::disambiguation::{self, DisambiguationFactors};

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    query: Option<String>,
    disambiguation_factors: Option<DisambiguationFactors>,
}

/// POST /api/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<ResolveRequest>,
) -> Result<Json<Value>, ApiError> {
    let query = request
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or(ApiError::MissingInput("Query is required"))?;

    // Search failures degrade to an empty match list so the caller still
    // gets suggestions rather than an error.
    let results = match state.resolver.search(&query).await {
        Ok(results) => results,
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "token search failed");
            Vec::new()
        }
    };

    if results.is_empty() {
        let suggestions = disambiguation::suggest_alternatives(&state.resolver, &query, &[]).await;
        return Ok(Json(json!({
            "query": query,
            "resolved": false,
            "suggestions": suggestions,
            "message": "No exact matches found. Here are some suggestions:",
        })));
    }

    let total_matches = results.len();
    let mut results = results;
    let recommended = results.remove(0);

    if let Some(factors) = request
        .disambiguation_factors
        .as_ref()
        .filter(|_| total_matches > 1)
    {
        let outcome = disambiguation::disambiguate(recommended, results, factors);
        return Ok(Json(json!({
            "query": query,
            "resolved": true,
            "recommended_token": outcome.recommended,
            "confidence": outcome.confidence,
            "reasoning": outcome.reasoning,
            "alternatives": outcome.alternatives,
            "total_matches": total_matches,
        })));
    }

    let confidence = recommended.confidence_score;
    Ok(Json(json!({
        "query": query,
        "resolved": true,
        "recommended_token": recommended,
        "confidence": confidence,
        "alternatives": results,
        "total_matches": total_matches,
    })))
}
