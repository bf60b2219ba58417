use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::server::AppState;
use crate::market::MarketCacheStats;
use crate::resolve::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct CacheReport {
    pub resolver: CacheStats,
    pub market: MarketCacheStats,
}

#[derive(Serialize)]
pub struct SessionSummary {
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SessionReport {
    pub active: usize,
    pub sessions: Vec<SessionSummary>,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_cache(State(state): State<AppState>) -> Json<CacheReport> {
    Json(CacheReport {
        resolver: state.resolver.cache_stats(),
        market: state.market_cache.stats(),
    })
}

/// Session tokens stay server-side; only identity and age are reported.
pub async fn get_sessions(State(state): State<AppState>) -> Json<SessionReport> {
    let sessions: Vec<SessionSummary> = state
        .sessions
        .active_sessions()
        .into_iter()
        .map(|s| SessionSummary {
            email: s.user.email,
            name: s.user.name,
            created_at: s.created_at,
        })
        .collect();

    Json(SessionReport {
        active: sessions.len(),
        sessions,
    })
}
