pub mod auth;
pub mod handlers;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use self::auth::require_api_key;
use self::handlers::*;
use crate::http::server::AppState;

/// Admin routes, gated by the Bearer API key. The caller supplies the
/// router state.
pub fn admin_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache))
        .route("/admin/sessions", get(get_sessions))
        .layer(middleware::from_fn_with_state(state, require_api_key))
}
