//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID, metrics)
//! - Assemble the shared application state
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::{HashedRiskFeed, RiskFeed};
use crate::config::GatewayConfig;
use crate::http::{analyze, auth, market, resolve, validation};
use crate::market::{MarketCache, MarketClient};
use crate::observability::metrics;
use crate::resilience::{ResilientFetcher, UpstreamTarget};
use crate::resolve::TokenResolver;
use crate::session::SessionStore;
use crate::validation::{HashedSourceFeed, SourceFeed};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub resolver: Arc<TokenResolver>,
    pub market: Arc<MarketClient>,
    pub market_cache: Arc<MarketCache>,
    pub risk_feed: Arc<dyn RiskFeed>,
    pub source_feed: Arc<dyn SourceFeed>,
    pub sessions: Arc<SessionStore>,
}

/// HTTP server for the token risk gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server with the default (deterministic) risk feed.
    pub fn new(config: GatewayConfig) -> Self {
        Self::with_risk_feed(config, Arc::new(HashedRiskFeed))
    }

    /// Create a server with an injected risk feed. This is the seam for
    /// swapping the stand-in scan data for a live provider.
    pub fn with_risk_feed(config: GatewayConfig, risk_feed: Arc<dyn RiskFeed>) -> Self {
        let fetcher = ResilientFetcher::new();
        let target = UpstreamTarget::from_config(&config.upstream, &config.fetch);

        let state = AppState {
            resolver: Arc::new(TokenResolver::new(
                fetcher.clone(),
                target.clone(),
                &config.resolver,
            )),
            market: Arc::new(MarketClient::new(fetcher, target)),
            market_cache: Arc::new(MarketCache::new(Duration::from_secs(
                config.cache.market_ttl_secs,
            ))),
            risk_feed,
            source_feed: Arc::new(HashedSourceFeed),
            sessions: Arc::new(SessionStore::new(config.auth.clone())),
            config: Arc::new(config),
        };

        let router = Self::build_router(state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        Router::new()
            .route("/health", get(health))
            .route("/api/market/price", post(market::price))
            .route("/api/market/history", post(market::history))
            .route(
                "/api/market/data",
                get(market::data).delete(market::clear_cache),
            )
            .route("/api/resolve", post(resolve::resolve))
            .route("/api/analyze/quick", post(analyze::quick))
            .route("/api/validation/cross-source", post(validation::cross_source))
            .route("/api/auth/login", post(auth::login))
            .route("/api/auth/logout", post(auth::logout))
            .merge(crate::admin::admin_router(state.clone()))
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops on Ctrl+C or when the shutdown channel fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = shutdown.recv() => {},
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Record a counter and latency histogram for every request.
async fn track_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    metrics::record_request(&method, &path, response.status().as_u16(), start_time);
    response
}
