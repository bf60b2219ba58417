//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the token risk gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream market-data provider.
    pub upstream: UpstreamConfig,

    /// Per-call retry/timeout settings for upstream fetches.
    pub fetch: FetchConfig,

    /// Token search resolver settings.
    pub resolver: ResolverConfig,

    /// Aggregate market-data cache settings.
    pub cache: CacheConfig,

    /// Timeout configuration for the server itself.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Credentials accepted by the session store.
    pub auth: AuthConfig,

    /// Admin surface settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream market-data provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the provider API (no trailing slash).
    pub base_url: String,

    /// Optional API key, sent as `x-cg-demo-api-key` when non-empty.
    pub api_key: String,

    /// User-Agent header sent on every upstream request.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: String::new(),
            user_agent: "risk-gateway/0.1".to_string(),
        }
    }
}

/// Retry/timeout settings applied to every upstream fetch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-attempt timeout in milliseconds. The deadline applies to each
    /// attempt individually, not cumulatively across retries.
    pub timeout_ms: u64,

    /// Total number of attempts (1 = no retry).
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds. The delay after failed attempt
    /// `k` is `backoff_base_ms * k`. Applied only after timeouts and
    /// transport errors; HTTP-status failures retry immediately.
    pub backoff_base_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            max_attempts: 2,
            backoff_base_ms: 1_000,
        }
    }
}

/// Token search resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How long search results stay cached, in seconds.
    pub cache_ttl_secs: u64,

    /// Maximum number of ranked results returned per query.
    pub max_results: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            max_results: 10,
        }
    }
}

/// Aggregate market-data cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long aggregate market data stays fresh, in seconds. Expired
    /// entries are still served as a stale fallback when the upstream fails.
    pub market_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { market_ttl_secs: 60 }
    }
}

/// Timeout configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Credentials accepted by the session store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Admin login email.
    pub admin_email: String,

    /// Admin login password.
    pub admin_password: String,

    /// Display name attached to the admin session.
    pub admin_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@example.com".to_string(),
            // WARNING: This is a placeholder! Change this in production.
            admin_password: "CHANGE_ME_IN_PRODUCTION".to_string(),
            admin_name: "Admin User".to_string(),
        }
    }
}

/// Admin surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}
