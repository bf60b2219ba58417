//! Configuration validation.
//!
//! Serde handles syntactic checks; this module covers the semantic ones:
//! addresses must parse, the upstream base URL must be absolute, and the
//! fetch limits must describe at least one attempt. All violations are
//! collected and reported together, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.base_url '{0}' is not a valid absolute URL")]
    UpstreamUrl(String),

    #[error("fetch.max_attempts must be at least 1")]
    MaxAttempts,

    #[error("fetch.timeout_ms must be greater than 0")]
    FetchTimeout,

    #[error("timeouts.request_secs must be greater than 0")]
    RequestTimeout,

    #[error("resolver.max_results must be at least 1")]
    ResolverMaxResults,

    #[error("observability.metrics_address '{0}' is not a valid socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if url.has_host() => {}
        _ => errors.push(ValidationError::UpstreamUrl(
            config.upstream.base_url.clone(),
        )),
    }

    if config.fetch.max_attempts < 1 {
        errors.push(ValidationError::MaxAttempts);
    }

    if config.fetch.timeout_ms == 0 {
        errors.push(ValidationError::FetchTimeout);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.resolver.max_results == 0 {
        errors.push(ValidationError::ResolverMaxResults);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
