//! Resilient upstream fetch wrapper.
//!
//! # Responsibilities
//! - Issue one HTTP request per attempt with a strict per-attempt deadline
//! - Retry up to a bounded number of attempts
//! - Classify the terminal outcome (success, timeout, upstream error,
//!   network error) for the caller to map to a response
//!
//! # Design Decisions
//! - The timeout applies per attempt, not cumulatively across retries
//! - Non-2xx responses retry immediately with no backoff; timeouts and
//!   transport errors back off linearly in the attempt number. The
//!   asymmetry mirrors the upstream routes this wrapper generalizes and
//!   is intentional.
//! - Each invocation is independent; no shared mutable state beyond the
//!   transport's own connection pool

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;
use url::Url;

use crate::config::{FetchConfig, UpstreamConfig};
use crate::resilience::backoff::linear_backoff;

/// Immutable description of a single upstream call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: Url,
    pub headers: HeaderMap,
    /// Deadline for each individual attempt.
    pub timeout: Duration,
    /// Total number of attempts (1 = no retry).
    pub max_attempts: u32,
    /// Base delay for linear backoff between attempts, in milliseconds.
    pub backoff_base_ms: u64,
}

impl RequestDescriptor {
    pub fn new(url: Url) -> Self {
        let defaults = FetchConfig::default();
        Self {
            url,
            headers: HeaderMap::new(),
            timeout: Duration::from_millis(defaults.timeout_ms),
            max_attempts: defaults.max_attempts,
            backoff_base_ms: defaults.backoff_base_ms,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }
}

/// Outcome of one attempt. Never escapes the retry loop.
#[derive(Debug)]
enum AttemptOutcome {
    Success(String),
    HttpError(u16, String),
    TimedOut,
    NetworkError(String),
}

/// Terminal classification of an exhausted fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every allowed attempt exceeded the per-attempt deadline (or the
    /// final one did after other failures).
    #[error("upstream request timed out")]
    Timeout,

    /// The final attempt completed with a non-2xx status.
    #[error("upstream returned status {status}")]
    Upstream { status: u16, body: String },

    /// The final attempt failed at the transport level.
    #[error("network error: {0}")]
    Network(String),
}

/// Issues upstream requests with per-attempt timeout and bounded retry.
///
/// Cloning is cheap; the inner client shares its connection pool.
#[derive(Debug, Clone, Default)]
pub struct ResilientFetcher {
    client: reqwest::Client,
}

impl ResilientFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Execute the described GET request, retrying per its limits.
    ///
    /// Exactly one terminal result is produced per call. Intermediate
    /// attempt failures are logged and never surface to the caller;
    /// once attempts are exhausted, the most recent failure is what the
    /// caller sees.
    pub async fn fetch_with_retry(&self, desc: &RequestDescriptor) -> Result<String, FetchError> {
        let max_attempts = desc.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.attempt(desc).await {
                AttemptOutcome::Success(body) => return Ok(body),
                AttemptOutcome::HttpError(status, body) => {
                    if attempt >= max_attempts {
                        return Err(FetchError::Upstream { status, body });
                    }
                    // Non-2xx falls straight through to the next attempt.
                    tracing::debug!(
                        attempt,
                        status,
                        url = %desc.url,
                        "upstream returned error status, retrying"
                    );
                }
                AttemptOutcome::TimedOut => {
                    if attempt >= max_attempts {
                        return Err(FetchError::Timeout);
                    }
                    let delay = linear_backoff(attempt, desc.backoff_base_ms);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        url = %desc.url,
                        "attempt timed out, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
                AttemptOutcome::NetworkError(message) => {
                    if attempt >= max_attempts {
                        return Err(FetchError::Network(message));
                    }
                    let delay = linear_backoff(attempt, desc.backoff_base_ms);
                    tracing::debug!(
                        attempt,
                        error = %message,
                        delay_ms = delay.as_millis() as u64,
                        url = %desc.url,
                        "network error, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Fetch and parse a JSON body.
    pub async fn fetch_json(
        &self,
        desc: &RequestDescriptor,
    ) -> Result<serde_json::Value, FetchError> {
        let body = self.fetch_with_retry(desc).await?;
        serde_json::from_str(&body)
            .map_err(|e| FetchError::Network(format!("invalid JSON from upstream: {e}")))
    }

    /// One attempt: send the request and read the full body under a
    /// single deadline.
    async fn attempt(&self, desc: &RequestDescriptor) -> AttemptOutcome {
        let call = async {
            let response = self
                .client
                .get(desc.url.clone())
                .headers(desc.headers.clone())
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(desc.timeout, call).await {
            Err(_) => AttemptOutcome::TimedOut,
            Ok(Err(e)) => AttemptOutcome::NetworkError(e.to_string()),
            Ok(Ok((status, body))) => {
                if status.is_success() {
                    AttemptOutcome::Success(body)
                } else {
                    AttemptOutcome::HttpError(status.as_u16(), body)
                }
            }
        }
    }
}

/// Descriptor factory bound to one upstream provider.
///
/// Bundles the base URL, standing headers, and retry limits from config
/// so call sites only supply the path and query.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
    max_attempts: u32,
    backoff_base_ms: u64,
}

impl UpstreamTarget {
    pub fn from_config(upstream: &UpstreamConfig, fetch: &FetchConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        match HeaderValue::from_str(&upstream.user_agent) {
            Ok(v) => {
                headers.insert(USER_AGENT, v);
            }
            Err(_) => tracing::warn!("upstream.user_agent is not a valid header value, skipping"),
        }

        if !upstream.api_key.is_empty() {
            match HeaderValue::from_str(&upstream.api_key) {
                Ok(v) => {
                    headers.insert("x-cg-demo-api-key", v);
                }
                Err(_) => tracing::warn!("upstream.api_key is not a valid header value, skipping"),
            }
        }

        Self {
            base_url: upstream.base_url.trim_end_matches('/').to_string(),
            headers,
            timeout: Duration::from_millis(fetch.timeout_ms),
            max_attempts: fetch.max_attempts,
            backoff_base_ms: fetch.backoff_base_ms,
        }
    }

    /// Build a descriptor for `path_and_query` relative to the base URL.
    pub fn descriptor(&self, path_and_query: &str) -> Result<RequestDescriptor, FetchError> {
        let url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path_and_query.trim_start_matches('/')
        ))
        .map_err(|e| FetchError::Network(format!("invalid upstream url: {e}")))?;

        Ok(RequestDescriptor::new(url)
            .with_headers(self.headers.clone())
            .with_timeout(self.timeout)
            .with_max_attempts(self.max_attempts)
            .with_backoff_base_ms(self.backoff_base_ms))
    }
}
