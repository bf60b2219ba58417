//! Token risk gateway library.
//!
//! Resolves cryptocurrency token queries, fetches market data from an
//! upstream provider through a resilient fetch wrapper, and serves JSON
//! endpoints for price, history, resolution, and quick risk scans.

pub mod admin;
pub mod analysis;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod market;
pub mod observability;
pub mod resilience;
pub mod resolve;
pub mod session;
pub mod validation;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{FetchError, RequestDescriptor, ResilientFetcher};
