//! Market-data subsystem.
//!
//! # Data Flow
//! ```text
//! route handler
//!     → cache.rs (fresh hit short-circuits; stale kept for fallback)
//!     → client.rs (typed provider endpoints via the resilient fetcher)
//!     → shaped JSON back to the route layer
//! ```

pub mod cache;
pub mod client;

pub use cache::{MarketCache, MarketCacheStats};
pub use client::{MarketChart, MarketClient, PricePoint, VolumePoint};
