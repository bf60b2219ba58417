//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream provider:
//!     → fetcher.rs (per-attempt deadline, bounded retry loop)
//!     → On timeout/network failure: backoff.rs (linear delay, then retry)
//!     → On non-2xx: immediate retry, no delay
//!     → Terminal outcome classified for the route layer
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - The deadline covers one attempt, never the whole call
//! - Retries are transparent; only the last failure reaches the caller

pub mod backoff;
pub mod fetcher;

pub use fetcher::{FetchError, RequestDescriptor, ResilientFetcher, UpstreamTarget};
