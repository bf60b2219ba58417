//! HTTP routing subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, request ID)
//!     → market.rs / resolve.rs / analyze.rs / validation.rs / auth.rs (handlers)
//!     → error.rs (failure → {error} JSON + status)
//!     → Send to client
//! ```

pub mod analyze;
pub mod auth;
pub mod error;
pub mod market;
pub mod resolve;
pub mod server;
pub mod validation;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
