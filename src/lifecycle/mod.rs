//! Lifecycle management subsystem.
//!
//! Startup is ordered in `main`: config first, then observability, then
//! the listener. Shutdown is coordinated through a broadcast channel so
//! tests and signal handlers can stop the server the same way.

pub mod shutdown;

pub use shutdown::Shutdown;
