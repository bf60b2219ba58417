//! Token identification subsystem.
//!
//! # Data Flow
//! ```text
//! user query ("BTC", "Solana", "0x…")
//!     → alias.rs (fixed ticker table, no network)
//!     → bare-ID pattern check (already a provider ID)
//!     → resolver.rs (upstream /search, scored + cached)
//!     → provider ID, or the cleaned query as a last resort
//! ```

pub mod alias;
pub mod disambiguation;
pub mod resolver;

pub use disambiguation::DisambiguationFactors;
pub use resolver::{CacheStats, ResolvedToken, TokenResolver};

/// Resolve free-form user input to a provider token ID.
///
/// Checks, in order: the fixed alias table, the bare-identifier pattern
/// (`[a-z0-9-]{3,}`), then the search resolver. If nothing matches, the
/// trimmed, lowercased input is returned unchanged as a last resort.
pub async fn resolve_id(resolver: &TokenResolver, input: &str) -> String {
    let query = input.trim().to_lowercase();

    if let Some(id) = alias::lookup(&query) {
        return id.to_string();
    }

    if alias::is_bare_id(&query) {
        return query;
    }

    match resolver.search(&query).await {
        Ok(results) if !results.is_empty() => results[0].id.clone(),
        Ok(_) => query,
        Err(e) => {
            tracing::debug!(query = %query, error = %e, "search resolution failed, using raw query");
            query
        }
    }
}
