//! Search-based token resolution against the upstream provider.
//!
//! Queries the provider's `/search` endpoint through the resilient
//! fetcher, scores candidates by how exactly they match the query, ranks
//! them, and caches the ranked list for a few minutes.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;

use crate::config::ResolverConfig;
use crate::resilience::{FetchError, ResilientFetcher, UpstreamTarget};

/// A ranked search candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub confidence_score: f64,
    pub resolution_method: &'static str,
}

/// Cache size and age information for the admin surface.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub oldest_entry_ms: u64,
}

struct CachedSearch {
    results: Vec<ResolvedToken>,
    stored_at: Instant,
}

/// Resolves free-form queries to provider token IDs via upstream search.
pub struct TokenResolver {
    fetcher: ResilientFetcher,
    target: UpstreamTarget,
    cache: DashMap<String, CachedSearch>,
    cache_ttl: Duration,
    max_results: usize,
}

impl TokenResolver {
    pub fn new(fetcher: ResilientFetcher, target: UpstreamTarget, config: &ResolverConfig) -> Self {
        Self {
            fetcher,
            target,
            cache: DashMap::new(),
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            max_results: config.max_results,
        }
    }

    /// Search the provider for `query`, returning ranked candidates.
    ///
    /// Results are cached per lowercased query for the configured TTL.
    pub async fn search(&self, query: &str) -> Result<Vec<ResolvedToken>, FetchError> {
        let key = query.trim().to_lowercase();

        if let Some(entry) = self.cache.get(&key) {
            if entry.stored_at.elapsed() < self.cache_ttl {
                return Ok(entry.results.clone());
            }
        }

        let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
        let desc = self.target.descriptor(&format!("search?query={encoded}"))?;
        let value = self.fetcher.fetch_json(&desc).await?;

        let mut results: Vec<ResolvedToken> = value
            .get("coins")
            .and_then(|c| c.as_array())
            .map(|coins| {
                coins
                    .iter()
                    .filter_map(|coin| score_candidate(&key, coin))
                    .collect()
            })
            .unwrap_or_default();

        rank(&mut results);
        results.truncate(self.max_results);

        // Expired entries are never served; sweep them out on write so the
        // map does not grow one dead entry per distinct query.
        self.cache
            .retain(|_, entry| entry.stored_at.elapsed() < self.cache_ttl);
        self.cache.insert(
            key,
            CachedSearch {
                results: results.clone(),
                stored_at: Instant::now(),
            },
        );

        Ok(results)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        let oldest = self
            .cache
            .iter()
            .map(|entry| entry.stored_at.elapsed())
            .max()
            .unwrap_or(Duration::ZERO);

        CacheStats {
            size: self.cache.len(),
            oldest_entry_ms: oldest.as_millis() as u64,
        }
    }
}

/// Score one search candidate against the query. Exact symbol, name, and
/// ID matches stack on a 0.5 base; highly ranked tokens get a small bonus.
fn score_candidate(query: &str, coin: &serde_json::Value) -> Option<ResolvedToken> {
    let id = coin.get("id")?.as_str()?.to_string();
    let symbol = coin.get("symbol")?.as_str()?.to_string();
    let name = coin.get("name")?.as_str()?.to_string();
    let market_cap_rank = coin
        .get("market_cap_rank")
        .and_then(|r| r.as_u64())
        .map(|r| r as u32);
    let image = coin
        .get("large")
        .or_else(|| coin.get("thumb"))
        .and_then(|i| i.as_str())
        .map(String::from);

    let mut confidence: f64 = 0.5;
    if symbol.to_lowercase() == query {
        confidence += 0.4;
    }
    if name.to_lowercase() == query {
        confidence += 0.3;
    }
    if id == query {
        confidence += 0.2;
    }
    match market_cap_rank {
        Some(rank) if rank <= 10 => confidence += 0.1,
        Some(rank) if rank <= 100 => confidence += 0.05,
        _ => {}
    }

    Some(ResolvedToken {
        id,
        symbol: symbol.to_uppercase(),
        name,
        market_cap_rank,
        image,
        confidence_score: confidence.min(1.0),
        resolution_method: "search",
    })
}

/// Sort by confidence, breaking near-ties by market-cap rank.
fn rank(results: &mut [ResolvedToken]) {
    results.sort_by(|a, b| {
        if (a.confidence_score - b.confidence_score).abs() > 0.1 {
            b.confidence_score
                .partial_cmp(&a.confidence_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            match (a.market_cap_rank, b.market_cap_rank) {
                (Some(ra), Some(rb)) => ra.cmp(&rb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        }
    });
}
