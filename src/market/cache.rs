//! TTL cache for aggregate market data.
//!
//! Entries past their TTL are not returned as fresh, but they are kept
//! around: when the upstream fails, the route serves the expired entry as
//! a stale fallback rather than an error.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct MarketCacheStats {
    pub size: usize,
    pub oldest_entry_ms: u64,
}

struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

pub struct MarketCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl MarketCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// A still-fresh entry, or `None`.
    pub fn fresh(&self, key: &str) -> Option<Value> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Any entry regardless of age, for fallback when the upstream fails.
    pub fn stale(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn store(&self, key: &str, value: Value) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> MarketCacheStats {
        let oldest = self
            .entries
            .iter()
            .map(|entry| entry.stored_at.elapsed())
            .max()
            .unwrap_or(Duration::ZERO);

        MarketCacheStats {
            size: self.entries.len(),
            oldest_entry_ms: oldest.as_millis() as u64,
        }
    }
}
