//! Quick risk-scan feed.
//!
//! The scan fields (holder concentration, liquidity, contract flags) come
//! from a [`RiskFeed`] implementation injected into the application state.
//! The shipped [`HashedRiskFeed`] is a deterministic stand-in that derives
//! every field from a stable hash of the token ID; a live implementation
//! backed by real holder/liquidity providers plugs in behind the same
//! trait without touching the routes.

use async_trait::async_trait;
use serde::Serialize;

use crate::resolve::ResolvedToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolderSummary {
    pub total_holders: u64,
    pub top_wallets_percentage: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiquiditySummary {
    pub total_liquidity_usd: f64,
    pub swap_activity_24h: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractSummary {
    pub verified: bool,
    pub age_months: u32,
    pub audit_status: &'static str,
}

/// Result of a quick scan for one token.
#[derive(Debug, Clone, Serialize)]
pub struct QuickScan {
    pub token: String,
    pub symbol: String,
    pub price: Option<f64>,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub holders: HolderSummary,
    pub liquidity: LiquiditySummary,
    pub contract: ContractSummary,
}

/// Source of quick-scan risk data.
#[async_trait]
pub trait RiskFeed: Send + Sync {
    async fn quick_scan(&self, token: &ResolvedToken, price: Option<f64>) -> QuickScan;
}

/// Deterministic stand-in feed: all fields derive from an FNV-1a hash of
/// the token ID, so repeated scans of the same token agree and tests can
/// assert exact values.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedRiskFeed;

const AUDIT_STATUSES: [&str; 5] = ["none", "pending", "passed", "failed", "warning"];

pub(crate) fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in input.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl RiskFeed for HashedRiskFeed {
    async fn quick_scan(&self, token: &ResolvedToken, price: Option<f64>) -> QuickScan {
        let hash = fnv1a(&token.id);

        let risk_score = (hash % 101) as u8;
        let risk_level = match risk_score {
            70.. => RiskLevel::High,
            40..=69 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };

        QuickScan {
            token: token.name.clone(),
            symbol: token.symbol.clone(),
            price,
            risk_level,
            risk_score,
            holders: HolderSummary {
                total_holders: (hash >> 8) % 100_000,
                top_wallets_percentage: ((hash >> 16) % 90) as u8,
            },
            liquidity: LiquiditySummary {
                total_liquidity_usd: ((hash >> 24) % 10_000_000) as f64,
                swap_activity_24h: ((hash >> 32) % 1_000_000) as f64,
            },
            contract: ContractSummary {
                verified: hash & 1 == 0,
                age_months: ((hash >> 40) % 24) as u32,
                audit_status: AUDIT_STATUSES[(hash >> 48) as usize % AUDIT_STATUSES.len()],
            },
        }
    }
}
