//! Upstream market-data client.
//!
//! Thin typed wrappers over the provider endpoints the gateway exposes.
//! Every call goes through the resilient fetcher; this module only builds
//! descriptors and shapes responses.

use serde::Serialize;
use serde_json::{json, Value};

use crate::resilience::{FetchError, ResilientFetcher, UpstreamTarget};

/// One `[timestamp, price]` pair from the provider, reshaped.
#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub time: i64,
    pub price: f64,
}

/// One `[timestamp, volume]` pair from the provider, reshaped.
#[derive(Debug, Clone, Serialize)]
pub struct VolumePoint {
    pub time: i64,
    pub volume: f64,
}

/// Price and volume history for one token.
#[derive(Debug, Clone, Serialize)]
pub struct MarketChart {
    pub prices: Vec<PricePoint>,
    pub volumes: Vec<VolumePoint>,
}

/// Client for the upstream market-data provider.
pub struct MarketClient {
    fetcher: ResilientFetcher,
    target: UpstreamTarget,
}

impl MarketClient {
    pub fn new(fetcher: ResilientFetcher, target: UpstreamTarget) -> Self {
        Self { fetcher, target }
    }

    /// Current USD price for one token ID. `None` when the provider has
    /// no price for the ID.
    pub async fn simple_price(&self, id: &str) -> Result<Option<f64>, FetchError> {
        let desc = self
            .target
            .descriptor(&format!("simple/price?ids={id}&vs_currencies=usd"))?;
        let value = self.fetcher.fetch_json(&desc).await?;
        Ok(value.get(id).and_then(|v| v.get("usd")).and_then(Value::as_f64))
    }

    /// Price/volume history over `days` days. Granularity follows the
    /// provider convention: hourly up to two days, daily beyond.
    pub async fn market_chart(&self, id: &str, days: u32) -> Result<MarketChart, FetchError> {
        let interval = if days <= 2 { "hourly" } else { "daily" };
        let desc = self.target.descriptor(&format!(
            "coins/{id}/market_chart?vs_currency=usd&days={days}&interval={interval}"
        ))?;
        let value = self.fetcher.fetch_json(&desc).await?;

        Ok(MarketChart {
            prices: pairs(&value, "prices")
                .into_iter()
                .map(|(time, price)| PricePoint { time, price })
                .collect(),
            volumes: pairs(&value, "total_volumes")
                .into_iter()
                .map(|(time, volume)| VolumePoint { time, volume })
                .collect(),
        })
    }

    /// Global market summary (total cap, volume, BTC dominance).
    pub async fn global_summary(&self) -> Result<Value, FetchError> {
        let desc = self.target.descriptor("global")?;
        let value = self.fetcher.fetch_json(&desc).await?;
        let data = value.get("data").cloned().unwrap_or(Value::Null);

        Ok(json!({
            "totalMarketCap": data.pointer("/total_market_cap/usd"),
            "totalVolume": data.pointer("/total_volume/usd"),
            "btcDominance": data.pointer("/market_cap_percentage/btc"),
            "activeCryptocurrencies": data.get("active_cryptocurrencies"),
            "markets": data.get("markets"),
        }))
    }

    /// The provider's current trending list, trimmed to five entries.
    pub async fn trending_summary(&self) -> Result<Value, FetchError> {
        let desc = self.target.descriptor("search/trending")?;
        let value = self.fetcher.fetch_json(&desc).await?;

        let coins: Vec<Value> = value
            .get("coins")
            .and_then(Value::as_array)
            .map(|coins| {
                coins
                    .iter()
                    .take(5)
                    .filter_map(|entry| entry.get("item"))
                    .map(|item| {
                        json!({
                            "id": item.get("id"),
                            "name": item.get("name"),
                            "symbol": item.get("symbol"),
                            "market_cap_rank": item.get("market_cap_rank"),
                            "thumb": item.get("thumb"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({ "coins": coins }))
    }

    /// Top coins by market cap.
    pub async fn top_coins(&self, limit: u32) -> Result<Value, FetchError> {
        let desc = self.target.descriptor(&format!(
            "coins/markets?vs_currency=usd&order=market_cap_desc&per_page={limit}&page=1&sparkline=false"
        ))?;
        let value = self.fetcher.fetch_json(&desc).await?;

        let coins: Vec<Value> = value
            .as_array()
            .map(|coins| {
                coins
                    .iter()
                    .map(|coin| {
                        json!({
                            "id": coin.get("id"),
                            "symbol": coin.get("symbol"),
                            "name": coin.get("name"),
                            "current_price": coin.get("current_price"),
                            "price_change_percentage_24h": coin.get("price_change_percentage_24h"),
                            "market_cap_rank": coin.get("market_cap_rank"),
                            "market_cap": coin.get("market_cap"),
                            "image": coin.get("image"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(json!({ "coins": coins }))
    }

    /// Combined view: global summary plus the top five coins.
    pub async fn combined(&self) -> Result<Value, FetchError> {
        let global = self.global_summary().await?;
        let top = self.top_coins(5).await?;

        Ok(json!({
            "global": global,
            "topCoins": top.get("coins"),
        }))
    }
}

/// Extract `[timestamp, value]` pairs from a provider array field.
fn pairs(value: &Value, key: &str) -> Vec<(i64, f64)> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let row = row.as_array()?;
                    // providers emit timestamps as either ints or floats
                    Some((row.first()?.as_f64()? as i64, row.get(1)?.as_f64()?))
                })
                .collect()
        })
        .unwrap_or_default()
}
