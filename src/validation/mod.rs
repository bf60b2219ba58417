//! Cross-source data validation.
//!
//! Compares the critical market fields for one token across several data
//! sources, computes a reliability-weighted consensus per field, flags
//! outliers and anomalies, and scores the overall agreement. The source
//! readings themselves arrive through a [`SourceFeed`] implementation
//! injected into the application state; the shipped [`HashedSourceFeed`]
//! is a deterministic stand-in, the same seam the quick-scan feed uses.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::fnv1a;

pub const VALIDATION_VERSION: &str = "1.0";

/// Known sources and their reliability weights.
const SOURCES: &[(&str, f64)] = &[
    ("CoinGecko", 0.95),
    ("Mobula", 0.88),
    ("Tokenview", 0.82),
    ("CoinMarketCap", 0.90),
];

const DEFAULT_RELIABILITY: f64 = 0.5;
const MIN_SOURCES: usize = 2;

const CRITICAL_FIELDS: [&str; 5] = [
    "current_price",
    "market_cap",
    "total_volume",
    "circulating_supply",
    "total_supply",
];

fn reliability(source: &str) -> f64 {
    SOURCES
        .iter()
        .find(|(name, _)| *name == source)
        .map(|(_, score)| *score)
        .unwrap_or(DEFAULT_RELIABILITY)
}

/// Allowed relative variance per field before readings count as divergent.
fn variance_threshold(field: &str) -> f64 {
    match field {
        "current_price" => 0.05,
        "market_cap" => 0.10,
        "total_volume" => 0.15,
        "circulating_supply" | "total_supply" => 0.02,
        _ => 0.10,
    }
}

/// Weight of each field in the overall confidence.
fn field_weight(field: &str) -> f64 {
    match field {
        "current_price" => 0.30,
        "market_cap" => 0.25,
        "total_volume" => 0.20,
        "circulating_supply" => 0.15,
        "total_supply" => 0.10,
        _ => 0.10,
    }
}

/// The critical market fields as reported by one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceReading {
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_volume: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub total_supply: Option<f64>,
}

impl SourceReading {
    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "current_price" => self.current_price,
            "market_cap" => self.market_cap,
            "total_volume" => self.total_volume,
            "circulating_supply" => self.circulating_supply,
            "total_supply" => self.total_supply,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Valid,
    Warning,
    Error,
}

/// Validation outcome for one field across all sources.
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidation {
    pub field: &'static str,
    pub sources: BTreeMap<String, f64>,
    pub consensus_value: Option<f64>,
    pub confidence_score: f64,
    pub discrepancies: Vec<String>,
    pub validation_status: FieldStatus,
    pub resolution_method: &'static str,
}

/// Full cross-source report for one token.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub token_id: String,
    pub timestamp: DateTime<Utc>,
    pub overall_confidence: f64,
    pub validation_results: Vec<FieldValidation>,
    pub data_quality_score: f64,
    pub anomalies_detected: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Validate one token's readings across sources.
pub fn validate_token_data(
    token_id: &str,
    readings: &BTreeMap<String, SourceReading>,
) -> ValidationReport {
    let mut results = Vec::with_capacity(CRITICAL_FIELDS.len());
    let mut anomalies = Vec::new();

    for field in CRITICAL_FIELDS {
        let validation = validate_field(field, readings);
        if validation.validation_status == FieldStatus::Error {
            anomalies.push(format!("Critical discrepancy in {field}"));
        }
        results.push(validation);
    }

    let overall_confidence = overall_confidence(&results);
    let data_quality_score = data_quality_score(&results, readings);
    anomalies.extend(detect_anomalies(readings, &results));
    let recommendations = recommendations(&results, overall_confidence);

    ValidationReport {
        token_id: token_id.to_string(),
        timestamp: Utc::now(),
        overall_confidence,
        validation_results: results,
        data_quality_score,
        anomalies_detected: anomalies,
        recommendations,
    }
}

fn validate_field(
    field: &'static str,
    readings: &BTreeMap<String, SourceReading>,
) -> FieldValidation {
    let mut sources = BTreeMap::new();
    for (name, reading) in readings {
        if let Some(value) = reading.get(field) {
            sources.insert(name.clone(), value);
        }
    }

    if sources.len() < MIN_SOURCES {
        return FieldValidation {
            field,
            discrepancies: vec![format!(
                "Insufficient data sources ({} < {MIN_SOURCES})",
                sources.len()
            )],
            consensus_value: None,
            confidence_score: 0.0,
            validation_status: FieldStatus::Error,
            resolution_method: "insufficient_data",
            sources,
        };
    }

    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (name, value) in &sources {
        let weight = reliability(name);
        weighted_sum += value * weight;
        total_weight += weight;
    }
    let consensus = weighted_sum / total_weight;

    let variance = relative_variance(sources.values().copied(), consensus);
    let threshold = variance_threshold(field);

    let mut discrepancies = Vec::new();
    if consensus != 0.0 {
        for (name, value) in &sources {
            let deviation = ((value - consensus) / consensus).abs();
            if deviation > threshold {
                discrepancies.push(format!(
                    "{name}: {value} deviates by {:.1}% from consensus",
                    deviation * 100.0
                ));
            }
        }
    }

    let validation_status = if variance > threshold * 2.0 {
        FieldStatus::Error
    } else if variance > threshold {
        FieldStatus::Warning
    } else {
        FieldStatus::Valid
    };

    let confidence_score = field_confidence(field, variance, &sources);
    let resolution_method = match validation_status {
        FieldStatus::Valid => "consensus_agreement",
        FieldStatus::Warning if discrepancies.len() > 1 => "weighted_average",
        FieldStatus::Warning => "majority_consensus",
        FieldStatus::Error => "manual_review_required",
    };

    FieldValidation {
        field,
        sources,
        consensus_value: Some(consensus),
        confidence_score,
        discrepancies,
        validation_status,
        resolution_method,
    }
}

/// Root-mean-square of the relative deviations from consensus.
fn relative_variance(values: impl Iterator<Item = f64>, consensus: f64) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() <= 1 || consensus == 0.0 {
        return 0.0;
    }
    let sum: f64 = values
        .iter()
        .map(|v| ((v - consensus) / consensus).powi(2))
        .sum();
    (sum / values.len() as f64).sqrt()
}

fn field_confidence(field: &str, variance: f64, sources: &BTreeMap<String, f64>) -> f64 {
    let mut confidence = 0.5;

    confidence += (sources.len() as f64 / 4.0).min(0.25);
    confidence -= (variance / variance_threshold(field)).min(1.0) * 0.3;

    let known: Vec<f64> = sources
        .keys()
        .filter_map(|name| {
            SOURCES
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, score)| *score)
        })
        .collect();
    if !known.is_empty() {
        let average = known.iter().sum::<f64>() / known.len() as f64;
        confidence += (average - 0.5) * 0.25;
    }

    confidence.clamp(0.0, 1.0)
}

fn overall_confidence(results: &[FieldValidation]) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for result in results {
        let weight = field_weight(result.field);
        weighted += result.confidence_score * weight;
        total_weight += weight;
    }
    if total_weight > 0.0 {
        weighted / total_weight
    } else {
        0.0
    }
}

fn data_quality_score(
    results: &[FieldValidation],
    readings: &BTreeMap<String, SourceReading>,
) -> f64 {
    let mut score = 0.5;

    if !readings.is_empty() {
        let expected = 10.0;
        let available: usize = readings
            .values()
            .map(|r| CRITICAL_FIELDS.iter().filter(|f| r.get(f).is_some()).count())
            .sum();
        let completeness = (available as f64 / (expected * readings.len() as f64)).min(1.0);
        score += completeness * 0.3;
    }

    if !results.is_empty() {
        let valid = results
            .iter()
            .filter(|r| r.validation_status == FieldStatus::Valid)
            .count();
        score += (valid as f64 / results.len() as f64) * 0.4;
    }

    // Freshness placeholder: readings carry no timestamps yet.
    score += 0.9 * 0.2;

    score.clamp(0.0, 1.0)
}

fn detect_anomalies(
    readings: &BTreeMap<String, SourceReading>,
    results: &[FieldValidation],
) -> Vec<String> {
    let mut anomalies = Vec::new();

    for (name, reading) in readings {
        if matches!(reading.current_price, Some(price) if price < 0.0) {
            anomalies.push(format!("{name}: Negative price detected"));
        }

        if let (Some(cap), Some(price), Some(circulating)) = (
            reading.market_cap,
            reading.current_price,
            reading.circulating_supply,
        ) {
            if cap != 0.0 {
                let deviation = ((price * circulating - cap) / cap).abs();
                if deviation > 0.1 {
                    anomalies.push(format!("{name}: Market cap calculation mismatch"));
                }
            }
        }

        if let (Some(total), Some(circulating)) =
            (reading.total_supply, reading.circulating_supply)
        {
            if circulating > total {
                anomalies.push(format!("{name}: Circulating supply exceeds total supply"));
            }
        }
    }

    if let Some(price) = results.iter().find(|r| r.field == "current_price") {
        if price.confidence_score < 0.3 {
            anomalies.push("Significant price discrepancies across sources".to_string());
        }
    }

    anomalies
}

fn recommendations(results: &[FieldValidation], overall_confidence: f64) -> Vec<String> {
    let mut out = Vec::new();

    if overall_confidence < 0.5 {
        out.push("LOW CONFIDENCE: Data validation shows significant discrepancies".to_string());
        out.push("Consider using additional data sources for verification".to_string());
    } else if overall_confidence < 0.7 {
        out.push("MODERATE CONFIDENCE: Some data inconsistencies detected".to_string());
        out.push("Monitor for data quality improvements".to_string());
    } else {
        out.push("HIGH CONFIDENCE: Data validation successful".to_string());
    }

    let errors: Vec<&str> = results
        .iter()
        .filter(|r| r.validation_status == FieldStatus::Error)
        .map(|r| r.field)
        .collect();
    if !errors.is_empty() {
        out.push(format!("Manual review required for: {}", errors.join(", ")));
    }

    let warnings: Vec<&str> = results
        .iter()
        .filter(|r| r.validation_status == FieldStatus::Warning)
        .map(|r| r.field)
        .collect();
    if !warnings.is_empty() {
        out.push(format!("Monitor data quality for: {}", warnings.join(", ")));
    }

    if results.iter().any(|r| r.confidence_score < 0.5) {
        out.push("Consider excluding unreliable data sources from analysis".to_string());
    }

    out
}

/// Source of per-provider market readings for one token.
#[async_trait]
pub trait SourceFeed: Send + Sync {
    async fn readings(&self, token_id: &str) -> BTreeMap<String, SourceReading>;
}

/// Deterministic stand-in feed: every reading derives from a stable hash
/// of (source, token, field), so repeated validations of the same token
/// agree and tests can assert exact outcomes.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashedSourceFeed;

#[async_trait]
impl SourceFeed for HashedSourceFeed {
    async fn readings(&self, token_id: &str) -> BTreeMap<String, SourceReading> {
        let mut out = BTreeMap::new();
        for (source, _) in SOURCES.iter().take(3) {
            let jitter =
                |field: &str, range: u64| (fnv1a(&format!("{source}:{token_id}:{field}")) % range) as f64;

            out.insert(
                (*source).to_string(),
                SourceReading {
                    current_price: Some(50_000.0 + jitter("price", 1_000)),
                    market_cap: Some(1.0e9 + jitter("cap", 100_000_000)),
                    total_volume: Some(5.0e7 + jitter("volume", 10_000_000)),
                    circulating_supply: Some(19_000_000.0 + jitter("supply", 100_000)),
                    total_supply: Some(21_000_000.0),
                },
            );
        }
        out
    }
}
