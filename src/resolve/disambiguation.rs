//! Picking between several tokens that match the same query.
//!
//! When a search yields more than one candidate, caller-supplied factors
//! re-rank them and the outcome carries human-readable reasoning. When a
//! search yields nothing, alternative spellings of the query are tried
//! against the resolver instead.

use serde::Deserialize;

use crate::resolve::resolver::{ResolvedToken, TokenResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketCapPreference {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
}

/// Caller preferences for breaking ties between matched tokens.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DisambiguationFactors {
    pub market_cap_preference: Option<MarketCapPreference>,
    pub risk_tolerance: Option<RiskTolerance>,
}

/// Outcome of weighing the matches against the factors.
#[derive(Debug, Clone)]
pub struct Disambiguation {
    pub recommended: ResolvedToken,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub alternatives: Vec<ResolvedToken>,
}

/// Re-rank `first` and `rest` (the search results, best first) by
/// `confidence * 0.6 + factor_score * 0.4` and explain the winner.
pub fn disambiguate(
    first: ResolvedToken,
    rest: Vec<ResolvedToken>,
    factors: &DisambiguationFactors,
) -> Disambiguation {
    if rest.is_empty() {
        return Disambiguation {
            confidence: first.confidence_score,
            reasoning: vec!["Only one token matched the query".to_string()],
            alternatives: Vec::new(),
            recommended: first,
        };
    }

    let mut scored: Vec<(f64, ResolvedToken)> = std::iter::once(first)
        .chain(rest)
        .map(|token| {
            let combined = token.confidence_score * 0.6 + factor_score(&token, factors) * 0.4;
            (combined, token)
        })
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let (confidence, recommended) = scored.remove(0);
    let reasoning = reasoning(&recommended, factors);

    Disambiguation {
        confidence,
        reasoning,
        alternatives: scored.into_iter().map(|(_, token)| token).collect(),
        recommended,
    }
}

fn factor_score(token: &ResolvedToken, factors: &DisambiguationFactors) -> f64 {
    let mut score: f64 = 0.5;

    if let (Some(preference), Some(rank)) = (factors.market_cap_preference, token.market_cap_rank)
    {
        match preference {
            MarketCapPreference::High if rank <= 100 => score += 0.2,
            MarketCapPreference::Low if rank > 500 => score += 0.1,
            _ => {}
        }
    }

    // Market-cap rank stands in for risk until a live risk feed is wired
    // into resolution.
    if let (Some(tolerance), Some(rank)) = (factors.risk_tolerance, token.market_cap_rank) {
        match tolerance {
            RiskTolerance::Low if rank <= 50 => score += 0.1,
            RiskTolerance::High if rank > 200 => score += 0.05,
            _ => {}
        }
    }

    score.min(1.0)
}

fn reasoning(token: &ResolvedToken, factors: &DisambiguationFactors) -> Vec<String> {
    let mut out = Vec::new();

    match token.market_cap_rank {
        Some(rank) if rank <= 10 => {
            out.push("Top 10 cryptocurrency by market capitalization".to_string())
        }
        Some(rank) if rank <= 100 => {
            out.push("Well-established cryptocurrency in top 100".to_string())
        }
        _ => {}
    }

    if token.confidence_score > 0.9 {
        out.push("High confidence exact match".to_string());
    } else if token.confidence_score > 0.7 {
        out.push("Strong match for search query".to_string());
    }

    if factors.market_cap_preference == Some(MarketCapPreference::High)
        && matches!(token.market_cap_rank, Some(rank) if rank <= 50)
    {
        out.push("Matches preference for high market cap tokens".to_string());
    }

    if out.is_empty() {
        out.push("Best match based on search criteria".to_string());
    }
    out
}

/// Query the resolver with alternative spellings of `query` (cleaned,
/// space-stripped, hyphenated), deduplicated by token ID keeping the
/// highest confidence. Search failures on a variant are skipped.
pub async fn suggest_alternatives(
    resolver: &TokenResolver,
    query: &str,
    exclude: &[String],
) -> Vec<ResolvedToken> {
    let cleaned = query.trim().to_lowercase();
    let mut variants: Vec<String> = Vec::new();
    for candidate in [
        cleaned.clone(),
        cleaned.split_whitespace().collect::<String>(),
        cleaned.split_whitespace().collect::<Vec<_>>().join("-"),
    ] {
        if !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }

    let mut suggestions: Vec<ResolvedToken> = Vec::new();
    for variant in &variants {
        let Ok(results) = resolver.search(variant).await else {
            continue;
        };
        for token in results {
            if exclude.contains(&token.id) {
                continue;
            }
            match suggestions.iter_mut().find(|t| t.id == token.id) {
                Some(existing) if existing.confidence_score < token.confidence_score => {
                    *existing = token
                }
                Some(_) => {}
                None => suggestions.push(token),
            }
        }
    }

    suggestions.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    suggestions.truncate(5);
    suggestions
}
