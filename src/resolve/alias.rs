//! Fixed ticker-symbol alias table.

/// Common ticker symbols mapped to canonical provider IDs. Checked before
/// any network lookup.
const ALIASES: &[(&str, &str)] = &[
    ("btc", "bitcoin"),
    ("xbt", "bitcoin"),
    ("eth", "ethereum"),
    ("bnb", "binancecoin"),
    ("sol", "solana"),
    ("ada", "cardano"),
    ("xrp", "ripple"),
    ("doge", "dogecoin"),
    ("matic", "matic-network"),
    ("ton", "the-open-network"),
    ("trx", "tron"),
    ("dot", "polkadot"),
];

/// Look up a lowercased query in the alias table.
pub fn lookup(query: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == query)
        .map(|(_, id)| *id)
}

/// Whether a lowercased query already looks like a provider ID
/// (`[a-z0-9-]`, at least 3 characters).
pub fn is_bare_id(query: &str) -> bool {
    query.len() >= 3
        && query
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
