//! Source reliability ranking
//!
//! Static ranking of data-source trustworthiness, used to break ties when
//! raw records disagree on a scalar attribute and no authoritative payload
//! resolves it. Kept as an immutable, injectable value so tests and callers
//! can substitute custom rankings without touching global state.

use propfuse_common::config::EngineConfig;
use std::collections::BTreeMap;

/// Reliability score for any source the table does not recognize
pub const DEFAULT_RELIABILITY: u32 = 25;

/// Built-in ranking, ordered most-specific/most-trusted first
///
/// Entries are matched by exact key, then by substring containment, so
/// versioned or namespaced source keys ("county-camden-records") still
/// resolve.
const DEFAULT_ENTRIES: &[(&str, u32)] = &[
    ("attom", 98),
    ("county", 90),
    ("tax", 88),
    ("mls", 82),
    ("zillow", 74),
    ("realtor", 72),
    ("redfin", 70),
    ("auction", 55),
    ("foreclosure", 52),
    ("craigslist", 30),
];

/// Immutable source-reliability table
#[derive(Debug, Clone)]
pub struct SourceReliabilityTable {
    entries: Vec<(String, u32)>,
    default_score: u32,
}

impl SourceReliabilityTable {
    /// Table with custom entries (matched in order) and default floor
    pub fn new(entries: Vec<(String, u32)>, default_score: u32) -> Self {
        Self {
            entries,
            default_score,
        }
    }

    /// Built-in ranking with configured overrides prepended
    ///
    /// Overrides win over built-in entries for both exact and substring
    /// matches.
    pub fn with_overrides(overrides: &BTreeMap<String, u32>) -> Self {
        let mut entries: Vec<(String, u32)> = overrides
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.extend(
            DEFAULT_ENTRIES
                .iter()
                .map(|(k, v)| (k.to_string(), *v)),
        );
        Self::new(entries, DEFAULT_RELIABILITY)
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_overrides(&config.reliability)
    }

    /// Score for a source key: exact match, then substring containment,
    /// then the default floor
    pub fn score(&self, source_key: &str) -> u32 {
        if let Some((_, score)) = self
            .entries
            .iter()
            .find(|(key, _)| key.as_str() == source_key)
        {
            return *score;
        }
        if let Some((_, score)) = self
            .entries
            .iter()
            .find(|(key, _)| source_key.contains(key.as_str()))
        {
            return *score;
        }
        self.default_score
    }
}

impl Default for SourceReliabilityTable {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}
