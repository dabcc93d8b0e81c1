//! Usage types for token accounting

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Fallback key used for a missing model name or an unparseable timestamp
pub const UNKNOWN_KEY: &str = "unknown";

/// One accounted assistant response extracted from a log line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageEntry {
    pub request_id: Option<String>,
    pub model: String,
    /// Calendar date (`YYYY-MM-DD`) or `"unknown"`
    pub date_key: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_write_tokens: u64,
    pub cache_read_tokens: u64,
    pub session_id: Option<String>,
}

impl UsageEntry {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.output_tokens)
            .saturating_add(self.cache_write_tokens)
            .saturating_add(self.cache_read_tokens)
    }

    /// Dedup key: the request id, if present and non-empty.
    /// Entries without one are never deduplicated.
    pub fn dedup_key(&self) -> Option<&str> {
        self.request_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Accumulator of token counts and messages along one dimension.
///
/// `cost` is `None` when no pricing was available ("unknown"), which is
/// distinct from `Some(0.0)` (a known zero cost).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TokenBucket {
    pub input: u64,
    pub output: u64,
    pub cache_write: u64,
    pub cache_read: u64,
    pub messages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl TokenBucket {
    pub fn add(&mut self, entry: &UsageEntry) {
        self.input = self.input.saturating_add(entry.input_tokens);
        self.output = self.output.saturating_add(entry.output_tokens);
        self.cache_write = self.cache_write.saturating_add(entry.cache_write_tokens);
        self.cache_read = self.cache_read.saturating_add(entry.cache_read_tokens);
        self.messages = self.messages.saturating_add(1);
    }

    /// Fold another bucket into this one. Costs stay unknown only if both are.
    pub fn merge(&mut self, other: &TokenBucket) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.cache_write = self.cache_write.saturating_add(other.cache_write);
        self.cache_read = self.cache_read.saturating_add(other.cache_read);
        self.messages = self.messages.saturating_add(other.messages);
        self.cost = match (self.cost, other.cost) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
        };
    }

    pub fn cache_tokens(&self) -> u64 {
        self.cache_write.saturating_add(self.cache_read)
    }

    pub fn total_tokens(&self) -> u64 {
        self.input
            .saturating_add(self.output)
            .saturating_add(self.cache_tokens())
    }
}

/// Aggregated accounting over the whole log corpus.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedView {
    pub by_model: HashMap<String, TokenBucket>,
    pub by_date: HashMap<String, TokenBucket>,
    /// Keyed by `(date_key, model)`
    pub by_date_model: HashMap<(String, String), TokenBucket>,
    pub total: TokenBucket,
    pub sessions: HashSet<String>,
}

impl AggregatedView {
    pub fn is_empty(&self) -> bool {
        self.total.messages == 0
    }
}

/// Presentation projection of an [`AggregatedView`], keys sorted.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub by_model: BTreeMap<String, TokenBucket>,
    pub by_date: BTreeMap<String, TokenBucket>,
    pub total: TokenBucket,
    pub sessions_count: usize,
}

impl Report {
    pub fn from_view(view: &AggregatedView) -> Self {
        Self {
            by_model: view
                .by_model
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            by_date: view
                .by_date
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            total: view.total.clone(),
            sessions_count: view.sessions.len(),
        }
    }

    /// Whether the report carries cost figures
    pub fn has_cost(&self) -> bool {
        self.total.cost.is_some()
    }
}
