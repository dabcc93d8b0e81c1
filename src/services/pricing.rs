//! Pricing table loader
//!
//! Loads per-model prices (USD per 1M tokens) from a CSV file with columns
//! `model,input_price_per_1m,output_price_per_1m,cache_read_price_per_1m,cache_write_price_per_1m`.
//! A missing file is not an error: it yields an empty table, meaning
//! "cost unavailable".

use crate::types::{Result, TokcountError, TokenBucket};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default pricing file name, looked up next to the executable
pub const DEFAULT_PRICING_FILE: &str = "model-cost.csv";

/// Tokens per pricing unit
const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// Pricing information for a model, in USD per 1M tokens
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct PricingEntry {
    pub input_price_per_1m: f64,
    pub output_price_per_1m: f64,
    pub cache_read_price_per_1m: f64,
    pub cache_write_price_per_1m: f64,
}

impl PricingEntry {
    /// Cost of a bucket's tokens at these rates
    pub fn cost_of(&self, bucket: &TokenBucket) -> f64 {
        calculate_cost(bucket.input, self.input_price_per_1m)
            + calculate_cost(bucket.output, self.output_price_per_1m)
            + calculate_cost(bucket.cache_write, self.cache_write_price_per_1m)
            + calculate_cost(bucket.cache_read, self.cache_read_price_per_1m)
    }
}

/// Cost of `tokens` at `price_per_1m`. Zero on either side is exactly 0.0.
pub fn calculate_cost(tokens: u64, price_per_1m: f64) -> f64 {
    if tokens == 0 || price_per_1m == 0.0 {
        return 0.0;
    }
    (tokens as f64 / TOKENS_PER_PRICE_UNIT) * price_per_1m
}

/// Raw CSV row; price cells stay strings so bad numbers can default to 0
#[derive(Deserialize)]
struct PricingRow {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    input_price_per_1m: Option<String>,
    #[serde(default)]
    output_price_per_1m: Option<String>,
    #[serde(default)]
    cache_read_price_per_1m: Option<String>,
    #[serde(default)]
    cache_write_price_per_1m: Option<String>,
}

fn parse_price(cell: Option<&str>) -> f64 {
    cell.and_then(|c| c.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

/// Model name to pricing entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingTable {
    models: HashMap<String, PricingEntry>,
}

impl PricingTable {
    /// Load pricing from `path`, or from the default location next to the
    /// executable when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::from_path(&Self::default_path()?),
        }
    }

    /// `model-cost.csv` in the directory of the running executable
    pub fn default_path() -> Result<PathBuf> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().ok_or_else(|| {
            TokcountError::Config("Failed to resolve executable directory".into())
        })?;
        Ok(dir.join(DEFAULT_PRICING_FILE))
    }

    /// Load pricing from a CSV file; a nonexistent file yields an empty table
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        if !headers.iter().any(|h| h == "model") {
            return Err(TokcountError::Pricing("missing 'model' column".into()));
        }

        let mut models = HashMap::new();
        for (index, row) in reader.deserialize::<PricingRow>().enumerate() {
            let row = row?;
            let model = match row.model.as_deref().map(str::trim) {
                Some(m) if !m.is_empty() => m.to_string(),
                _ => {
                    eprintln!(
                        "[tokcount] Warning: pricing row {} has no model, skipping",
                        index + 1
                    );
                    continue;
                }
            };

            // Last row for a model wins
            models.insert(
                model,
                PricingEntry {
                    input_price_per_1m: parse_price(row.input_price_per_1m.as_deref()),
                    output_price_per_1m: parse_price(row.output_price_per_1m.as_deref()),
                    cache_read_price_per_1m: parse_price(row.cache_read_price_per_1m.as_deref()),
                    cache_write_price_per_1m: parse_price(
                        row.cache_write_price_per_1m.as_deref(),
                    ),
                },
            );
        }

        Ok(Self { models })
    }

    /// Build a table from entries directly
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, PricingEntry)>,
    {
        Self {
            models: entries.into_iter().collect(),
        }
    }

    /// Exact-match lookup
    pub fn get(&self, model: &str) -> Option<&PricingEntry> {
        self.models.get(model)
    }

    /// Cost of a bucket for `model`; unpriced models cost exactly 0.0
    pub fn cost_for(&self, model: &str, bucket: &TokenBucket) -> f64 {
        self.get(model).map_or(0.0, |p| p.cost_of(bucket))
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Number of priced models
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}
