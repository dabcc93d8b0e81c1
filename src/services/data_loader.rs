//! Data loading pipeline for the CLI
//!
//! Discovers log files, extracts them in parallel, folds every entry through
//! one [`Aggregator`] in file order, then applies pricing.

use std::path::PathBuf;

use crate::parsers::{ClaudeCodeParser, LogParser};
use crate::services::{apply_costs, Aggregator, PricingTable};
use crate::types::AggregatedView;

/// Where to read logs and pricing from
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Projects directory (default: ~/.claude/projects)
    pub data_dir: Option<PathBuf>,
    /// Pricing CSV (default: model-cost.csv next to the executable)
    pub pricing_path: Option<PathBuf>,
    /// Skip pricing entirely
    pub skip_cost: bool,
}

/// Aggregated data plus run statistics
#[derive(Debug)]
pub struct LoadResult {
    pub view: AggregatedView,
    pub file_count: usize,
    pub duplicates: u64,
}

/// Outcome of a load
#[derive(Debug)]
pub enum LoadOutcome {
    /// No log files were found (or the directory does not exist)
    NoFiles,
    Loaded(LoadResult),
}

/// Unified data loading service
pub struct DataLoaderService {
    parser: ClaudeCodeParser,
    pricing: PricingTable,
}

impl DataLoaderService {
    /// Build the service, loading pricing unless `skip_cost` is set.
    ///
    /// Pricing problems never fail the run: they degrade to an empty table.
    pub fn new(options: &LoadOptions) -> Self {
        let parser = match &options.data_dir {
            Some(dir) => ClaudeCodeParser::with_data_dir(dir.clone()),
            None => ClaudeCodeParser::new(),
        };

        let pricing = if options.skip_cost {
            PricingTable::default()
        } else {
            Self::load_pricing(options.pricing_path.as_deref())
        };

        Self::with_parts(parser, pricing)
    }

    pub fn with_parts(parser: ClaudeCodeParser, pricing: PricingTable) -> Self {
        Self { parser, pricing }
    }

    fn load_pricing(path: Option<&std::path::Path>) -> PricingTable {
        eprintln!("Loading pricing information...");
        let pricing = match PricingTable::load(path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("[tokcount] Warning: Failed to load pricing: {}", e);
                PricingTable::default()
            }
        };

        if pricing.is_empty() {
            eprintln!("No pricing data found. Costs will not be calculated.");
        } else {
            eprintln!("Loaded pricing for {} models.", pricing.model_count());
        }
        pricing
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Scan, extract, aggregate and price the whole corpus
    pub fn load(&self) -> LoadOutcome {
        eprintln!("Scanning Claude conversation logs...");

        let data_dir = self.parser.data_dir();
        if !data_dir.exists() {
            eprintln!("Claude projects directory not found: {}", data_dir.display());
            return LoadOutcome::NoFiles;
        }

        let files = self.parser.collect_files();
        if files.is_empty() {
            eprintln!("No JSONL files found.");
            return LoadOutcome::NoFiles;
        }
        eprintln!("Found {} conversation files.", files.len());

        // Extraction is parallel; the fold below stays in file order
        let per_file = self.parser.parse_files(&files);

        let mut aggregator = Aggregator::new();
        for entries in per_file {
            aggregator.extend(entries);
        }
        let duplicates = aggregator.duplicates();
        if duplicates > 0 {
            eprintln!("Skipped {} duplicate records.", duplicates);
        }

        let view = apply_costs(aggregator.finish(), &self.pricing);

        LoadOutcome::Loaded(LoadResult {
            view,
            file_count: files.len(),
            duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn assistant_line(request_id: &str, model: &str, ts: &str, input: u64) -> String {
        format!(
            r#"{{"type":"assistant","requestId":"{request_id}","sessionId":"s1","timestamp":"{ts}","message":{{"model":"{model}","usage":{{"input_tokens":{input},"output_tokens":1}}}}}}"#
        )
    }

    fn options(dir: &TempDir) -> LoadOptions {
        LoadOptions {
            data_dir: Some(dir.path().join("projects")),
            pricing_path: Some(dir.path().join("model-cost.csv")),
            skip_cost: false,
        }
    }

    #[test]
    fn test_load_missing_directory_is_no_files() {
        let temp = TempDir::new().unwrap();
        let service = DataLoaderService::new(&options(&temp));
        assert!(matches!(service.load(), LoadOutcome::NoFiles));
    }

    #[test]
    fn test_load_empty_directory_is_no_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("projects")).unwrap();
        let service = DataLoaderService::new(&options(&temp));
        assert!(matches!(service.load(), LoadOutcome::NoFiles));
    }

    #[test]
    fn test_load_dedups_across_files_and_prices() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("projects").join("proj");
        fs::create_dir_all(&project).unwrap();
        fs::write(
            project.join("a.jsonl"),
            assistant_line("r1", "m1", "2024-01-01T00:00:00Z", 1_000_000),
        )
        .unwrap();
        fs::write(
            project.join("b.jsonl"),
            format!(
                "{}\n{}\n",
                assistant_line("r1", "m1", "2024-01-01T00:00:00Z", 1_000_000),
                assistant_line("r2", "m1", "2024-01-02T00:00:00Z", 1_000_000)
            ),
        )
        .unwrap();
        fs::write(
            temp.path().join("model-cost.csv"),
            "model,input_price_per_1m,output_price_per_1m,cache_read_price_per_1m,cache_write_price_per_1m\nm1,2,0,0,0\n",
        )
        .unwrap();

        let service = DataLoaderService::new(&options(&temp));
        assert_eq!(service.pricing().model_count(), 1);

        let LoadOutcome::Loaded(result) = service.load() else {
            panic!("expected data");
        };
        assert_eq!(result.file_count, 2);
        assert_eq!(result.duplicates, 1);
        assert_eq!(result.view.total.messages, 2);
        assert!((result.view.total.cost.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(result.view.sessions.len(), 1);
    }

    #[test]
    fn test_skip_cost_leaves_cost_unknown() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("projects");
        fs::create_dir_all(&project).unwrap();
        fs::write(
            project.join("a.jsonl"),
            assistant_line("r1", "m1", "2024-01-01T00:00:00Z", 10),
        )
        .unwrap();
        fs::write(
            temp.path().join("model-cost.csv"),
            "model,input_price_per_1m\nm1,2\n",
        )
        .unwrap();

        let mut opts = options(&temp);
        opts.skip_cost = true;
        let service = DataLoaderService::new(&opts);
        assert!(service.pricing().is_empty());

        let LoadOutcome::Loaded(result) = service.load() else {
            panic!("expected data");
        };
        assert_eq!(result.view.total.cost, None);
    }

    #[test]
    fn test_malformed_pricing_degrades_to_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("model-cost.csv"), "name,price\nx,1\n").unwrap();
        let service = DataLoaderService::new(&options(&temp));
        assert!(service.pricing().is_empty());
    }
}
