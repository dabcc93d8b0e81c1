mod table;

use std::path::PathBuf;

use clap::Parser;

use tokcount::services::{filter_by_model, DataLoaderService, FilterOutcome, LoadOptions, LoadOutcome};
use tokcount::types::Report;

/// Count Claude tokens and costs from conversation logs
#[derive(Parser, Debug)]
#[command(name = "tokcount")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  tokcount                            Count all tokens with costs
  tokcount --model claude-3-5-sonnet  Filter by model
  tokcount --json                     Output as JSON
  tokcount --claude-dir ~/.claude     Custom Claude directory
  tokcount --no-cost                  Skip cost calculation
  tokcount --pricing custom.csv       Use custom pricing file")]
pub struct Cli {
    /// Path to Claude projects directory (default: ~/.claude/projects)
    #[arg(long, value_name = "DIR")]
    claude_dir: Option<PathBuf>,

    /// Filter by model name (partial, case-insensitive match)
    #[arg(long, value_name = "QUERY")]
    model: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Path to model pricing CSV file
    #[arg(long, value_name = "CSV")]
    pricing: Option<PathBuf>,

    /// Skip cost calculation
    #[arg(long)]
    no_cost: bool,
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            data_dir: self.claude_dir.clone(),
            pricing_path: self.pricing.clone(),
            skip_cost: self.no_cost,
        }
    }

    pub fn run(self) -> anyhow::Result<()> {
        let service = DataLoaderService::new(&self.load_options());

        let result = match service.load() {
            LoadOutcome::NoFiles => return Ok(()),
            LoadOutcome::Loaded(result) => result,
        };

        let report = match &self.model {
            None => Report::from_view(&result.view),
            Some(query) => match filter_by_model(&result.view, query) {
                FilterOutcome::Matched(report) => report,
                FilterOutcome::NoMatch => {
                    eprintln!("No matches for model: {}", query);
                    return Ok(());
                }
                FilterOutcome::NoData => {
                    eprintln!("No usage data found.");
                    return Ok(());
                }
            },
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", table::render(&report));
        }
        Ok(())
    }
}
