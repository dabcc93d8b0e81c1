//! Parser trait and the Claude Code log implementation

mod claude;

pub use claude::ClaudeCodeParser;

use crate::types::{Result, UsageEntry};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Trait for extracting usage entries from a directory of log files
pub trait LogParser: Send + Sync {
    /// Data directory to scan for log files
    fn data_dir(&self) -> &Path;

    /// Glob pattern for finding log files (e.g., "**/*.jsonl")
    fn file_pattern(&self) -> &str;

    /// Parse a single file and return its usage entries in line order
    fn parse_file(&self, path: &Path) -> Result<Vec<UsageEntry>>;

    /// Collect all files matching the glob pattern, sorted by path.
    ///
    /// The order is the enumeration order the aggregator folds in.
    fn collect_files(&self) -> Vec<PathBuf> {
        let dir = glob::Pattern::escape(&self.data_dir().to_string_lossy());
        let pattern = Path::new(&dir).join(self.file_pattern());
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| {
                paths
                    .filter_map(|e| e.ok())
                    .filter(|p| p.is_file())
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Parse files in parallel, one entry list per file in input order.
    ///
    /// A file that cannot be read is reported and contributes nothing.
    fn parse_files(&self, files: &[PathBuf]) -> Vec<Vec<UsageEntry>> {
        files
            .par_iter()
            .map(|f| match self.parse_file(f) {
                Ok(entries) => entries,
                Err(e) => {
                    eprintln!("[tokcount] Warning: Failed to read {:?}: {}", f, e);
                    Vec::new()
                }
            })
            .collect()
    }

    /// Collect and parse every file under the data directory
    fn parse_all(&self) -> Vec<Vec<UsageEntry>> {
        let files = self.collect_files();
        self.parse_files(&files)
    }
}
