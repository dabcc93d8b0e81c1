//! Deduplicating aggregator for usage entries
//!
//! Folds entries from every log file into one [`AggregatedView`]. The
//! seen-set of request ids is global to the run: the same request may be
//! written to more than one file, and only its first occurrence counts.

use crate::types::{AggregatedView, UsageEntry};
use std::collections::HashSet;

/// Single-threaded fold state for one run
#[derive(Debug, Default)]
pub struct Aggregator {
    seen: HashSet<String>,
    view: AggregatedView,
    duplicates: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate per-file entry lists in file-enumeration order
    pub fn aggregate<I>(files: I) -> AggregatedView
    where
        I: IntoIterator<Item = Vec<UsageEntry>>,
    {
        let mut aggregator = Self::new();
        for entries in files {
            aggregator.extend(entries);
        }
        aggregator.finish()
    }

    /// Fold one entry. Returns `false` if it was a duplicate and discarded.
    pub fn push(&mut self, entry: UsageEntry) -> bool {
        // Entries without a request id are always counted
        if let Some(key) = entry.dedup_key() {
            if self.seen.contains(key) {
                self.duplicates = self.duplicates.saturating_add(1);
                return false;
            }
            self.seen.insert(key.to_string());
        }

        let view = &mut self.view;
        view.by_model
            .entry(entry.model.clone())
            .or_default()
            .add(&entry);
        view.by_date
            .entry(entry.date_key.clone())
            .or_default()
            .add(&entry);
        view.by_date_model
            .entry((entry.date_key.clone(), entry.model.clone()))
            .or_default()
            .add(&entry);
        view.total.add(&entry);

        if let Some(session) = entry.session_id.filter(|s| !s.is_empty()) {
            view.sessions.insert(session);
        }

        true
    }

    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = UsageEntry>,
    {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Number of entries discarded as duplicates so far
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    pub fn finish(self) -> AggregatedView {
        self.view
    }
}
