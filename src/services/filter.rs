//! Model-name filter over an aggregated view

use crate::types::{AggregatedView, Report, TokenBucket};
use std::collections::BTreeMap;

/// Result of filtering a view by model name
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// At least one model matched
    Matched(Report),
    /// Data exists but no model name contains the query
    NoMatch,
    /// The view has no models at all
    NoData,
}

/// Narrow `view` to models whose name contains `query` (case-insensitive).
///
/// The total is re-summed over the matching models only. Dates are passed
/// through unfiltered and keep representing all models. `view` is not
/// modified.
pub fn filter_by_model(view: &AggregatedView, query: &str) -> FilterOutcome {
    if view.by_model.is_empty() {
        return FilterOutcome::NoData;
    }

    let needle = query.to_lowercase();
    let by_model: BTreeMap<String, TokenBucket> = view
        .by_model
        .iter()
        .filter(|(model, _)| model.to_lowercase().contains(&needle))
        .map(|(model, bucket)| (model.clone(), bucket.clone()))
        .collect();

    if by_model.is_empty() {
        return FilterOutcome::NoMatch;
    }

    let mut total = TokenBucket::default();
    for bucket in by_model.values() {
        total.merge(bucket);
    }

    let mut report = Report::from_view(view);
    report.by_model = by_model;
    report.total = total;
    FilterOutcome::Matched(report)
}
