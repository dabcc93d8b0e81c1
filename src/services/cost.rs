//! Cost calculation over aggregated totals
//!
//! Model costs are priced from each model's own totals. The grand total is
//! the sum of model costs. Date costs are priced per `(date, model)` bucket
//! and summed per date, so rates never mix across models.

use crate::services::PricingTable;
use crate::types::AggregatedView;
use std::collections::BTreeMap;

/// Annotate every bucket of `view` with its cost.
///
/// With an empty pricing table nothing is annotated and every `cost`
/// stays `None` ("unknown"), which is distinct from a known 0.0.
/// Sums run in key order so the result does not depend on hash order.
pub fn apply_costs(mut view: AggregatedView, pricing: &PricingTable) -> AggregatedView {
    if pricing.is_empty() {
        return view;
    }

    let mut model_costs = BTreeMap::new();
    for (model, bucket) in view.by_model.iter_mut() {
        let cost = pricing.cost_for(model, bucket);
        bucket.cost = Some(cost);
        model_costs.insert(model.as_str(), cost);
    }
    view.total.cost = Some(model_costs.values().sum());

    let mut cell_costs = BTreeMap::new();
    for (key, bucket) in view.by_date_model.iter_mut() {
        let cost = pricing.cost_for(&key.1, bucket);
        bucket.cost = Some(cost);
        cell_costs.insert((key.0.as_str(), key.1.as_str()), cost);
    }
    let mut date_costs: BTreeMap<&str, f64> = BTreeMap::new();
    for ((date, _), cost) in cell_costs {
        *date_costs.entry(date).or_default() += cost;
    }
    for (date, bucket) in view.by_date.iter_mut() {
        bucket.cost = Some(date_costs.get(date.as_str()).copied().unwrap_or(0.0));
    }

    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::pricing::PricingEntry;
    use crate::services::Aggregator;
    use crate::types::UsageEntry;

    fn make_entry(request_id: &str, model: &str, date: &str, input: u64, output: u64) -> UsageEntry {
        UsageEntry {
            request_id: Some(request_id.into()),
            model: model.into(),
            date_key: date.into(),
            input_tokens: input,
            output_tokens: output,
            cache_write_tokens: 0,
            cache_read_tokens: 0,
            session_id: None,
        }
    }

    fn pricing() -> PricingTable {
        PricingTable::from_entries([
            (
                "cheap".to_string(),
                PricingEntry {
                    input_price_per_1m: 1.0,
                    output_price_per_1m: 2.0,
                    cache_read_price_per_1m: 0.1,
                    cache_write_price_per_1m: 1.25,
                },
            ),
            (
                "pricey".to_string(),
                PricingEntry {
                    input_price_per_1m: 10.0,
                    output_price_per_1m: 50.0,
                    cache_read_price_per_1m: 1.0,
                    cache_write_price_per_1m: 12.5,
                },
            ),
            ("free".to_string(), PricingEntry::default()),
        ])
    }

    fn sample_view() -> AggregatedView {
        Aggregator::aggregate(vec![vec![
            make_entry("a", "cheap", "2024-01-01", 1_000_000, 0),
            make_entry("b", "pricey", "2024-01-01", 0, 1_000_000),
            make_entry("c", "cheap", "2024-01-02", 0, 500_000),
            make_entry("d", "mystery", "2024-01-02", 2_000_000, 0),
            make_entry("e", "free", "2024-01-03", 42, 42),
        ]])
    }

    #[test]
    fn test_model_costs() {
        let view = apply_costs(sample_view(), &pricing());

        // cheap: 1M in * $1 + 0.5M out * $2 = $2
        assert!((view.by_model["cheap"].cost.unwrap() - 2.0).abs() < 1e-9);
        // pricey: 1M out * $50
        assert!((view.by_model["pricey"].cost.unwrap() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_unpriced_and_zero_priced_models_cost_exactly_zero() {
        let view = apply_costs(sample_view(), &pricing());
        assert_eq!(view.by_model["mystery"].cost, Some(0.0));
        assert_eq!(view.by_model["free"].cost, Some(0.0));
    }

    #[test]
    fn test_total_is_sum_of_model_costs() {
        let view = apply_costs(sample_view(), &pricing());
        let sum: f64 = view.by_model.values().filter_map(|b| b.cost).sum();
        assert!((view.total.cost.unwrap() - sum).abs() < 1e-9);
        assert!((view.total.cost.unwrap() - 52.0).abs() < 1e-9);
    }

    #[test]
    fn test_date_costs_priced_per_model() {
        let view = apply_costs(sample_view(), &pricing());

        // 2024-01-01: cheap 1M in ($1) + pricey 1M out ($50)
        assert!((view.by_date["2024-01-01"].cost.unwrap() - 51.0).abs() < 1e-9);
        // 2024-01-02: cheap 0.5M out ($1) + mystery (unpriced, $0)
        assert!((view.by_date["2024-01-02"].cost.unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(view.by_date["2024-01-03"].cost, Some(0.0));

        let date_sum: f64 = view.by_date.values().filter_map(|b| b.cost).sum();
        assert!((date_sum - view.total.cost.unwrap()).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pricing_leaves_costs_unknown() {
        let view = apply_costs(sample_view(), &PricingTable::default());

        assert_eq!(view.total.cost, None);
        assert!(view.by_model.values().all(|b| b.cost.is_none()));
        assert!(view.by_date.values().all(|b| b.cost.is_none()));
        assert_eq!(view, sample_view());
    }

    #[test]
    fn test_cost_scales_linearly_with_tokens() {
        let table = pricing();
        let base = apply_costs(
            Aggregator::aggregate(vec![vec![make_entry("a", "pricey", "2024-01-01", 3_000, 7_000)]]),
            &table,
        );
        let scaled = apply_costs(
            Aggregator::aggregate(vec![vec![make_entry("a", "pricey", "2024-01-01", 12_000, 28_000)]]),
            &table,
        );

        let base_cost = base.by_model["pricey"].cost.unwrap();
        let scaled_cost = scaled.by_model["pricey"].cost.unwrap();
        assert!(base_cost > 0.0);
        assert!((scaled_cost - 4.0 * base_cost).abs() < 1e-12);
    }

    #[test]
    fn test_cost_sums_run_in_model_order() {
        // 1e16 + 1.0 rounds back to 1e16, so only small-first order keeps both ones
        let table = PricingTable::from_entries([
            ("a-small".to_string(), PricingEntry { input_price_per_1m: 1.0, ..Default::default() }),
            ("b-small".to_string(), PricingEntry { input_price_per_1m: 1.0, ..Default::default() }),
            ("z-big".to_string(), PricingEntry { input_price_per_1m: 1e16, ..Default::default() }),
        ]);

        for _ in 0..20 {
            let view = apply_costs(
                Aggregator::aggregate(vec![vec![
                    make_entry("z", "z-big", "2024-01-01", 1_000_000, 0),
                    make_entry("a", "a-small", "2024-01-01", 1_000_000, 0),
                    make_entry("b", "b-small", "2024-01-01", 1_000_000, 0),
                ]]),
                &table,
            );
            assert_eq!(view.total.cost, Some(1e16 + 2.0));
            assert_eq!(view.by_date["2024-01-01"].cost, Some(1e16 + 2.0));
        }
    }

    #[test]
    fn test_empty_view_with_pricing_has_zero_total() {
        let view = apply_costs(AggregatedView::default(), &pricing());
        assert_eq!(view.total.cost, Some(0.0));
    }
}
