//! Services for pricing, aggregation and reporting

pub mod aggregator;
pub mod cost;
pub mod data_loader;
pub mod filter;
pub mod pricing;

pub use aggregator::Aggregator;
pub use cost::apply_costs;
pub use data_loader::{DataLoaderService, LoadOptions, LoadOutcome, LoadResult};
pub use filter::{filter_by_model, FilterOutcome};
pub use pricing::{PricingEntry, PricingTable};
