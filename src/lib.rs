//! Token and cost accounting for Claude Code conversation logs.
//!
//! Log files are extracted by [`parsers`], folded with request-id
//! deduplication by [`services::Aggregator`], and priced from a CSV table by
//! [`services::apply_costs`].

pub mod parsers;
pub mod services;
pub mod types;
