//! Ballot aggregation pipeline.
//!
//! Turns raw voter ballots into display-ready breakdowns by resolving team
//! ids against the content store.

pub mod aggregator;

pub use aggregator::*;
