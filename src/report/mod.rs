//! Breakdown report generation.
//!
//! Renders aggregated voter breakdowns as a Markdown table or JSON.

pub mod generator;

pub use generator::*;
