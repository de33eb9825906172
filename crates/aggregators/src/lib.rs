//! # Aggregators
//!
//! The pure analytical transforms of the pipeline: Pareto ranking with
//! cumulative shares, the Herfindahl-style concentration index, decile
//! bucketing, segment rollups and budget/forecast variance.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** Every transform is a pure function of the fetched rows,
//!   the filter snapshot and the dataset's load-time reference values. No
//!   clocks, no I/O, no hidden state, so two runs over identical inputs
//!   produce identical derived rows.
//! - **Fixed Denominators:** Concentration and decile metrics are computed
//!   against the reference population captured when the dataset was built.
//!   Entity filtering narrows the rows but never rescopes those denominators.
//!
//! ## Public API
//!
//! - `AggregationEngine`: composes the steps of an `AggregationPlan`.
//! - `AggregationPlan` / `AggregationStep`: which transforms a page runs.
//! - `AggregationOutput`: derived rows plus the flat summary metric map.
//! - `AggregatorError`: the specific error types returned from this crate.

pub mod concentration;
pub mod decile;
pub mod engine;
pub mod error;
pub mod pareto;
pub mod plan;
pub mod rollup;
pub mod variance;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AggregationEngine, AggregationOutput};
pub use error::AggregatorError;
pub use plan::{AggregationPlan, AggregationStep};
pub use rollup::SegmentRollup;
