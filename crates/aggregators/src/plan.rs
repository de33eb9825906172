use serde::{Deserialize, Serialize};

/// One analytical transform the engine can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationStep {
    /// Rank descending by the primary measure and derive cumulative shares.
    ParetoRank,
    /// Sum of squared reference shares plus per-row contributions.
    ConcentrationIndex,
    /// Fixed-boundary decile labels and reference decile counts.
    DecileBucket,
    /// Group-by-category sums and averages with a stable category set.
    SegmentRollup,
    /// Actual vs. budget/forecast variance with favorability.
    Variance,
}

/// The ordered list of steps a page's pipeline composes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPlan {
    pub steps: Vec<AggregationStep>,
}

impl AggregationPlan {
    /// The full plan the console pages share: rank, concentrate, bucket,
    /// roll up, and compare to the baseline.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                AggregationStep::ParetoRank,
                AggregationStep::ConcentrationIndex,
                AggregationStep::DecileBucket,
                AggregationStep::SegmentRollup,
                AggregationStep::Variance,
            ],
        }
    }

    pub fn with_steps(steps: Vec<AggregationStep>) -> Self {
        Self { steps }
    }
}

impl Default for AggregationPlan {
    fn default() -> Self {
        Self::standard()
    }
}
