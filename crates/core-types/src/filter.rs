use crate::enums::{BenchmarkSource, ComparisonBasis, CurrencyCode, EntityFilter, Granularity};
use serde::{Deserialize, Serialize};

/// The complete filter selection driving the pipeline.
///
/// Owned exclusively by the filter store. Every accepted change produces a new
/// immutable value (replace, not in-place mutation); the pipeline only ever
/// sees read-only snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub currency: CurrencyCode,
    pub entity_filter: EntityFilter,
    pub granularity: Granularity,
    pub comparison_basis: ComparisonBasis,
    pub benchmark_source: BenchmarkSource,
}

impl FilterState {
    /// The defaults every console page starts from, with the display currency
    /// supplied externally (it is the one persisted user preference).
    pub fn with_currency(currency: CurrencyCode) -> Self {
        Self {
            currency,
            entity_filter: EntityFilter::All,
            granularity: Granularity::Monthly,
            comparison_basis: ComparisonBasis::Budget,
            benchmark_source: BenchmarkSource::Internal,
        }
    }

    /// Builds the successor state for a partial update.
    pub fn apply(&self, patch: &FilterPatch) -> Self {
        Self {
            currency: patch.currency.unwrap_or(self.currency),
            entity_filter: patch.entity_filter.unwrap_or(self.entity_filter),
            granularity: patch.granularity.unwrap_or(self.granularity),
            comparison_basis: patch.comparison_basis.unwrap_or(self.comparison_basis),
            benchmark_source: patch.benchmark_source.unwrap_or(self.benchmark_source),
        }
    }
}

/// A partial filter update; unset fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPatch {
    pub currency: Option<CurrencyCode>,
    pub entity_filter: Option<EntityFilter>,
    pub granularity: Option<Granularity>,
    pub comparison_basis: Option<ComparisonBasis>,
    pub benchmark_source: Option<BenchmarkSource>,
}

impl FilterPatch {
    pub fn currency(currency: CurrencyCode) -> Self {
        Self {
            currency: Some(currency),
            ..Self::default()
        }
    }

    pub fn entity(entity_filter: EntityFilter) -> Self {
        Self {
            entity_filter: Some(entity_filter),
            ..Self::default()
        }
    }

    pub fn granularity(granularity: Granularity) -> Self {
        Self {
            granularity: Some(granularity),
            ..Self::default()
        }
    }

    pub fn comparison_basis(comparison_basis: ComparisonBasis) -> Self {
        Self {
            comparison_basis: Some(comparison_basis),
            ..Self::default()
        }
    }

    pub fn benchmark_source(benchmark_source: BenchmarkSource) -> Self {
        Self {
            benchmark_source: Some(benchmark_source),
            ..Self::default()
        }
    }
}
