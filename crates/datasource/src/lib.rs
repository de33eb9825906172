//! # Data Source
//!
//! The async boundary of the pipeline. `DataSource` is the abstract contract
//! the refresh controller fetches through, so the simulated backend can be
//! swapped for a scripted stub in tests.
//!
//! `SimulatedBackend` reproduces the console's mock behavior: a few hundred
//! milliseconds of latency, a configurable failure probability surfaced as a
//! typed error (never an unhandled panic), and per-granularity slicing of the
//! in-memory datasets. The failure probability and RNG seed are
//! construction-time parameters, so tests pin them instead of fighting a
//! global random source.

use async_trait::async_trait;
use core_types::{Dataset, FilterState, RawRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;

pub mod error;
pub mod samples;

pub use error::SourceError;

/// The abstract backend contract: one fetch per settled filter state.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the records of `dataset_id` for a filter snapshot.
    async fn fetch(
        &self,
        dataset_id: &str,
        filter: &FilterState,
    ) -> Result<Vec<RawRecord>, SourceError>;
}

/// The in-memory mock backend the console pages run against.
pub struct SimulatedBackend {
    latency: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
    datasets: BTreeMap<String, Dataset>,
}

impl SimulatedBackend {
    /// Builds a backend over the bundled sample datasets. `rng_seed` pins the
    /// failure draws for reproducible runs.
    pub fn new(latency: Duration, failure_rate: f64, rng_seed: Option<u64>) -> Self {
        Self::with_datasets(latency, failure_rate, rng_seed, samples::all())
    }

    pub fn with_datasets(
        latency: Duration,
        failure_rate: f64,
        rng_seed: Option<u64>,
        datasets: Vec<Dataset>,
    ) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            latency,
            failure_rate,
            rng: Mutex::new(rng),
            datasets: datasets.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    pub fn dataset(&self, id: &str) -> Option<&Dataset> {
        self.datasets.get(id)
    }

    pub fn dataset_ids(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }
}

#[async_trait]
impl DataSource for SimulatedBackend {
    async fn fetch(
        &self,
        dataset_id: &str,
        filter: &FilterState,
    ) -> Result<Vec<RawRecord>, SourceError> {
        tokio::time::sleep(self.latency).await;

        let draw: f64 = self.rng.lock().await.r#gen();
        if draw < self.failure_rate {
            tracing::debug!(dataset_id, "simulated backend failure");
            return Err(SourceError::FetchFailure(dataset_id.to_string()));
        }

        let dataset = self
            .datasets
            .get(dataset_id)
            .ok_or_else(|| SourceError::UnknownDataset(dataset_id.to_string()))?;

        // Serve the slice for the requested granularity by scaling period
        // measures, mirroring the mock data's per-granularity variants.
        let factor = filter.granularity.period_factor();
        let records = dataset
            .records
            .iter()
            .map(|record| {
                let mut scaled = record.clone();
                for value in scaled.measures.values_mut() {
                    *value *= factor;
                }
                scaled
            })
            .collect();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CurrencyCode, FilterPatch, Granularity};
    use rust_decimal_macros::dec;

    fn filter() -> FilterState {
        FilterState::with_currency(CurrencyCode::Usd)
    }

    #[tokio::test(start_paused = true)]
    async fn serves_the_requested_dataset() {
        let backend = SimulatedBackend::new(Duration::from_millis(300), 0.0, Some(7));
        let records = backend
            .fetch(samples::CUSTOMER_REVENUE, &filter())
            .await
            .unwrap();
        assert!(!records.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_dataset_is_a_typed_error() {
        let backend = SimulatedBackend::new(Duration::ZERO, 0.0, Some(7));
        let err = backend.fetch("nope", &filter()).await.unwrap_err();
        assert_eq!(err, SourceError::UnknownDataset("nope".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_rate_one_always_fails() {
        let backend = SimulatedBackend::new(Duration::ZERO, 1.0, Some(7));
        let err = backend
            .fetch(samples::CUSTOMER_REVENUE, &filter())
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::FetchFailure(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn granularity_scales_period_measures() {
        let backend = SimulatedBackend::new(Duration::ZERO, 0.0, Some(7));
        let monthly = backend
            .fetch(samples::CUSTOMER_REVENUE, &filter())
            .await
            .unwrap();
        let quarterly = backend
            .fetch(
                samples::CUSTOMER_REVENUE,
                &filter().apply(&FilterPatch::granularity(Granularity::Quarterly)),
            )
            .await
            .unwrap();

        assert_eq!(
            quarterly[0].measure("revenue"),
            monthly[0].measure("revenue") * dec!(3)
        );
    }
}
