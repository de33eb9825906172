use core_types::CurrencyCode;
use serde::Deserialize;
use std::time::Duration;

/// The root configuration structure for the analytics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub refresh: Refresh,
    pub backend: Backend,
    /// The externally persisted display-currency preference the filter store
    /// is constructed with.
    pub initial_currency: CurrencyCode,
}

/// Parameters of the refresh controller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Refresh {
    /// How long filter input must stay quiet before a fetch is issued.
    #[serde(with = "humantime_serde")]
    pub debounce_window: Duration,
}

/// Parameters of the simulated backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Backend {
    /// Simulated round-trip latency per fetch.
    #[serde(with = "humantime_serde")]
    pub latency: Duration,
    /// Probability in [0, 1] that a fetch fails with a typed error.
    pub failure_rate: f64,
    /// Fixed RNG seed for reproducible failure injection; random when unset.
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh: Refresh::default(),
            backend: Backend::default(),
            initial_currency: CurrencyCode::Usd,
        }
    }
}

impl Default for Refresh {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(450),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(350),
            failure_rate: 0.01,
            rng_seed: None,
        }
    }
}
