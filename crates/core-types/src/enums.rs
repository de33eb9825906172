use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ISO-style code for a display currency. The set of codes the pipeline can
/// actually convert to is owned by the currency rate table, not this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Eur,
    Gbp,
    Inr,
    Jpy,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
            CurrencyCode::Inr => "INR",
            CurrencyCode::Jpy => "JPY",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(CurrencyCode::Usd),
            "EUR" => Ok(CurrencyCode::Eur),
            "GBP" => Ok(CurrencyCode::Gbp),
            "INR" => Ok(CurrencyCode::Inr),
            "JPY" => Ok(CurrencyCode::Jpy),
            other => Err(CoreError::InvalidInput(
                "currency".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// The time slice the dashboard is looking at. The simulated backend serves a
/// different slice of the mock data per granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Ytd,
}

impl Granularity {
    /// Multiplier applied to period measures when slicing the mock data.
    /// Monthly is the base period; YTD assumes three quarters elapsed.
    pub fn period_factor(&self) -> Decimal {
        match self {
            Granularity::Monthly => dec!(1),
            Granularity::Quarterly => dec!(3),
            Granularity::Ytd => dec!(9),
        }
    }
}

/// Which baseline the variance calculator measures "actual" against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonBasis {
    Budget,
    Forecast,
}

impl ComparisonBasis {
    /// The measure key on a `RawRecord` that holds the baseline value.
    pub fn measure_key(&self) -> &'static str {
        match self {
            ComparisonBasis::Budget => "budget",
            ComparisonBasis::Forecast => "forecast",
        }
    }
}

/// Which benchmark series feeds the summary's benchmark total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkSource {
    Internal,
    Industry,
}

impl BenchmarkSource {
    pub fn measure_key(&self) -> &'static str {
        match self {
            BenchmarkSource::Internal => "benchmark_internal",
            BenchmarkSource::Industry => "benchmark_industry",
        }
    }
}

/// Narrows the working set to a single entity, or keeps the full population.
/// Filtering only ever narrows; reference denominators are not rescoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityFilter {
    All,
    Entity(u32),
}

impl EntityFilter {
    pub fn matches(&self, id: u32) -> bool {
        match self {
            EntityFilter::All => true,
            EntityFilter::Entity(selected) => *selected == id,
        }
    }
}

/// The view-facing error taxonomy carried inside a `PipelineResult`.
///
/// An empty dataset is deliberately absent: totals of zero propagate as
/// zero-valued metrics, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ErrorKind {
    /// A filter mutation was rejected; the previous valid state is retained.
    InvalidFilterValue,
    /// The display currency is missing from the rate table.
    UnknownCurrency,
    /// The simulated backend fetch failed. Recoverable via a manual refresh.
    FetchFailure,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_round_trips_through_str() {
        for code in [
            CurrencyCode::Usd,
            CurrencyCode::Eur,
            CurrencyCode::Gbp,
            CurrencyCode::Inr,
            CurrencyCode::Jpy,
        ] {
            assert_eq!(code.as_str().parse::<CurrencyCode>().unwrap(), code);
        }
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn entity_filter_narrows() {
        assert!(EntityFilter::All.matches(7));
        assert!(EntityFilter::Entity(7).matches(7));
        assert!(!EntityFilter::Entity(7).matches(8));
    }
}
