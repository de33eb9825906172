//! # Currency Conversion
//!
//! Pure conversion of base-currency (USD) amounts into a display currency via
//! a static rate table.
//!
//! Rounding is deliberately split from conversion: `convert` multiplies by the
//! rate and returns the unrounded value, and `round_display` snaps a value to
//! two decimal places exactly once, at the output boundary of the pipeline.
//! Rounding at every intermediate step would compound error across chained
//! aggregations.

use core_types::CurrencyCode;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub mod error;

pub use error::CurrencyError;

/// Decimal places shown for money and percentage values.
pub const DISPLAY_DECIMALS: u32 = 2;

/// A stateless converter around a fixed base-currency rate table.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: BTreeMap<CurrencyCode, Decimal>,
}

impl CurrencyConverter {
    /// Builds a converter from an explicit rate table. The base currency must
    /// map to 1.
    pub fn with_rates(rates: BTreeMap<CurrencyCode, Decimal>) -> Self {
        Self { rates }
    }

    /// The currencies this converter can produce.
    pub fn supported(&self) -> Vec<CurrencyCode> {
        self.rates.keys().copied().collect()
    }

    pub fn is_supported(&self, currency: CurrencyCode) -> bool {
        self.rates.contains_key(&currency)
    }

    pub fn rate(&self, target: CurrencyCode) -> Result<Decimal, CurrencyError> {
        self.rates
            .get(&target)
            .copied()
            .ok_or(CurrencyError::UnknownCurrency(target))
    }

    /// Converts a base-currency value into the target currency, unrounded.
    pub fn convert(
        &self,
        value_in_base: Decimal,
        target: CurrencyCode,
    ) -> Result<Decimal, CurrencyError> {
        Ok(value_in_base * self.rate(target)?)
    }

    /// Snaps a value to display precision. Applied once, at the pipeline
    /// output boundary, never at intermediate steps.
    pub fn round_display(value: Decimal) -> Decimal {
        value.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl Default for CurrencyConverter {
    /// The static rate table the mock console ships with, USD-based.
    fn default() -> Self {
        Self::with_rates(BTreeMap::from([
            (CurrencyCode::Usd, dec!(1)),
            (CurrencyCode::Eur, dec!(0.92)),
            (CurrencyCode::Gbp, dec!(0.79)),
            (CurrencyCode::Inr, dec!(83.10)),
            (CurrencyCode::Jpy, dec!(147.60)),
        ]))
    }
}
