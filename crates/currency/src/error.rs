use core_types::CurrencyCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("Unknown currency: {0} is not in the rate table")]
    UnknownCurrency(CurrencyCode),
}
