use currency::CurrencyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Currency conversion failed: {0}")]
    Currency(#[from] CurrencyError),
}
