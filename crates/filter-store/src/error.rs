use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid filter value for {field}: {value}")]
    InvalidFilterValue { field: String, value: String },
}
