use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Fetch failed for dataset {0} (simulated backend error)")]
    FetchFailure(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}
