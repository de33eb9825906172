pub mod enums;
pub mod error;
pub mod filter;
pub mod records;
pub mod result;

// Re-export the core types to provide a clean public API.
pub use enums::{BenchmarkSource, ComparisonBasis, CurrencyCode, EntityFilter, ErrorKind, Granularity};
pub use error::CoreError;
pub use filter::{FilterPatch, FilterState};
pub use records::{Dataset, DerivedRow, RawRecord};
pub use result::PipelineResult;
