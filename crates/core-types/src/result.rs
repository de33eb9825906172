use crate::enums::ErrorKind;
use crate::records::DerivedRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single object the pipeline exposes to the view layer.
///
/// Replaced wholesale on each completed, non-stale fetch. On a failed fetch
/// the previous `rows` and `summary` are carried forward with `error` set, so
/// a transient failure never blanks the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub rows: Vec<DerivedRow>,
    /// Flat metric map: totals, the concentration index, decile counts,
    /// segment rollups under `segment.<group>.<measure>` keys.
    pub summary: BTreeMap<String, Decimal>,
    pub loading: bool,
    pub error: Option<ErrorKind>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl PipelineResult {
    /// The state before the first fetch completes: no rows, nothing loading.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            summary: BTreeMap::new(),
            loading: false,
            error: None,
            last_refreshed_at: None,
        }
    }
}

impl Default for PipelineResult {
    fn default() -> Self {
        Self::empty()
    }
}
