use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable row of reference data (a customer, a region, a period).
///
/// The attribute set varies by dataset, but every record carries a stable `id`,
/// one or more base-currency numeric measures, and zero or more categorical
/// attributes. Records are defined once at dataset load and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: u32,
    pub label: String,
    pub measures: BTreeMap<String, Decimal>,
    pub attributes: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            measures: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_measure(mut self, key: impl Into<String>, value: Decimal) -> Self {
        self.measures.insert(key.into(), value);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Reads a measure, treating a missing key as zero. Missing measures are
    /// common across heterogeneous mock datasets and must not be fatal.
    pub fn measure(&self, key: &str) -> Decimal {
        self.measures.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A named reference dataset plus everything the aggregators need that is
/// fixed at load time: the primary measure, the stable category set, the
/// decile boundary table, and the reference (denominator) population.
///
/// The denominator population for concentration and decile metrics is captured
/// here, at construction, and does not shrink under entity filtering. A
/// single-entity view "zooms in" on these fixed reference values instead of
/// recomputing them over a population of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub records: Vec<RawRecord>,
    /// The measure ranked, bucketed and rolled up by default.
    pub primary_measure: String,
    /// The attribute segment rollups group by, with its stable category set.
    pub category_attribute: Option<String>,
    pub categories: Vec<String>,
    /// Ascending cut points on the primary measure; a value above the last cut
    /// point lands in the top decile. Supplied externally, never recomputed
    /// from the currently-filtered set.
    pub decile_boundaries: Vec<Decimal>,
    /// When true the measures are cost-like: coming in under the baseline is
    /// favorable, so variance favorability is inverted.
    pub expense_like: bool,
    /// Sum of the primary measure over the full population at load time.
    pub reference_total: Decimal,
    /// Per-record share of `reference_total`, as a fraction in [0, 1].
    pub reference_shares: BTreeMap<u32, Decimal>,
}

impl Dataset {
    /// Builds a dataset and captures its reference totals. Fails on duplicate
    /// record ids, which would break share accounting and tie-breaking.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        primary_measure: impl Into<String>,
        records: Vec<RawRecord>,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        let primary_measure = primary_measure.into();

        let mut reference_shares = BTreeMap::new();
        let mut reference_total = Decimal::ZERO;
        for record in &records {
            if reference_shares
                .insert(record.id, Decimal::ZERO)
                .is_some()
            {
                return Err(CoreError::InvalidInput(
                    format!("dataset {id}"),
                    format!("duplicate record id {}", record.id),
                ));
            }
            reference_total += record.measure(&primary_measure);
        }
        if reference_total != Decimal::ZERO {
            for record in &records {
                reference_shares
                    .insert(record.id, record.measure(&primary_measure) / reference_total);
            }
        }

        Ok(Self {
            id,
            name: name.into(),
            records,
            primary_measure,
            category_attribute: None,
            categories: Vec::new(),
            decile_boundaries: Vec::new(),
            expense_like: false,
            reference_total,
            reference_shares,
        })
    }

    pub fn with_categories(
        mut self,
        attribute: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        self.category_attribute = Some(attribute.into());
        self.categories = categories;
        self
    }

    pub fn with_decile_boundaries(mut self, boundaries: Vec<Decimal>) -> Self {
        self.decile_boundaries = boundaries;
        self
    }

    pub fn with_expense_semantics(mut self) -> Self {
        self.expense_like = true;
        self
    }

    pub fn record(&self, id: u32) -> Option<&RawRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// The load-time share of a record, zero for unknown ids or a zero total.
    pub fn reference_share(&self, id: u32) -> Decimal {
        self.reference_shares.get(&id).copied().unwrap_or(Decimal::ZERO)
    }
}

/// The output shape of the aggregation pipeline: the record's identity fields
/// plus the computed analytics, with measures already in the display currency.
///
/// Derived rows are created fresh on every pipeline run and replaced
/// wholesale, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRow {
    pub id: u32,
    pub label: String,
    pub measures: BTreeMap<String, Decimal>,
    pub attributes: BTreeMap<String, String>,
    pub rank: Option<u32>,
    pub cumulative_share_pct: Option<Decimal>,
    pub decile: Option<String>,
    pub concentration_contribution: Option<Decimal>,
    pub variance: Option<Decimal>,
    pub variance_pct: Option<Decimal>,
    /// Favorability of the variance, with the sign convention already applied
    /// for expense-like measures so the view never inspects signs.
    pub favorable: Option<bool>,
}

impl DerivedRow {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            id: record.id,
            label: record.label.clone(),
            measures: record.measures.clone(),
            attributes: record.attributes.clone(),
            rank: None,
            cumulative_share_pct: None,
            decile: None,
            concentration_contribution: None,
            variance: None,
            variance_pct: None,
            favorable: None,
        }
    }

    pub fn measure(&self, key: &str) -> Decimal {
        self.measures.get(key).copied().unwrap_or(Decimal::ZERO)
    }
}
