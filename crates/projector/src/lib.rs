//! # Output Projection
//!
//! The last presentation-independent stage of the pipeline: rows are ordered
//! by an explicit, caller-specified sort key with a documented tie-break
//! (stable sort, ascending `id`), then snapped to display precision in a
//! single rounding pass. Re-sorting the same rows is therefore deterministic
//! and testable, and no intermediate stage ever rounds.

use core_types::DerivedRow;
use currency::CurrencyConverter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Which computed field orders the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// The Pareto rank (the default presentation order).
    Rank,
    /// The named measure, e.g. "by revenue" vs "by profit".
    Measure,
    CumulativeShare,
    VarianceAmount,
    VariancePct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A complete ordering request: key, direction, and (for `SortKey::Measure`)
/// the measure to sort on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
    pub measure: Option<String>,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            key,
            direction,
            measure: None,
        }
    }

    pub fn by_measure(measure: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: SortKey::Measure,
            direction,
            measure: Some(measure.into()),
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::Rank, SortDirection::Ascending)
    }
}

/// Applies final ordering and the single display-rounding pass.
#[derive(Debug, Default)]
pub struct OutputProjector {}

impl OutputProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders rows per the sort spec (rows without the sorted field go last)
    /// and rounds money and percentage fields to display precision. This is
    /// the only place rounding happens.
    pub fn project(&self, mut rows: Vec<DerivedRow>, sort: &SortSpec) -> Vec<DerivedRow> {
        rows.sort_by(|a, b| {
            compare_by_key(a, b, sort)
                .then(a.id.cmp(&b.id))
        });
        for row in &mut rows {
            round_row(row);
        }
        rows
    }

    /// Rounds the summary metrics for display. Fractional indices keep four
    /// places so small concentration values survive.
    pub fn finalize_summary(
        &self,
        summary: BTreeMap<String, Decimal>,
    ) -> BTreeMap<String, Decimal> {
        summary
            .into_iter()
            .map(|(key, value)| {
                let rounded = if key.starts_with("concentration") {
                    value.round_dp(4)
                } else {
                    CurrencyConverter::round_display(value)
                };
                (key, rounded)
            })
            .collect()
    }
}

fn compare_by_key(a: &DerivedRow, b: &DerivedRow, sort: &SortSpec) -> Ordering {
    let direction = sort.direction;
    match sort.key {
        SortKey::Rank => cmp_option(&a.rank, &b.rank, direction),
        SortKey::Measure => {
            let key = sort.measure.as_deref().unwrap_or_default();
            directed(a.measure(key).cmp(&b.measure(key)), direction)
        }
        SortKey::CumulativeShare => {
            cmp_option(&a.cumulative_share_pct, &b.cumulative_share_pct, direction)
        }
        SortKey::VarianceAmount => cmp_option(&a.variance, &b.variance, direction),
        SortKey::VariancePct => cmp_option(&a.variance_pct, &b.variance_pct, direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

// None sorts after Some in either direction, so unfilled fields trail.
fn cmp_option<T: Ord>(a: &Option<T>, b: &Option<T>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.cmp(y), direction),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn round_row(row: &mut DerivedRow) {
    for value in row.measures.values_mut() {
        *value = CurrencyConverter::round_display(*value);
    }
    row.cumulative_share_pct = row.cumulative_share_pct.map(CurrencyConverter::round_display);
    row.variance = row.variance.map(CurrencyConverter::round_display);
    row.variance_pct = row.variance_pct.map(CurrencyConverter::round_display);
    row.concentration_contribution = row.concentration_contribution.map(|v| v.round_dp(4));
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RawRecord;
    use rust_decimal_macros::dec;

    fn row(id: u32, revenue: Decimal, variance: Decimal) -> DerivedRow {
        let mut row = DerivedRow::from_record(
            &RawRecord::new(id, format!("r{id}")).with_measure("revenue", revenue),
        );
        row.variance = Some(variance);
        row
    }

    #[test]
    fn sorts_by_requested_key_and_direction() {
        let rows = vec![
            row(1, dec!(10), dec!(-5)),
            row(2, dec!(30), dec!(2)),
            row(3, dec!(20), dec!(-9)),
        ];
        let projected = OutputProjector::new().project(
            rows,
            &SortSpec::new(SortKey::VarianceAmount, SortDirection::Ascending),
        );
        let order: Vec<u32> = projected.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn ties_break_by_ascending_id_in_both_directions() {
        let rows = vec![
            row(9, dec!(10), dec!(1)),
            row(2, dec!(10), dec!(1)),
            row(5, dec!(10), dec!(1)),
        ];
        let projector = OutputProjector::new();
        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let projected = projector.project(
                rows.clone(),
                &SortSpec::by_measure("revenue", direction),
            );
            let order: Vec<u32> = projected.iter().map(|r| r.id).collect();
            assert_eq!(order, vec![2, 5, 9]);
        }
    }

    #[test]
    fn rounding_happens_once_at_the_boundary() {
        let mut unrounded = row(1, dec!(9.2092), dec!(0));
        unrounded.variance_pct = Some(dec!(-13.333333));
        unrounded.concentration_contribution = Some(dec!(0.040404));

        let projected = OutputProjector::new().project(vec![unrounded], &SortSpec::default());
        assert_eq!(projected[0].measure("revenue"), dec!(9.21));
        assert_eq!(projected[0].variance_pct, Some(dec!(-13.33)));
        assert_eq!(projected[0].concentration_contribution, Some(dec!(0.0404)));
    }

    #[test]
    fn rows_without_the_sorted_field_trail() {
        let mut missing = row(7, dec!(5), dec!(0));
        missing.variance = None;
        let rows = vec![missing, row(1, dec!(10), dec!(3))];
        let projected = OutputProjector::new().project(
            rows,
            &SortSpec::new(SortKey::VarianceAmount, SortDirection::Descending),
        );
        assert_eq!(projected.last().unwrap().id, 7);
    }

    #[test]
    fn summary_rounding_keeps_index_precision() {
        let summary = BTreeMap::from([
            ("total".to_string(), dec!(123.4567)),
            ("concentration_index".to_string(), dec!(0.123456)),
        ]);
        let finalized = OutputProjector::new().finalize_summary(summary);
        assert_eq!(finalized["total"], dec!(123.46));
        assert_eq!(finalized["concentration_index"], dec!(0.1235));
    }
}
