use core_types::DerivedRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-category sums and averages of one measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRollup {
    pub category: String,
    pub count: u32,
    pub total: Decimal,
    pub average: Decimal,
}

/// Groups rows by a categorical attribute and sums/averages `measure` per
/// group.
///
/// Every category in the stable set appears in the output, zero-valued when
/// unmatched, so downstream visualizations keep a stable category set.
/// Attribute values outside the stable set are appended in first-seen order
/// rather than dropped.
pub fn by_segment(
    rows: &[DerivedRow],
    attribute: &str,
    categories: &[String],
    measure: &str,
) -> Vec<SegmentRollup> {
    let mut order: Vec<String> = categories.to_vec();
    let mut totals: BTreeMap<String, (u32, Decimal)> = categories
        .iter()
        .map(|c| (c.clone(), (0, Decimal::ZERO)))
        .collect();

    for row in rows {
        let Some(category) = row.attributes.get(attribute) else {
            continue;
        };
        if !totals.contains_key(category) {
            order.push(category.clone());
        }
        let entry = totals.entry(category.clone()).or_insert((0, Decimal::ZERO));
        entry.0 += 1;
        entry.1 += row.measure(measure);
    }

    order
        .into_iter()
        .map(|category| {
            let (count, total) = totals[&category];
            let average = if count == 0 {
                Decimal::ZERO
            } else {
                total / Decimal::from(count)
            };
            SegmentRollup {
                category,
                count,
                total,
                average,
            }
        })
        .collect()
}
