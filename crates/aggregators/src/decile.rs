use core_types::{Dataset, DerivedRow};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Maps a measure value to a decile label against a fixed, externally
/// supplied boundary table (ascending cut points). A value above the last cut
/// point lands in the top bucket.
pub fn bucket_label(value: Decimal, boundaries: &[Decimal]) -> String {
    let below = boundaries.iter().filter(|cut| value > **cut).count();
    format!("D{}", below + 1)
}

/// Labels each row with its decile.
///
/// The assignment uses the record's load-time value of the primary measure,
/// not the currently fetched slice, so buckets are fixed at dataset load. When
/// a single-entity filter is active the rows are already narrowed to that
/// entity: its bucket is retained and the row keeps the entity's own
/// contribution. Deciles are never recomputed over a population of one.
pub fn annotate(rows: &mut [DerivedRow], dataset: &Dataset) {
    if dataset.decile_boundaries.is_empty() {
        return;
    }
    for row in rows {
        if let Some(record) = dataset.record(row.id) {
            row.decile = Some(bucket_label(
                record.measure(&dataset.primary_measure),
                &dataset.decile_boundaries,
            ));
        }
    }
}

/// Decile population counts over the full reference population. Every bucket
/// the boundary table defines appears, zero-valued when empty, so downstream
/// visualizations keep a stable bucket set.
pub fn reference_counts(dataset: &Dataset) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    if dataset.decile_boundaries.is_empty() {
        return counts;
    }
    for bucket in 1..=dataset.decile_boundaries.len() + 1 {
        counts.insert(format!("D{bucket}"), 0);
    }
    for record in &dataset.records {
        let label = bucket_label(
            record.measure(&dataset.primary_measure),
            &dataset.decile_boundaries,
        );
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RawRecord;
    use rust_decimal_macros::dec;

    #[test]
    fn labels_follow_the_boundary_table() {
        let cuts = vec![dec!(10), dec!(20), dec!(30)];
        assert_eq!(bucket_label(dec!(5), &cuts), "D1");
        assert_eq!(bucket_label(dec!(10), &cuts), "D1");
        assert_eq!(bucket_label(dec!(15), &cuts), "D2");
        assert_eq!(bucket_label(dec!(25), &cuts), "D3");
        assert_eq!(bucket_label(dec!(99), &cuts), "D4");
    }

    #[test]
    fn single_entity_keeps_its_full_population_bucket() {
        let records = vec![
            RawRecord::new(1, "a").with_measure("revenue", dec!(5)),
            RawRecord::new(2, "b").with_measure("revenue", dec!(25)),
        ];
        let ds = Dataset::new("t", "Test", "revenue", records)
            .unwrap()
            .with_decile_boundaries(vec![dec!(10), dec!(20)]);

        // Narrowed to entity 2 only: it stays in the bucket the full
        // population put it in, with its own value.
        let mut rows = vec![DerivedRow::from_record(ds.record(2).unwrap())];
        annotate(&mut rows, &ds);
        assert_eq!(rows[0].decile.as_deref(), Some("D3"));
        assert_eq!(rows[0].measure("revenue"), dec!(25));
    }

    #[test]
    fn reference_counts_keep_empty_buckets() {
        let records = vec![
            RawRecord::new(1, "a").with_measure("revenue", dec!(5)),
            RawRecord::new(2, "b").with_measure("revenue", dec!(6)),
        ];
        let ds = Dataset::new("t", "Test", "revenue", records)
            .unwrap()
            .with_decile_boundaries(vec![dec!(10), dec!(20)]);

        let counts = reference_counts(&ds);
        assert_eq!(counts.get("D1"), Some(&2));
        assert_eq!(counts.get("D2"), Some(&0));
        assert_eq!(counts.get("D3"), Some(&0));
    }

    #[test]
    fn no_boundaries_means_no_buckets() {
        let ds = Dataset::new("t", "Test", "revenue", vec![]).unwrap();
        assert!(reference_counts(&ds).is_empty());
    }
}
