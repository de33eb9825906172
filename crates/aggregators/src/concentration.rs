use core_types::{Dataset, DerivedRow};
use rust_decimal::Decimal;

/// Herfindahl-style concentration index: the sum of squared shares over the
/// dataset's load-time reference population.
///
/// The denominator population is fixed when the dataset is built and does not
/// shrink under entity filtering, so a drill-in view reports the same index as
/// the full view it zoomed from. Shares are fractions, so the index is bounded
/// in [0, 1].
pub fn index(dataset: &Dataset) -> Decimal {
    dataset
        .reference_shares
        .values()
        .map(|share| *share * *share)
        .sum()
}

/// Writes each row's squared reference share into
/// `concentration_contribution`. Rows the reference population does not know
/// (never the case for well-formed datasets) contribute zero.
pub fn annotate(rows: &mut [DerivedRow], dataset: &Dataset) {
    for row in rows {
        let share = dataset.reference_share(row.id);
        row.concentration_contribution = Some(share * share);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RawRecord;
    use rust_decimal_macros::dec;

    fn dataset(values: &[(u32, Decimal)]) -> Dataset {
        let records = values
            .iter()
            .map(|(id, v)| RawRecord::new(*id, format!("r{id}")).with_measure("revenue", *v))
            .collect();
        Dataset::new("t", "Test", "revenue", records).unwrap()
    }

    #[test]
    fn single_dominant_record_scores_one() {
        let ds = dataset(&[(1, dec!(100)), (2, dec!(0)), (3, dec!(0))]);
        assert_eq!(index(&ds), dec!(1));
    }

    #[test]
    fn equal_shares_score_one_over_n() {
        let ds = dataset(&[(1, dec!(25)), (2, dec!(25)), (3, dec!(25)), (4, dec!(25))]);
        assert_eq!(index(&ds), dec!(0.25));
    }

    #[test]
    fn index_is_bounded() {
        let ds = dataset(&[(1, dec!(60)), (2, dec!(30)), (3, dec!(10))]);
        let hhi = index(&ds);
        assert!(hhi > Decimal::ZERO && hhi <= Decimal::ONE);
        // 0.36 + 0.09 + 0.01
        assert_eq!(hhi, dec!(0.46));
    }

    #[test]
    fn contributions_use_the_reference_population() {
        let ds = dataset(&[(1, dec!(60)), (2, dec!(30)), (3, dec!(10))]);
        // Narrow to entity 1; its contribution still reflects the full
        // population denominator.
        let mut rows = vec![DerivedRow::from_record(ds.record(1).unwrap())];
        annotate(&mut rows, &ds);
        assert_eq!(rows[0].concentration_contribution, Some(dec!(0.36)));
    }

    #[test]
    fn empty_dataset_scores_zero() {
        let ds = dataset(&[]);
        assert_eq!(index(&ds), Decimal::ZERO);
    }
}
