use core_types::DerivedRow;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Ranks rows descending by `measure` (tie-break ascending `id` so re-runs are
/// deterministic), assigns `rank = 1..N` and the running cumulative share of
/// the narrowed set's total.
///
/// A zero total defines every share as 0 rather than dividing. Returns the
/// total for the summary map.
pub fn rank(rows: &mut [DerivedRow], measure: &str) -> Decimal {
    rows.sort_by(|a, b| {
        b.measure(measure)
            .cmp(&a.measure(measure))
            .then(a.id.cmp(&b.id))
    });

    let total: Decimal = rows.iter().map(|r| r.measure(measure)).sum();

    let mut running = Decimal::ZERO;
    for (position, row) in rows.iter_mut().enumerate() {
        row.rank = Some(position as u32 + 1);
        if total.is_zero() {
            row.cumulative_share_pct = Some(Decimal::ZERO);
        } else {
            running += row.measure(measure);
            row.cumulative_share_pct = Some(running / total * dec!(100));
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RawRecord;

    fn rows(values: &[(u32, Decimal)]) -> Vec<DerivedRow> {
        values
            .iter()
            .map(|(id, v)| {
                DerivedRow::from_record(
                    &RawRecord::new(*id, format!("r{id}")).with_measure("revenue", *v),
                )
            })
            .collect()
    }

    #[test]
    fn ranks_and_accumulates_shares() {
        // The three-customer scenario: 12.5 / 10.8 / 9.2.
        let mut rows = rows(&[(1, dec!(12.5)), (2, dec!(10.8)), (3, dec!(9.2))]);
        let total = rank(&mut rows, "revenue");
        assert_eq!(total, dec!(32.5));

        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows[1].rank, Some(2));
        assert_eq!(rows[2].rank, Some(3));

        let share = |i: usize| rows[i].cumulative_share_pct.unwrap();
        assert!((share(0) - dec!(38.46)).abs() < dec!(0.01));
        assert!((share(1) - dec!(71.69)).abs() < dec!(0.01));
        assert_eq!(share(2), dec!(100));
    }

    #[test]
    fn last_row_share_is_exactly_one_hundred() {
        let mut rows = rows(&[(1, dec!(3)), (2, dec!(1)), (3, dec!(6))]);
        rank(&mut rows, "revenue");
        assert_eq!(rows.last().unwrap().cumulative_share_pct, Some(dec!(100)));
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let mut rows = rows(&[(9, dec!(5)), (2, dec!(5)), (4, dec!(5))]);
        rank(&mut rows, "revenue");
        let order: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![2, 4, 9]);
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let mut rows = rows(&[(1, dec!(0)), (2, dec!(0))]);
        let total = rank(&mut rows, "revenue");
        assert_eq!(total, Decimal::ZERO);
        assert!(rows
            .iter()
            .all(|r| r.cumulative_share_pct == Some(Decimal::ZERO)));
    }
}
