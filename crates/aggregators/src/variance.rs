use core_types::DerivedRow;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The measure key holding the realized value a baseline is compared against.
pub const ACTUAL_MEASURE: &str = "actual";

/// Computes `variance = actual - baseline` and its percentage form per row,
/// plus the favorability bit.
///
/// For expense-like measures a negative variance (under budget) is favorable,
/// so the bit is inverted there and the view never needs sign heuristics. A
/// zero baseline defines the percentage as 0 rather than dividing. Returns
/// the total variance for the summary map.
pub fn calculate(rows: &mut [DerivedRow], basis_key: &str, expense_like: bool) -> Decimal {
    let mut total = Decimal::ZERO;
    for row in rows {
        let actual = row.measure(ACTUAL_MEASURE);
        let basis = row.measure(basis_key);
        let variance = actual - basis;
        total += variance;

        row.variance = Some(variance);
        row.variance_pct = Some(if basis.is_zero() {
            Decimal::ZERO
        } else {
            variance / basis * dec!(100)
        });
        row.favorable = Some(if expense_like {
            variance <= Decimal::ZERO
        } else {
            variance >= Decimal::ZERO
        });
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::RawRecord;

    fn row(actual: Decimal, budget: Decimal) -> DerivedRow {
        DerivedRow::from_record(
            &RawRecord::new(1, "r1")
                .with_measure(ACTUAL_MEASURE, actual)
                .with_measure("budget", budget),
        )
    }

    #[test]
    fn derives_amount_and_percentage() {
        // The 65-vs-75 scenario: -10 and about -13.33%.
        let mut rows = vec![row(dec!(65), dec!(75))];
        let total = calculate(&mut rows, "budget", false);

        assert_eq!(total, dec!(-10));
        assert_eq!(rows[0].variance, Some(dec!(-10)));
        let pct = rows[0].variance_pct.unwrap();
        assert!((pct - dec!(-13.33)).abs() < dec!(0.01));
        assert_eq!(rows[0].favorable, Some(false));
    }

    #[test]
    fn expense_measures_invert_favorability() {
        let mut rows = vec![row(dec!(65), dec!(75)), row(dec!(80), dec!(75))];
        calculate(&mut rows, "budget", true);

        // Under budget is favorable for spend, over budget is not.
        assert_eq!(rows[0].favorable, Some(true));
        assert_eq!(rows[1].favorable, Some(false));
    }

    #[test]
    fn zero_baseline_defines_percentage_as_zero() {
        let mut rows = vec![row(dec!(10), dec!(0))];
        calculate(&mut rows, "budget", false);
        assert_eq!(rows[0].variance, Some(dec!(10)));
        assert_eq!(rows[0].variance_pct, Some(Decimal::ZERO));
    }
}
