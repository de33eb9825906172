//! The bundled in-memory datasets the console pages display. Values are
//! base-currency (USD) monthly figures; they are illustrative mock data, not
//! authoritative business numbers.

use core_types::{Dataset, RawRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const CUSTOMER_REVENUE: &str = "customer-revenue";
pub const REGIONAL_SPEND: &str = "regional-spend";

/// All datasets the simulated backend serves.
pub fn all() -> Vec<Dataset> {
    vec![customer_revenue(), regional_spend()]
}

/// The revenue-concentration page: top customers ranked by revenue, with
/// budget/forecast baselines and benchmark series.
pub fn customer_revenue() -> Dataset {
    let customer = |id: u32,
                    label: &str,
                    segment: &str,
                    revenue: Decimal,
                    actual: Decimal,
                    budget: Decimal,
                    forecast: Decimal| {
        RawRecord::new(id, label)
            .with_attribute("segment", segment)
            .with_measure("revenue", revenue)
            .with_measure("actual", actual)
            .with_measure("budget", budget)
            .with_measure("forecast", forecast)
            .with_measure("benchmark_internal", budget)
            .with_measure("benchmark_industry", budget * dec!(1.05))
    };

    let records = vec![
        customer(1, "Northwind Traders", "Enterprise", dec!(12.5), dec!(12.5), dec!(11.8), dec!(12.1)),
        customer(2, "Contoso Ltd", "Enterprise", dec!(10.8), dec!(10.8), dec!(11.2), dec!(10.9)),
        customer(3, "Fabrikam Inc", "Enterprise", dec!(9.2), dec!(9.2), dec!(8.9), dec!(9.0)),
        customer(4, "Adventure Works", "Mid-Market", dec!(7.4), dec!(7.4), dec!(7.0), dec!(7.2)),
        customer(5, "Tailspin Toys", "Mid-Market", dec!(6.1), dec!(6.1), dec!(6.5), dec!(6.3)),
        customer(6, "Wingtip Corp", "Mid-Market", dec!(4.9), dec!(4.9), dec!(5.1), dec!(5.0)),
        customer(7, "Proseware", "SMB", dec!(3.6), dec!(3.6), dec!(3.4), dec!(3.5)),
        customer(8, "Lucerne Publishing", "SMB", dec!(2.8), dec!(2.8), dec!(3.0), dec!(2.9)),
    ];

    Dataset::new(CUSTOMER_REVENUE, "Customer Revenue Concentration", "revenue", records)
        .expect("sample dataset ids are unique")
        .with_categories(
            "segment",
            vec![
                "Enterprise".to_string(),
                "Mid-Market".to_string(),
                "SMB".to_string(),
            ],
        )
        .with_decile_boundaries(vec![
            dec!(2),
            dec!(3),
            dec!(4),
            dec!(5),
            dec!(6),
            dec!(7),
            dec!(8),
            dec!(10),
            dec!(12),
        ])
}

/// The spend-variance page: operating spend per region against budget.
/// Expense-like, so coming in under budget is favorable.
pub fn regional_spend() -> Dataset {
    let region = |id: u32, label: &str, zone: &str, actual: Decimal, budget: Decimal, forecast: Decimal| {
        RawRecord::new(id, label)
            .with_attribute("zone", zone)
            .with_measure("spend", actual)
            .with_measure("actual", actual)
            .with_measure("budget", budget)
            .with_measure("forecast", forecast)
            .with_measure("benchmark_internal", budget)
            .with_measure("benchmark_industry", budget * dec!(0.97))
    };

    let records = vec![
        region(1, "North America", "Americas", dec!(8.4), dec!(8.0), dec!(8.2)),
        region(2, "Latin America", "Americas", dec!(2.1), dec!(2.4), dec!(2.2)),
        region(3, "Western Europe", "EMEA", dec!(6.6), dec!(6.9), dec!(6.7)),
        region(4, "Middle East", "EMEA", dec!(1.9), dec!(1.7), dec!(1.8)),
        region(5, "India", "APAC", dec!(3.2), dec!(3.5), dec!(3.3)),
        region(6, "Southeast Asia", "APAC", dec!(2.7), dec!(2.6), dec!(2.7)),
    ];

    Dataset::new(REGIONAL_SPEND, "Regional Spend vs Budget", "spend", records)
        .expect("sample dataset ids are unique")
        .with_categories(
            "zone",
            vec![
                "Americas".to_string(),
                "EMEA".to_string(),
                "APAC".to_string(),
            ],
        )
        .with_decile_boundaries(vec![
            dec!(1),
            dec!(2),
            dec!(3),
            dec!(4),
            dec!(5),
            dec!(6),
            dec!(7),
            dec!(8),
            dec!(9),
        ])
        .with_expense_semantics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_datasets_are_well_formed() {
        for dataset in all() {
            assert!(!dataset.records.is_empty());
            assert!(dataset.reference_total > Decimal::ZERO);
            assert!(dataset.category_attribute.is_some());
            assert_eq!(dataset.decile_boundaries.len(), 9);
            // Reference shares are a full partition of the population.
            let share_sum: Decimal = dataset.reference_shares.values().sum();
            assert!((share_sum - Decimal::ONE).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn spend_dataset_is_expense_like() {
        assert!(regional_spend().expense_like);
        assert!(!customer_revenue().expense_like);
    }
}
