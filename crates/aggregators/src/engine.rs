use crate::error::AggregatorError;
use crate::plan::{AggregationPlan, AggregationStep};
use crate::{concentration, decile, pareto, rollup, variance};
use core_types::{Dataset, DerivedRow, FilterState, RawRecord};
use currency::CurrencyConverter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Derived rows plus the flat summary metric map, unrounded. The projector
/// applies ordering and display rounding before publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationOutput {
    pub rows: Vec<DerivedRow>,
    pub summary: BTreeMap<String, Decimal>,
}

/// A stateless calculator composing the plan's transforms over one fetched
/// slice of records.
#[derive(Debug, Default)]
pub struct AggregationEngine {}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the plan against the fetched records and the filter snapshot.
    ///
    /// The entity filter narrows the working set first (derived row count is
    /// therefore never above the raw count), measures are converted into the
    /// display currency once, and each step merges its computed fields into
    /// the rows and summary. Pure and deterministic: identical inputs yield
    /// identical output.
    pub fn run(
        &self,
        plan: &AggregationPlan,
        dataset: &Dataset,
        records: &[RawRecord],
        filter: &FilterState,
        converter: &CurrencyConverter,
    ) -> Result<AggregationOutput, AggregatorError> {
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            if !filter.entity_filter.matches(record.id) {
                continue;
            }
            let mut row = DerivedRow::from_record(record);
            for value in row.measures.values_mut() {
                *value = converter.convert(*value, filter.currency)?;
            }
            rows.push(row);
        }

        let mut summary = BTreeMap::new();
        for step in &plan.steps {
            match step {
                AggregationStep::ParetoRank => {
                    let total = pareto::rank(&mut rows, &dataset.primary_measure);
                    summary.insert("total".to_string(), total);
                }
                AggregationStep::ConcentrationIndex => {
                    summary.insert(
                        "concentration_index".to_string(),
                        concentration::index(dataset),
                    );
                    concentration::annotate(&mut rows, dataset);
                }
                AggregationStep::DecileBucket => {
                    decile::annotate(&mut rows, dataset);
                    for (label, count) in decile::reference_counts(dataset) {
                        summary.insert(format!("decile_count.{label}"), Decimal::from(count));
                    }
                }
                AggregationStep::SegmentRollup => {
                    let Some(attribute) = &dataset.category_attribute else {
                        continue;
                    };
                    for segment in rollup::by_segment(
                        &rows,
                        attribute,
                        &dataset.categories,
                        &dataset.primary_measure,
                    ) {
                        summary.insert(
                            format!("segment.{}.{}", segment.category, dataset.primary_measure),
                            segment.total,
                        );
                        summary.insert(
                            format!(
                                "segment.{}.avg.{}",
                                segment.category, dataset.primary_measure
                            ),
                            segment.average,
                        );
                        summary.insert(
                            format!("segment.{}.count", segment.category),
                            Decimal::from(segment.count),
                        );
                    }
                }
                AggregationStep::Variance => {
                    let basis_key = filter.comparison_basis.measure_key();
                    let total = variance::calculate(&mut rows, basis_key, dataset.expense_like);
                    summary.insert("variance_total".to_string(), total);
                }
            }
        }

        // The benchmark card always has a value, zero when the dataset
        // carries no series for the selected source.
        let benchmark: Decimal = rows
            .iter()
            .map(|r| r.measure(filter.benchmark_source.measure_key()))
            .sum();
        summary.insert("benchmark".to_string(), benchmark);

        Ok(AggregationOutput { rows, summary })
    }
}
