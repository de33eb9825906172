use aggregators::AggregationPlan;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use core_types::{
    ComparisonBasis, CurrencyCode, EntityFilter, FilterPatch, Granularity, PipelineResult,
};
use currency::CurrencyConverter;
use datasource::{DataSource, SimulatedBackend};
use filter_store::FilterStore;
use projector::{SortDirection, SortKey, SortSpec};
use refresh::RefreshController;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Meridian analytics console.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Datasets => handle_datasets(),
        Commands::Report(args) => handle_report(args).await?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A reactive metrics pipeline for financial dashboards, driven from the terminal.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the bundled datasets.
    Datasets,
    /// Run the pipeline against a dataset and print the derived rows.
    Report(ReportArgs),
}

#[derive(Parser)]
struct ReportArgs {
    /// The dataset to report on (see `datasets`).
    #[arg(long, default_value = datasource::samples::CUSTOMER_REVENUE)]
    dataset: String,

    /// Display currency (e.g. "EUR"); defaults to the configured preference.
    #[arg(long)]
    currency: Option<CurrencyCode>,

    /// Narrow the report to a single entity id.
    #[arg(long)]
    entity: Option<u32>,

    /// Time granularity of the slice.
    #[arg(long, value_enum)]
    granularity: Option<GranularityArg>,

    /// Baseline for the variance columns.
    #[arg(long, value_enum)]
    basis: Option<BasisArg>,

    /// Row ordering of the printed report.
    #[arg(long, value_enum, default_value = "rank")]
    sort: SortArg,

    /// Sort descending instead of ascending.
    #[arg(long)]
    descending: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GranularityArg {
    Monthly,
    Quarterly,
    Ytd,
}

impl From<GranularityArg> for Granularity {
    fn from(value: GranularityArg) -> Self {
        match value {
            GranularityArg::Monthly => Granularity::Monthly,
            GranularityArg::Quarterly => Granularity::Quarterly,
            GranularityArg::Ytd => Granularity::Ytd,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BasisArg {
    Budget,
    Forecast,
}

impl From<BasisArg> for ComparisonBasis {
    fn from(value: BasisArg) -> Self {
        match value {
            BasisArg::Budget => ComparisonBasis::Budget,
            BasisArg::Forecast => ComparisonBasis::Forecast,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Rank,
    Share,
    Variance,
    VariancePct,
}

impl SortArg {
    fn spec(self, descending: bool) -> SortSpec {
        let direction = if descending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        let key = match self {
            SortArg::Rank => SortKey::Rank,
            SortArg::Share => SortKey::CumulativeShare,
            SortArg::Variance => SortKey::VarianceAmount,
            SortArg::VariancePct => SortKey::VariancePct,
        };
        SortSpec::new(key, direction)
    }
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_datasets() {
    let backend = SimulatedBackend::new(Default::default(), 0.0, None);
    println!("Bundled datasets:");
    for id in backend.dataset_ids() {
        let name = backend.dataset(id).map(|d| d.name.clone()).unwrap_or_default();
        println!("  {id:<20} {name}");
    }
}

async fn handle_report(args: ReportArgs) -> anyhow::Result<()> {
    let config = configuration::load_config().context("failed to load meridian.toml")?;

    let converter = CurrencyConverter::default();
    let backend = Arc::new(SimulatedBackend::new(
        config.backend.latency,
        config.backend.failure_rate,
        config.backend.rng_seed,
    ));
    let dataset = backend
        .dataset(&args.dataset)
        .with_context(|| format!("unknown dataset: {}", args.dataset))?
        .clone();

    let store = FilterStore::new(config.initial_currency, converter.supported())?;
    let controller = RefreshController::new(
        dataset,
        Arc::clone(&backend) as Arc<dyn DataSource>,
        store.clone(),
        converter,
        AggregationPlan::standard(),
        args.sort.spec(args.descending),
        config.refresh.debounce_window,
    );
    let mut rx = controller.subscribe();

    // Apply the CLI's filter selections, then refresh immediately instead of
    // waiting out the debounce window.
    let patch = FilterPatch {
        currency: args.currency,
        entity_filter: args.entity.map(EntityFilter::Entity),
        granularity: args.granularity.map(Into::into),
        comparison_basis: args.basis.map(Into::into),
        benchmark_source: None,
    };
    if patch != FilterPatch::default() {
        store.set_filter(patch)?;
    }
    controller.force_refresh();

    // The simulated backend fails a small fraction of fetches; retry a
    // couple of times the way the console's retry affordance would.
    let mut retries_left = 3;
    let result: PipelineResult = loop {
        rx.changed().await?;
        let result = rx.borrow().clone();
        if result.loading {
            continue;
        }
        if result.error.is_some() && retries_left > 0 {
            tracing::warn!(error = ?result.error, retries_left, "fetch failed; retrying");
            retries_left -= 1;
            controller.force_refresh();
            continue;
        }
        break result;
    };

    if let Some(error) = &result.error {
        anyhow::bail!("pipeline failed after retries: {error:?}");
    }

    print_report(&controller, &result, store.state().currency);
    Ok(())
}

fn print_report(controller: &RefreshController, result: &PipelineResult, currency: CurrencyCode) {
    let dataset = controller.dataset();
    println!(
        "\n{}: {} rows, in {}\n",
        dataset.name,
        result.rows.len(),
        currency
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Rank",
        "Entity",
        dataset.primary_measure.as_str(),
        "Cum. Share %",
        "Decile",
        "Variance",
        "Var %",
        "Favorable",
    ]);
    for row in &result.rows {
        table.add_row(vec![
            row.rank.map(|r| r.to_string()).unwrap_or_default(),
            row.label.clone(),
            row.measure(&dataset.primary_measure).to_string(),
            row.cumulative_share_pct
                .map(|v| v.to_string())
                .unwrap_or_default(),
            row.decile.clone().unwrap_or_default(),
            row.variance.map(|v| v.to_string()).unwrap_or_default(),
            row.variance_pct.map(|v| v.to_string()).unwrap_or_default(),
            row.favorable
                .map(|f| (if f { "yes" } else { "no" }).to_string())
                .unwrap_or_default(),
        ]);
    }
    println!("{table}");

    let mut summary = Table::new();
    summary
        .load_preset(UTF8_FULL)
        .set_header(vec!["Metric", "Value"]);
    for (key, value) in &result.summary {
        summary.add_row(vec![key.clone(), value.to_string()]);
    }
    println!("\n{summary}");

    if let Some(at) = result.last_refreshed_at {
        println!("\nLast refreshed at {at}");
    }
}
