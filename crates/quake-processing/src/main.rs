//! CLI entry point for exploring a seismic event dataset.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use quake_processing::{
    CorrelationMethod, CorrelationPair, DatasetPreparer, DatasetSummary, FilterCriteria,
    FilterSummary, Hemisphere, LoadOptions, MagnitudeCategory, TsunamiFilter, YearlyStats,
    correlation_matrix, describe, filter, yearly_stats,
};
use quake_processing::analytics::default_correlation_columns;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// CLI-compatible tsunami filter enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliTsunami {
    /// Keep every event
    All,
    /// Keep events that generated a tsunami
    With,
    /// Keep events that did not generate a tsunami
    Without,
}

impl From<CliTsunami> for TsunamiFilter {
    fn from(cli: CliTsunami) -> Self {
        match cli {
            CliTsunami::All => TsunamiFilter::All,
            CliTsunami::With => TsunamiFilter::OnlyWith,
            CliTsunami::Without => TsunamiFilter::OnlyWithout,
        }
    }
}

/// CLI-compatible hemisphere enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliHemisphere {
    /// Latitude >= 0
    North,
    /// Latitude < 0
    South,
    /// Longitude >= 0
    East,
    /// Longitude < 0
    West,
}

impl From<CliHemisphere> for Hemisphere {
    fn from(cli: CliHemisphere) -> Self {
        match cli {
            CliHemisphere::North => Hemisphere::North,
            CliHemisphere::South => Hemisphere::South,
            CliHemisphere::East => Hemisphere::East,
            CliHemisphere::West => Hemisphere::West,
        }
    }
}

/// CLI-compatible magnitude category enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMagnitudeCategory {
    /// Magnitude <= 6.5
    Moderate,
    /// 6.5 < magnitude <= 7.0
    Strong,
    /// 7.0 < magnitude <= 7.5
    Major,
    /// Magnitude > 7.5
    Great,
}

impl From<CliMagnitudeCategory> for MagnitudeCategory {
    fn from(cli: CliMagnitudeCategory) -> Self {
        match cli {
            CliMagnitudeCategory::Moderate => MagnitudeCategory::Moderate,
            CliMagnitudeCategory::Strong => MagnitudeCategory::Strong,
            CliMagnitudeCategory::Major => MagnitudeCategory::Major,
            CliMagnitudeCategory::Great => MagnitudeCategory::Great,
        }
    }
}

/// CLI-compatible correlation method enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCorrelationMethod {
    Pearson,
    Spearman,
}

impl From<CliCorrelationMethod> for CorrelationMethod {
    fn from(cli: CliCorrelationMethod) -> Self {
        match cli {
            CliCorrelationMethod::Pearson => CorrelationMethod::Pearson,
            CliCorrelationMethod::Spearman => CorrelationMethod::Spearman,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Seismic event dataset explorer",
    long_about = "Loads an earthquake catalogue, derives analysis columns and applies filters.\n\n\
                  EXAMPLES:\n  \
                  # Dataset overview\n  \
                  quake-processing -i earthquake_data_tsunami.csv\n\n  \
                  # Shallow tsunami events between 2010 and 2015\n  \
                  quake-processing -i quakes.csv --year-min 2010 --year-max 2015 --tsunami with --shallow-only\n\n  \
                  # Southern hemisphere only, as JSON\n  \
                  quake-processing -i quakes.csv --hemisphere south --hemisphere east --hemisphere west --json"
)]
struct Args {
    /// Path to the CSV file to load
    #[arg(short, long)]
    input: PathBuf,

    /// Column separator of the input file
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Lower bound (inclusive) on event year
    #[arg(long)]
    year_min: Option<i32>,

    /// Upper bound (inclusive) on event year
    #[arg(long)]
    year_max: Option<i32>,

    /// Lower bound (inclusive) on magnitude
    #[arg(long)]
    mag_min: Option<f64>,

    /// Upper bound (inclusive) on magnitude
    #[arg(long)]
    mag_max: Option<f64>,

    /// Maximum depth in km (inclusive)
    #[arg(long)]
    max_depth: Option<f64>,

    /// Tsunami outcome to keep
    #[arg(long, value_enum, default_value = "all")]
    tsunami: CliTsunami,

    /// Hemisphere to keep (repeatable). Omit to keep all
    #[arg(long, value_enum)]
    hemisphere: Vec<CliHemisphere>,

    /// Magnitude category to keep (repeatable). Omit to keep all
    #[arg(long, value_enum)]
    magnitude_category: Vec<CliMagnitudeCategory>,

    /// Minimum significance score (inclusive)
    #[arg(long)]
    min_sig: Option<f64>,

    /// Keep only events shallower than 50 km
    #[arg(long)]
    shallow_only: bool,

    /// Keep only events of magnitude 7.0 or more
    #[arg(long)]
    high_magnitude_only: bool,

    /// Print per-year aggregates of the filtered events
    #[arg(long)]
    yearly: bool,

    /// Print the N most strongly correlated column pairs of the filtered events
    #[arg(long, value_name = "N")]
    top_correlations: Option<usize>,

    /// Correlation method used with --top-correlations
    #[arg(long, value_enum, default_value = "spearman")]
    correlation_method: CliCorrelationMethod,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of a human-readable report
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = u8::try_from(self.delimiter)
            .map_err(|_| anyhow!("Delimiter must be a single ASCII character"))?;
        Ok(LoadOptions::builder().delimiter(delimiter).build()?)
    }

    fn criteria(&self) -> Result<FilterCriteria> {
        let mut builder = FilterCriteria::builder()
            .tsunami_filter(self.tsunami.into())
            .hemispheres(self.hemisphere.iter().copied().map(Hemisphere::from))
            .magnitude_categories(
                self.magnitude_category
                    .iter()
                    .copied()
                    .map(MagnitudeCategory::from),
            )
            .shallow_only(self.shallow_only)
            .high_magnitude_only(self.high_magnitude_only);

        if self.year_min.is_some() || self.year_max.is_some() {
            builder = builder.year_range(
                self.year_min.unwrap_or(i32::MIN),
                self.year_max.unwrap_or(i32::MAX),
            );
        }
        if self.mag_min.is_some() || self.mag_max.is_some() {
            builder = builder.magnitude_range(
                self.mag_min.unwrap_or(f64::NEG_INFINITY),
                self.mag_max.unwrap_or(f64::INFINITY),
            );
        }
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        if let Some(sig) = self.min_sig {
            builder = builder.min_significance(sig);
        }

        Ok(builder.build()?)
    }
}

/// Everything the CLI reports for one run.
#[derive(Debug, Serialize)]
struct Report {
    dataset: DatasetSummary,
    criteria: FilterCriteria,
    filter: FilterSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    yearly: Option<Vec<YearlyStats>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlations: Option<Vec<CorrelationPair>>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let criteria = args.criteria()?;
    let preparer = DatasetPreparer::new(args.load_options()?);

    let events = preparer
        .load(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let dataset = describe(&events)?;

    let filtered = filter::apply(&events, &criteria)?;
    let summary = filter::summarize(&events, &filtered)?;
    info!(
        "Filter kept {} of {} events",
        summary.filtered_count, summary.original_count
    );

    let yearly = if args.yearly {
        Some(yearly_stats(&filtered)?)
    } else {
        None
    };

    let correlations = match args.top_correlations {
        Some(n) => {
            let columns = default_correlation_columns(&filtered);
            debug!("Correlating columns: {:?}", columns);
            let matrix = correlation_matrix(&filtered, &columns, args.correlation_method.into())?;
            Some(matrix.strongest_pairs(n))
        }
        None => None,
    };

    let report = Report {
        dataset,
        criteria,
        filter: summary,
        yearly,
        correlations,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args, &report);
    }

    Ok(())
}

/// Print a human-readable report.
///
/// Uses `println!` intentionally: this is the primary output of the CLI and
/// must be visible regardless of log level.
fn print_report(args: &Args, report: &Report) {
    let dataset = &report.dataset;
    let filter = &report.filter;

    println!("\n{}", "=".repeat(80));
    println!("SEISMIC EVENT DATASET");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input.display());
    println!("  Events: {}", dataset.total_events);
    println!(
        "  Tsunami events: {} ({:.1}%)",
        dataset.tsunami_events, dataset.tsunami_percentage
    );
    println!("  Years: {}", dataset.years_span);
    println!("  Magnitude: {}", dataset.magnitude_range);
    println!("  Depth: {}", dataset.depth_range);
    println!();

    println!("FILTER RESULT");
    println!("{}", "-".repeat(40));
    if report.criteria.is_empty() {
        println!("  No filters active");
    }
    println!(
        "  Kept: {} of {} ({:.1}%)",
        filter.filtered_count, filter.original_count, filter.retained_percentage
    );
    println!("  Removed: {}", filter.removed_count);
    println!(
        "  Tsunami events: {} ({:.1}%)",
        filter.tsunami_count, filter.tsunami_percentage
    );
    println!();

    if let Some(yearly) = &report.yearly {
        println!("YEARLY STATISTICS");
        println!("{}", "-".repeat(40));
        println!(
            "{:<6} {:>7} {:>9} {:>8} {:>9} {:>11}",
            "Year", "Events", "Mag mean", "Mag max", "Tsunamis", "Depth mean"
        );
        println!("{}", "-".repeat(55));
        for row in yearly {
            println!(
                "{:<6} {:>7} {:>9} {:>8} {:>9} {:>11}",
                row.year,
                row.event_count,
                fmt_opt(row.mag_mean, 2),
                fmt_opt(row.mag_max, 1),
                row.tsunami_count,
                fmt_opt(row.depth_mean, 1),
            );
        }
        println!();
    }

    if let Some(pairs) = &report.correlations {
        println!("STRONGEST CORRELATIONS");
        println!("{}", "-".repeat(40));
        if pairs.is_empty() {
            println!("  No defined correlations");
        }
        for pair in pairs {
            println!(
                "  {:<20} {:<20} {:>7.3}",
                pair.left, pair.right, pair.coefficient
            );
        }
        println!();
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}
