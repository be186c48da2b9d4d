//! CLI entry point for the data preparation pipeline.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use data_prep::{DataPaths, PrepReport, TracingObserver, datasets, pipeline};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Batch preparation of raw customer, product, and sales tables",
    long_about = "Cleans delimited data files: deduplication, missing-value handling,\n\
                  categorical standardization, validity filtering, and IQR outlier\n\
                  removal. Inputs are read from <data-dir>/raw and prepared files are\n\
                  written to <data-dir>/prepared.\n\n\
                  EXAMPLES:\n  \
                  # Prepare a single dataset\n  \
                  data-prep customers\n\n  \
                  # Prepare everything, writing JSON run reports\n  \
                  data-prep all --emit-report"
)]
struct Args {
    #[command(subcommand)]
    dataset: DatasetCommand,

    /// Root directory holding raw/ and prepared/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress informational output (only warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Write a JSON run report next to each prepared file
    #[arg(long)]
    emit_report: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum DatasetCommand {
    /// Prepare the customers dataset
    Customers,
    /// Prepare the products dataset
    Products,
    /// Prepare the sales dataset
    Sales,
    /// Prepare every dataset in sequence
    All,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
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
    init_logging(&args.log_level, args.quiet);

    let specs = match args.dataset {
        DatasetCommand::Customers => vec![datasets::customers()],
        DatasetCommand::Products => vec![datasets::products()],
        DatasetCommand::Sales => vec![datasets::sales()],
        DatasetCommand::All => datasets::all(),
    };

    let paths = DataPaths::new(&args.data_dir);
    let observer = TracingObserver;

    // Dataset pipelines are isolated: a failure is logged and the next
    // dataset still runs. Success is the written file; the process exits
    // zero either way.
    for spec in &specs {
        info!("======= preparing '{}' dataset =======", spec.name);
        match pipeline::run_from_files(spec, &paths, &observer) {
            Ok(report) => {
                info!(
                    "'{}' prepared: {} rows in, {} rows out, {} removed ({} ms)",
                    report.dataset,
                    report.rows_in,
                    report.rows_out,
                    report.rows_removed_total(),
                    report.duration_ms
                );
                for stage in &report.stages {
                    if stage.rows_removed > 0 {
                        info!(
                            "  {}: removed {} rows",
                            stage.stage.display_name(),
                            stage.rows_removed
                        );
                    }
                }
                if args.emit_report {
                    match write_report(&report, &paths) {
                        Ok(path) => info!("run report written to {}", path.display()),
                        Err(e) => warn!("could not write run report: {}", e),
                    }
                }
            }
            Err(e) => error!("'{}' pipeline failed: {}", spec.name, e),
        }
    }

    Ok(())
}

fn write_report(report: &PrepReport, paths: &DataPaths) -> data_prep::Result<PathBuf> {
    let path = paths
        .prepared_dir
        .join(format!("{}_report.json", report.dataset));
    std::fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
