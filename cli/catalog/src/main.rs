//! cv-catalog CLI
//!
//! Builds and queries the Cal/Val product catalog.

use clap::Parser;
use cv_cli_common::{format_number, format_seconds, init_logging};
use cv_error::{CvError, ErrorCategory, classify_error};

mod args;
mod run;

use args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for query output)
    init_logging(args.log_level)?;

    let result = match args.command {
        Command::Build(build_args) => run::build(build_args).await.map(report_build),
        Command::Query(query_args) => run::query(query_args).map(report_query),
    };

    if let Err(error) = result {
        exit_with(error);
    }

    Ok(())
}

fn report_build(stats: cv_catalog::BuildStats) {
    eprintln!();
    eprintln!("Catalog build completed:");
    eprintln!("  Partitions:         {}", stats.partitions_processed);
    eprintln!("  Keys listed:        {}", format_number(stats.keys_listed as u64));
    eprintln!("  Already cataloged:  {}", format_number(stats.keys_skipped as u64));
    eprintln!("  Superseded:         {}", format_number(stats.keys_superseded as u64));
    eprintln!("  Records added:      {}", format_number(stats.records_added as u64));
    eprintln!("  Geometries fetched: {}", stats.geometries_fetched);
    eprintln!("  Geometries reused:  {}", stats.geometries_reused);
    eprintln!("  Duplicates removed: {}", stats.duplicates_removed);
    eprintln!("  Catalog size:       {}", format_number(stats.catalog_size as u64));

    if let Some(duration) = stats.duration() {
        eprintln!(
            "  Duration:           {}",
            format_seconds(duration.num_milliseconds())
        );
    }
}

fn report_query(summary: run::QuerySummary) {
    eprintln!(
        "Matched {} of {} records",
        format_number(summary.matched as u64),
        format_number(summary.catalog_size as u64)
    );
}

/// Report a failed run and exit: 2 when the input or configuration must be
/// fixed first, 3 when re-running may succeed.
fn exit_with(error: anyhow::Error) -> ! {
    let category = match error.downcast_ref::<CvError>() {
        Some(cv_error) => classify_error(cv_error),
        None => ErrorCategory::Permanent,
    };

    eprintln!("Error: {error:#}");
    match category {
        ErrorCategory::Permanent => {
            eprintln!("  The input or configuration must be fixed before re-running.");
            std::process::exit(2);
        }
        ErrorCategory::Transient => {
            eprintln!("  Re-running may succeed; already cataloged products are skipped.");
            std::process::exit(3);
        }
    }
}
