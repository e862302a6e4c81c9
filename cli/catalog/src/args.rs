//! CLI argument definitions for cv-catalog.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use cv_cli_common::LogLevel;
use std::path::PathBuf;

/// Incremental Cal/Val product catalog.
///
/// Builds a CSV catalog of CSLC products from an S3 bucket, one burst at a
/// time, and queries it by burst, date range and area of interest.
///
/// ## Examples
///
/// Update the catalog for every burst in the seed table:
///   cv-catalog build -b opera-bucket -p products/CSLC_S1 \
///       --seed-file bursts.csv --catalog-file catalog.csv
///
/// Update two bursts only, anonymously:
///   cv-catalog build -b opera-bucket --anonymous \
///       --burst-id t142_303931_iw3 --burst-id t064_135523_iw2
///
/// Query a date range inside a named area:
///   cv-catalog query --aoi-file aois.json --aoi Ecuador \
///       --start-date 2014-10-01 --end-date 2015-01-01
#[derive(Parser, Debug)]
#[command(name = "cv-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge newly listed products into the catalog file
    Build(BuildArgs),

    /// Print catalog records matching the given filters
    Query(QueryArgs),
}

/// Arguments of `cv-catalog build`.
#[derive(Args, Debug)]
pub struct BuildArgs {
    // === S3 Configuration ===
    /// S3 bucket name
    #[arg(short, long, env = "CV_S3_BUCKET")]
    pub bucket: String,

    /// Base prefix; the network tag of each burst is appended to it
    #[arg(short, long, env = "CV_S3_PREFIX", default_value = "")]
    pub prefix: String,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "CV_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-west-2")]
    pub region: String,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Send unsigned requests (public buckets)
    #[arg(long)]
    pub anonymous: bool,

    /// Per-request timeout in seconds (must be >= 1)
    #[arg(long, default_value = "30", value_parser = parse_positive_u64)]
    pub timeout: u64,

    // === Catalog Options ===
    /// Seed table with `burst_id` and `cr_network` columns
    #[arg(long, env = "CV_SEED_FILE", default_value = "bursts.csv")]
    pub seed_file: PathBuf,

    /// Catalog file to update (created when missing)
    #[arg(long, env = "CV_CATALOG_FILE", default_value = "catalog.csv")]
    pub catalog_file: PathBuf,

    /// Only update this burst (can be specified multiple times)
    #[arg(long = "burst-id")]
    pub burst_ids: Vec<String>,

    /// Suffix of product keys
    #[arg(long, default_value = cv_catalog::DEFAULT_SUFFIX)]
    pub suffix: String,
}

/// Arguments of `cv-catalog query`.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Catalog file to read
    #[arg(long, env = "CV_CATALOG_FILE", default_value = "catalog.csv")]
    pub catalog_file: PathBuf,

    /// Only include this burst (can be specified multiple times)
    #[arg(long = "burst-id")]
    pub burst_ids: Vec<String>,

    /// Earliest acquisition date, inclusive (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Latest acquisition date, inclusive (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// JSON file mapping area names to WKT geometries
    #[arg(long, env = "CV_AOI_FILE")]
    pub aoi_file: Option<PathBuf>,

    /// Name of an area in the AOI file
    #[arg(long, requires = "aoi_file", conflicts_with = "wkt")]
    pub aoi: Option<String>,

    /// Area of interest given directly as WKT
    #[arg(long)]
    pub wkt: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "jsonl")]
    pub output_format: OutputFormatArg,
}

/// Output format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    /// JSON Lines (one JSON object per line)
    Jsonl,
    /// Pretty-printed JSON
    Json,
}

impl From<OutputFormatArg> for cv_catalog::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Jsonl => cv_catalog::OutputFormat::Jsonl,
            OutputFormatArg::Json => cv_catalog::OutputFormat::Json,
        }
    }
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

/// Parse a calendar date in ISO or compact form.
fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, cv_catalog::DATE_FORMAT))
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD or YYYYMMDD)", s))
}
