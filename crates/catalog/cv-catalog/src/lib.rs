//! cv-catalog - incremental Cal/Val product catalog builder.
//!
//! This crate maintains a CSV catalog of calibration/validation products
//! stored in an object store. It supports:
//!
//! - Paginated S3 listing per burst, with LocalStack support
//! - Incremental merges that skip already-cataloged URLs
//! - Footprint geometry resolved at most once per burst
//! - Deduplication on (burst id, acquisition date) and a stable sort
//! - Queries by burst, inclusive date range and area of interest
//!
//! # Example
//!
//! ```ignore
//! use cv_catalog::{BuildConfig, CatalogBuilder, DEFAULT_SUFFIX};
//! use cv_catalog::s3::{S3Config, S3GeometryFetcher, S3KeyLister, create_s3_client};
//!
//! let s3_config = S3Config::new().with_region("us-west-2").with_anonymous(true);
//! let client = create_s3_client(&s3_config).await?;
//!
//! let builder = CatalogBuilder::new(
//!     S3KeyLister::new(client.clone(), "opera-bucket", DEFAULT_SUFFIX),
//!     S3GeometryFetcher::new(client),
//!     BuildConfig::new("opera-bucket", "products/cslc"),
//! );
//!
//! let stats = builder
//!     .update_catalog_file("bursts.csv".as_ref(), "catalog.csv".as_ref(), &[])
//!     .await?;
//! eprintln!("Added {} records", stats.records_added);
//! ```

pub mod aoi;
pub mod builder;
pub mod catalog;
pub mod config;
pub mod geometry;
pub mod query;
pub mod record;
pub mod remote;
pub mod s3;
pub mod seed;
pub mod stats;

pub use aoi::AoiRegistry;
pub use builder::CatalogBuilder;
pub use catalog::{CATALOG_COLUMNS, Catalog};
pub use config::{BuildConfig, DEFAULT_SCHEME, DEFAULT_SUFFIX};
pub use geometry::Geometry;
pub use query::{CatalogQuery, OutputFormat, QueryRow, render_rows};
pub use record::{CatalogRecord, DATE_FORMAT, ObjectKey, Partition};
pub use remote::{GeometryFetcher, KeyLister};
pub use s3::{S3Config, S3GeometryFetcher, S3KeyLister, create_s3_client};
pub use seed::{load_partitions, select_partitions};
pub use stats::BuildStats;
