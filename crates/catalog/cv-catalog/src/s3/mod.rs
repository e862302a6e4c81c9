//! S3 implementations of the remote collaborators.
//!
//! This module provides:
//! - Client configuration with anonymous access and LocalStack support
//! - Paginated key listing with continuation tokens
//! - Geometry fetching from downloaded objects

mod client;
mod fetch;
mod list;

pub use client::{S3Config, create_s3_client};
pub use fetch::{S3GeometryFetcher, SCAN_OVERLAP, WktScanner, extract_wkt, parse_s3_url};
pub use list::S3KeyLister;
