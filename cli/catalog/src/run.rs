//! Main execution logic for the cv-catalog CLI.

use anyhow::{Context, Result};
use cv_catalog::{
    AoiRegistry, BuildConfig, BuildStats, Catalog, CatalogBuilder, CatalogQuery, Geometry,
    QueryRow, S3Config, S3GeometryFetcher, S3KeyLister, create_s3_client, render_rows,
};
use std::io::Write;
use tracing::info;

use crate::args::{BuildArgs, QueryArgs};

/// Summary of a query run.
#[derive(Debug, Default)]
pub struct QuerySummary {
    pub catalog_size: usize,
    pub matched: usize,
}

/// Update the catalog file from S3.
pub async fn build(args: BuildArgs) -> Result<BuildStats> {
    let mut s3_config = S3Config::new()
        .with_region(&args.region)
        .with_anonymous(args.anonymous)
        .with_timeout(args.timeout);

    if let Some(endpoint) = &args.s3_endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&args.access_key, &args.secret_key) {
        s3_config = s3_config.with_credentials(access_key, secret_key);
    }

    if let Some(profile) = &args.profile {
        s3_config = s3_config.with_profile(profile);
    }

    let client = create_s3_client(&s3_config).await?;

    let builder = CatalogBuilder::new(
        S3KeyLister::new(client.clone(), &args.bucket, &args.suffix),
        S3GeometryFetcher::new(client),
        BuildConfig::new(&args.bucket, &args.prefix),
    );

    let stats = builder
        .update_catalog_file(&args.seed_file, &args.catalog_file, &args.burst_ids)
        .await?;

    info!(path = %args.catalog_file.display(), "Catalog written");
    Ok(stats)
}

/// Print the records matching the query filters to stdout.
pub fn query(args: QueryArgs) -> Result<QuerySummary> {
    let catalog = Catalog::load(&args.catalog_file)?;

    let mut query = CatalogQuery::new().with_burst_ids(args.burst_ids.clone());
    if let Some(start) = args.start_date {
        query = query.with_start_date(start);
    }
    if let Some(end) = args.end_date {
        query = query.with_end_date(end);
    }
    if let Some(aoi) = resolve_aoi(&args)? {
        query = query.with_aoi(aoi);
    }

    let rows: Vec<QueryRow> = query.apply(&catalog).into_iter().map(QueryRow::from).collect();
    let output = render_rows(&rows, args.output_format.into())?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .and_then(|_| stdout.flush())
        .context("Failed to write query output")?;

    Ok(QuerySummary {
        catalog_size: catalog.len(),
        matched: rows.len(),
    })
}

/// The area of interest named on the command line, if any.
fn resolve_aoi(args: &QueryArgs) -> Result<Option<Geometry>> {
    if let Some(wkt) = &args.wkt {
        return Ok(Some(Geometry::from_wkt(wkt)?));
    }

    match (&args.aoi, &args.aoi_file) {
        (Some(name), Some(path)) => {
            let registry = AoiRegistry::load(path)?;
            Ok(Some(registry.get(name)?.clone()))
        }
        _ => Ok(None),
    }
}
