//! Incremental catalog builder.

use chrono::NaiveDate;
use cv_error::Result;
use futures::TryStreamExt;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::BuildConfig;
use crate::geometry::Geometry;
use crate::record::{CatalogRecord, ObjectKey, Partition};
use crate::remote::{GeometryFetcher, KeyLister};
use crate::seed::{load_partitions, select_partitions};
use crate::stats::BuildStats;

/// Merges newly listed objects into a catalog.
///
/// Generic over the lister and fetcher so the same merge logic runs against
/// S3 in production and in-memory doubles in tests.
pub struct CatalogBuilder<L: KeyLister, G: GeometryFetcher> {
    lister: L,
    fetcher: G,
    config: BuildConfig,
}

/// Lookup state carried across partitions within one build.
#[derive(Default)]
struct MergeState {
    /// URLs already present in the working catalog
    known_urls: HashSet<String>,

    /// (burst id, date) pairs already present in the working catalog
    known_dates: HashSet<(String, NaiveDate)>,

    /// Geometry per burst id, resolved at most once per build
    geometries: HashMap<String, Geometry>,
}

impl<L: KeyLister, G: GeometryFetcher> CatalogBuilder<L, G> {
    /// Create a new builder.
    pub fn new(lister: L, fetcher: G, config: BuildConfig) -> Self {
        Self {
            lister,
            fetcher,
            config,
        }
    }

    /// The build configuration.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Merge the objects of every partition into `catalog`.
    ///
    /// Partitions are processed in order, one at a time. Any listing or
    /// geometry error aborts the build and is returned as is; the caller's
    /// persisted catalog is untouched in that case. The returned catalog is
    /// deduplicated on (burst id, date) and sorted by it.
    pub async fn build(
        &self,
        mut catalog: Catalog,
        partitions: &[Partition],
    ) -> Result<(Catalog, BuildStats)> {
        let mut stats = BuildStats::new();
        let mut state = MergeState {
            known_urls: catalog.urls(),
            known_dates: catalog
                .iter()
                .map(|r| (r.burst_id.clone(), r.date))
                .collect(),
            ..Default::default()
        };

        info!(
            bucket = %self.config.bucket,
            prefix = %self.config.prefix,
            partitions = partitions.len(),
            existing = catalog.len(),
            "Starting catalog build"
        );

        for partition in partitions {
            self.merge_partition(&mut catalog, &mut state, partition, &mut stats)
                .await?;
            stats.partitions_processed += 1;
        }

        stats.duplicates_removed = catalog.normalize();
        stats.complete(catalog.len());

        info!(
            partitions = stats.partitions_processed,
            keys_listed = stats.keys_listed,
            records_added = stats.records_added,
            keys_skipped = stats.keys_skipped,
            keys_superseded = stats.keys_superseded,
            geometries_fetched = stats.geometries_fetched,
            duplicates_removed = stats.duplicates_removed,
            records = stats.catalog_size,
            "Catalog build completed"
        );

        Ok((catalog, stats))
    }

    /// Update a persisted catalog from a partition seed file.
    ///
    /// The seed file is read first; when it is missing the configuration
    /// error is returned before anything is listed. `burst_ids` narrows the
    /// seed to a subset (empty means all). The catalog file is rewritten only
    /// when the build succeeds.
    pub async fn update_catalog_file(
        &self,
        seed_path: &Path,
        catalog_path: &Path,
        burst_ids: &[String],
    ) -> Result<BuildStats> {
        let partitions = select_partitions(load_partitions(seed_path)?, burst_ids);
        let catalog = Catalog::load(catalog_path)?;

        let (catalog, stats) = self.build(catalog, &partitions).await?;
        catalog.save(catalog_path)?;

        Ok(stats)
    }

    async fn merge_partition(
        &self,
        catalog: &mut Catalog,
        state: &mut MergeState,
        partition: &Partition,
        stats: &mut BuildStats,
    ) -> Result<()> {
        let prefix = self.config.network_prefix(&partition.network);

        let keys: Vec<ObjectKey> = self
            .lister
            .list_keys(&prefix, &partition.burst_id)
            .try_collect()
            .await?;

        debug!(
            burst_id = %partition.burst_id,
            network = %partition.network,
            prefix = %prefix,
            keys = keys.len(),
            "Listed partition"
        );

        let mut added = 0usize;
        for key in keys {
            let url = self.config.object_url(&key.key);

            if state.known_urls.contains(&url) {
                stats.record_skipped();
                debug!(url = %url, "Already cataloged");
                continue;
            }

            let date = key.date_token()?;
            let pair = (partition.burst_id.clone(), date);
            if state.known_dates.contains(&pair) {
                stats.record_superseded();
                debug!(url = %url, %date, "Date already cataloged");
                continue;
            }

            let geometry = self
                .resolve_geometry(catalog, state, &partition.burst_id, &url, stats)
                .await?;

            catalog.push(CatalogRecord {
                burst_id: partition.burst_id.clone(),
                date,
                cslc_url: url.clone(),
                cslc_static_url: None,
                geometry,
            });
            state.known_urls.insert(url);
            state.known_dates.insert(pair);
            stats.record_added();
            added += 1;
        }

        info!(
            burst_id = %partition.burst_id,
            network = %partition.network,
            added,
            "Merged partition"
        );

        Ok(())
    }

    /// Geometry for a burst: cached, else from the first existing record,
    /// else fetched from `url`.
    async fn resolve_geometry(
        &self,
        catalog: &Catalog,
        state: &mut MergeState,
        burst_id: &str,
        url: &str,
        stats: &mut BuildStats,
    ) -> Result<Geometry> {
        if let Some(geometry) = state.geometries.get(burst_id) {
            return Ok(geometry.clone());
        }

        let geometry = match catalog.geometry_for(burst_id) {
            Some(geometry) => {
                stats.geometries_reused += 1;
                debug!(burst_id, "Reusing cataloged geometry");
                geometry.clone()
            }
            None => {
                debug!(burst_id, url, "Fetching geometry");
                let geometry = self.fetcher.fetch_geometry(url).await?;
                stats.geometries_fetched += 1;
                geometry
            }
        };

        state
            .geometries
            .insert(burst_id.to_string(), geometry.clone());
        Ok(geometry)
    }
}
