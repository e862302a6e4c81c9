//! Statistics for catalog builds.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Statistics collected during a build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    /// When the build started
    pub started_at: Option<DateTime<Utc>>,

    /// When the build completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of partitions listed
    pub partitions_processed: usize,

    /// Number of keys returned by the lister
    pub keys_listed: usize,

    /// Number of keys skipped because their URL was already cataloged
    pub keys_skipped: usize,

    /// Number of new keys whose (burst id, date) was already cataloged
    pub keys_superseded: usize,

    /// Number of records appended
    pub records_added: usize,

    /// Number of geometry fetches
    pub geometries_fetched: usize,

    /// Number of geometries taken from existing records
    pub geometries_reused: usize,

    /// Number of duplicate records dropped by normalization
    pub duplicates_removed: usize,

    /// Number of records in the final catalog
    pub catalog_size: usize,
}

impl BuildStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the build as complete with the current time.
    pub fn complete(&mut self, catalog_size: usize) {
        self.catalog_size = catalog_size;
        self.completed_at = Some(Utc::now());
    }

    /// Record a listed key that was already cataloged.
    pub fn record_skipped(&mut self) {
        self.keys_listed += 1;
        self.keys_skipped += 1;
    }

    /// Record a new key dropped because its date was already cataloged.
    pub fn record_superseded(&mut self) {
        self.keys_listed += 1;
        self.keys_superseded += 1;
    }

    /// Record a listed key that became a new record.
    pub fn record_added(&mut self) {
        self.keys_listed += 1;
        self.records_added += 1;
    }

    /// Get the duration of the build.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Check whether the build changed the catalog.
    pub fn changed(&self) -> bool {
        self.records_added > 0 || self.duplicates_removed > 0
    }
}
