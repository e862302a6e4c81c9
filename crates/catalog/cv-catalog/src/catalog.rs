//! The persisted catalog table.
//!
//! A catalog is an ordered list of [`CatalogRecord`]s stored as a flat CSV
//! file with the columns `burst_id, date, cslc_url, cslc_static_url,
//! geometry`. Dates are written as `YYYYMMDD` and geometries as WKT.

use chrono::NaiveDate;
use cv_error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::geometry::Geometry;
use crate::record::{CatalogRecord, DATE_FORMAT};

/// Column names of the persisted table, in order.
pub const CATALOG_COLUMNS: [&str; 5] = [
    "burst_id",
    "date",
    "cslc_url",
    "cslc_static_url",
    "geometry",
];

/// Flat representation of a record as it appears in the CSV file.
#[derive(Debug, Serialize, Deserialize)]
struct CatalogRow {
    burst_id: String,
    date: String,
    cslc_url: String,
    cslc_static_url: Option<String>,
    geometry: String,
}

impl From<&CatalogRecord> for CatalogRow {
    fn from(record: &CatalogRecord) -> Self {
        Self {
            burst_id: record.burst_id.clone(),
            date: record.date.format(DATE_FORMAT).to_string(),
            cslc_url: record.cslc_url.clone(),
            cslc_static_url: record.cslc_static_url.clone(),
            geometry: record.geometry.to_wkt(),
        }
    }
}

impl CatalogRow {
    fn into_record(self, line: u64) -> Result<CatalogRecord> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|e| {
            CatalogError::Parse(format!("line {line}: invalid date '{}': {e}", self.date))
        })?;

        let geometry = Geometry::from_wkt(&self.geometry)
            .map_err(|e| CatalogError::Parse(format!("line {line}: {e}")))?;

        Ok(CatalogRecord {
            burst_id: self.burst_id,
            date,
            cslc_url: self.cslc_url,
            cslc_static_url: self.cslc_static_url.filter(|url| !url.is_empty()),
            geometry,
        })
    }
}

/// An ordered, in-memory catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog from records, keeping their order.
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        Self { records }
    }

    /// Load a catalog from a CSV file.
    ///
    /// A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No existing catalog, starting empty");
            return Ok(Self::new());
        }

        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            CatalogError::Read(format!("Failed to open {}: {e}", path.display()))
        })?;

        let headers = reader
            .headers()
            .map_err(|e| CatalogError::Parse(format!("Failed to parse CSV headers: {e}")))?
            .clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                CatalogError::Parse(format!("{} line {line}: {e}", path.display()))
            })?;
            // Line where the record starts
            let line = row.position().map(|p| p.line()).unwrap_or(0);
            let parsed: CatalogRow = row.deserialize(Some(&headers)).map_err(|e| {
                CatalogError::Parse(format!("{} line {line}: {e}", path.display()))
            })?;
            records.push(parsed.into_record(line)?);
        }

        info!(
            path = %path.display(),
            records = records.len(),
            "Loaded catalog"
        );

        Ok(Self { records })
    }

    /// Write the catalog to a CSV file, replacing any previous content.
    ///
    /// Rows are written to a temporary file next to `path` which is then
    /// renamed over it, so readers never observe a partial table.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            CatalogError::Write(format!("Failed to create temp file in {}: {e}", dir.display()))
        })?;

        {
            let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
            for record in &self.records {
                writer
                    .serialize(CatalogRow::from(record))
                    .map_err(|e| CatalogError::Write(format!("Failed to write row: {e}")))?;
            }
            if self.records.is_empty() {
                writer
                    .write_record(CATALOG_COLUMNS)
                    .map_err(|e| CatalogError::Write(format!("Failed to write header: {e}")))?;
            }
            writer
                .flush()
                .map_err(|e| CatalogError::Write(format!("Failed to flush rows: {e}")))?;
        }

        tmp.as_file_mut()
            .sync_all()
            .map_err(|e| CatalogError::Write(format!("Failed to sync temp file: {e}")))?;

        tmp.persist(path).map_err(|e| {
            CatalogError::Write(format!("Failed to replace {}: {}", path.display(), e.error))
        })?;

        info!(path = %path.display(), records = self.records.len(), "Saved catalog");
        Ok(())
    }

    /// Append a record.
    pub fn push(&mut self, record: CatalogRecord) {
        self.records.push(record);
    }

    /// Check whether a record with this object URL exists.
    pub fn contains_url(&self, url: &str) -> bool {
        self.records.iter().any(|r| r.cslc_url == url)
    }

    /// Set of all object URLs in the catalog.
    pub fn urls(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.cslc_url.clone()).collect()
    }

    /// Geometry of the first record (in insertion order) for a burst.
    pub fn geometry_for(&self, burst_id: &str) -> Option<&Geometry> {
        self.records
            .iter()
            .find(|r| r.burst_id == burst_id)
            .map(|r| &r.geometry)
    }

    /// Remove duplicate (burst id, date) pairs and sort by them.
    ///
    /// Of several records sharing a pair, the one inserted first is kept.
    /// Returns the number of records removed.
    pub fn normalize(&mut self) -> usize {
        let before = self.records.len();

        // Stable sort keeps insertion order among equal keys.
        self.records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.records.dedup_by(|later, earlier| later.sort_key() == earlier.sort_key());

        let removed = before - self.records.len();
        if removed > 0 {
            debug!(removed, "Removed duplicate catalog records");
        }
        removed
    }

    /// Check the (burst id, date) ordering and uniqueness invariant.
    pub fn is_normalized(&self) -> bool {
        self.records
            .windows(2)
            .all(|pair| pair[0].sort_key() < pair[1].sort_key())
    }

    /// All records in order.
    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    /// Iterate over records in order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the catalog has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the catalog, returning its records.
    pub fn into_records(self) -> Vec<CatalogRecord> {
        self.records
    }
}
