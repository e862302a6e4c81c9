//! Record selection over a catalog.

use chrono::NaiveDate;
use cv_error::{CvError, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::geometry::Geometry;
use crate::record::{CatalogRecord, DATE_FORMAT};

/// Selects catalog records by burst, date range and area of interest.
///
/// All criteria must hold; an unset criterion matches everything. Date
/// bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    burst_ids: Vec<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    aoi: Option<Geometry>,
}

impl CatalogQuery {
    /// Create a query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to these burst ids (empty means all).
    pub fn with_burst_ids(mut self, burst_ids: Vec<String>) -> Self {
        self.burst_ids = burst_ids;
        self
    }

    /// Exclude records dated before `date`.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Exclude records dated after `date`.
    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Keep only records whose footprint intersects `aoi`.
    pub fn with_aoi(mut self, aoi: Geometry) -> Self {
        self.aoi = Some(aoi);
        self
    }

    /// Check a single record.
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        if !self.burst_ids.is_empty() && !self.burst_ids.iter().any(|b| *b == record.burst_id) {
            return false;
        }
        if self.start_date.is_some_and(|start| record.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| record.date > end) {
            return false;
        }
        match &self.aoi {
            Some(aoi) => record.geometry.intersects(aoi),
            None => true,
        }
    }

    /// Matching records, in catalog order.
    pub fn apply<'a>(&self, catalog: &'a Catalog) -> Vec<&'a CatalogRecord> {
        catalog.iter().filter(|r| self.matches(r)).collect()
    }
}

/// A record as emitted by query output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRow {
    pub burst_id: String,
    pub date: String,
    pub cslc_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cslc_static_url: Option<String>,
    pub geometry: String,
}

impl From<&CatalogRecord> for QueryRow {
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

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON Lines format - one JSON object per line (default)
    #[default]
    Jsonl,

    /// Pretty-printed JSON array
    Json,
}

/// Render rows in the given format, newline terminated.
pub fn render_rows(rows: &[QueryRow], format: OutputFormat) -> Result<String> {
    let to_err = |e: serde_json::Error| CvError::Config(format!("JSON serialization failed: {e}"));

    let mut out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(rows).map_err(to_err)?,
        OutputFormat::Jsonl => rows
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(to_err)?
            .join("\n"),
    };

    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}
