//! Partition, object key and catalog record types.

use chrono::{DateTime, NaiveDate, Utc};
use cv_error::{ListingError, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

/// Format of the date token in object paths and in the persisted catalog.
pub const DATE_FORMAT: &str = "%Y%m%d";

/// A burst identifier paired with the corner-reflector network whose
/// prefix holds its objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    /// Burst identifier (e.g., "t142_303931_iw3")
    pub burst_id: String,

    /// Network tag selecting the remote prefix (e.g., "Ecuador")
    pub network: String,
}

impl Partition {
    /// Create a partition from a burst id and network tag.
    pub fn new(burst_id: impl Into<String>, network: impl Into<String>) -> Self {
        Self {
            burst_id: burst_id.into(),
            network: network.into(),
        }
    }
}

/// A key returned by the listing collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey {
    /// The object key (full path within the bucket)
    pub key: String,

    /// Last modified timestamp, used only to order keys within a page
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectKey {
    /// Create an object key without a modification time.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            last_modified: None,
        }
    }

    /// Set the last modified timestamp.
    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Derive the acquisition date from the second-to-last path segment.
    ///
    /// The segment must start with a `YYYYMMDD` date; anything after the
    /// first eight characters (e.g., a `T001518Z` time suffix) is ignored.
    pub fn date_token(&self) -> Result<NaiveDate> {
        let segment = self
            .key
            .rsplit('/')
            .nth(1)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ListingError::InvalidKey(format!("No date segment in key '{}'", self.key))
            })?;

        let token = segment.get(..8).unwrap_or(segment);
        NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|e| {
            ListingError::InvalidKey(format!(
                "Segment '{segment}' of key '{}' is not a date: {e}",
                self.key
            ))
            .into()
        })
    }
}

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    /// Burst identifier the record belongs to
    pub burst_id: String,

    /// Acquisition date parsed from the object path
    pub date: NaiveDate,

    /// URL of the CSLC object
    pub cslc_url: String,

    /// URL of the companion static-layers object, when known
    pub cslc_static_url: Option<String>,

    /// Burst footprint
    pub geometry: Geometry,
}

impl CatalogRecord {
    /// The (burst id, date) pair that must be unique within a catalog.
    pub fn sort_key(&self) -> (&str, NaiveDate) {
        (&self.burst_id, self.date)
    }
}

/// Join key path segments with single slashes, dropping empty segments.
pub fn join_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|s| s.trim_matches('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the URL of an object from its storage scheme, bucket and key.
pub fn object_url(scheme: &str, bucket: &str, key: &str) -> String {
    format!("{scheme}://{bucket}/{}", key.trim_start_matches('/'))
}
