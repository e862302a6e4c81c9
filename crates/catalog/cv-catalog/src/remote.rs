//! Collaborator traits for remote listing and geometry fetching.
//!
//! The builder only talks to these traits, so object stores other than S3
//! (and in-memory doubles in tests) can be plugged in.

use async_trait::async_trait;
use cv_error::Result;
use futures::stream::BoxStream;

use crate::geometry::Geometry;
use crate::record::ObjectKey;

/// Lists object keys for one partition.
pub trait KeyLister: Send + Sync {
    /// List the keys stored for `burst_id` under `prefix`.
    ///
    /// The stream is lazy and finite and may span many pages. Keys arrive
    /// filtered to the expected suffix and sorted by last-modified time
    /// within each page. It ends once the store stops returning a
    /// continuation token; a failed page request ends it with an error.
    fn list_keys<'a>(
        &'a self,
        prefix: &'a str,
        burst_id: &'a str,
    ) -> BoxStream<'a, Result<ObjectKey>>;
}

/// Reads the footprint geometry embedded in a remote object.
#[async_trait]
pub trait GeometryFetcher: Send + Sync {
    /// Open the object at `url` and decode its well-known-text geometry.
    async fn fetch_geometry(&self, url: &str) -> Result<Geometry>;
}
