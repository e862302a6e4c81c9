//! Configuration types for the catalog builder.

use serde::{Deserialize, Serialize};

use crate::record::{join_path, object_url};

/// Default storage scheme for object URLs.
pub const DEFAULT_SCHEME: &str = "s3";

/// Default suffix of cataloged objects.
pub const DEFAULT_SUFFIX: &str = ".h5";

/// Configuration for a catalog build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Bucket holding the objects
    pub bucket: String,

    /// Static base prefix; network tags are appended to it
    pub prefix: String,

    /// URL scheme of the store (e.g., "s3")
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

fn default_scheme() -> String {
    DEFAULT_SCHEME.to_string()
}

impl BuildConfig {
    /// Create a configuration for `bucket` and base `prefix`.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            scheme: default_scheme(),
        }
    }

    /// Set the URL scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Prefix under which a network's bursts are stored.
    pub fn network_prefix(&self, network: &str) -> String {
        join_path(&[&self.prefix, network])
    }

    /// URL of an object in the configured bucket.
    pub fn object_url(&self, key: &str) -> String {
        object_url(&self.scheme, &self.bucket, key)
    }
}
