//! Named areas of interest.
//!
//! Areas are configured as a JSON object mapping a name to a WKT string:
//!
//! ```json
//! {
//!   "Ecuador": "POLYGON((-79.2 -0.9,-77.8 -0.9,-77.8 0.4,-79.2 0.4,-79.2 -0.9))",
//!   "Rosamond": "POINT(-118.08 34.80)"
//! }
//! ```

use cv_error::{CatalogError, CvError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::geometry::Geometry;

/// Registry of area-of-interest geometries by name.
#[derive(Debug, Clone, Default)]
pub struct AoiRegistry {
    areas: BTreeMap<String, Geometry>,
}

impl AoiRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a registry from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)
            .map_err(|e| CatalogError::Parse(format!("Invalid AOI definitions: {e}")))?;

        let mut registry = Self::new();
        for (name, wkt) in raw {
            let geometry = Geometry::from_wkt(&wkt)
                .map_err(|e| CatalogError::Parse(format!("AOI '{name}': {e}")))?;
            registry.insert(name, geometry);
        }
        Ok(registry)
    }

    /// Load a registry from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CvError::Config(format!("Failed to read AOI file {}: {e}", path.display()))
        })?;

        let registry = Self::from_json(&text)?;
        info!(path = %path.display(), areas = registry.len(), "Loaded AOI definitions");
        Ok(registry)
    }

    /// Add or replace an area.
    pub fn insert(&mut self, name: impl Into<String>, geometry: Geometry) {
        self.areas.insert(name.into(), geometry);
    }

    /// Look up an area by name.
    pub fn get(&self, name: &str) -> Result<&Geometry> {
        self.areas.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.areas.keys().map(String::as_str).collect();
            CvError::Config(format!("Unknown AOI '{name}', known areas: {known:?}"))
        })
    }

    /// Names of all configured areas, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.areas.keys().map(String::as_str)
    }

    /// Number of configured areas.
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Check if no areas are configured.
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
