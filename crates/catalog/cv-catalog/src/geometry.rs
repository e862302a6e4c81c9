//! Planar geometry values carried by catalog records.

use cv_error::{CvError, FetchError, Result};
use geo::Intersects;
use std::fmt;
use std::str::FromStr;
use wkt::{ToWkt, TryFromWkt};

/// A polygon or point decoded from well-known text.
///
/// Geometries are compared structurally, so a value read back from a saved
/// catalog equals the one that was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry(geo::Geometry<f64>);

impl Geometry {
    /// Parse a geometry from a well-known-text string.
    pub fn from_wkt(text: &str) -> Result<Self> {
        let geometry = geo::Geometry::<f64>::try_from_wkt_str(text.trim()).map_err(|e| {
            CvError::Fetch(FetchError::Decode(format!("Invalid WKT '{text}': {e}")))
        })?;
        Ok(Self(geometry))
    }

    /// Render the geometry as well-known text.
    pub fn to_wkt(&self) -> String {
        self.0.wkt_string()
    }

    /// Borrow the underlying `geo` geometry.
    pub fn inner(&self) -> &geo::Geometry<f64> {
        &self.0
    }

    /// Check whether two geometries share at least one point.
    pub fn intersects(&self, other: &Geometry) -> bool {
        self.0.intersects(&other.0)
    }
}

impl From<geo::Geometry<f64>> for Geometry {
    fn from(geometry: geo::Geometry<f64>) -> Self {
        Self(geometry)
    }
}

impl FromStr for Geometry {
    type Err = CvError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_wkt(s)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}
