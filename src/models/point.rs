//! CRS-tagged coordinate types.
//!
//! Geographic (degrees, EPSG:4326) and planar (meters, EPSG:3857) points are
//! distinct types so the two reference systems cannot be mixed by accident.

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// A point in geographic coordinates (degrees, EPSG:4326)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeographicPoint {
    /// Validate and construct. Both components must be finite,
    /// `lat` in [-90, 90] and `lon` in [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, QueryError> {
        if !lat.is_finite() || !lon.is_finite() || !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(QueryError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }
}

/// A point in planar coordinates (meters, EPSG:3857)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}
