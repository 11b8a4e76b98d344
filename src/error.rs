//! Error taxonomy for the hazard service.
//!
//! `QueryError` is returned per-query and never affects service state;
//! `LoadError` occurs only while building a snapshot and is fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

/// Per-query errors surfaced to the transport layer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// Latitude/longitude out of range or non-finite.
    #[error("invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// The spatial index produced a geometry the store does not know about.
    /// This is a programming defect, not a recoverable condition.
    #[error("spatial index references unknown hazard geometry '{id}'")]
    IndexInconsistency { id: String },
}

/// Errors while building a hazard snapshot. All of these are fatal at
/// startup: the service must not begin serving without a valid snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read hazard source {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse hazard source {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A record carries coordinates the reprojector rejects, or too few
    /// vertices for its kind.
    #[error("hazard record '{id}' has unusable geometry: {reason}")]
    BadGeometry { id: String, reason: String },

    /// Zero geometries survived classification. Serving with an empty set
    /// would silently answer "never dangerous", so the caller must abort.
    #[error("no hazard geometries with danger score >= {min_score} in source")]
    EmptyHazardSet { min_score: i32 },
}
