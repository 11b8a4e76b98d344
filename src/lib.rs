//! Hazardwatch - proximity warnings for dangerous road geometry
//!
//! This library provides the spatial-query core shared by the server binary:
//! snapshot loading, coordinate reprojection, spatial indexing, and the
//! nearby-danger query engine.

pub mod error;
pub mod hazard;
pub mod models;
pub mod proj;

pub use error::{LoadError, QueryError};
pub use hazard::{HazardSnapshot, LoadOptions, ProximityEngine, QueryOutcome};
pub use models::{GeographicPoint, HazardGeometry, HazardKind, PlanarPoint};
