//! Core data models for the hazard proximity service.

pub mod hazard;
pub mod point;

pub use hazard::{HazardGeometry, HazardKind, HazardShape, RawHazardRecord};
pub use point::{GeographicPoint, PlanarPoint};
