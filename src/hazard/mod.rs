//! Hazard proximity core.
//!
//! Classifies raw hazard records, stores them in an immutable snapshot,
//! indexes their bounding boxes in an R-tree, and answers nearby-danger
//! queries against the active snapshot.

mod classify;
mod engine;
mod index;
mod store;

pub use classify::{classify, DEFAULT_MIN_DANGER_SCORE};
pub use engine::{ProximityEngine, QueryOutcome, DEFAULT_RADIUS_METERS};
pub use index::HazardSpatialIndex;
pub use store::{load_snapshot, ActiveSnapshot, HazardSnapshot, LoadOptions};
