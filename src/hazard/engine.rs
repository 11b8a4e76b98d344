//! Proximity query engine.
//!
//! Two-phase lookup: the R-tree prunes the hazard set to bounding-box
//! candidates near the point, then each candidate gets the exact geometric
//! test. Zone tiles match by point containment, road segments by planar
//! distance to the line; both boundaries are inclusive.

use std::sync::Arc;

use geo::{Distance, Euclidean, Intersects, Point};
use tracing::debug;

use super::store::{ActiveSnapshot, HazardSnapshot};
use crate::error::QueryError;
use crate::models::{GeographicPoint, HazardShape, PlanarPoint};
use crate::proj;

/// Radius used when a query does not specify one.
pub const DEFAULT_RADIUS_METERS: f64 = 50.0;

/// Result of a proximity query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub danger_nearby: bool,
    /// Ids of the hazards that passed the exact test, sorted for stable
    /// output. Empty when `danger_nearby` is false.
    pub matches: Vec<String>,
}

/// Owns the active snapshot and answers `is_danger_nearby` queries.
///
/// Ready as soon as it is constructed with a built snapshot; stays ready
/// across queries and reloads.
pub struct ProximityEngine {
    active: ActiveSnapshot,
    default_radius: f64,
}

impl ProximityEngine {
    pub fn new(snapshot: HazardSnapshot) -> Self {
        Self::with_default_radius(snapshot, DEFAULT_RADIUS_METERS)
    }

    pub fn with_default_radius(snapshot: HazardSnapshot, default_radius: f64) -> Self {
        Self {
            active: ActiveSnapshot::new(snapshot),
            default_radius,
        }
    }

    /// Swap in a freshly built snapshot. In-flight queries keep the
    /// snapshot they started with.
    pub fn reload(&self, snapshot: HazardSnapshot) {
        self.active.replace(snapshot);
    }

    /// The snapshot queries currently run against.
    pub fn snapshot(&self) -> Arc<HazardSnapshot> {
        self.active.current()
    }

    /// Is any classified hazard within `radius` meters of the point?
    ///
    /// `radius` defaults to the engine's configured radius. Returns the ids
    /// of all matching hazards alongside the boolean.
    pub fn is_danger_nearby(
        &self,
        lat: f64,
        lon: f64,
        radius: Option<f64>,
    ) -> Result<QueryOutcome, QueryError> {
        let point = GeographicPoint::new(lat, lon)?;
        let planar = proj::to_planar(point);
        let radius = radius.unwrap_or(self.default_radius);

        let snapshot = self.active.current();
        let candidates = snapshot.index().candidates(planar, radius);
        debug!(
            "Query at ({}, {}) radius {}m: {} bbox candidates",
            lat,
            lon,
            radius,
            candidates.len()
        );

        let mut matches = Vec::new();
        for hazard in candidates {
            // The index and the store are built from the same set; a miss
            // here means the snapshot is corrupt.
            if snapshot.get(&hazard.id).is_none() {
                return Err(QueryError::IndexInconsistency {
                    id: hazard.id.clone(),
                });
            }

            if shape_matches(&hazard.shape, planar, radius) {
                matches.push(hazard.id.clone());
            }
        }

        matches.sort();

        Ok(QueryOutcome {
            danger_nearby: !matches.is_empty(),
            matches,
        })
    }
}

/// Exact test for one candidate. Inclusive on both boundaries: a point at
/// exactly `radius` from a segment, or exactly on a tile edge, matches.
fn shape_matches(shape: &HazardShape, point: PlanarPoint, radius: f64) -> bool {
    let p = Point::new(point.x, point.y);
    match shape {
        HazardShape::Zone(polygon) => polygon.intersects(&p),
        HazardShape::Segment(line) => Euclidean.distance(&p, line) <= radius,
    }
}
