//! Spatial index for fast hazard candidate retrieval.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use crate::models::{HazardGeometry, PlanarPoint};

/// Wrapper for R-tree indexing of hazard geometries
#[derive(Debug, Clone)]
pub struct IndexedHazard {
    pub hazard: Arc<HazardGeometry>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedHazard {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedHazard {
    pub fn new(hazard: Arc<HazardGeometry>) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = hazard.bbox()?;
        Some(Self {
            hazard,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// R-tree over the planar bounding boxes of a snapshot's hazard set.
///
/// Candidate retrieval is a superset filter: every geometry whose bounding
/// box, expanded by the query radius, contains the query point is returned.
/// False positives are expected; the engine runs the exact test.
#[derive(Debug)]
pub struct HazardSpatialIndex {
    tree: RTree<IndexedHazard>,
}

impl HazardSpatialIndex {
    /// Build the index over a hazard set
    pub fn build(hazards: Vec<Arc<HazardGeometry>>) -> Self {
        let indexed: Vec<IndexedHazard> = hazards.into_iter().filter_map(IndexedHazard::new).collect();
        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());
        Self { tree }
    }

    /// All hazards whose bounding box lies within `radius` meters of `point`
    /// on both axes. Never omits a geometry whose true distance to the point
    /// is within `radius`.
    pub fn candidates(&self, point: PlanarPoint, radius: f64) -> Vec<Arc<HazardGeometry>> {
        let query_envelope = AABB::from_corners(
            [point.x - radius, point.y - radius],
            [point.x + radius, point.y + radius],
        );

        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .map(|ih| Arc::clone(&ih.hazard))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
