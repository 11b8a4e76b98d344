//! Hazard geometry records.

use geo::{BoundingRect, LineString, Polygon};
use serde::{Deserialize, Serialize};

/// Kind of hazard geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardKind {
    /// A dangerous stretch of road, matched by buffer distance
    RoadSegment,
    /// A scored area tile, matched by point containment
    ZoneTile,
}

impl std::fmt::Display for HazardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HazardKind::RoadSegment => write!(f, "road-segment"),
            HazardKind::ZoneTile => write!(f, "zone-tile"),
        }
    }
}

/// Hazard shape in planar (EPSG:3857) coordinates
#[derive(Debug, Clone)]
pub enum HazardShape {
    Segment(LineString<f64>),
    Zone(Polygon<f64>),
}

/// An immutable hazard record. `shape` and `danger_score` never change after
/// construction; all shapes in one snapshot share the same planar CRS.
#[derive(Debug, Clone)]
pub struct HazardGeometry {
    pub id: String,
    pub shape: HazardShape,
    pub danger_score: i32,
}

impl HazardGeometry {
    pub fn kind(&self) -> HazardKind {
        match self.shape {
            HazardShape::Segment(_) => HazardKind::RoadSegment,
            HazardShape::Zone(_) => HazardKind::ZoneTile,
        }
    }

    /// Planar bounding box as (min_x, min_y, max_x, max_y)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let rect = match &self.shape {
            HazardShape::Segment(line) => line.bounding_rect(),
            HazardShape::Zone(poly) => poly.bounding_rect(),
        };
        rect.map(|r| (r.min().x, r.min().y, r.max().x, r.max().y))
    }
}

/// A hazard record as it appears in the source file, before classification
/// and reprojection. Coordinates are `[lon, lat]` pairs in degrees: an open
/// polyline for a road segment, an outer ring for a zone tile (closed or
/// not; the store closes it).
#[derive(Debug, Clone, Deserialize)]
pub struct RawHazardRecord {
    pub id: String,
    pub kind: HazardKind,
    pub danger_score: i32,
    pub coordinates: Vec<[f64; 2]>,
}
