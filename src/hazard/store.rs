//! Hazard record store and snapshot lifecycle.
//!
//! A snapshot is built once from a source file (classify, reproject, index)
//! and is immutable afterwards. A reload builds a whole new snapshot and
//! swaps it in only after the build succeeded, so readers always observe a
//! fully-built hazard set.

use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

use hashbrown::HashMap;
use tracing::info;

use super::classify::{classify, DEFAULT_MIN_DANGER_SCORE};
use super::index::HazardSpatialIndex;
use crate::error::LoadError;
use crate::models::{HazardGeometry, HazardKind, HazardShape, RawHazardRecord};
use crate::proj;

/// Options recognized by the load/build path.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Inclusive danger-score threshold
    pub min_danger_score: i32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            min_danger_score: DEFAULT_MIN_DANGER_SCORE,
        }
    }
}

/// The immutable, queryable hazard set: the filtered geometries plus the
/// spatial index built over them.
#[derive(Debug)]
pub struct HazardSnapshot {
    hazards: HashMap<String, Arc<HazardGeometry>>,
    index: HazardSpatialIndex,
}

impl HazardSnapshot {
    /// Classify, reproject and index a set of raw records.
    pub fn build(records: Vec<RawHazardRecord>, options: &LoadOptions) -> Result<Self, LoadError> {
        let total = records.len();
        let kept = classify(records, options.min_danger_score);
        info!(
            "Classified hazard records: {} of {} at score >= {}",
            kept.len(),
            total,
            options.min_danger_score
        );

        if kept.is_empty() {
            return Err(LoadError::EmptyHazardSet {
                min_score: options.min_danger_score,
            });
        }

        let mut hazards: HashMap<String, Arc<HazardGeometry>> = HashMap::with_capacity(kept.len());
        for record in kept {
            let geometry = Arc::new(reproject_record(record)?);
            hazards.insert(geometry.id.clone(), geometry);
        }

        let index = HazardSpatialIndex::build(hazards.values().cloned().collect());

        Ok(Self { hazards, index })
    }

    pub fn get(&self, id: &str) -> Option<&Arc<HazardGeometry>> {
        self.hazards.get(id)
    }

    pub fn index(&self) -> &HazardSpatialIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

/// Reproject one raw record into a planar hazard geometry.
fn reproject_record(record: RawHazardRecord) -> Result<HazardGeometry, LoadError> {
    let bad = |reason: String| LoadError::BadGeometry {
        id: record.id.clone(),
        reason,
    };

    let shape = match record.kind {
        HazardKind::RoadSegment => {
            if record.coordinates.len() < 2 {
                return Err(bad(format!(
                    "road segment needs at least 2 vertices, got {}",
                    record.coordinates.len()
                )));
            }
            let line = proj::project_line_string(&record.coordinates)
                .map_err(|e| bad(e.to_string()))?;
            HazardShape::Segment(line)
        }
        HazardKind::ZoneTile => {
            if record.coordinates.len() < 3 {
                return Err(bad(format!(
                    "zone tile needs at least 3 vertices, got {}",
                    record.coordinates.len()
                )));
            }
            let polygon =
                proj::project_polygon(&record.coordinates).map_err(|e| bad(e.to_string()))?;
            HazardShape::Zone(polygon)
        }
    };

    Ok(HazardGeometry {
        id: record.id,
        shape,
        danger_score: record.danger_score,
    })
}

/// Read a JSON array of raw hazard records and build a snapshot from it.
pub fn load_snapshot<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<HazardSnapshot, LoadError> {
    let path = path.as_ref();
    info!("Loading hazard geometries from {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<RawHazardRecord> =
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let snapshot = HazardSnapshot::build(records, options)?;
    info!("Hazard snapshot ready with {} geometries", snapshot.len());
    Ok(snapshot)
}

/// Holder for the one active snapshot. Queries clone the `Arc` under a read
/// lock and then run lock-free against their copy; `replace` swaps the
/// reference atomically after a successful rebuild.
pub struct ActiveSnapshot {
    inner: RwLock<Arc<HazardSnapshot>>,
}

impl ActiveSnapshot {
    pub fn new(snapshot: HazardSnapshot) -> Self {
        Self {
            inner: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The currently active snapshot. The lock is held only long enough to
    /// clone the reference.
    pub fn current(&self) -> Arc<HazardSnapshot> {
        Arc::clone(&self.inner.read().expect("snapshot lock poisoned"))
    }

    /// Publish a new snapshot. Callers build it first; a failed build never
    /// reaches this point, so the old snapshot stays active on error.
    pub fn replace(&self, snapshot: HazardSnapshot) {
        let mut guard = self.inner.write().expect("snapshot lock poisoned");
        *guard = Arc::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn zone_record(id: &str, score: i32) -> RawHazardRecord {
        RawHazardRecord {
            id: id.to_string(),
            kind: HazardKind::ZoneTile,
            danger_score: score,
            coordinates: vec![
                [12.10, 49.01],
                [12.11, 49.01],
                [12.11, 49.02],
                [12.10, 49.02],
            ],
        }
    }

    #[test]
    fn test_build_filters_by_score() {
        let snapshot = HazardSnapshot::build(
            vec![zone_record("low", 1), zone_record("high", 4)],
            &LoadOptions::default(),
        )
        .unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("high").is_some());
        assert!(snapshot.get("low").is_none());
    }

    #[test]
    fn test_snapshot_is_debug_printable() {
        // Keeps `unwrap_err` usable on build results across the test suite.
        let snapshot =
            HazardSnapshot::build(vec![zone_record("a", 4)], &LoadOptions::default()).unwrap();
        let repr = format!("{:?}", snapshot);
        assert!(repr.contains("HazardSnapshot"));
    }

    #[test]
    fn test_build_fails_on_empty_set() {
        let err = HazardSnapshot::build(vec![zone_record("low", 1)], &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::EmptyHazardSet { min_score: 3 }));
    }

    #[test]
    fn test_build_rejects_degenerate_segment() {
        let record = RawHazardRecord {
            id: "stub".to_string(),
            kind: HazardKind::RoadSegment,
            danger_score: 5,
            coordinates: vec![[12.10, 49.01]],
        };
        let err = HazardSnapshot::build(vec![record], &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::BadGeometry { .. }));
    }

    #[test]
    fn test_load_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{
                "id": "z1",
                "kind": "zone-tile",
                "danger_score": 4,
                "coordinates": [[12.10, 49.01], [12.11, 49.01], [12.11, 49.02], [12.10, 49.02]]
            }}]"#
        )
        .unwrap();

        let snapshot = load_snapshot(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.index().len(), 1);
    }

    #[test]
    fn test_load_snapshot_missing_file() {
        let err = load_snapshot("/nonexistent/hazards.json", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_snapshot_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = load_snapshot(file.path(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_active_snapshot_swap() {
        let first = HazardSnapshot::build(vec![zone_record("a", 4)], &LoadOptions::default()).unwrap();
        let active = ActiveSnapshot::new(first);

        let held = active.current();
        assert!(held.get("a").is_some());

        let second = HazardSnapshot::build(
            vec![zone_record("b", 4), zone_record("c", 5)],
            &LoadOptions::default(),
        )
        .unwrap();
        active.replace(second);

        // The old reference is unaffected by the swap.
        assert!(held.get("a").is_some());
        assert_eq!(active.current().len(), 2);
    }
}
