//! Danger-score classification of raw hazard records.

use crate::models::RawHazardRecord;

/// Records scoring below this are not considered dangerous.
pub const DEFAULT_MIN_DANGER_SCORE: i32 = 3;

/// Keep the records with `danger_score >= min_score`. The threshold is
/// inclusive; output order is unspecified.
pub fn classify(records: Vec<RawHazardRecord>, min_score: i32) -> Vec<RawHazardRecord> {
    records
        .into_iter()
        .filter(|r| r.danger_score >= min_score)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HazardKind;

    fn record(id: &str, score: i32) -> RawHazardRecord {
        RawHazardRecord {
            id: id.to_string(),
            kind: HazardKind::RoadSegment,
            danger_score: score,
            coordinates: vec![[12.10, 49.01], [12.11, 49.01]],
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let records = vec![record("a", 2), record("b", 3), record("c", 4)];
        let kept = classify(records, DEFAULT_MIN_DANGER_SCORE);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(classify(vec![], 3).is_empty());
    }

    #[test]
    fn test_all_below_threshold() {
        let records = vec![record("a", 0), record("b", 2)];
        assert!(classify(records, 3).is_empty());
    }
}
