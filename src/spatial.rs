//! Aim trainer distance analysis
//!
//! Targets are circles of a fixed radius, so the distance the pointer really
//! travels between two hits is the edge-to-edge gap, not the centre distance.

use crate::stats::Summary;
use crate::types::{AimResult, Coordinate, DistanceSummary};
use tracing::debug;

/// Radius of each circular target in pixels
pub const TARGET_RADIUS: f64 = 50.0;

/// Targets in a complete aim trainer run
pub const TARGET_COUNT: u32 = 30;

/// Edge-to-edge gaps between consecutive targets.
///
/// Formula: `max(|c2 - c1| - 2r, 0)`; overlapping or touching circles give 0.
pub fn gap_distances(coordinates: &[Coordinate], radius: f64) -> Vec<f64> {
    coordinates
        .windows(2)
        .map(|pair| (pair[0].distance_to(&pair[1]) - 2.0 * radius).max(0.0))
        .collect()
}

/// Summary of the gaps; every field absent with fewer than two coordinates
pub fn distance_summary(coordinates: &[Coordinate], radius: f64) -> DistanceSummary {
    Summary::of(&gap_distances(coordinates, radius))
}

/// Build the aim trainer result.
///
/// Coordinates past `targets` are dropped: a run that stopped early reports
/// only the targets the page confirmed as hit.
pub fn aim_result(
    targets: u32,
    seconds: f64,
    mut coordinates: Vec<Coordinate>,
    radius: f64,
) -> AimResult {
    if targets == 0 {
        return AimResult {
            targets: 0,
            seconds: 0.0,
            ms_per_target: 0.0,
            coordinates: Vec::new(),
            distance: None,
        };
    }

    coordinates.truncate(targets as usize);
    let distance = distance_summary(&coordinates, radius);
    let ms_per_target = seconds / f64::from(targets) * 1000.0;

    debug!(targets, ms_per_target, total_gap = ?distance.total, "analyzed aim capture");

    AimResult {
        targets,
        seconds,
        ms_per_target,
        coordinates,
        distance: Some(distance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn coords(points: &[(i32, i32)]) -> Vec<Coordinate> {
        points.iter().copied().map(Coordinate::from).collect()
    }

    #[test]
    fn test_gap_subtracts_both_radii() {
        let gaps = gap_distances(&coords(&[(0, 0), (300, 400)]), TARGET_RADIUS);
        assert_eq!(gaps, vec![400.0]);
    }

    #[test]
    fn test_overlapping_targets_have_zero_gap() {
        let gaps = gap_distances(&coords(&[(10, 10), (10, 10), (40, 50)]), TARGET_RADIUS);
        assert_eq!(gaps, vec![0.0, 0.0]);
    }

    #[test]
    fn test_summary_of_run() {
        let summary = distance_summary(
            &coords(&[(0, 0), (200, 0), (200, 0), (200, 400)]),
            TARGET_RADIUS,
        );
        // gaps: 100, 0, 300
        assert_eq!(summary.total, Some(400.0));
        assert_eq!(summary.median, Some(100.0));
        assert_eq!(summary.min, Some(0.0));
        assert_eq!(summary.max, Some(300.0));
        assert!((summary.mean.unwrap() - 133.333).abs() < 0.001);
    }

    #[test]
    fn test_summary_needs_two_targets() {
        assert!(distance_summary(&coords(&[(5, 5)]), TARGET_RADIUS).is_empty());
        assert!(distance_summary(&[], TARGET_RADIUS).is_empty());
    }

    #[test]
    fn test_aim_result() {
        let result = aim_result(
            2,
            1.5,
            coords(&[(0, 0), (0, 150), (999, 999)]),
            TARGET_RADIUS,
        );
        assert_eq!(result.targets, 2);
        assert_eq!(result.ms_per_target, 750.0);
        assert_eq!(result.coordinates.len(), 2);
        assert_eq!(result.distance.unwrap().total, Some(50.0));
    }

    #[test]
    fn test_aim_result_without_hits() {
        let result = aim_result(0, 3.2, coords(&[(1, 1)]), TARGET_RADIUS);
        assert_eq!(
            result,
            AimResult {
                targets: 0,
                seconds: 0.0,
                ms_per_target: 0.0,
                coordinates: vec![],
                distance: None,
            }
        );
    }

    #[test]
    fn test_single_hit_has_empty_summary() {
        let result = aim_result(1, 0.4, coords(&[(1, 1)]), TARGET_RADIUS);
        assert_eq!(result.distance, Some(DistanceSummary::empty()));
    }
}
