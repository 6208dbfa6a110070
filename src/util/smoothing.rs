// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Curve smoothing.

use crate::models::point::TrackPoint;

/// Centered moving average over point positions.
///
/// Only the points at `indices` are replaced; their neighbours (by list
/// position) feed the average but are left as they are. The window shrinks
/// near the ends of the list. Frames and statuses are preserved.
pub fn moving_average(points: &[TrackPoint], indices: &[usize], window: usize) -> Vec<TrackPoint> {
    let half = window / 2;
    let mut smoothed = points.to_vec();

    for &index in indices {
        if index >= points.len() {
            continue;
        }
        let start = index.saturating_sub(half);
        let end = (index + half + 1).min(points.len());
        let span = &points[start..end];
        let n = span.len() as f64;
        let x = span.iter().map(|p| p.x).sum::<f64>() / n;
        let y = span.iter().map(|p| p.y).sum::<f64>() / n;
        smoothed[index] = points[index].moved_to(x, y);
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::point::PointStatus;

    #[test]
    fn test_spike_is_flattened() {
        let points: Vec<TrackPoint> = (0..5)
            .map(|i| TrackPoint::new(i + 1, i as f64, if i == 2 { 30.0 } else { 0.0 }))
            .collect();

        let smoothed = moving_average(&points, &[2], 3);

        assert_eq!(smoothed[2].y, 10.0);
        assert_eq!(smoothed[2].x, 2.0);
        assert_eq!(smoothed[1], points[1]);
        assert_eq!(smoothed[3], points[3]);
    }

    #[test]
    fn test_window_shrinks_at_edges() {
        let points = vec![
            TrackPoint::new(1, 0.0, 0.0),
            TrackPoint::new(2, 6.0, 3.0),
            TrackPoint::new(3, 12.0, 6.0),
        ];
        let smoothed = moving_average(&points, &[0], 5);
        assert_eq!((smoothed[0].x, smoothed[0].y), (6.0, 3.0));
    }

    #[test]
    fn test_uses_original_neighbours() {
        let points: Vec<TrackPoint> = [0.0, 9.0, 0.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, &y)| TrackPoint::new(i as i32 + 1, 0.0, y))
            .collect();
        let smoothed = moving_average(&points, &[1, 2], 3);
        assert_eq!(smoothed[1].y, 3.0);
        assert_eq!(smoothed[2].y, 6.0);
    }

    #[test]
    fn test_keeps_frame_and_status() {
        let points = vec![
            TrackPoint::new(10, 0.0, 0.0),
            TrackPoint::new(11, 3.0, 3.0).with_status(PointStatus::Keyframe),
            TrackPoint::new(12, 6.0, 0.0),
        ];
        let smoothed = moving_average(&points, &[1], 3);
        assert_eq!(smoothed[1].frame, 11);
        assert_eq!(smoothed[1].status, PointStatus::Keyframe);
        assert_eq!(smoothed[1].y, 1.0);
    }
}
