//! Eye openness estimation from landmark geometry

use tracing::debug;

use crate::landmarks::{LandmarkSet, LEFT_EYE, RIGHT_EYE};

/// Euclidean distance between two landmark indices in pixel space.
fn pixel_distance(set: &LandmarkSet, a: usize, b: usize) -> Option<f64> {
    let (ax, ay) = set.pixel(a)?;
    let (bx, by) = set.pixel(b)?;
    Some(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt())
}

/// Openness ratio for one eye.
///
/// `eye` lists six contour indices ordered outer corner, top-outer,
/// top-inner, inner corner, bottom-inner, bottom-outer. The ratio is the
/// mean of the two lid distances over twice the corner distance; it falls
/// toward zero as the eye closes.
///
/// A degenerate set (zero corner distance, or indices the set does not
/// carry) reads as fully closed rather than an error.
pub fn eye_openness(set: &LandmarkSet, eye: &[usize; 6]) -> f64 {
    let v1 = pixel_distance(set, eye[1], eye[5]);
    let v2 = pixel_distance(set, eye[2], eye[4]);
    let h = pixel_distance(set, eye[0], eye[3]);

    match (v1, v2, h) {
        (Some(v1), Some(v2), Some(h)) if h > 0.0 => (v1 + v2) / (2.0 * h),
        (Some(_), Some(_), Some(_)) => {
            debug!("degenerate eye geometry: zero corner distance");
            0.0
        }
        _ => {
            debug!("eye landmarks missing from set");
            0.0
        }
    }
}

/// Per-frame openness: mean of the left and right eye ratios.
pub fn average_openness(set: &LandmarkSet) -> f64 {
    (eye_openness(set, &LEFT_EYE) + eye_openness(set, &RIGHT_EYE)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::source::{face_with_openness, SyntheticConfig};

    const EYE: [usize; 6] = [0, 1, 2, 3, 4, 5];

    fn from_pixels(pixels: &[(f64, f64)]) -> LandmarkSet {
        let points = pixels
            .iter()
            .map(|&(x, y)| Landmark::new(x / 640.0, y / 480.0))
            .collect();
        LandmarkSet::new(points, 640, 480)
    }

    #[test]
    fn test_matches_hand_computed_ratio() {
        // Corner distance 100 px, both lid gaps 20 px: (20 + 20) / 200
        let set = from_pixels(&[
            (100.0, 200.0),
            (130.0, 190.0),
            (170.0, 190.0),
            (200.0, 200.0),
            (170.0, 210.0),
            (130.0, 210.0),
        ]);
        assert!((eye_openness(&set, &EYE) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_zero_corner_distance_reads_closed() {
        let set = from_pixels(&[(100.0, 200.0); 6]);
        assert_eq!(eye_openness(&set, &EYE), 0.0);
    }

    #[test]
    fn test_missing_points_read_closed() {
        let set = from_pixels(&[(100.0, 200.0), (130.0, 190.0)]);
        assert_eq!(eye_openness(&set, &EYE), 0.0);
    }

    #[test]
    fn test_average_covers_both_eyes() {
        let set = face_with_openness(&SyntheticConfig::default(), 0.3);
        assert!((average_openness(&set) - 0.3).abs() < 1e-6);
    }
}
