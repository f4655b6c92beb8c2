//! Landmark types and eye index conventions

use serde::{Deserialize, Serialize};

/// Number of points in a full face-mesh detection.
pub const FACE_MESH_POINTS: usize = 468;

/// Left eye contour indices, ordered outer corner, top-outer, top-inner,
/// inner corner, bottom-inner, bottom-outer.
pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

/// Right eye contour indices, same ordering as [`LEFT_EYE`].
pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// One normalized landmark point (both axes in 0.0..=1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One frame's facial landmarks plus the pixel dimensions of the frame
/// they were detected in. Immutable once built; each frame gets its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkSet {
    /// Ordered landmark points, normalized to the frame
    pub points: Vec<Landmark>,
    /// Source frame width in pixels
    pub frame_width: u32,
    /// Source frame height in pixels
    pub frame_height: u32,
}

impl LandmarkSet {
    /// Create a new landmark set for one frame.
    pub fn new(points: Vec<Landmark>, frame_width: u32, frame_height: u32) -> Self {
        Self {
            points,
            frame_width,
            frame_height,
        }
    }

    /// Normalized point at `idx`, if the set carries that many points.
    pub fn point(&self, idx: usize) -> Option<Landmark> {
        self.points.get(idx).copied()
    }

    /// Point at `idx` converted to pixel coordinates.
    pub fn pixel(&self, idx: usize) -> Option<(f64, f64)> {
        self.point(idx).map(|p| {
            (
                p.x * self.frame_width as f64,
                p.y * self.frame_height as f64,
            )
        })
    }

    /// Horizontal extent of the landmark cloud in normalized units.
    /// Empty or single-point sets span zero.
    pub fn horizontal_span(&self) -> f64 {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        for p in &self.points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
        }
        if max_x > min_x {
            max_x - min_x
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_conversion_scales_by_frame_dimensions() {
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.25)], 640, 480);
        assert_eq!(set.pixel(0), Some((320.0, 120.0)));
    }

    #[test]
    fn test_out_of_range_index_yields_none() {
        let set = LandmarkSet::new(vec![Landmark::new(0.5, 0.5)], 640, 480);
        assert_eq!(set.point(1), None);
        assert_eq!(set.pixel(468), None);
    }

    #[test]
    fn test_horizontal_span_covers_extreme_points() {
        let set = LandmarkSet::new(
            vec![
                Landmark::new(0.25, 0.5),
                Landmark::new(0.5, 0.4),
                Landmark::new(0.75, 0.5),
            ],
            640,
            480,
        );
        assert!((set.horizontal_span() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_sets_span_zero() {
        let empty = LandmarkSet::new(vec![], 640, 480);
        assert_eq!(empty.horizontal_span(), 0.0);

        let single = LandmarkSet::new(vec![Landmark::new(0.3, 0.3)], 640, 480);
        assert_eq!(single.horizontal_span(), 0.0);
    }
}
