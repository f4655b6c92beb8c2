//! Screen proximity estimation from face width

use crate::landmarks::LandmarkSet;

/// Horizontal width of the detected face in pixels.
pub fn face_width_px(set: &LandmarkSet) -> f64 {
    set.horizontal_span() * set.frame_width as f64
}

/// True when the face spans strictly more than `ratio` of the frame width.
pub fn is_too_close(set: &LandmarkSet, ratio: f64) -> bool {
    face_width_px(set) > ratio * set.frame_width as f64
}
