//! Landmark sources
//!
//! The engine never talks to a detector directly; frames arrive through
//! [`LandmarkSource`]. The synthetic source scripts a deterministic face
//! with periodic blinks so the pipeline can run without any upstream
//! detector wired in.

use crate::landmarks::{Landmark, LandmarkSet, FACE_MESH_POINTS, LEFT_EYE, RIGHT_EYE};

/// Per-frame landmark provider. `None` means no face in this frame.
pub trait LandmarkSource: Send {
    fn next_frame(&mut self) -> Option<LandmarkSet>;
}

/// Synthetic source tuning.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
    /// Openness ratio while the eyes are open
    pub open_openness: f64,
    /// Openness ratio during a scripted blink
    pub closed_openness: f64,
    /// Frames between blink starts
    pub blink_interval: u32,
    /// Consecutive closed frames per blink
    pub blink_length: u32,
    /// Horizontal face span as a fraction of frame width
    pub face_span: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            frame_width: 640,
            frame_height: 480,
            open_openness: 0.32,
            closed_openness: 0.06,
            blink_interval: 80,
            blink_length: 3,
            face_span: 0.30,
        }
    }
}

impl SyntheticConfig {
    /// Face parked close to the camera (proximity alerts).
    pub fn close_up() -> Self {
        Self {
            face_span: 0.60,
            ..Default::default()
        }
    }

    /// Heavy-lidded face that drifts into drowsiness.
    pub fn drowsy() -> Self {
        Self {
            open_openness: 0.12,
            closed_openness: 0.05,
            ..Default::default()
        }
    }
}

/// Deterministic scripted landmark source.
pub struct SyntheticSource {
    config: SyntheticConfig,
    frame: u64,
}

impl SyntheticSource {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config, frame: 0 }
    }

    fn blinking(&self, frame: u64) -> bool {
        let interval = self.config.blink_interval.max(1) as u64;
        frame % interval < self.config.blink_length as u64
    }
}

impl LandmarkSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<LandmarkSet> {
        let openness = if self.blinking(self.frame) {
            self.config.closed_openness
        } else {
            self.config.open_openness
        };
        self.frame += 1;
        Some(face_with_openness(&self.config, openness))
    }
}

/// Build a full synthetic face mesh whose downstream aspect-ratio
/// computation lands on `openness`, with the configured horizontal span.
///
/// Also used by tests that need exact openness sequences.
pub fn face_with_openness(config: &SyntheticConfig, openness: f64) -> LandmarkSet {
    let half = config.face_span / 2.0;
    let mut points = Vec::with_capacity(FACE_MESH_POINTS);

    // Deterministic point cloud filling the configured span.
    for i in 0..FACE_MESH_POINTS {
        let fx = (i % 37) as f64 / 18.0 - 1.0;
        let fy = (i / 37) as f64 / 12.0;
        points.push(Landmark::new(0.5 + half * fx, 0.3 + 0.35 * fy));
    }

    // Eye geometry: corner distance 2*hw, lid offset solved from the
    // target ratio. Pixel aspect enters because openness is computed in
    // pixel space while landmarks are normalized.
    let hw = half * 0.25;
    let offset = half * 0.45;
    let vert = openness * hw * config.frame_width as f64 / config.frame_height as f64;
    place_eye(&mut points, &RIGHT_EYE, 0.5 - offset, 0.45, hw, vert);
    place_eye(&mut points, &LEFT_EYE, 0.5 + offset, 0.45, hw, vert);

    LandmarkSet::new(points, config.frame_width, config.frame_height)
}

fn place_eye(points: &mut [Landmark], eye: &[usize; 6], cx: f64, cy: f64, hw: f64, vert: f64) {
    points[eye[0]] = Landmark::new(cx - hw, cy);
    points[eye[1]] = Landmark::new(cx - hw / 3.0, cy - vert);
    points[eye[2]] = Landmark::new(cx + hw / 3.0, cy - vert);
    points[eye[3]] = Landmark::new(cx + hw, cy);
    points[eye[4]] = Landmark::new(cx + hw / 3.0, cy + vert);
    points[eye[5]] = Landmark::new(cx - hw / 3.0, cy + vert);
}
