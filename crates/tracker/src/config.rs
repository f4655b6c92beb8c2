//! Session tracker configuration

use serde::{Deserialize, Serialize};

use crate::TrackerError;

/// Tunable thresholds for one tracking session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Openness ratio below which the eye counts as closed
    pub openness_threshold: f64,

    /// Consecutive closed frames required before a reopening counts as a blink
    pub min_closed_frames: u32,

    /// Resting blink rate (blinks/minute) the drop percentage is measured against
    pub baseline_bpm: f64,

    /// Smoothed openness below which drowsiness pressure builds
    pub drowsy_openness_threshold: f64,

    /// Hysteresis counter value that must be exceeded to report drowsy
    pub drowsy_frame_threshold: u32,

    /// Face width over frame width above which the face is too close
    pub proximity_ratio: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            openness_threshold: 0.21,
            min_closed_frames: 2,
            baseline_bpm: 15.0,
            drowsy_openness_threshold: 0.18,
            drowsy_frame_threshold: 15,
            proximity_ratio: 0.55,
        }
    }
}

impl TrackerConfig {
    /// Flag fatigue earlier (shorter hysteresis, higher drowsy threshold).
    pub fn strict() -> Self {
        Self {
            drowsy_openness_threshold: 0.20,
            drowsy_frame_threshold: 10,
            ..Default::default()
        }
    }

    /// Tolerate more before alerting.
    pub fn relaxed() -> Self {
        Self {
            drowsy_frame_threshold: 25,
            proximity_ratio: 0.65,
            ..Default::default()
        }
    }

    /// Reject configurations no session should start with.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.openness_threshold > 0.0 && self.openness_threshold < 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "openness_threshold must be in (0, 1), got {}",
                self.openness_threshold
            )));
        }
        if self.min_closed_frames == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_closed_frames must be at least 1".into(),
            ));
        }
        if !(self.baseline_bpm > 0.0 && self.baseline_bpm.is_finite()) {
            return Err(TrackerError::InvalidConfig(format!(
                "baseline_bpm must be positive and finite, got {}",
                self.baseline_bpm
            )));
        }
        if !(self.drowsy_openness_threshold > 0.0 && self.drowsy_openness_threshold < 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "drowsy_openness_threshold must be in (0, 1), got {}",
                self.drowsy_openness_threshold
            )));
        }
        if self.drowsy_frame_threshold == 0 {
            return Err(TrackerError::InvalidConfig(
                "drowsy_frame_threshold must be at least 1".into(),
            ));
        }
        if !(self.proximity_ratio > 0.0 && self.proximity_ratio < 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "proximity_ratio must be in (0, 1), got {}",
                self.proximity_ratio
            )));
        }
        Ok(())
    }
}
