//! Per-frame output record and alert arbitration

use serde::{Deserialize, Serialize};

/// Wellness alert kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessAlert {
    /// Sustained low eye openness
    Drowsy,
    /// Blink rate well below baseline
    DryEyes,
    /// Face too close to the screen
    TooClose,
}

impl WellnessAlert {
    /// Stable string form, matching the wire encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            WellnessAlert::Drowsy => "drowsy",
            WellnessAlert::DryEyes => "dry_eyes",
            WellnessAlert::TooClose => "too_close",
        }
    }

    /// Pick at most one alert for a frame. Drowsiness outranks dry eyes,
    /// which outranks proximity. Dry eyes needs at least one blink in the
    /// window so a silent rate never alerts on its own.
    pub fn arbitrate(
        drowsy: bool,
        blink_rate: u32,
        rate_drop_pct: f64,
        too_close: bool,
    ) -> Option<Self> {
        if drowsy {
            Some(WellnessAlert::Drowsy)
        } else if rate_drop_pct > 50.0 && blink_rate > 0 {
            Some(WellnessAlert::DryEyes)
        } else if too_close {
            Some(WellnessAlert::TooClose)
        } else {
            None
        }
    }
}

/// One frame's session metrics, serialized as-is to the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameMetrics {
    /// Whether a face was found this frame
    pub face_detected: bool,
    /// Openness ratio, rounded to 3 decimals for reporting
    pub openness: f64,
    /// Completed blinks since session start
    pub blink_count: u64,
    /// Blinks inside the trailing rate window
    pub blink_rate: u32,
    /// Percent the blink rate sits below baseline, rounded to 1 decimal
    pub rate_drop_pct: f64,
    /// Sustained low-openness state
    pub drowsy: bool,
    /// Face too close to the screen
    pub too_close: bool,
    /// Whole seconds since session start
    pub session_seconds: u64,
    /// At most one prioritized alert
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<WellnessAlert>,
    /// Advisory text for the alert, possibly cached from an earlier request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

/// Round to a fixed number of decimal digits for reporting.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
