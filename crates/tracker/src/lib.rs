//! Ocular fatigue session tracking
//!
//! Per-frame signal pipeline for one viewer session:
//! - Eye openness from landmark geometry
//! - Debounced blink detection (consecutive-closed-frame filter)
//! - Rolling blinks-per-minute over a trailing 60 s window
//! - Drowsiness from smoothed openness with a hysteresis counter
//! - Screen proximity from horizontal face span
//! - At most one prioritized wellness alert per frame

pub mod config;
pub mod metrics;
pub mod state;

pub use config::TrackerConfig;
pub use metrics::{FrameMetrics, WellnessAlert};
pub use state::SessionState;

use std::time::Instant;

use face_geometry::{average_openness, is_too_close, LandmarkSet};
use thiserror::Error;
use tracing::debug;

/// Tracker error types
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Fatigue tracker for one session.
///
/// Frames must be fed strictly in order; blink debouncing and the
/// drowsiness hysteresis depend on sequential processing. One instance
/// per session, dropped when the session ends.
pub struct SessionTracker {
    config: TrackerConfig,
    state: SessionState,
}

impl SessionTracker {
    /// Create a tracker for a session starting now. Fails fast on an
    /// invalid configuration; nothing else here can fail.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        Self::started_at(config, Instant::now())
    }

    /// Create a tracker with an explicit session start, for callers that
    /// control time.
    pub fn started_at(config: TrackerConfig, start: Instant) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            state: SessionState::new(start),
            config,
        })
    }

    /// Process one frame with the current time as the frame time.
    pub fn process(&mut self, landmarks: Option<&LandmarkSet>) -> FrameMetrics {
        self.process_at(landmarks, Instant::now())
    }

    /// Process one frame observed at `now`.
    ///
    /// `None` means the detector found no face; derived fields come back
    /// neutral and session state is left untouched. Cumulative counters
    /// (blink count, session clock) still report.
    pub fn process_at(&mut self, landmarks: Option<&LandmarkSet>, now: Instant) -> FrameMetrics {
        let mut out = FrameMetrics {
            blink_count: self.state.blink_count,
            session_seconds: self.state.elapsed_seconds(now),
            ..Default::default()
        };

        let set = match landmarks {
            Some(set) => set,
            None => return out,
        };
        out.face_detected = true;

        let openness = average_openness(set);
        out.openness = metrics::round_to(openness, 3);
        self.state.push_openness(openness);

        // Blink debounce: eyes must stay closed for min_closed_frames
        // before the reopening frame records a blink.
        if openness < self.config.openness_threshold {
            self.state.closed_frames += 1;
        } else {
            if self.state.closed_frames >= self.config.min_closed_frames {
                self.state.record_blink(now);
                out.blink_count = self.state.blink_count;
                debug!(blink_count = self.state.blink_count, "blink recorded");
            }
            self.state.closed_frames = 0;
        }

        let rate = self.state.blink_rate(now);
        out.blink_rate = rate;
        if rate > 0 {
            let drop = (self.config.baseline_bpm - rate as f64) / self.config.baseline_bpm * 100.0;
            out.rate_drop_pct = metrics::round_to(drop.max(0.0), 1);
        }

        // Drowsiness hysteresis on the smoothed signal: builds while the
        // mean stays low, decays one step per recovered frame.
        if self.state.smoothed_openness() < self.config.drowsy_openness_threshold {
            self.state.drowsy_frames += 1;
        } else {
            self.state.drowsy_frames = self.state.drowsy_frames.saturating_sub(1);
        }
        out.drowsy = self.state.drowsy_frames > self.config.drowsy_frame_threshold;

        out.too_close = is_too_close(set, self.config.proximity_ratio);

        out.alert = WellnessAlert::arbitrate(out.drowsy, rate, out.rate_drop_pct, out.too_close);
        out
    }

    /// Read-only view of the session state, for diagnostics and
    /// end-of-session reporting.
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use face_geometry::{face_with_openness, Landmark, SyntheticConfig, FACE_MESH_POINTS};
    use proptest::prelude::*;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(50);

    fn tracker_at(t0: Instant) -> SessionTracker {
        SessionTracker::started_at(TrackerConfig::default(), t0).unwrap()
    }

    fn face(openness: f64) -> face_geometry::LandmarkSet {
        face_with_openness(&SyntheticConfig::default(), openness)
    }

    /// Feed a sequence of openness values, one frame apart, returning the
    /// last frame's metrics.
    fn feed(
        tracker: &mut SessionTracker,
        t0: Instant,
        start_frame: u64,
        values: &[f64],
    ) -> FrameMetrics {
        let mut last = FrameMetrics::default();
        for (i, o) in values.iter().enumerate() {
            let now = t0 + FRAME * (start_frame + i as u64) as u32;
            last = tracker.process_at(Some(&face(*o)), now);
        }
        last
    }

    #[test]
    fn test_blink_counts_after_min_closed_frames() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &[0.3, 0.1, 0.1, 0.3]);
        assert_eq!(m.blink_count, 1);
        assert_eq!(m.blink_rate, 1);
    }

    #[test]
    fn test_single_closed_frame_is_noise() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &[0.3, 0.1, 0.3]);
        assert_eq!(m.blink_count, 0);
        assert_eq!(tracker.state().closed_frames, 0);
    }

    #[test]
    fn test_blink_lands_on_the_reopening_frame() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &[0.1, 0.1, 0.1, 0.1, 0.1]);
        assert_eq!(m.blink_count, 0, "still closed, no blink yet");
        assert_eq!(tracker.state().closed_frames, 5);

        let m = feed(&mut tracker, t0, 5, &[0.3]);
        assert_eq!(m.blink_count, 1);
        assert_eq!(tracker.state().closed_frames, 0);
    }

    #[test]
    fn test_blink_rate_forgets_events_past_the_window() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &[0.1, 0.1, 0.3]);
        assert_eq!(m.blink_rate, 1);

        // Same session, one minute later: the blink fell out of the window
        // but the cumulative count stands.
        let m = tracker.process_at(Some(&face(0.3)), t0 + Duration::from_secs(61));
        assert_eq!(m.blink_rate, 0);
        assert_eq!(m.blink_count, 1);
        assert_eq!(m.rate_drop_pct, 0.0, "no rate signal, no drop");
    }

    // Blinks without drowsiness: 0.19 sits below the blink threshold but
    // above the drowsy one, so the smoothed mean never drops far enough.
    fn blink_cycles(n: usize) -> Vec<f64> {
        let mut values = Vec::with_capacity(n * 3);
        for _ in 0..n {
            values.extend_from_slice(&[0.19, 0.19, 0.30]);
        }
        values
    }

    #[test]
    fn test_drop_percentage_follows_the_baseline() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &blink_cycles(8));
        assert_eq!(m.blink_rate, 8);
        assert_eq!(m.rate_drop_pct, 46.7);
        assert_eq!(m.alert, None, "46.7% is under the dry-eyes bar");
        assert!(!m.drowsy);
    }

    #[test]
    fn test_dry_eyes_fires_past_half_the_baseline() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &blink_cycles(7));
        assert_eq!(m.blink_rate, 7);
        assert_eq!(m.rate_drop_pct, 53.3);
        assert_eq!(m.alert, Some(WellnessAlert::DryEyes));
    }

    #[test]
    fn test_fast_blinking_never_reports_a_negative_drop() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = feed(&mut tracker, t0, 0, &blink_cycles(20));
        assert_eq!(m.blink_rate, 20);
        assert_eq!(m.rate_drop_pct, 0.0);
    }

    #[test]
    fn test_drowsiness_needs_sixteen_low_frames() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);
        let m = feed(&mut tracker, t0, 0, &[0.179; 15]);
        assert!(!m.drowsy, "15 frames leaves the counter at the threshold");

        let m = feed(&mut tracker, t0, 15, &[0.179]);
        assert!(m.drowsy);
        assert_eq!(m.alert, Some(WellnessAlert::Drowsy));
    }

    #[test]
    fn test_one_recovered_frame_only_decays_the_counter() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);
        feed(&mut tracker, t0, 0, &[0.179; 20]);
        assert_eq!(tracker.state().drowsy_frames, 20);

        // 0.40 lifts the smoothed mean above the drowsy threshold, but one
        // frame of recovery cannot clear twenty frames of buildup.
        let m = feed(&mut tracker, t0, 20, &[0.40]);
        assert_eq!(tracker.state().drowsy_frames, 19);
        assert!(m.drowsy);
    }

    #[test]
    fn test_drowsy_outranks_proximity_in_arbitration() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);
        let near = SyntheticConfig::close_up();

        let mut m = FrameMetrics::default();
        for i in 0..17 {
            let set = face_with_openness(&near, 0.1);
            m = tracker.process_at(Some(&set), t0 + FRAME * i);
        }
        assert!(m.drowsy);
        assert!(m.too_close);
        assert_eq!(m.alert, Some(WellnessAlert::Drowsy));
    }

    #[test]
    fn test_proximity_alone_raises_too_close() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let set = face_with_openness(&SyntheticConfig::close_up(), 0.3);
        let m = tracker.process_at(Some(&set), t0);
        assert!(m.too_close);
        assert_eq!(m.alert, Some(WellnessAlert::TooClose));
    }

    #[test]
    fn test_no_face_reports_neutral_and_preserves_state() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        feed(&mut tracker, t0, 0, &[0.1, 0.1, 0.3]);
        feed(&mut tracker, t0, 3, &[0.179; 17]);
        assert_eq!(tracker.state().blink_count, 1);
        let drowsy_before = tracker.state().drowsy_frames;
        let closed_before = tracker.state().closed_frames;

        let m = tracker.process_at(None, t0 + Duration::from_secs(5));
        assert!(!m.face_detected);
        assert_eq!(m.openness, 0.0);
        assert_eq!(m.blink_count, 1, "cumulative count still reports");
        assert_eq!(m.blink_rate, 0);
        assert_eq!(m.rate_drop_pct, 0.0);
        assert!(!m.drowsy);
        assert!(!m.too_close);
        assert_eq!(m.alert, None);
        assert_eq!(m.session_seconds, 5);

        assert_eq!(tracker.state().drowsy_frames, drowsy_before);
        assert_eq!(tracker.state().closed_frames, closed_before);
    }

    #[test]
    fn test_degenerate_landmarks_read_as_closed_eyes() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let collapsed = face_geometry::LandmarkSet::new(
            vec![Landmark::new(0.5, 0.5); FACE_MESH_POINTS],
            640,
            480,
        );
        let m = tracker.process_at(Some(&collapsed), t0);
        assert!(m.face_detected);
        assert_eq!(m.openness, 0.0);
        assert_eq!(tracker.state().closed_frames, 1);
    }

    #[test]
    fn test_reported_openness_is_rounded_to_three_decimals() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = tracker.process_at(Some(&face(0.2345678)), t0);
        assert_eq!(m.openness, 0.235);
    }

    #[test]
    fn test_session_clock_reports_whole_seconds() {
        let t0 = Instant::now();
        let mut tracker = tracker_at(t0);

        let m = tracker.process_at(Some(&face(0.3)), t0 + Duration::from_millis(90_400));
        assert_eq!(m.session_seconds, 90);
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let config = TrackerConfig {
            openness_threshold: -1.0,
            ..Default::default()
        };
        let err = SessionTracker::new(config).err().unwrap();
        assert!(matches!(err, TrackerError::InvalidConfig(_)));
    }

    proptest! {
        #[test]
        fn test_sustained_open_eyes_never_blink(
            samples in proptest::collection::vec(0.22f64..0.9, 1..200)
        ) {
            let t0 = Instant::now();
            let mut tracker = tracker_at(t0);
            for (i, o) in samples.iter().enumerate() {
                let set = face(*o);
                let m = tracker.process_at(Some(&set), t0 + FRAME * i as u32);
                prop_assert_eq!(m.blink_count, 0);
            }
        }
    }
}
