//! Per-session tracking state

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Openness samples kept for drowsiness smoothing.
pub(crate) const OPENNESS_HISTORY_LEN: usize = 10;

/// Trailing window the blink rate is counted over.
pub(crate) const RATE_WINDOW: Duration = Duration::from_secs(60);

/// State of one tracking session. Single-writer: exactly one frame is
/// processed at a time, and only that call mutates the state.
#[derive(Debug)]
pub struct SessionState {
    /// Consecutive frames with openness below threshold
    pub closed_frames: u32,
    /// Completed blinks since session start
    pub blink_count: u64,
    /// Drowsiness hysteresis counter
    pub drowsy_frames: u32,
    /// Session start
    pub started_at: Instant,
    /// Timestamps of completed blinks, oldest first
    blink_times: VecDeque<Instant>,
    /// Recent openness samples for smoothing
    openness_history: VecDeque<f64>,
}

impl SessionState {
    pub fn new(started_at: Instant) -> Self {
        Self {
            closed_frames: 0,
            blink_count: 0,
            drowsy_frames: 0,
            started_at,
            blink_times: VecDeque::new(),
            openness_history: VecDeque::with_capacity(OPENNESS_HISTORY_LEN),
        }
    }

    /// Push one openness sample, evicting the oldest past capacity.
    pub fn push_openness(&mut self, openness: f64) {
        if self.openness_history.len() == OPENNESS_HISTORY_LEN {
            self.openness_history.pop_front();
        }
        self.openness_history.push_back(openness);
    }

    /// Mean of the buffered openness samples; zero before the first sample.
    pub fn smoothed_openness(&self) -> f64 {
        if self.openness_history.is_empty() {
            return 0.0;
        }
        self.openness_history.iter().sum::<f64>() / self.openness_history.len() as f64
    }

    /// Record one completed blink at `now`. Frames are processed in order,
    /// so timestamps stay non-decreasing.
    pub fn record_blink(&mut self, now: Instant) {
        self.blink_count += 1;
        self.blink_times.push_back(now);
    }

    /// Prune blinks that fell out of the rate window, then count the rest.
    pub fn blink_rate(&mut self, now: Instant) -> u32 {
        while let Some(front) = self.blink_times.front() {
            if now.duration_since(*front) > RATE_WINDOW {
                self.blink_times.pop_front();
            } else {
                break;
            }
        }
        self.blink_times.len() as u32
    }

    /// Whole seconds since the session started.
    pub fn elapsed_seconds(&self, now: Instant) -> u64 {
        now.duration_since(self.started_at).as_secs()
    }
}
