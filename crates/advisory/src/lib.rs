//! Advisory text generation
//!
//! Turns a wellness alert plus session statistics into short human-readable
//! guidance. The engine only ever talks to the [`AdvisoryProvider`] trait;
//! the remote implementation calls the Gemini API, and [`StaticAdvisor`]
//! serves the fixed texts when no remote generator is configured.
//!
//! Providers fail with an error, never a panic. The alert throttle maps
//! any failure to [`fallback_text`].

pub mod gemini;

pub use gemini::{GeminiAdvisor, DEFAULT_MODEL};

use async_trait::async_trait;
use thiserror::Error;
use tracker::WellnessAlert;

/// Advisory error types
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("advisory request failed: {0}")]
    Request(String),

    #[error("advisory response malformed: {0}")]
    Malformed(String),
}

/// Context passed to the generator with each request.
#[derive(Debug, Clone)]
pub struct AdvisoryRequest {
    /// The alert the guidance is for
    pub kind: WellnessAlert,
    /// Current blinks per minute
    pub blink_rate: u32,
    /// Percent the rate sits below baseline
    pub rate_drop_pct: f64,
    /// Whole seconds since the session started
    pub session_seconds: u64,
}

/// Generates guidance text for one alert.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError>;
}

/// Fixed guidance per alert kind, served when generation fails and by
/// [`StaticAdvisor`].
pub fn fallback_text(kind: WellnessAlert) -> &'static str {
    match kind {
        WellnessAlert::DryEyes => {
            "Your blink rate has dropped. Try the 20-20-20 rule: \
             look at something 20 feet away for 20 seconds."
        }
        WellnessAlert::Drowsy => {
            "You seem drowsy. Stand up, splash cold water on your face, \
             and take a 5 minute walk."
        }
        WellnessAlert::TooClose => {
            "You're sitting too close to the screen. Move back to at least \
             arm's length distance."
        }
    }
}

/// Provider that always answers with the fixed per-kind guidance.
#[derive(Debug, Default, Clone)]
pub struct StaticAdvisor;

#[async_trait]
impl AdvisoryProvider for StaticAdvisor {
    async fn generate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
        Ok(fallback_text(request.kind).to_string())
    }
}
