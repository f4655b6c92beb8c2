//! Alert Throttling
//!
//! Cooldown-gated advisory requests, one throttle per session.

mod throttle;

pub use throttle::{AdvisoryThrottle, ThrottleConfig, ThrottleError};
