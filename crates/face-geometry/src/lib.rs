//! Facial landmark geometry for ocular fatigue tracking
//!
//! Leaf crate of the pipeline. Converts per-frame face-mesh landmarks into
//! the scalar signals the session tracker consumes:
//! - Eye openness ratio (lid distance over corner distance)
//! - Screen proximity from horizontal face span
//!
//! Detection itself stays out of process; frames arrive through the
//! [`LandmarkSource`] trait, with a deterministic synthetic source for
//! demos and tests.

pub mod landmarks;
pub mod openness;
pub mod proximity;
pub mod source;

pub use landmarks::{Landmark, LandmarkSet, FACE_MESH_POINTS, LEFT_EYE, RIGHT_EYE};
pub use openness::{average_openness, eye_openness};
pub use proximity::{face_width_px, is_too_close};
pub use source::{face_with_openness, LandmarkSource, SyntheticConfig, SyntheticSource};
