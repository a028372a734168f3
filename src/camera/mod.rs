//! Camera system for the globe view.
//!
//! Provides a perspective camera with a cached projection and orbit
//! controls with damping, auto-rotation and polar limits.

/// Orbit controls: drag-to-rotate, inertia, auto-rotation.
pub mod controls;
/// Core camera struct and GPU uniform type.
pub mod core;

pub use self::controls::OrbitControls;
pub use self::core::{Camera, CameraUniform};
