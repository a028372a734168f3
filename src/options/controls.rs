use std::f32::consts::PI;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Orbit control behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
pub struct ControlsOptions {
    /// Smooth rotation with inertia.
    #[schemars(title = "Damping")]
    pub enable_damping: bool,
    /// Fraction of the pending rotation applied (and shed) per update.
    #[schemars(title = "Damping Factor", range(min = 0.01, max = 0.5), extend("step" = 0.01))]
    pub damping_factor: f32,
    /// Spin around the target when the user is not dragging.
    #[schemars(title = "Auto Rotate")]
    pub auto_rotate: bool,
    /// Auto-rotation speed; 1.0 is one revolution per minute.
    #[schemars(title = "Auto Rotate Speed", range(min = 0.0, max = 5.0), extend("step" = 0.05))]
    pub auto_rotate_speed: f32,
    /// Drag sensitivity multiplier.
    #[schemars(title = "Rotate Speed", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub rotate_speed: f32,
    /// Allow scroll-wheel dolly.
    #[schemars(skip)]
    pub enable_zoom: bool,
    /// Smallest polar angle (radians from +Y).
    #[schemars(skip)]
    pub min_polar_angle: f32,
    /// Largest polar angle (radians from +Y).
    #[schemars(skip)]
    pub max_polar_angle: f32,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.3,
            rotate_speed: 1.0,
            enable_zoom: false,
            min_polar_angle: PI * 0.3,
            max_polar_angle: PI * 0.7,
        }
    }
}
