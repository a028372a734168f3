//! Centralized globe options with TOML preset support.
//!
//! Every tweakable constant of the globe (camera placement, renderer
//! quality, lighting rig, orbit controls, model source) is consolidated
//! here. Options serialize to/from TOML so a deployment can override any
//! subset without recompiling.

mod camera;
mod controls;
mod lighting;
mod model;
mod renderer;

use std::path::Path;

pub use camera::CameraOptions;
pub use controls::ControlsOptions;
pub use lighting::LightingOptions;
pub use model::ModelOptions;
pub use renderer::{OutputColorSpace, RendererOptions, ShadowFilter, ToneMapping};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[renderer]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Camera projection and placement.
    pub camera: CameraOptions,
    /// Rendering surface configuration.
    pub renderer: RendererOptions,
    /// Lighting rig parameters.
    pub lighting: LightingOptions,
    /// Orbit control behavior.
    pub controls: ControlsOptions,
    /// Model asset location and load policy.
    pub model: ModelOptions,
}

impl Options {
    /// Generate JSON Schema describing the user-facing options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, GlobeError> {
        toml::from_str(content)
            .map_err(|e| GlobeError::OptionsParse(e.to_string()))
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, GlobeError> {
        let content = std::fs::read_to_string(path).map_err(GlobeError::Io)?;
        Self::from_toml(&content)
    }
}
