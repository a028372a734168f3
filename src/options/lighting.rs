use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Hemisphere fill plus one shadow-casting directional key light.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Lighting", inline)]
#[serde(default)]
pub struct LightingOptions {
    /// Sky colour of the hemisphere light (linear RGB).
    #[schemars(skip)]
    pub hemisphere_sky: [f32; 3],
    /// Ground colour of the hemisphere light (linear RGB).
    #[schemars(skip)]
    pub hemisphere_ground: [f32; 3],
    /// Hemisphere light intensity.
    #[schemars(title = "Ambient Fill", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub hemisphere_intensity: f32,
    /// Hemisphere "up" direction (the sky side).
    #[schemars(skip)]
    pub hemisphere_position: [f32; 3],
    /// Directional light colour (linear RGB).
    #[schemars(skip)]
    pub directional_color: [f32; 3],
    /// Directional light intensity.
    #[schemars(title = "Key Light", range(min = 0.0, max = 3.5), extend("step" = 0.05))]
    pub directional_intensity: f32,
    /// Directional light position; the light shines toward the origin.
    #[schemars(skip)]
    pub directional_position: [f32; 3],
    /// Shadow map edge length in texels.
    #[schemars(skip)]
    pub shadow_map_size: u32,
    /// Near plane of the shadow frustum.
    #[schemars(skip)]
    pub shadow_near: f32,
    /// Far plane of the shadow frustum.
    #[schemars(skip)]
    pub shadow_far: f32,
    /// Half-extent of the orthographic shadow frustum.
    #[schemars(skip)]
    pub shadow_extent: f32,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            hemisphere_sky: [1.0, 1.0, 1.0],
            // 0xA6A6A6
            hemisphere_ground: [0.651, 0.651, 0.651],
            hemisphere_intensity: 0.8,
            hemisphere_position: [0.0, 1.0, 0.0],
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 1.0,
            directional_position: [5.0, 10.0, 7.0],
            shadow_map_size: 2048,
            shadow_near: 0.5,
            shadow_far: 50.0,
            shadow_extent: 5.0,
        }
    }
}
