use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tone-mapping curve applied when resolving HDR color to the surface.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// Clamp only.
    None,
    /// ACES filmic approximation.
    #[default]
    AcesFilmic,
}

/// Color space of the presented image.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputColorSpace {
    /// Encode to sRGB before presenting.
    #[default]
    Srgb,
    /// Present linear values unchanged.
    Linear,
}

/// Shadow map filtering.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ShadowFilter {
    /// Single comparison tap.
    Hard,
    /// 3x3 percentage-closer filtering.
    #[default]
    PcfSoft,
}

/// Rendering surface configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Renderer", inline)]
#[serde(default)]
pub struct RendererOptions {
    /// Multisample the geometry pass.
    #[schemars(title = "Antialias")]
    pub antialias: bool,
    /// Leave the background transparent for compositing over the host.
    #[schemars(skip)]
    pub alpha: bool,
    /// Upper bound on the device pixel ratio used for the render target.
    #[schemars(title = "Max Pixel Ratio", range(min = 1.0, max = 3.0), extend("step" = 0.25))]
    pub max_pixel_ratio: f32,
    /// Output color space.
    #[schemars(skip)]
    pub output_color_space: OutputColorSpace,
    /// Tone-mapping curve.
    #[schemars(title = "Tone Mapping")]
    pub tone_mapping: ToneMapping,
    /// Exposure multiplier applied before tone mapping.
    #[schemars(title = "Exposure", range(min = 0.1, max = 4.0), extend("step" = 0.05))]
    pub exposure: f32,
    /// Render the directional light's shadow map.
    #[schemars(title = "Shadows")]
    pub shadows: bool,
    /// Shadow filtering mode.
    #[schemars(skip)]
    pub shadow_filter: ShadowFilter,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            antialias: true,
            alpha: true,
            max_pixel_ratio: 2.0,
            output_color_space: OutputColorSpace::Srgb,
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 2.0,
            shadows: true,
            shadow_filter: ShadowFilter::PcfSoft,
        }
    }
}
