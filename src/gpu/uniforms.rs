//! CPU-side layouts of the uniform blocks in `assets/shaders`.

use glam::{Mat4, Vec3, Vec4};

use crate::options::{OutputColorSpace, ShadowFilter, ToneMapping};
use crate::renderer::RendererConfig;
use crate::scene::{Mesh, Scene};

/// Depth offset subtracted before the shadow comparison.
pub const SHADOW_DEPTH_BIAS: f32 = 0.0005;

/// `orbis::lighting::LightUniform`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Shadow camera view-projection.
    pub shadow_view_proj: [[f32; 4]; 4],
    /// Sky color, w = hemisphere intensity.
    pub sky_color: [f32; 4],
    /// Ground color.
    pub ground_color: [f32; 4],
    /// Hemisphere up direction.
    pub hemisphere_up: [f32; 4],
    /// Key light color, w = intensity.
    pub key_color: [f32; 4],
    /// Toward the key light, w = 1 when shadows are sampled.
    pub key_direction: [f32; 4],
    /// Texel size, depth bias, soft filtering flag.
    pub shadow_params: [f32; 4],
}

impl LightUniform {
    /// Pack the scene's first hemisphere and directional light. Missing
    /// lights contribute nothing.
    pub fn from_scene(scene: &Scene, config: &RendererConfig) -> Self {
        let mut uniform = Self {
            shadow_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky_color: [0.0; 4],
            ground_color: [0.0; 4],
            hemisphere_up: [0.0, 1.0, 0.0, 0.0],
            key_color: [0.0; 4],
            key_direction: [0.0, 1.0, 0.0, 0.0],
            shadow_params: [0.0; 4],
        };
        if let Some(hemi) = scene.hemisphere_light() {
            uniform.sky_color = hemi.sky_color.extend(hemi.intensity).to_array();
            uniform.ground_color = hemi.ground_color.extend(1.0).to_array();
            uniform.hemisphere_up = hemi.up.extend(0.0).to_array();
        }
        if let Some(key) = scene.directional_light() {
            uniform.key_color = key.color.extend(key.intensity).to_array();
            let shadowed = config.shadows && key.shadow.is_some();
            uniform.key_direction = key
                .direction_to_light()
                .extend(if shadowed { 1.0 } else { 0.0 })
                .to_array();
            if let (Some(shadow), Some(view_proj)) =
                (key.shadow, key.shadow_view_proj())
            {
                uniform.shadow_view_proj = view_proj.to_cols_array_2d();
                let soft = config.shadow_filter == ShadowFilter::PcfSoft;
                uniform.shadow_params = [
                    1.0 / shadow.map_size.max(1) as f32,
                    SHADOW_DEPTH_BIAS,
                    if soft { 1.0 } else { 0.0 },
                    0.0,
                ];
            }
        }
        uniform
    }

    /// Whether the mesh pass samples the shadow map.
    pub fn shadows_enabled(&self) -> bool {
        self.key_direction[3] > 0.5
    }
}

/// `orbis::mesh::MeshUniform`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    /// Model-to-world.
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of `model`.
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
    /// x = receives shadows.
    pub flags: [f32; 4],
}

impl MeshUniform {
    /// Block for drawing `mesh` with `world`.
    pub fn new(world: Mat4, mesh: &Mesh) -> Self {
        let normal = if world.determinant().abs() > f32::EPSILON {
            world.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: world.to_cols_array_2d(),
            normal_matrix: normal.to_cols_array_2d(),
            base_color: mesh.material.base_color,
            flags: [
                if mesh.receive_shadow { 1.0 } else { 0.0 },
                0.0,
                0.0,
                0.0,
            ],
        }
    }

    /// Transform a normal the way the vertex shader does.
    pub fn transform_normal(&self, normal: Vec3) -> Vec3 {
        (Mat4::from_cols_array_2d(&self.normal_matrix) * Vec4::from((normal, 0.0)))
            .truncate()
    }
}

/// Composite pass parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CompositeParams {
    /// Exposure multiplier.
    pub exposure: f32,
    /// 0 = none, 1 = ACES filmic.
    pub tone_mapping: u32,
    /// 1 = encode to sRGB.
    pub encode_srgb: u32,
    /// 1 = present opaque.
    pub opaque: u32,
}

impl From<&RendererConfig> for CompositeParams {
    fn from(config: &RendererConfig) -> Self {
        Self {
            exposure: config.exposure,
            tone_mapping: match config.tone_mapping {
                ToneMapping::None => 0,
                ToneMapping::AcesFilmic => 1,
            },
            encode_srgb: u32::from(
                config.output_color_space == OutputColorSpace::Srgb,
            ),
            opaque: u32::from(!config.alpha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LightingOptions;
    use crate::scene::install_lighting;

    fn lit_scene() -> Scene {
        let mut scene = Scene::new();
        install_lighting(&mut scene, &LightingOptions::default());
        scene
    }

    #[test]
    fn layouts_match_wgsl() {
        assert_eq!(size_of::<LightUniform>(), 160);
        assert_eq!(size_of::<MeshUniform>(), 160);
        assert_eq!(size_of::<CompositeParams>(), 16);
    }

    #[test]
    fn default_rig_packs_soft_shadows() {
        let uniform = LightUniform::from_scene(&lit_scene(), &RendererConfig::default());
        assert!(uniform.shadows_enabled());
        assert_eq!(uniform.sky_color[3], 0.8);
        assert_eq!(uniform.shadow_params[0], 1.0 / 2048.0);
        assert_eq!(uniform.shadow_params[2], 1.0);
        let dir = Vec3::from_slice(&uniform.key_direction[..3]);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn shadows_off_in_config_disables_sampling() {
        let config = RendererConfig {
            shadows: false,
            shadow_filter: ShadowFilter::Hard,
            ..RendererConfig::default()
        };
        let uniform = LightUniform::from_scene(&lit_scene(), &config);
        assert!(!uniform.shadows_enabled());
        assert_eq!(uniform.shadow_params[2], 0.0);
    }

    #[test]
    fn unlit_scene_is_dark() {
        let uniform = LightUniform::from_scene(&Scene::new(), &RendererConfig::default());
        assert_eq!(uniform.sky_color, [0.0; 4]);
        assert_eq!(uniform.key_color, [0.0; 4]);
        assert!(!uniform.shadows_enabled());
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let world = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniform = MeshUniform::new(world, &Mesh::default());
        let n = uniform.transform_normal(Vec3::X);
        assert!((n - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn degenerate_world_keeps_identity_normals() {
        let uniform = MeshUniform::new(Mat4::ZERO, &Mesh::default());
        assert_eq!(uniform.transform_normal(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn composite_params_follow_config() {
        let params = CompositeParams::from(&RendererConfig::default());
        assert_eq!(params.exposure, 2.0);
        assert_eq!((params.tone_mapping, params.encode_srgb, params.opaque), (1, 1, 0));
    }
}
