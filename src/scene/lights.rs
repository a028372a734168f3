//! Lighting rig: hemisphere fill plus a shadow-casting directional light.

use glam::{Mat4, Vec3};

use super::Scene;
use crate::options::LightingOptions;

/// Sky/ground gradient light used for ambient fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    /// Color received by surfaces facing `up`.
    pub sky_color: Vec3,
    /// Color received by surfaces facing away from `up`.
    pub ground_color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Normalized sky direction.
    pub up: Vec3,
}

/// Orthographic shadow frustum of a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadow {
    /// Shadow map edge length in texels.
    pub map_size: u32,
    /// Near plane distance from the light.
    pub near: f32,
    /// Far plane distance from the light.
    pub far: f32,
    /// Half-width/height of the orthographic volume.
    pub extent: f32,
}

/// Parallel light shining from `position` toward `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Light color.
    pub color: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Light position; only the direction to `target` affects shading.
    pub position: Vec3,
    /// Point the light aims at.
    pub target: Vec3,
    /// Shadow settings, `None` when the light casts no shadow.
    pub shadow: Option<DirectionalShadow>,
}

impl DirectionalLight {
    /// Unit vector from the surface toward the light.
    pub fn direction_to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or(Vec3::Y)
    }

    /// View-projection of the shadow camera, if this light casts shadows.
    pub fn shadow_view_proj(&self) -> Option<Mat4> {
        let shadow = self.shadow?;
        let up = if self.direction_to_light().abs().dot(Vec3::Y) > 0.99 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.position, self.target, up);
        let e = shadow.extent;
        let proj =
            Mat4::orthographic_rh(-e, e, -e, e, shadow.near, shadow.far);
        Some(proj * view)
    }
}

/// A light in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Ambient fill.
    Hemisphere(HemisphereLight),
    /// Key light.
    Directional(DirectionalLight),
}

impl Scene {
    /// First hemisphere light, if any.
    pub fn hemisphere_light(&self) -> Option<&HemisphereLight> {
        self.lights().iter().find_map(|light| match light {
            Light::Hemisphere(h) => Some(h),
            Light::Directional(_) => None,
        })
    }

    /// First directional light, if any.
    pub fn directional_light(&self) -> Option<&DirectionalLight> {
        self.lights().iter().find_map(|light| match light {
            Light::Directional(d) => Some(d),
            Light::Hemisphere(_) => None,
        })
    }
}

/// Add the hemisphere and directional lights described by `options`.
pub fn install_lighting(scene: &mut Scene, options: &LightingOptions) {
    scene.add_light(Light::Hemisphere(HemisphereLight {
        sky_color: Vec3::from(options.hemisphere_sky),
        ground_color: Vec3::from(options.hemisphere_ground),
        intensity: options.hemisphere_intensity,
        up: Vec3::from(options.hemisphere_position).normalize_or(Vec3::Y),
    }));
    scene.add_light(Light::Directional(DirectionalLight {
        color: Vec3::from(options.directional_color),
        intensity: options.directional_intensity,
        position: Vec3::from(options.directional_position),
        target: Vec3::ZERO,
        shadow: Some(DirectionalShadow {
            map_size: options.shadow_map_size,
            near: options.shadow_near,
            far: options.shadow_far,
            extent: options.shadow_extent,
        }),
    }));
}
