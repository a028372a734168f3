//! Fresh scene and camera for a viewport.

use super::Scene;
use crate::camera::Camera;
use crate::error::GlobeError;
use crate::options::CameraOptions;
use crate::viewport::ViewportDimensions;

/// Build an empty, transparent scene and a perspective camera whose aspect
/// matches `dims`.
///
/// # Errors
///
/// Returns [`GlobeError::InvalidViewport`] when `dims.height` is zero.
pub fn build_scene(
    dims: &ViewportDimensions,
    options: &CameraOptions,
) -> Result<(Scene, Camera), GlobeError> {
    let aspect = dims.aspect()?;
    let scene = Scene::new();
    let camera = Camera::new(options, aspect);
    Ok((scene, camera))
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn dims(width: u32, height: u32) -> ViewportDimensions {
        ViewportDimensions {
            width,
            height,
            device_pixel_ratio: 1.0,
            viewport_width: width,
        }
    }

    #[test]
    fn scene_is_transparent_and_camera_matches_viewport() {
        let (scene, camera) =
            build_scene(&dims(320, 480), &CameraOptions::default()).unwrap();
        assert!(scene.background.is_none());
        assert!(scene.lights().is_empty());
        assert_eq!(scene.node_count(), 0);
        assert_eq!(camera.aspect, 320.0 / 480.0);
        assert_eq!((camera.fovy, camera.znear, camera.zfar), (60.0, 0.1, 1000.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn zero_height_is_rejected() {
        let result = build_scene(&dims(320, 0), &CameraOptions::default());
        assert!(matches!(result, Err(GlobeError::InvalidViewport { .. })));
    }
}
