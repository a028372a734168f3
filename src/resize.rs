//! Viewport resize handling.
//!
//! The controller holds the one resize listener a session registers on its
//! container. Handling a resize re-reads the container, updates the camera
//! projection and renderer size, and re-applies the responsive model scale.

use crate::camera::Camera;
use crate::container::{Container, ListenerId};
use crate::renderer::RenderSurface;
use crate::scale::ScaleTier;
use crate::scene::{NodeId, Scene};
use crate::viewport::ViewportDimensions;

/// Session state a resize touches. Every part is optional so the handler
/// can run against a partially built or torn-down session.
pub struct ResizeTargets<'a, C: Container> {
    /// Container to measure.
    pub container: Option<&'a C>,
    /// Camera whose aspect follows the container.
    pub camera: Option<&'a mut Camera>,
    /// Surface to resize.
    pub renderer: Option<&'a mut (dyn RenderSurface + 'static)>,
    /// Scene holding the model node.
    pub scene: Option<&'a mut Scene>,
    /// Loaded model group node, if any.
    pub model: Option<NodeId>,
}

/// What a handled resize applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOutcome {
    /// Dimensions that were read.
    pub dims: ViewportDimensions,
    /// Tier for the new viewport width.
    pub tier: ScaleTier,
    /// Whether a model was rescaled.
    pub model_scaled: bool,
}

/// Owner of a container resize listener.
#[derive(Debug, Default)]
pub struct ResizeController {
    listener: Option<ListenerId>,
}

impl ResizeController {
    /// Register a resize listener on `container`.
    pub fn attach<C: Container>(container: &C) -> Self {
        Self {
            listener: Some(container.add_resize_listener()),
        }
    }

    /// Whether a listener is registered.
    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// The registered listener.
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    /// Apply a resize. A no-op (returns `None`) when detached, when the
    /// container, camera or renderer is missing, or when the container has
    /// zero height.
    pub fn handle<C: Container>(
        &self,
        targets: ResizeTargets<'_, C>,
    ) -> Option<ResizeOutcome> {
        if !self.is_attached() {
            return None;
        }
        let (Some(container), Some(camera), Some(renderer)) =
            (targets.container, targets.camera, targets.renderer)
        else {
            return None;
        };

        let dims = ViewportDimensions::read(container);
        let aspect = match dims.aspect() {
            Ok(aspect) => aspect,
            Err(e) => {
                log::debug!("Skipping resize: {e}");
                return None;
            }
        };
        camera.set_aspect(aspect);
        renderer.resize(&dims);

        let tier = ScaleTier::from_width(dims.viewport_width);
        let model_scaled = match (targets.scene, targets.model) {
            (Some(scene), Some(model)) => apply_model_scale(scene, model, tier),
            _ => false,
        };
        log::debug!(
            "Resized to {}x{} ({tier:?}, aspect {aspect:.3})",
            dims.width,
            dims.height
        );
        Some(ResizeOutcome {
            dims,
            tier,
            model_scaled,
        })
    }

    /// Unregister the listener. Idempotent.
    pub fn detach<C: Container>(&mut self, container: &C) {
        if let Some(listener) = self.listener.take() {
            if !container.remove_resize_listener(listener) {
                log::debug!("resize listener {listener:?} was already gone");
            }
        }
    }
}

/// Scale `model` uniformly by `tier`'s factor. Returns `false` if the node
/// no longer exists.
pub fn apply_model_scale(scene: &mut Scene, model: NodeId, tier: ScaleTier) -> bool {
    match scene.node_mut(model) {
        Some(node) => {
            node.transform.set_uniform_scale(tier.factor());
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::CameraOptions;
    use crate::renderer::{RendererConfig, SurfaceFactory};
    use crate::scene::SubtreeNode;
    use crate::testing::{FakeContainer, FakeSurfaceFactory};

    #[test]
    fn attach_and_detach_balance_listeners() {
        let container = FakeContainer::new(400, 300);
        let mut controller = ResizeController::attach(&container);
        assert_eq!(container.listener_count(), 1);
        controller.detach(&container);
        controller.detach(&container);
        assert_eq!(container.listener_count(), 0);
        assert!(!controller.is_attached());
    }

    #[test]
    fn resize_updates_camera_renderer_and_model() {
        let container = FakeContainer::new(400, 300);
        let dims = ViewportDimensions::read(&container);
        let factory = FakeSurfaceFactory::default();
        let mut renderer = factory
            .create_surface(&container, &dims, &RendererConfig::default())
            .unwrap();
        let mut camera = Camera::new(&CameraOptions::default(), 400.0 / 300.0);
        let mut scene = Scene::new();
        let model = scene
            .insert_subtree(vec![SubtreeNode::default()], &[0], vec![])
            .root;
        let controller = ResizeController::attach(&container);

        container.resize(1200, 800);
        let outcome = controller
            .handle(ResizeTargets {
                container: Some(&container),
                camera: Some(&mut camera),
                renderer: Some(renderer.as_mut()),
                scene: Some(&mut scene),
                model: Some(model),
            })
            .unwrap();

        assert_eq!(camera.aspect, 1200.0 / 800.0);
        assert_eq!(renderer.size(), (1200, 800));
        assert_eq!(outcome.tier, ScaleTier::Large);
        assert!(outcome.model_scaled);
        assert_eq!(
            scene.node(model).unwrap().transform.scale,
            Vec3::splat(0.85)
        );
    }

    #[test]
    fn missing_parts_make_resize_a_no_op() {
        let container = FakeContainer::new(400, 300);
        let controller = ResizeController::attach(&container);
        let mut camera = Camera::new(&CameraOptions::default(), 1.0);
        let outcome = controller.handle(ResizeTargets {
            container: Some(&container),
            camera: Some(&mut camera),
            renderer: None,
            scene: None,
            model: None,
        });
        assert!(outcome.is_none());
        assert_eq!(camera.aspect, 1.0);
    }

    #[test]
    fn zero_height_is_skipped() {
        let container = FakeContainer::new(400, 300);
        let dims = ViewportDimensions::read(&container);
        let mut renderer = FakeSurfaceFactory::default()
            .create_surface(&container, &dims, &RendererConfig::default())
            .unwrap();
        let mut camera = Camera::new(&CameraOptions::default(), 4.0 / 3.0);
        let controller = ResizeController::attach(&container);
        container.resize(400, 0);
        assert!(controller
            .handle(ResizeTargets {
                container: Some(&container),
                camera: Some(&mut camera),
                renderer: Some(renderer.as_mut()),
                scene: None,
                model: None,
            })
            .is_none());
        assert_eq!(camera.aspect, 4.0 / 3.0);
        assert_eq!(renderer.size(), (400, 300));
    }
}
