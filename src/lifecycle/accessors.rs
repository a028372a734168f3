//! Read-only views of the mounted session.

use glam::Vec3;

use super::Globe;
use crate::animation::AnimationMixer;
use crate::camera::{Camera, OrbitControls};
use crate::container::Container;
use crate::model::LoadState;
use crate::options::Options;
use crate::scene::{NodeId, Scene};

impl<C: Container> Globe<C> {
    /// Whether a session is mounted (even a partially built one).
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the frame loop is armed.
    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.frame_loop.is_running())
    }

    /// Options the globe was created with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The scene.
    pub fn scene(&self) -> Option<&Scene> {
        self.session.as_ref()?.scene.as_ref()
    }

    /// The camera.
    pub fn camera(&self) -> Option<&Camera> {
        self.session.as_ref()?.camera.as_ref()
    }

    /// The orbit controls.
    pub fn controls(&self) -> Option<&OrbitControls> {
        self.session.as_ref()?.controls.as_ref()
    }

    /// The mixer, once a model with clips is attached.
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.session.as_ref()?.mixer.as_ref()
    }

    /// Group node of the attached model.
    pub fn model(&self) -> Option<NodeId> {
        self.session.as_ref()?.model
    }

    /// Current scale of the attached model.
    pub fn model_scale(&self) -> Option<Vec3> {
        let session = self.session.as_ref()?;
        let node = session.scene.as_ref()?.node(session.model?)?;
        Some(node.transform.scale)
    }

    /// Model loader state.
    pub fn load_state(&self) -> Option<LoadState> {
        self.session.as_ref().map(|s| s.loader.state())
    }

    /// Logical size of the render surface.
    pub fn renderer_size(&self) -> Option<(u32, u32)> {
        Some(self.session.as_ref()?.renderer.as_ref()?.size())
    }

    /// Smoothed frame rate.
    pub fn fps(&self) -> Option<f32> {
        self.session.as_ref().map(|s| s.frame_loop.fps())
    }
}
