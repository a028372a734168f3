//! Per-frame work and model attachment.

use web_time::Instant;

use super::GlobeSession;
use crate::animation::{AnimationClip, AnimationMixer, LoopMode};
use crate::container::Container;
use crate::model::{LoadOutcome, ModelAsset};
use crate::resize::apply_model_scale;
use crate::scale::ScaleTier;
use crate::viewport::ViewportDimensions;

impl<C: Container> GlobeSession<C> {
    /// One frame: settle the model load, advance controls and animations,
    /// then render if the renderer, scene and camera all exist.
    pub(super) fn tick(&mut self, now: Instant) -> bool {
        let Some(tick) = self.frame_loop.begin_frame() else {
            return false;
        };

        match self.loader.poll(now) {
            Some(LoadOutcome::Loaded(asset)) => self.attach_model(*asset),
            Some(LoadOutcome::Failed(e)) => {
                log::error!("Error loading globe model: {e}");
            }
            None => {}
        }

        if let (Some(controls), Some(camera)) =
            (self.controls.as_mut(), self.camera.as_mut())
        {
            let _ = controls.update(camera, tick.delta);
        }
        if let (Some(mixer), Some(scene)) =
            (self.mixer.as_mut(), self.scene.as_mut())
        {
            mixer.update(tick.delta, scene);
        }

        let (Some(renderer), Some(scene), Some(camera)) =
            (self.renderer.as_mut(), self.scene.as_ref(), self.camera.as_ref())
        else {
            return false;
        };
        match renderer.render(scene, camera) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Frame render failed: {e}");
                false
            }
        }
    }

    /// Insert a loaded model into the scene, scale it for the viewport and
    /// start its clips.
    fn attach_model(&mut self, mut asset: ModelAsset) {
        // Cancelled between the loader's check and now: drop it.
        if !self.loader.is_live() {
            return;
        }
        let (Some(scene), Some(container)) =
            (self.scene.as_mut(), self.container.as_ref())
        else {
            return;
        };

        asset.enable_shadows();
        let ModelAsset {
            nodes,
            roots,
            meshes,
            clips,
        } = asset;
        let handle = scene.insert_subtree(nodes, &roots, meshes);
        let tier =
            ScaleTier::from_width(ViewportDimensions::read(container).viewport_width);
        let _ = apply_model_scale(scene, handle.root, tier);
        self.model = Some(handle.root);
        log::info!("Globe model loaded successfully ({tier:?})");

        if clips.is_empty() {
            log::info!("No animations found in the model");
            return;
        }
        let names: Vec<&str> =
            clips.iter().map(AnimationClip::display_name).collect();
        log::info!("Loaded {} animations: {}", clips.len(), names.join(", "));

        let mut mixer = AnimationMixer::new(handle.root, handle.bindings, clips);
        for index in 0..mixer.clips().len() {
            if let Some(action) = mixer.clip_action(index) {
                mixer.set_loop(action, LoopMode::Repeat);
                mixer.play(action);
            }
        }
        self.mixer = Some(mixer);
    }
}
