//! Playback of animation clips against scene nodes.

use crate::animation::clip::AnimationClip;
use crate::scene::{NodeId, Scene};

/// What happens when an action reaches the end of its clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Hold the final pose and stop.
    Once,
    /// Wrap around to the start.
    #[default]
    Repeat,
}

/// Handle to an action owned by an [`AnimationMixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

#[derive(Debug, Clone)]
struct AnimationAction {
    clip: usize,
    time: f32,
    loop_mode: LoopMode,
    playing: bool,
}

/// Plays clips against the scene nodes of one loaded asset.
///
/// Actions are applied in creation order; when two actions drive the same
/// node property the later one wins.
pub struct AnimationMixer {
    root: NodeId,
    bindings: Vec<NodeId>,
    clips: Vec<AnimationClip>,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    /// Mixer for the subtree rooted at `root`. `bindings[i]` is the scene
    /// node for asset node `i`.
    pub fn new(
        root: NodeId,
        bindings: Vec<NodeId>,
        clips: Vec<AnimationClip>,
    ) -> Self {
        Self {
            root,
            bindings,
            clips,
            actions: Vec::new(),
        }
    }

    /// Group node this mixer animates.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Clips available to this mixer.
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// The action for clip `index`, created (stopped, looping) on first
    /// request. `None` if there is no such clip.
    pub fn clip_action(&mut self, index: usize) -> Option<ActionId> {
        if index >= self.clips.len() {
            return None;
        }
        if let Some(pos) = self.actions.iter().position(|a| a.clip == index) {
            return Some(ActionId(pos));
        }
        self.actions.push(AnimationAction {
            clip: index,
            time: 0.0,
            loop_mode: LoopMode::default(),
            playing: false,
        });
        Some(ActionId(self.actions.len() - 1))
    }

    /// Change how an action behaves at the end of its clip.
    pub fn set_loop(&mut self, action: ActionId, mode: LoopMode) {
        if let Some(a) = self.actions.get_mut(action.0) {
            a.loop_mode = mode;
        }
    }

    /// Start (or resume) an action.
    pub fn play(&mut self, action: ActionId) {
        if let Some(a) = self.actions.get_mut(action.0) {
            a.playing = true;
        }
    }

    /// Whether an action is currently playing.
    pub fn is_playing(&self, action: ActionId) -> bool {
        self.actions.get(action.0).is_some_and(|a| a.playing)
    }

    /// Number of playing actions.
    pub fn active_action_count(&self) -> usize {
        self.actions.iter().filter(|a| a.playing).count()
    }

    /// Stop every action and rewind it.
    pub fn stop_all_action(&mut self) {
        for action in &mut self.actions {
            action.playing = false;
            action.time = 0.0;
        }
    }

    /// Advance playing actions by `dt` seconds and write the sampled poses
    /// into `scene`.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        let dt = dt.max(0.0);
        for action in &mut self.actions {
            if !action.playing {
                continue;
            }
            let Some(clip) = self.clips.get(action.clip) else {
                continue;
            };

            let duration = clip.duration();
            action.time += dt;
            if duration > 0.0 {
                match action.loop_mode {
                    LoopMode::Repeat => action.time %= duration,
                    LoopMode::Once if action.time >= duration => {
                        action.time = duration;
                        action.playing = false;
                    }
                    LoopMode::Once => {}
                }
            }

            for track in &clip.tracks {
                let Some(&node_id) = self.bindings.get(track.target) else {
                    continue;
                };
                let (Some(sample), Some(node)) =
                    (track.sample(action.time), scene.node_mut(node_id))
                else {
                    continue;
                };
                sample.apply(&mut node.transform);
            }
        }
    }
}
