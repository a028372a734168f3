//! Keyframe animation for loaded models: clips sampled from the asset and a
//! mixer that plays them against scene nodes.

pub mod clip;
pub mod mixer;

pub use clip::{AnimationClip, Interpolation, Track, TrackSample, TrackValues};
pub use mixer::{ActionId, AnimationMixer, LoopMode};
