//! Model assets: fetching, glTF decoding, and the background loader.

pub mod gltf;
pub mod loader;
pub mod source;

pub use loader::{CancelToken, LoadEvent, LoadOutcome, LoadState, ModelLoader};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{AssetSource, FileSource};

use crate::animation::AnimationClip;
use crate::scene::{Mesh, SubtreeNode};

/// A decoded model: a node tree with its meshes and animation clips.
///
/// Node, mesh and clip-track indices all refer into this asset; attaching
/// it to a scene (see [`Scene::insert_subtree`](crate::scene::Scene::insert_subtree))
/// maps them to scene handles.
#[derive(Debug, Clone, Default)]
pub struct ModelAsset {
    /// Asset nodes.
    pub nodes: Vec<SubtreeNode>,
    /// Indices of the top-level nodes.
    pub roots: Vec<usize>,
    /// Triangle meshes referenced by `nodes`.
    pub meshes: Vec<Mesh>,
    /// Animation clips; may be empty.
    pub clips: Vec<AnimationClip>,
}

impl ModelAsset {
    /// Flag every mesh to cast and receive shadows.
    pub fn enable_shadows(&mut self) {
        for mesh in &mut self.meshes {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
        }
    }
}
