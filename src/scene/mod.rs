//! Scene graph: an arena of transform nodes, the meshes they carry, and the
//! lights that illuminate them.
//!
//! The scene exclusively owns every node. Other parts of a session refer to
//! nodes through [`NodeId`], which is a non-owning handle: lookups return
//! `Option` and a stale id simply resolves to nothing.

pub mod builder;
pub mod lights;

use glam::{Mat4, Quat, Vec3};

pub use builder::build_scene;
pub use lights::{
    install_lighting, DirectionalLight, DirectionalShadow, HemisphereLight,
    Light,
};

/// Handle to a node owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Handle to a mesh owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(u32);

impl MeshId {
    /// Arena index of this mesh.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Local translation / rotation / scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub translation: Vec3,
    /// Rotation relative to the parent.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// No translation, rotation or scale.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Local-to-parent matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            self.rotation,
            self.translation,
        )
    }

    /// Set the same scale on all three axes.
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vec3::splat(scale);
    }
}

/// Surface appearance. Only a flat base color is modelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA base color.
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Surface material.
    pub material: Material,
    /// Rendered into the directional light's shadow map.
    pub cast_shadow: bool,
    /// Darkened by the directional light's shadow map.
    pub receive_shadow: bool,
}

/// A transform node with optional mesh attachments.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Optional node name (from the asset).
    pub name: Option<String>,
    /// Local transform.
    pub transform: Transform,
    /// Meshes drawn with this node's world transform.
    pub meshes: Vec<MeshId>,
    /// Child nodes.
    pub children: Vec<NodeId>,
}

/// Asset-side description of a node tree, consumed by
/// [`Scene::insert_subtree`].
#[derive(Debug, Clone, Default)]
pub struct SubtreeNode {
    /// Optional node name.
    pub name: Option<String>,
    /// Local transform.
    pub transform: Transform,
    /// Indices into the subtree's mesh list.
    pub meshes: Vec<usize>,
    /// Indices into the subtree's node list.
    pub children: Vec<usize>,
}

/// Result of attaching a subtree: the new group node plus the scene id of
/// every asset node, in asset order.
#[derive(Debug, Clone)]
pub struct SubtreeHandle {
    /// Group node that parents the subtree's roots.
    pub root: NodeId,
    /// Scene node for each asset node index.
    pub bindings: Vec<NodeId>,
}

/// A mesh to draw this frame together with its world transform.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance {
    /// The mesh.
    pub mesh: MeshId,
    /// Model-to-world matrix.
    pub world: Mat4,
}

/// The scene graph.
pub struct Scene {
    /// Clear color; `None` leaves the surface transparent.
    pub background: Option<[f32; 4]>,
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    lights: Vec<Light>,
    roots: Vec<NodeId>,
    /// Bumped whenever meshes are added; renderers use it to resync GPU
    /// buffers.
    generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Empty scene with a transparent background.
    #[must_use]
    pub fn new() -> Self {
        Self {
            background: None,
            nodes: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            roots: Vec::new(),
            generation: 0,
        }
    }

    /// Structural generation counter.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Add a light.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// All lights in insertion order.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Add a top-level node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = self.push_node(node);
        self.roots.push(id);
        id
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Look up a mesh.
    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.index())
    }

    /// Every mesh with its id, in insertion order.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| (MeshId(i as u32), mesh))
    }

    /// Number of meshes in the arena.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Attach a node tree (with its meshes) under a fresh top-level group
    /// node.
    ///
    /// Child indices that do not resolve are skipped. Every asset node is
    /// created even if it is not reachable from `roots`, so `bindings` is
    /// always as long as `nodes`.
    pub fn insert_subtree(
        &mut self,
        nodes: Vec<SubtreeNode>,
        roots: &[usize],
        meshes: Vec<Mesh>,
    ) -> SubtreeHandle {
        let mesh_base = self.meshes.len() as u32;
        let mesh_count = meshes.len();
        self.meshes.extend(meshes);

        let bindings: Vec<NodeId> = nodes
            .iter()
            .map(|asset| {
                self.push_node(Node {
                    name: asset.name.clone(),
                    transform: asset.transform,
                    meshes: asset
                        .meshes
                        .iter()
                        .filter(|&&m| m < mesh_count)
                        .map(|&m| MeshId(mesh_base + m as u32))
                        .collect(),
                    children: Vec::new(),
                })
            })
            .collect();

        for (asset, &id) in nodes.iter().zip(&bindings) {
            let children: Vec<NodeId> = asset
                .children
                .iter()
                .filter_map(|&c| bindings.get(c).copied())
                .collect();
            if let Some(node) = self.node_mut(id) {
                node.children = children;
            }
        }

        let root = self.add_node(Node {
            name: Some("model".to_owned()),
            children: roots
                .iter()
                .filter_map(|&r| bindings.get(r).copied())
                .collect(),
            ..Node::default()
        });

        self.generation += 1;
        SubtreeHandle { root, bindings }
    }

    /// Visit every mesh reachable from `root` (including `root`'s own).
    pub fn for_each_mesh_mut(
        &mut self,
        root: NodeId,
        mut visit: impl FnMut(&mut Mesh),
    ) {
        let mut mesh_ids = Vec::new();
        self.walk(root, Mat4::IDENTITY, &mut |id, _| mesh_ids.push(id));
        for id in mesh_ids {
            if let Some(mesh) = self.meshes.get_mut(id.index()) {
                visit(mesh);
            }
        }
    }

    /// Every mesh in the scene with its world transform, in depth-first
    /// order.
    pub fn mesh_instances(&self) -> Vec<MeshInstance> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.walk(root, Mat4::IDENTITY, &mut |mesh, world| {
                out.push(MeshInstance { mesh, world });
            });
        }
        out
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn walk(
        &self,
        root: NodeId,
        parent: Mat4,
        visit: &mut impl FnMut(MeshId, Mat4),
    ) {
        // Explicit stack; asset hierarchies can be deep.
        let mut stack = vec![(root, parent)];
        let mut visited = vec![false; self.nodes.len()];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let seen = &mut visited[id.0 as usize];
            if *seen {
                continue;
            }
            *seen = true;
            let world = parent * node.transform.matrix();
            for &mesh in &node.meshes {
                visit(mesh, world);
            }
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Mesh {
        Mesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
            ..Mesh::default()
        }
    }

    fn two_level_subtree() -> (Vec<SubtreeNode>, Vec<Mesh>) {
        let nodes = vec![
            SubtreeNode {
                name: Some("earth".to_owned()),
                transform: Transform {
                    translation: Vec3::new(1.0, 0.0, 0.0),
                    ..Transform::IDENTITY
                },
                meshes: vec![0],
                children: vec![1],
            },
            SubtreeNode {
                name: Some("clouds".to_owned()),
                transform: Transform {
                    translation: Vec3::new(0.0, 2.0, 0.0),
                    ..Transform::IDENTITY
                },
                meshes: vec![1],
                children: vec![],
            },
        ];
        (nodes, vec![triangle(), triangle()])
    }

    #[test]
    fn insert_subtree_binds_every_asset_node() {
        let mut scene = Scene::new();
        let (nodes, meshes) = two_level_subtree();
        let handle = scene.insert_subtree(nodes, &[0], meshes);

        assert_eq!(handle.bindings.len(), 2);
        assert_eq!(scene.roots(), &[handle.root]);
        assert_eq!(scene.mesh_count(), 2);
        assert_eq!(scene.generation(), 1);
        let root = scene.node(handle.root).unwrap();
        assert_eq!(root.children, vec![handle.bindings[0]]);
        assert_eq!(
            scene.node(handle.bindings[1]).unwrap().name.as_deref(),
            Some("clouds")
        );
    }

    #[test]
    fn world_transforms_compose_down_the_tree() {
        let mut scene = Scene::new();
        let (nodes, meshes) = two_level_subtree();
        let handle = scene.insert_subtree(nodes, &[0], meshes);
        scene
            .node_mut(handle.root)
            .unwrap()
            .transform
            .set_uniform_scale(0.5);

        let instances = scene.mesh_instances();
        assert_eq!(instances.len(), 2);
        let child_origin = instances[1].world.transform_point3(Vec3::ZERO);
        // (1,0,0) + (0,2,0), then halved by the group scale
        assert!((child_origin - Vec3::new(0.5, 1.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn mesh_visitor_reaches_nested_meshes() {
        let mut scene = Scene::new();
        let (nodes, meshes) = two_level_subtree();
        let handle = scene.insert_subtree(nodes, &[0], meshes);
        let mut visited = 0;
        scene.for_each_mesh_mut(handle.root, |mesh| {
            mesh.cast_shadow = true;
            visited += 1;
        });
        assert_eq!(visited, 2);
        assert!(scene.mesh(MeshId(1)).unwrap().cast_shadow);
    }

    #[test]
    fn dangling_indices_are_skipped() {
        let mut scene = Scene::new();
        let nodes = vec![SubtreeNode {
            meshes: vec![0, 7],
            children: vec![3],
            ..SubtreeNode::default()
        }];
        let handle = scene.insert_subtree(nodes, &[0, 9], vec![triangle()]);
        let node = scene.node(handle.bindings[0]).unwrap();
        assert_eq!(node.meshes.len(), 1);
        assert!(node.children.is_empty());
        assert_eq!(scene.node(handle.root).unwrap().children.len(), 1);
    }

    #[test]
    fn cyclic_children_do_not_loop() {
        let mut scene = Scene::new();
        let nodes = vec![
            SubtreeNode {
                meshes: vec![0],
                children: vec![1],
                ..SubtreeNode::default()
            },
            SubtreeNode {
                children: vec![0],
                ..SubtreeNode::default()
            },
        ];
        let _ = scene.insert_subtree(nodes, &[0], vec![triangle()]);
        assert_eq!(scene.mesh_instances().len(), 1);
    }
}
