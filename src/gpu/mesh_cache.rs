//! GPU copies of scene meshes.
//!
//! Scene meshes are append-only, so the cache only uploads what it has not
//! seen yet, and only when the scene's generation changes.

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::scene::{Mesh, MeshId, Scene};

/// Interleaved position + normal vertex.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Buffer layout matching `orbis::mesh::VertexInput`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave `mesh`'s attributes. Missing normals default to +Y.
pub fn interleave(mesh: &Mesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, &position)| Vertex {
            position,
            normal: mesh.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
        })
        .collect()
}

/// Vertex and index buffers for one mesh.
pub struct GpuMesh {
    /// Interleaved vertices.
    pub vertex_buffer: wgpu::Buffer,
    /// `u32` triangle list.
    pub index_buffer: wgpu::Buffer,
    /// Indices to draw.
    pub index_count: u32,
}

impl GpuMesh {
    /// Upload `mesh`. `None` for meshes with nothing to draw.
    fn upload(device: &wgpu::Device, id: MeshId, mesh: &Mesh) -> Option<Self> {
        if mesh.positions.is_empty() || mesh.indices.is_empty() {
            return None;
        }
        let vertices = interleave(mesh);
        let vertex_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Mesh {} Vertices", id.index())),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Mesh {} Indices", id.index())),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Some(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }
}

/// Uploaded meshes keyed by scene id.
#[derive(Default)]
pub struct MeshCache {
    meshes: FxHashMap<MeshId, GpuMesh>,
    synced_generation: Option<u64>,
    synced_count: usize,
}

impl MeshCache {
    /// Upload any meshes added since the last sync.
    pub fn sync(&mut self, device: &wgpu::Device, scene: &Scene) {
        if self.synced_generation == Some(scene.generation()) {
            return;
        }
        let before = self.meshes.len();
        for (id, mesh) in scene.meshes().skip(self.synced_count) {
            if let Some(gpu) = GpuMesh::upload(device, id, mesh) {
                let _ = self.meshes.insert(id, gpu);
            }
        }
        self.synced_count = scene.mesh_count();
        self.synced_generation = Some(scene.generation());
        log::debug!(
            "Mesh cache synced: {} uploaded, {} total",
            self.meshes.len() - before,
            self.meshes.len()
        );
    }

    /// Buffers for `id`, if uploaded.
    pub fn get(&self, id: MeshId) -> Option<&GpuMesh> {
        self.meshes.get(&id)
    }

    /// Number of uploaded meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Whether nothing is uploaded.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Drop every buffer.
    pub fn clear(&mut self) {
        self.meshes.clear();
        self.synced_generation = None;
        self.synced_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let mesh = Mesh {
            positions: vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            normals: vec![[0.0, 0.0, 1.0]],
            indices: vec![0, 1, 0],
            ..Mesh::default()
        };
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(vertices[1].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[1].offset, 12);
    }
}
