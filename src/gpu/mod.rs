//! GPU resource management and the wgpu renderer.
//!
//! Provides wgpu device/surface initialization, growable buffers, shader
//! composition, the shadow and composite passes, and [`GlobeRenderer`],
//! the [`RenderSurface`](crate::renderer::RenderSurface) the viewer uses.

/// HDR resolve onto the swapchain.
pub mod composite;
/// Growable GPU buffers and per-draw uniform packing.
pub mod dynamic_buffer;
/// The wgpu render surface.
pub mod globe_renderer;
/// Vertex layout and uploaded scene meshes.
pub mod mesh_cache;
/// Bind group layout, sampler and pipeline helpers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Key light shadow map.
pub mod shadow;
/// Render-target textures.
pub mod texture;
/// Uniform block layouts.
pub mod uniforms;

pub use globe_renderer::GlobeRenderer;

use crate::scene::MeshId;

/// One mesh instance to draw this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    /// Mesh to draw.
    pub mesh: MeshId,
    /// Dynamic offset of its [`uniforms::MeshUniform`] block.
    pub offset: u32,
    /// Included in the shadow pass.
    pub cast_shadow: bool,
}
