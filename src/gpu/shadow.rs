//! Depth-only shadow map rendered from the key light.

use super::mesh_cache::{MeshCache, Vertex};
use super::pipeline_helpers::uniform_buffer;
use super::texture::RenderTarget;
use super::Draw;

/// Shadow map depth format.
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Shadow map texture plus the pipeline that fills it.
pub struct ShadowPass {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    target: RenderTarget,
}

impl ShadowPass {
    /// Pass with a `size`² map.
    pub fn new(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        lights_buffer: &wgpu::Buffer,
        mesh_layout: &wgpu::BindGroupLayout,
        size: u32,
    ) -> Self {
        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Light Layout"),
                entries: &[uniform_buffer(0, wgpu::ShaderStages::VERTEX)],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Light Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.as_entire_binding(),
            }],
        });
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&layout, mesh_layout],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Shadow Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: None,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: SHADOW_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::LessEqual,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        Self {
            pipeline,
            bind_group,
            target: Self::map(device, size),
        }
    }

    fn map(device: &wgpu::Device, size: u32) -> RenderTarget {
        RenderTarget::new(device, "Shadow Map", (size, size), SHADOW_FORMAT, 1)
    }

    /// Depth view for sampling.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.target.view
    }

    /// Edge length in texels.
    pub fn size(&self) -> u32 {
        self.target.size().0
    }

    /// Recreate the map at `size`². Returns `true` when the view changed.
    pub fn ensure_size(&mut self, device: &wgpu::Device, size: u32) -> bool {
        if self.size() == size.max(1) {
            return false;
        }
        self.target = Self::map(device, size);
        true
    }

    /// Render every shadow caster in `draws`.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        draws: &[Draw],
        meshes: &MeshCache,
        mesh_bind_group: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.target.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        for draw in draws.iter().filter(|d| d.cast_shadow) {
            let Some(mesh) = meshes.get(draw.mesh) else {
                continue;
            };
            pass.set_bind_group(1, mesh_bind_group, &[draw.offset]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}
