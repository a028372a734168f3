//! The wgpu [`RenderSurface`].
//!
//! Three passes per frame: a depth-only shadow map from the key light, an
//! MSAA HDR geometry pass at the clamped device pixel ratio, and a
//! composite pass that applies exposure, tone mapping and sRGB encoding
//! onto the swapchain with premultiplied alpha.

use wgpu::util::DeviceExt;

use super::composite::CompositePass;
use super::dynamic_buffer::DrawUniforms;
use super::mesh_cache::{MeshCache, Vertex};
use super::pipeline_helpers::{
    comparison_sampler, depth_texture_2d, dynamic_uniform_buffer,
    shadow_sampler, uniform_buffer,
};
use super::render_context::RenderContext;
use super::shader_composer::{Shader, ShaderComposer};
use super::shadow::ShadowPass;
use super::texture::RenderTarget;
use super::uniforms::{LightUniform, MeshUniform};
use super::Draw;
use crate::camera::{Camera, CameraUniform};
use crate::container::SurfaceId;
use crate::error::GlobeError;
use crate::renderer::{RenderSurface, RendererConfig};
use crate::scene::Scene;
use crate::viewport::ViewportDimensions;

/// Geometry pass color format.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Geometry pass depth format.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Map size used until the scene provides a shadowed light.
const FALLBACK_SHADOW_SIZE: u32 = 1;

/// Size-dependent attachments of the geometry pass.
struct Targets {
    /// Multisampled color, absent without antialiasing.
    msaa: Option<RenderTarget>,
    /// Single-sampled HDR color read by the composite pass.
    hdr: RenderTarget,
    depth: RenderTarget,
}

impl Targets {
    fn new(device: &wgpu::Device, size: (u32, u32), samples: u32) -> Self {
        Self {
            msaa: (samples > 1).then(|| {
                RenderTarget::new(device, "HDR MSAA", size, HDR_FORMAT, samples)
            }),
            hdr: RenderTarget::new(device, "HDR Color", size, HDR_FORMAT, 1),
            depth: RenderTarget::new(device, "Depth", size, DEPTH_FORMAT, samples),
        }
    }
}

/// Everything that lives on the device. Dropped on dispose.
struct Gpu {
    context: RenderContext,
    camera_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    frame_layout: wgpu::BindGroupLayout,
    frame_bind_group: wgpu::BindGroup,
    shadow_sampler: wgpu::Sampler,
    mesh_layout: wgpu::BindGroupLayout,
    mesh_bind_group: wgpu::BindGroup,
    draw_uniforms: DrawUniforms<MeshUniform>,
    mesh_pipeline: wgpu::RenderPipeline,
    shadow: ShadowPass,
    composite: CompositePass,
    targets: Targets,
    meshes: MeshCache,
}

impl Gpu {
    fn new(
        context: RenderContext,
        config: &RendererConfig,
    ) -> Result<Self, GlobeError> {
        let device = &context.device;
        let mut composer = ShaderComposer::new()?;
        let mesh_shader = composer.compose(device, Shader::Mesh)?;
        let shadow_shader = composer.compose(device, Shader::Shadow)?;
        let composite_shader = composer.compose(device, Shader::Composite)?;

        let camera_buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform"),
                contents: bytemuck::bytes_of(&CameraUniform::new()),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Light Uniform"),
            size: size_of::<LightUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let draw_uniforms = DrawUniforms::new(device, "Mesh Uniforms", 16);
        let mesh_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Layout"),
                entries: &[dynamic_uniform_buffer(
                    0,
                    draw_uniforms.binding_size(),
                )],
            });
        let mesh_bind_group =
            Self::bind_draw_uniforms(device, &mesh_layout, &draw_uniforms);

        let frame_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Frame Layout"),
                entries: &[
                    uniform_buffer(0, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    uniform_buffer(1, wgpu::ShaderStages::VERTEX_FRAGMENT),
                    depth_texture_2d(2),
                    comparison_sampler(3),
                ],
            });
        let shadow = ShadowPass::new(
            device,
            &shadow_shader,
            &lights_buffer,
            &mesh_layout,
            FALLBACK_SHADOW_SIZE,
        );
        let shadow_sampler = shadow_sampler(device, "Shadow Sampler");
        let frame_bind_group = Self::bind_frame(
            device,
            &frame_layout,
            &camera_buffer,
            &lights_buffer,
            shadow.view(),
            &shadow_sampler,
        );

        let mesh_pipeline = Self::mesh_pipeline(
            device,
            &mesh_shader,
            &[&frame_layout, &mesh_layout],
            config.sample_count(),
        );
        let targets =
            Targets::new(device, context.size(), config.sample_count());
        let composite = CompositePass::new(
            device,
            &composite_shader,
            context.format(),
            &targets.hdr.view,
            config,
        );

        Ok(Self {
            context,
            camera_buffer,
            lights_buffer,
            frame_layout,
            frame_bind_group,
            shadow_sampler,
            mesh_layout,
            mesh_bind_group,
            draw_uniforms,
            mesh_pipeline,
            shadow,
            composite,
            targets,
            meshes: MeshCache::default(),
        })
    }

    fn mesh_pipeline(
        device: &wgpu::Device,
        shader: &wgpu::ShaderModule,
        layouts: &[&wgpu::BindGroupLayout],
        samples: u32,
    ) -> wgpu::RenderPipeline {
        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Mesh Pipeline Layout"),
                bind_group_layouts: layouts,
                push_constant_ranges: &[],
            });
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: samples,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        })
    }

    fn bind_frame(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        camera: &wgpu::Buffer,
        lights: &wgpu::Buffer,
        shadow_view: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lights.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn bind_draw_uniforms(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniforms: &DrawUniforms<MeshUniform>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: uniforms.buffer(),
                    offset: 0,
                    size: Some(uniforms.binding_size()),
                }),
            }],
        })
    }

    fn resize(&mut self, physical: (u32, u32), samples: u32) {
        self.context.resize(physical.0, physical.1);
        self.targets =
            Targets::new(&self.context.device, self.context.size(), samples);
        self.composite
            .rebind(&self.context.device, &self.targets.hdr.view);
    }

    /// Upload per-frame data and collect draws.
    fn prepare(
        &mut self,
        scene: &Scene,
        camera: &Camera,
        config: &RendererConfig,
    ) -> Vec<Draw> {
        let device = &self.context.device;
        self.meshes.sync(device, scene);

        let mut blocks = Vec::new();
        let mut draws = Vec::new();
        for instance in scene.mesh_instances() {
            let Some(mesh) = scene.mesh(instance.mesh) else {
                continue;
            };
            if self.meshes.get(instance.mesh).is_none() {
                continue;
            }
            draws.push(Draw {
                mesh: instance.mesh,
                offset: self.draw_uniforms.offset(blocks.len()),
                cast_shadow: mesh.cast_shadow,
            });
            blocks.push(MeshUniform::new(instance.world, mesh));
        }
        if self.draw_uniforms.write(device, &self.context.queue, &blocks) {
            self.mesh_bind_group = Self::bind_draw_uniforms(
                device,
                &self.mesh_layout,
                &self.draw_uniforms,
            );
        }

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera);
        self.context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&camera_uniform),
        );

        let lights = LightUniform::from_scene(scene, config);
        self.context.queue.write_buffer(
            &self.lights_buffer,
            0,
            bytemuck::bytes_of(&lights),
        );

        let map_size = scene
            .directional_light()
            .and_then(|light| light.shadow)
            .map_or(FALLBACK_SHADOW_SIZE, |shadow| shadow.map_size);
        if self.shadow.ensure_size(device, map_size) {
            self.frame_bind_group = Self::bind_frame(
                device,
                &self.frame_layout,
                &self.camera_buffer,
                &self.lights_buffer,
                self.shadow.view(),
                &self.shadow_sampler,
            );
        }
        draws
    }

    fn record_geometry(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        draws: &[Draw],
        background: Option<[f32; 4]>,
    ) {
        let clear = background.map_or(wgpu::Color::TRANSPARENT, |[r, g, b, a]| {
            wgpu::Color {
                r: f64::from(r * a),
                g: f64::from(g * a),
                b: f64::from(b * a),
                a: f64::from(a),
            }
        });
        let (view, resolve_target) = match &self.targets.msaa {
            Some(msaa) => (&msaa.view, Some(&self.targets.hdr.view)),
            None => (&self.targets.hdr.view, None),
        };
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(
                wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                },
            ),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.mesh_pipeline);
        pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for draw in draws {
            let Some(mesh) = self.meshes.get(draw.mesh) else {
                continue;
            };
            pass.set_bind_group(1, &self.mesh_bind_group, &[draw.offset]);
            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(
                mesh.index_buffer.slice(..),
                wgpu::IndexFormat::Uint32,
            );
            pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }
}

/// wgpu-backed globe surface.
pub struct GlobeRenderer {
    id: SurfaceId,
    config: RendererConfig,
    logical: (u32, u32),
    pixel_ratio: f32,
    gpu: Option<Gpu>,
}

impl GlobeRenderer {
    /// Create a renderer presenting to `target`, sized for `dims`.
    ///
    /// # Errors
    ///
    /// [`GlobeError::Gpu`] if the device or surface cannot be set up,
    /// [`GlobeError::Shader`] if a shader fails to compose.
    pub async fn new(
        id: SurfaceId,
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        dims: &ViewportDimensions,
        config: &RendererConfig,
    ) -> Result<Self, GlobeError> {
        let physical = dims.physical_size(config.max_pixel_ratio);
        let context = RenderContext::new(target, physical, config.alpha).await?;
        let gpu = Gpu::new(context, config)?;
        Ok(Self {
            id,
            config: *config,
            logical: (dims.width, dims.height),
            pixel_ratio: dims.clamped_pixel_ratio(config.max_pixel_ratio),
            gpu: Some(gpu),
        })
    }

    /// Physical size of the swapchain, `None` once disposed.
    pub fn physical_size(&self) -> Option<(u32, u32)> {
        self.gpu.as_ref().map(|gpu| gpu.context.size())
    }
}

impl RenderSurface for GlobeRenderer {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> (u32, u32) {
        self.logical
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    fn resize(&mut self, dims: &ViewportDimensions) {
        self.logical = (dims.width, dims.height);
        self.pixel_ratio = dims.clamped_pixel_ratio(self.config.max_pixel_ratio);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(
                dims.physical_size(self.config.max_pixel_ratio),
                self.config.sample_count(),
            );
        }
    }

    fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera,
    ) -> Result<(), GlobeError> {
        let config = self.config;
        let Some(gpu) = &mut self.gpu else {
            return Err(GlobeError::Render("renderer is disposed".to_owned()));
        };

        let draws = gpu.prepare(scene, camera, &config);
        let frame = match gpu.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(GlobeError::Render(e.to_string())),
        };
        let output = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu.context.create_encoder();
        let shadows_on = config.shadows
            && scene
                .directional_light()
                .is_some_and(|light| light.shadow.is_some());
        if shadows_on {
            gpu.shadow.record(
                &mut encoder,
                &draws,
                &gpu.meshes,
                &gpu.mesh_bind_group,
            );
        }
        gpu.record_geometry(&mut encoder, &draws, scene.background);
        gpu.composite.record(&mut encoder, &output);
        gpu.context.submit(encoder);
        frame.present();
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(mut gpu) = self.gpu.take() {
            gpu.meshes.clear();
            log::debug!("Renderer {:?} disposed", self.id);
        }
    }

    fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }
}
