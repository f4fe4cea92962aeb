use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::constants::render::DEPTH_FORMAT;
use crate::error::{TerrainError, TerrainResult};
use crate::gpu::{GpuContext, GpuTexture};
use crate::heightfield::HeightFieldStore;
use crate::mesh::{PositionVertex, TerrainMesh, TexCoordVertex};
use crate::transform::TerrainTransform;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub height_scale: f32,
    _padding: [f32; 3], // Padding to ensure 16-byte alignment
}

impl TerrainUniform {
    pub fn new(view_proj: Mat4, model: Mat4, height_scale: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            height_scale,
            _padding: [0.0; 3],
        }
    }
}

/// Line rasterization when wireframe is asked for and the device allows it
pub fn terrain_polygon_mode(wireframe: bool, line_supported: bool) -> wgpu::PolygonMode {
    if wireframe && line_supported {
        wgpu::PolygonMode::Line
    } else {
        wgpu::PolygonMode::Fill
    }
}

/// Draws the displaced terrain grid with its diffuse texture.
///
/// The height scale comes from the bound `HeightFieldStore`, the same value
/// its `sample_height` multiplies by.
pub struct TerrainRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    textures_layout: wgpu::BindGroupLayout,
    textures_bind_group: Option<wgpu::BindGroup>,
    fallback_diffuse: GpuTexture,
    model: Mat4,
    height_scale: f32,
}

impl TerrainRenderer {
    pub fn new(
        ctx: &GpuContext,
        color_format: wgpu::TextureFormat,
        transform: &TerrainTransform,
        wireframe: bool,
    ) -> Self {
        let device = &ctx.device;
        let filterable = ctx.float32_filterable();

        if wireframe && !ctx.polygon_mode_line() {
            log::warn!("[TerrainRenderer::new] Wireframe requested but POLYGON_MODE_LINE is unavailable, drawing filled");
        }
        let polygon_mode = terrain_polygon_mode(wireframe, ctx.polygon_mode_line());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Terrain Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/terrain.wgsl").into()),
        });

        let model = transform.model_matrix();
        let uniform = TerrainUniform::new(Mat4::IDENTITY, model, 0.0);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("terrain_uniform_bind_group_layout"),
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("terrain_uniform_bind_group"),
        });

        let elevation_sampler_type = if filterable {
            wgpu::SamplerBindingType::Filtering
        } else {
            wgpu::SamplerBindingType::NonFiltering
        };

        let textures_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                // Elevation
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Sampler(elevation_sampler_type),
                    count: None,
                },
                // Diffuse
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
            label: Some("terrain_textures_bind_group_layout"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Terrain Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &textures_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Terrain Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[PositionVertex::desc(), TexCoordVertex::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                // Grid triangles wind counter-clockwise seen from above
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let fallback_diffuse = GpuTexture::solid_color(ctx, [255, 255, 255, 255]);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            textures_layout,
            textures_bind_group: None,
            fallback_diffuse,
            model,
            height_scale: 0.0,
        }
    }

    /// Bind the store's textures and adopt its height scale.
    ///
    /// Requires a GPU-backed store with elevation loaded; a missing diffuse
    /// map falls back to plain white.
    pub fn bind_height_field(&mut self, ctx: &GpuContext, store: &HeightFieldStore) -> TerrainResult<()> {
        let elevation = store
            .elevation_texture()
            .ok_or(TerrainError::ElevationNotLoaded)?;
        let diffuse = store.diffuse_texture().unwrap_or(&self.fallback_diffuse);

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.textures_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&elevation.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&elevation.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
            label: Some("terrain_textures_bind_group"),
        });

        self.textures_bind_group = Some(bind_group);
        self.height_scale = store.height_scale();
        log::debug!(
            "[TerrainRenderer::bind_height_field] Bound elevation {}x{}, height scale {}",
            elevation.width,
            elevation.height,
            self.height_scale
        );
        Ok(())
    }

    /// Upload the camera for the next draw
    pub fn prepare(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniform = TerrainUniform::new(view_proj, self.model, self.height_scale);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
    }

    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a TerrainMesh,
    ) -> TerrainResult<()> {
        let textures = self
            .textures_bind_group
            .as_ref()
            .ok_or(TerrainError::ElevationNotLoaded)?;

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_bind_group(1, textures, &[]);
        mesh.draw(render_pass);
        Ok(())
    }

    pub fn height_scale(&self) -> f32 {
        self.height_scale
    }
}
