//! マーカー描画パイプラインモジュール
//!
//! 球マーカーの描画パイプライン。マーカーごとのモデル行列と色は
//! Uniformで与える

use wgpu::util::DeviceExt;

use glam::{Mat4, Vec3};

use editor_scene::{MARKER_RADIUS, Mesh, Vertex};

use super::depth::DEPTH_FORMAT;
use super::gpu_context::GpuContext;
use crate::shaders;

/// マーカーごとのUniform構造体
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MarkerUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl MarkerUniform {
    /// 指定位置と色で作成
    pub fn new(position: Vec3, tint: [f32; 4]) -> Self {
        Self {
            model: Mat4::from_translation(position).to_cols_array_2d(),
            tint,
        }
    }

    /// 単位行列・白で初期化
    pub fn identity() -> Self {
        Self {
            model: Mat4::IDENTITY.to_cols_array_2d(),
            tint: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// マーカー描画パイプライン
pub struct MarkerPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub marker_buffer: wgpu::Buffer,
    pub marker_bind_group: wgpu::BindGroup,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl MarkerPipeline {
    /// 新しいマーカーパイプラインを作成
    pub fn new(ctx: &GpuContext, camera_uniform: &[u8]) -> Self {
        // Camera Uniform Buffer
        let camera_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: camera_uniform,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        // Camera Bind Group Layout
        let camera_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Camera Bind Group Layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        // Camera Bind Group
        let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        // Marker Uniform Buffer (マーカーごとの行列と色)
        let marker_uniform = MarkerUniform::identity();
        let marker_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Marker Buffer"),
                contents: bytemuck::bytes_of(&marker_uniform),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        // Marker Bind Group Layout
        let marker_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("Marker Bind Group Layout"),
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
                });

        // Marker Bind Group
        let marker_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Marker Bind Group"),
            layout: &marker_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: marker_buffer.as_entire_binding(),
            }],
        });

        // 球メッシュ作成
        let sphere = Mesh::uv_sphere(MARKER_RADIUS, 16, 16);
        let vertex_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Marker Vertex Buffer"),
                contents: bytemuck::cast_slice(&sphere.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Marker Index Buffer"),
                contents: bytemuck::cast_slice(&sphere.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        let num_indices = sphere.index_count() as u32;

        // シェーダーモジュール作成
        let shader = ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("Marker Shader"),
                source: wgpu::ShaderSource::Wgsl(shaders::MARKER_SHADER.into()),
            });

        // Render Pipeline Layout (with bind groups)
        let render_pipeline_layout =
            ctx.device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some("Marker Pipeline Layout"),
                    bind_group_layouts: &[&camera_bind_group_layout, &marker_bind_group_layout],
                    push_constant_ranges: &[],
                });

        // Render Pipeline
        let pipeline = ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Marker Pipeline"),
                layout: Some(&render_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
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
                cache: None,
            });

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            marker_buffer,
            marker_bind_group,
            vertex_buffer,
            index_buffer,
            num_indices,
        }
    }
}
