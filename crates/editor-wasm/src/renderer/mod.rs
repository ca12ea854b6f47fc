//! Rendererモジュール
//!
//! WebGPUを使用したレンダリング機能を提供

mod depth;
mod gpu_context;
mod line_pipeline;
mod marker_pipeline;

pub use gpu_context::GpuContext;
pub use line_pipeline::LineUniform;
pub use marker_pipeline::MarkerUniform;

use wasm_bindgen::prelude::*;
use wgpu::util::DeviceExt;
use web_sys::HtmlCanvasElement;

use crate::utils::console_log;

use editor_scene::glam::{Mat4, Vec3};
use editor_scene::mesh::{
    BOUNDS_COLOR, MARKER_COLOR, MARKER_COLOR_SELECTED, aabb_edges, gizmo_axis_lines,
};
use editor_scene::{Editor, LineVertex};

use line_pipeline::LinePipeline;
use marker_pipeline::MarkerPipeline;

/// 背景色
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.1,
    g: 0.2,
    b: 0.3,
    a: 1.0,
};

/// Renderer構造体
pub struct Renderer {
    ctx: GpuContext,
    markers: MarkerPipeline,
    lines: LinePipeline,

    // Depth buffer
    #[allow(dead_code)]
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

impl Renderer {
    /// 新しいRendererを作成（非同期）
    pub async fn create(canvas: HtmlCanvasElement) -> Result<Renderer, JsValue> {
        let ctx = GpuContext::new(canvas).await?;

        // 初期カメラUniformは単位行列（毎フレーム上書きされる）
        let camera_uniform = editor_scene::CameraUniform::default();
        let markers = MarkerPipeline::new(&ctx, bytemuck::bytes_of(&camera_uniform));

        let lines = LinePipeline::new(&ctx);

        // Depth Texture 作成
        let (depth_texture, depth_view) =
            depth::create_texture(&ctx.device, ctx.width(), ctx.height());

        console_log!("Renderer initialized successfully");

        Ok(Self {
            ctx,
            markers,
            lines,
            depth_texture,
            depth_view,
        })
    }

    /// Canvas サイズ変更
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.resize(width, height);

            // Depth Texture再作成
            let (depth_texture, depth_view) =
                depth::create_texture(&self.ctx.device, width, height);
            self.depth_texture = depth_texture;
            self.depth_view = depth_view;

            console_log!("Resized to {}x{}", width, height);
        }
    }

    /// 現在のサイズ取得
    pub fn width(&self) -> u32 {
        self.ctx.width()
    }

    pub fn height(&self) -> u32 {
        self.ctx.height()
    }

    /// エディタの現在状態を描画（読み取りのみ）
    pub fn render(&self, editor: &Editor) -> Result<(), JsValue> {
        // 先に全マーカーのUniformを収集
        let uniforms: Vec<MarkerUniform> = editor
            .registry()
            .iter()
            .map(|(id, position)| {
                let tint = if editor.is_selected(id) {
                    MARKER_COLOR_SELECTED
                } else {
                    MARKER_COLOR
                };
                MarkerUniform::new(position, tint)
            })
            .collect();

        let output = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("Failed to get surface texture: {:?}", e)))?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Camera uniform更新
        self.ctx.queue.write_buffer(
            &self.markers.camera_buffer,
            0,
            bytemuck::bytes_of(&editor.camera().uniform()),
        );

        // 各マーカーを個別のコマンドで描画
        for (i, uniform) in uniforms.iter().enumerate() {
            // Marker uniform更新
            self.ctx
                .queue
                .write_buffer(&self.markers.marker_buffer, 0, bytemuck::bytes_of(uniform));

            let mut encoder =
                self.ctx
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some(&format!("Marker Encoder {}", i)),
                    });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(&format!("Marker Pass {}", i)),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            // 最初のパスのみClear、それ以降はLoad
                            load: if i == 0 {
                                wgpu::LoadOp::Clear(CLEAR_COLOR)
                            } else {
                                wgpu::LoadOp::Load
                            },
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: if i == 0 {
                                wgpu::LoadOp::Clear(1.0)
                            } else {
                                wgpu::LoadOp::Load
                            },
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                render_pass.set_pipeline(&self.markers.pipeline);
                render_pass.set_bind_group(0, &self.markers.camera_bind_group, &[]);
                render_pass.set_bind_group(1, &self.markers.marker_bind_group, &[]);
                render_pass.set_vertex_buffer(0, self.markers.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(self.markers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.markers.num_indices, 0, 0..1);
            }

            // 各コマンドを個別にsubmitしてバッファ更新を反映
            self.ctx.queue.submit(std::iter::once(encoder.finish()));
        }

        // マーカーが0の場合は背景のみ描画
        if uniforms.is_empty() {
            let mut encoder =
                self.ctx
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                        label: Some("Clear Encoder"),
                    });

            {
                let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.depth_view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });
            }

            self.ctx.queue.submit(std::iter::once(encoder.finish()));
        }

        let view_proj = editor.camera().build_view_projection_matrix();

        // 包囲ボックスのワイヤーフレーム
        if let Some(aabb) = editor.current_bounds() {
            let vertices = aabb_edges(&aabb, BOUNDS_COLOR);
            self.render_lines(&view, &vertices, LineUniform::new(view_proj, Mat4::IDENTITY));
        }

        // 移動ウィジェット
        let gizmo = editor.gizmo();
        if gizmo.visible {
            let vertices = gizmo_axis_lines(gizmo);
            let scale = gizmo.scale(editor.camera().position);
            let model = Mat4::from_translation(gizmo.position)
                * Mat4::from_scale(Vec3::splat(scale));
            self.render_lines(&view, &vertices, LineUniform::new(view_proj, model));
        }

        output.present();

        Ok(())
    }

    /// ライン列を1パスで描画
    fn render_lines(&self, view: &wgpu::TextureView, vertices: &[LineVertex], uniform: LineUniform) {
        if vertices.is_empty() {
            return;
        }

        // 一時的な頂点バッファを作成
        let vertex_buffer = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Line Vertex Buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.ctx
            .queue
            .write_buffer(&self.lines.uniform_buffer, 0, bytemuck::bytes_of(&uniform));

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Line Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Line Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load, // 既存の描画を保持
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None, // 深度テストなし
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.lines.pipeline);
            render_pass.set_bind_group(0, &self.lines.bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
            render_pass.draw(0..vertices.len() as u32, 0..1);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}
