use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::{BufferAddress, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode};

use editor_core::Aabb;

use crate::gizmo::{GizmoAxis, TranslateGizmo};

/// マーカー球の半径（ワールド空間、ピッキング半径と共通）
pub const MARKER_RADIUS: f32 = 0.1;

/// マーカーの色
pub const MARKER_COLOR: [f32; 4] = [1.0, 0.1, 0.1, 1.0];          // 赤
pub const MARKER_COLOR_SELECTED: [f32; 4] = [0.1, 0.1, 1.0, 1.0]; // 青

/// 包囲ボックスのワイヤーフレーム色
pub const BOUNDS_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0]; // 黄

/// 頂点構造体
/// 位置と法線を含む（色はマーカーごとのUniformで与える）
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    /// 新しい頂点を作成
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// 頂点バッファレイアウトを取得
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                // position
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                // normal
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// ライン描画用頂点
/// 位置と色を含む
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub fn new(position: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            color,
        }
    }

    /// 頂点バッファレイアウト
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as BufferAddress,
            step_mode: VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as BufferAddress,
                    shader_location: 1,
                    format: VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// メッシュ構造体
/// 頂点とインデックスを含む
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// 空のメッシュを作成
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// 緯度経度分割の球メッシュを生成（原点中心）
    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for ring in 0..=rings {
            let theta = ring as f32 / rings as f32 * std::f32::consts::PI;
            let (sin_theta, cos_theta) = theta.sin_cos();

            for segment in 0..=segments {
                let phi = segment as f32 / segments as f32 * std::f32::consts::TAU;
                let (sin_phi, cos_phi) = phi.sin_cos();

                let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
                vertices.push(Vertex::new((normal * radius).to_array(), normal.to_array()));
            }
        }

        let stride = segments + 1;
        for ring in 0..rings {
            for segment in 0..segments {
                let a = ring * stride + segment;
                let b = a + stride;

                indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
            }
        }

        Self { vertices, indices }
    }

    /// 頂点数を取得
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// インデックス数を取得
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// 包囲ボックスの12辺をライン頂点列（LineList）として生成
pub fn aabb_edges(aabb: &Aabb, color: [f32; 4]) -> Vec<LineVertex> {
    let (min, max) = (aabb.min, aabb.max);
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];

    // 底面4辺、上面4辺、縦4辺
    const EDGES: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0),
        (4, 5), (5, 6), (6, 7), (7, 4),
        (0, 4), (1, 5), (2, 6), (3, 7),
    ];

    EDGES
        .iter()
        .flat_map(|&(a, b)| [LineVertex::new(corners[a], color), LineVertex::new(corners[b], color)])
        .collect()
}

/// ウィジェットの軸ラインをローカル空間で生成（LineList）
/// シャフト1本と矢先2本を軸ごとに出す
pub fn gizmo_axis_lines(gizmo: &TranslateGizmo) -> Vec<LineVertex> {
    let mut lines = Vec::new();

    for (axis, dir, side) in [
        (GizmoAxis::X, Vec3::X, Vec3::Y),
        (GizmoAxis::Y, Vec3::Y, Vec3::Z),
        (GizmoAxis::Z, Vec3::Z, Vec3::Y),
    ] {
        let color = gizmo.axis_color(axis);
        let tip = dir;
        let head_base = dir * 0.85;
        let spread = side * 0.05;

        lines.push(LineVertex::new(Vec3::ZERO, color));
        lines.push(LineVertex::new(tip, color));

        lines.push(LineVertex::new(head_base + spread, color));
        lines.push(LineVertex::new(tip, color));

        lines.push(LineVertex::new(head_base - spread, color));
        lines.push(LineVertex::new(tip, color));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        // 3 floats * 2 attributes * 4 bytes = 24 bytes
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn test_line_vertex_size() {
        // (3 + 4) floats * 4 bytes = 28 bytes
        assert_eq!(std::mem::size_of::<LineVertex>(), 28);
    }

    #[test]
    fn test_uv_sphere_counts() {
        let sphere = Mesh::uv_sphere(MARKER_RADIUS, 16, 16);
        assert_eq!(sphere.vertex_count(), 17 * 17);
        assert_eq!(sphere.index_count(), 16 * 16 * 6);
    }

    #[test]
    fn test_uv_sphere_vertices_on_radius() {
        let sphere = Mesh::uv_sphere(2.0, 8, 8);
        for vertex in &sphere.vertices {
            let length = Vec3::from_array(vertex.position).length();
            assert!((length - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_aabb_edges_count() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let lines = aabb_edges(&aabb, BOUNDS_COLOR);
        // 12 edges * 2 vertices
        assert_eq!(lines.len(), 24);
    }

    #[test]
    fn test_gizmo_axis_lines_count() {
        let mut gizmo = TranslateGizmo::default();
        gizmo.attach(Vec3::ZERO);
        // 3 axes * 3 lines * 2 vertices
        assert_eq!(gizmo_axis_lines(&gizmo).len(), 18);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new();
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.index_count(), 0);
    }
}
