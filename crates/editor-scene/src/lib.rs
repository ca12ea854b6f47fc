pub mod camera;
pub mod editor;
pub mod gizmo;
pub mod marquee;
pub mod mesh;
pub mod picking;
pub mod select;

pub use camera::{Camera, CameraUniform};
pub use editor::Editor;
pub use gizmo::{GizmoAxis, TranslateGizmo};
pub use marquee::ScreenRect;
pub use mesh::{LineVertex, MARKER_RADIUS, Mesh, Vertex};
pub use picking::Ray;
pub use select::SelectionEngine;

// Re-export glam types for consistent version usage
pub use glam;
