//! Screen-space rectangle selection
//!
//! The rectangle is normalized on construction so left <= right and
//! top <= bottom regardless of drag direction; containment is inclusive
//! at all four edges.

use glam::Vec2;

use editor_core::{PointId, PointRegistry};

use crate::camera::Camera;

/// Normalized screen-space rectangle (pixel coordinates, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ScreenRect {
    /// Build from two opposite corners in any order
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Inclusive containment test
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right
            && point.y >= self.top
            && point.y <= self.bottom
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Collect all markers whose screen projection falls inside `rect`,
/// inclusive at the edges. Results follow registry iteration order.
/// Markers behind the near plane never project and are never contained.
pub fn points_in_rect(
    rect: &ScreenRect,
    camera: &Camera,
    width: f32,
    height: f32,
    registry: &PointRegistry,
) -> Vec<PointId> {
    registry
        .iter()
        .filter_map(|(id, position)| {
            let screen = camera.world_to_screen(position, width, height)?;
            rect.contains(screen).then_some(id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_from_corners_normalizes_any_direction() {
        let expected = ScreenRect {
            left: 50.0,
            top: 100.0,
            right: 100.0,
            bottom: 150.0,
        };

        // Dragged left and down
        let rect = ScreenRect::from_corners(Vec2::new(100.0, 100.0), Vec2::new(50.0, 150.0));
        assert_eq!(rect, expected);

        // Dragged right and up
        let rect = ScreenRect::from_corners(Vec2::new(50.0, 150.0), Vec2::new(100.0, 100.0));
        assert_eq!(rect, expected);
    }

    #[test]
    fn test_contains_is_inclusive_at_edges() {
        let rect = ScreenRect::from_corners(Vec2::ZERO, Vec2::new(100.0, 100.0));

        assert!(rect.contains(Vec2::new(50.0, 50.0)));
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(100.0, 100.0)));
        assert!(rect.contains(Vec2::new(100.0, 0.0)));
        assert!(!rect.contains(Vec2::new(-1.0, 50.0)));
        assert!(!rect.contains(Vec2::new(101.0, 50.0)));
    }

    #[test]
    fn test_width_and_height() {
        let rect = ScreenRect::from_corners(Vec2::new(10.0, 20.0), Vec2::new(40.0, 80.0));
        assert_eq!(rect.width(), 30.0);
        assert_eq!(rect.height(), 60.0);
    }

    #[test]
    fn test_points_in_rect_follows_registry_order() {
        let camera = Camera::new(1.0);
        let mut reg = PointRegistry::new();
        // Both near the view center, plus one far off to the side
        let a = reg.add(Vec3::new(0.1, 0.1, 0.0));
        let off = reg.add(Vec3::new(50.0, 0.0, 0.0));
        let b = reg.add(Vec3::new(-0.1, -0.1, 0.0));

        let rect = ScreenRect::from_corners(Vec2::ZERO, Vec2::new(800.0, 600.0));
        let contained = points_in_rect(&rect, &camera, 800.0, 600.0, &reg);

        assert_eq!(contained, vec![a, b]);
        assert!(!contained.contains(&off));
    }

    #[test]
    fn test_points_behind_camera_are_excluded() {
        let camera = Camera::new(1.0);
        let forward = (camera.target - camera.position).normalize();
        let behind = camera.position - forward * 3.0;

        let mut reg = PointRegistry::new();
        reg.add(behind);

        let rect = ScreenRect::from_corners(Vec2::ZERO, Vec2::new(800.0, 600.0));
        assert!(points_in_rect(&rect, &camera, 800.0, 600.0, &reg).is_empty());
    }

    #[test]
    fn test_point_on_rect_edge_is_contained() {
        let camera = Camera::new(1.0);
        let mut reg = PointRegistry::new();
        let id = reg.add(camera.target);

        // Target projects to the exact screen center; make that the rect edge
        let center = camera
            .world_to_screen(camera.target, 800.0, 600.0)
            .unwrap();
        let rect = ScreenRect::from_corners(center, center + Vec2::new(50.0, 50.0));

        assert_eq!(points_in_rect(&rect, &camera, 800.0, 600.0, &reg), vec![id]);
    }
}
