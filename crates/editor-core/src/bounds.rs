//! Minimum enclosing axis-aligned bounding box over the marker registry.
//!
//! The box is recomputed with a full fold after every structural change and
//! after position changes. A cached extreme can reference a removed marker,
//! so deletion never takes an incremental path.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::registry::PointRegistry;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a degenerate AABB enclosing a single point
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Compute the enclosing AABB of an iterator of points.
    /// Returns None for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self::from_point(first);
        for point in iter {
            aabb.extend(point);
        }
        Some(aabb)
    }

    /// Grow the box to enclose `point`
    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Check if a point is inside the AABB (inclusive bounds)
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent per axis
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Maintains the current enclosing box of a registry.
/// `None` means the registry is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundsTracker {
    current: Option<Aabb>,
}

impl BoundsTracker {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Full O(n) fold over all live markers. Safe on an empty registry.
    pub fn recompute(&mut self, registry: &PointRegistry) -> Option<Aabb> {
        self.current = Aabb::from_points(registry.iter().map(|(_, position)| position));
        self.current
    }

    /// The box computed by the last `recompute`
    pub fn current(&self) -> Option<Aabb> {
        self.current
    }
}
