//! Picking system for ray-based marker selection
//!
//! Markers are picked against a fixed-radius sphere proxy in world space,
//! not a pixel-space hit test.

use glam::Vec3;

use editor_core::{Aabb, PointId, PointRegistry};

/// Ray for raycasting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (should be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Check intersection with a sphere.
    /// Returns the smallest non-negative ray parameter if hit, None otherwise.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_disc = discriminant.sqrt();
        let t_near = -b - sqrt_disc;
        if t_near >= 0.0 {
            return Some(t_near);
        }

        // Origin inside the sphere: the far hit is still in front
        let t_far = -b + sqrt_disc;
        if t_far >= 0.0 {
            return Some(t_far);
        }

        None
    }

    /// Check intersection with an infinite plane.
    /// Returns the ray parameter, which may be negative when the plane is
    /// behind the origin. None when the ray is parallel to the plane.
    pub fn intersect_plane(&self, plane_point: Vec3, plane_normal: Vec3) -> Option<f32> {
        let denom = self.direction.dot(plane_normal);
        if denom.abs() < 1e-6 {
            return None;
        }

        Some((plane_point - self.origin).dot(plane_normal) / denom)
    }

    /// Check intersection with an AABB using the slab method.
    /// Returns the distance to the entry point if hit, None otherwise.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        // Handle division by zero with small epsilon
        let inv_dir = Vec3::new(
            if self.direction.x.abs() > f32::EPSILON {
                1.0 / self.direction.x
            } else {
                f32::MAX
            },
            if self.direction.y.abs() > f32::EPSILON {
                1.0 / self.direction.y
            } else {
                f32::MAX
            },
            if self.direction.z.abs() > f32::EPSILON {
                1.0 / self.direction.z
            } else {
                f32::MAX
            },
        );

        let t1 = (aabb.min - self.origin) * inv_dir;
        let t2 = (aabb.max - self.origin) * inv_dir;

        let tmin_vec = t1.min(t2);
        let tmax_vec = t1.max(t2);

        let tmin = tmin_vec.x.max(tmin_vec.y).max(tmin_vec.z);
        let tmax = tmax_vec.x.min(tmax_vec.y).min(tmax_vec.z);

        if tmax >= tmin && tmax >= 0.0 {
            Some(tmin.max(0.0))
        } else {
            None
        }
    }

    /// Point at parameter `t`
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Pick the marker nearest along the ray, treating each marker as a sphere
/// of `radius`. Returns None when the registry is empty or nothing is hit.
pub fn pick_nearest(ray: &Ray, registry: &PointRegistry, radius: f32) -> Option<PointId> {
    let mut closest: Option<(PointId, f32)> = None;

    for (id, position) in registry.iter() {
        if let Some(t) = ray.intersect_sphere(position, radius) {
            match closest {
                None => closest = Some((id, t)),
                Some((_, prev_t)) if t < prev_t => closest = Some((id, t)),
                _ => {}
            }
        }
    }

    closest.map(|(id, _)| id)
}
