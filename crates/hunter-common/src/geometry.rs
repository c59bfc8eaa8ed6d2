//! Geometry types: points, planar helpers, and axis-aligned boxes.
//!
//! The walkable surface is treated as lying in the XZ plane with Y up.
//! Distances used for sight and hearing are full 3D distances; random
//! sampling around a point happens in the plane.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// A position in world space.
pub type Point3 = Vec3;

/// Distance between two points ignoring height.
#[must_use]
pub fn planar_distance(a: Point3, b: Point3) -> f32 {
    planar(a).distance(planar(b))
}

/// Projects a point onto the XZ plane.
#[must_use]
pub fn planar(p: Point3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Horizontal unit direction from `from` toward `to`, or zero when they
/// coincide in plan.
#[must_use]
pub fn planar_direction(from: Point3, to: Point3) -> Vec3 {
    let d = to - from;
    Vec3::new(d.x, 0.0, d.z).normalize_or_zero()
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3,
    /// Maximum corner
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns the size of the box along each axis.
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Checks if a point lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: Point3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Checks if a point lies inside the box footprint, ignoring height.
    #[must_use]
    pub fn contains_planar(&self, p: Point3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.z >= self.min.z && p.z <= self.max.z
    }

    /// Returns the box expanded by a margin on all sides.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Clamps a point into the box.
    #[must_use]
    pub fn clamp_point(&self, p: Point3) -> Point3 {
        p.clamp(self.min, self.max)
    }

    /// Distance along a ray to the first contact with the box.
    ///
    /// `direction` does not need to be normalized; the returned value is in
    /// units of `direction`. Returns `None` when the ray misses or the hit
    /// lies beyond `max_distance`. A ray starting inside the box hits at 0.
    #[must_use]
    pub fn ray_intersection(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                // Parallel to the slab
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }

    /// Checks whether the straight segment `a -> b` touches the box.
    #[must_use]
    pub fn intersects_segment(&self, a: Point3, b: Point3) -> bool {
        self.ray_intersection(a, b - a, 1.0).is_some()
    }
}
