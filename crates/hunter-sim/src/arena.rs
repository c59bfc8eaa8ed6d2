//! Box arena: the walkable floor, its obstacles, and a straight-line
//! navigation agent that slides along walls.

use crate::config::ArenaConfig;
use glam::Vec3;
use hunter_ai::{
    NavProgress, NavigationService, PathStatus, RayHit, SpatialQuery, WalkableSurface,
};
use hunter_common::{planar_distance, Aabb, LayerMask, Point3};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Rings tried when projecting a point onto the floor.
const PROJECTION_RINGS: u32 = 4;
/// Directions tried on each ring.
const PROJECTION_DIRECTIONS: u32 = 8;

/// Floor rectangle with box obstacles.
#[derive(Debug, Clone)]
pub struct Arena {
    bounds: Aabb,
    obstacles: Vec<Aabb>,
    grid_step: f32,
    agent_radius: f32,
}

impl Arena {
    /// Builds an arena from its configuration.
    #[must_use]
    pub fn from_config(config: &ArenaConfig) -> Self {
        let bounds = Aabb::new(
            Vec3::new(config.min[0], 0.0, config.min[1]),
            Vec3::new(config.max[0], 0.0, config.max[1]),
        );
        let obstacles = config
            .obstacles
            .iter()
            .map(|o| {
                Aabb::new(
                    Vec3::new(o.min[0], 0.0, o.min[1]),
                    Vec3::new(o.max[0], o.height, o.max[1]),
                )
            })
            .collect();
        Self {
            bounds,
            obstacles,
            grid_step: config.grid_step,
            agent_radius: config.agent_radius,
        }
    }

    /// Collision radius of agents.
    #[must_use]
    pub fn agent_radius(&self) -> f32 {
        self.agent_radius
    }

    /// Checks whether an agent can stand at `p`.
    #[must_use]
    pub fn is_walkable(&self, p: Point3) -> bool {
        self.bounds.contains_planar(p)
            && !self
                .obstacles
                .iter()
                .any(|o| o.expanded(self.agent_radius).contains_planar(p))
    }

    /// Checks whether the straight segment between two floor points
    /// avoids every obstacle.
    #[must_use]
    pub fn segment_clear(&self, a: Point3, b: Point3) -> bool {
        !self.obstacles.iter().any(|o| o.intersects_segment(a, b))
    }

    /// Moves from `from` toward `to`, sliding along blocked axes.
    #[must_use]
    pub fn slide(&self, from: Point3, to: Point3) -> Point3 {
        if self.is_walkable(to) {
            return to;
        }
        let along_x = Vec3::new(to.x, from.y, from.z);
        if self.is_walkable(along_x) {
            return along_x;
        }
        let along_z = Vec3::new(from.x, from.y, to.z);
        if self.is_walkable(along_z) {
            return along_z;
        }
        from
    }
}

impl WalkableSurface for Arena {
    fn sample_position(&self, approx: Point3, max_radius: f32) -> Option<Point3> {
        let floor = Vec3::new(approx.x, 0.0, approx.z);
        if self.is_walkable(floor) {
            return Some(floor);
        }

        let clamped = self.bounds.clamp_point(floor);
        if self.is_walkable(clamped) && planar_distance(clamped, floor) <= max_radius {
            return Some(clamped);
        }

        for ring in 1..=PROJECTION_RINGS {
            let radius = max_radius * ring as f32 / PROJECTION_RINGS as f32;
            for k in 0..PROJECTION_DIRECTIONS {
                let angle = TAU * k as f32 / PROJECTION_DIRECTIONS as f32;
                let candidate = floor + Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
                if self.is_walkable(candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn triangulation_vertices(&self) -> Vec<Point3> {
        let size = self.bounds.size();
        let cols = (size.x / self.grid_step).floor() as u32;
        let rows = (size.z / self.grid_step).floor() as u32;

        let mut vertices = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
        for row in 0..=rows {
            for col in 0..=cols {
                vertices.push(Vec3::new(
                    self.bounds.min.x + col as f32 * self.grid_step,
                    0.0,
                    self.bounds.min.z + row as f32 * self.grid_step,
                ));
            }
        }
        vertices
    }
}

impl SpatialQuery for Arena {
    fn raycast(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if !mask.intersects(LayerMask::OBSTACLE) {
            return None;
        }
        self.obstacles
            .iter()
            .filter_map(|o| o.ray_intersection(origin, direction, max_distance))
            .min_by(f32::total_cmp)
            .map(|distance| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }
}

/// Navigation agent that walks straight at its destination.
#[derive(Debug, Clone)]
pub struct ArenaNav {
    arena: Arc<Arena>,
    position: Point3,
    destination: Option<Point3>,
    speed: f32,
    pending: bool,
}

impl ArenaNav {
    /// Places an agent at `position`.
    #[must_use]
    pub fn new(arena: Arc<Arena>, position: Point3) -> Self {
        Self {
            arena,
            position,
            destination: None,
            speed: 0.0,
            pending: false,
        }
    }

    /// Moves the agent for `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Point3 {
        self.pending = false;
        let Some(goal) = self.destination else {
            return self.position;
        };

        let offset = Vec3::new(goal.x - self.position.x, 0.0, goal.z - self.position.z);
        let distance = offset.length();
        let reach = self.speed * dt;
        let next = if distance <= reach {
            Vec3::new(goal.x, self.position.y, goal.z)
        } else {
            self.position + offset / distance * reach
        };

        self.position = self.arena.slide(self.position, next);
        self.position
    }
}

impl WalkableSurface for ArenaNav {
    fn sample_position(&self, approx: Point3, max_radius: f32) -> Option<Point3> {
        self.arena.sample_position(approx, max_radius)
    }

    fn triangulation_vertices(&self) -> Vec<Point3> {
        self.arena.triangulation_vertices()
    }
}

impl NavigationService for ArenaNav {
    fn position(&self) -> Point3 {
        self.position
    }

    fn set_destination(&mut self, point: Point3) {
        self.destination = Some(point);
        self.pending = true;
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn calculate_path(&self, point: Point3) -> PathStatus {
        let floor = Vec3::new(point.x, 0.0, point.z);
        if !self.arena.bounds.contains_planar(floor) {
            PathStatus::Invalid
        } else if self.arena.segment_clear(self.position, floor) {
            PathStatus::Complete
        } else {
            PathStatus::Partial
        }
    }

    fn progress(&self) -> NavProgress {
        if self.pending {
            return NavProgress::PENDING;
        }
        NavProgress {
            path_pending: false,
            remaining_distance: self
                .destination
                .map_or(0.0, |goal| planar_distance(self.position, goal)),
        }
    }
}
