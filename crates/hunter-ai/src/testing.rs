//! Deterministic collaborators for unit tests.

use crate::world::{
    NavProgress, NavigationService, PathStatus, RayHit, SpatialQuery, WalkableSurface,
};
use glam::Vec3;
use hunter_common::{Aabb, LayerMask, Point3};

/// Query surface with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct OpenSpace;

impl SpatialQuery for OpenSpace {
    fn raycast(&self, _: Point3, _: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
        None
    }
}

/// Query surface made of boxes on one layer.
#[derive(Debug, Clone)]
pub(crate) struct WallQuery {
    walls: Vec<Aabb>,
    layer: LayerMask,
}

impl WallQuery {
    pub(crate) fn new(walls: Vec<Aabb>) -> Self {
        Self {
            walls,
            layer: LayerMask::OBSTACLE,
        }
    }

    pub(crate) fn on_layer(mut self, layer: LayerMask) -> Self {
        self.layer = layer;
        self
    }
}

impl SpatialQuery for WallQuery {
    fn raycast(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        if !mask.intersects(self.layer) {
            return None;
        }
        self.walls
            .iter()
            .filter_map(|w| w.ray_intersection(origin, direction, max_distance))
            .min_by(f32::total_cmp)
            .map(|distance| RayHit {
                point: origin + direction * distance,
                distance,
            })
    }
}

/// Unbounded flat surface: every point is walkable.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpenSurface {
    vertices: Vec<Point3>,
}

impl OpenSurface {
    pub(crate) fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }
}

impl WalkableSurface for OpenSurface {
    fn sample_position(&self, approx: Point3, _: f32) -> Option<Point3> {
        Some(approx)
    }

    fn triangulation_vertices(&self) -> Vec<Point3> {
        self.vertices.clone()
    }
}

/// Surface where every sample misses.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailingSurface {
    vertices: Vec<Point3>,
}

impl FailingSurface {
    pub(crate) fn new(vertices: Vec<Point3>) -> Self {
        Self { vertices }
    }
}

impl WalkableSurface for FailingSurface {
    fn sample_position(&self, _: Point3, _: f32) -> Option<Point3> {
        None
    }

    fn triangulation_vertices(&self) -> Vec<Point3> {
        self.vertices.clone()
    }
}

/// Navigation agent that only moves when a test moves it.
#[derive(Debug, Clone)]
pub(crate) struct ScriptedNav {
    pub(crate) position: Point3,
    pub(crate) destinations: Vec<Point3>,
    pub(crate) speed: f32,
    pub(crate) path_status: PathStatus,
    pub(crate) progress: NavProgress,
    pub(crate) vertices: Vec<Point3>,
    pub(crate) walkable: bool,
}

impl ScriptedNav {
    /// Agent at `position` on a 5x5 grid of roam points spaced 10 apart.
    pub(crate) fn new(position: Point3) -> Self {
        let vertices = (0..25)
            .map(|i| {
                let (col, row) = ((i % 5) as f32, (i / 5) as f32);
                Vec3::new(col * 10.0 - 20.0, 0.0, row * 10.0 - 20.0)
            })
            .collect();
        Self {
            position,
            destinations: Vec::new(),
            speed: 0.0,
            path_status: PathStatus::Complete,
            progress: NavProgress::PENDING,
            vertices,
            walkable: true,
        }
    }

    pub(crate) fn last_destination(&self) -> Option<Point3> {
        self.destinations.last().copied()
    }

    /// Teleports onto the last requested destination.
    pub(crate) fn arrive(&mut self) {
        if let Some(goal) = self.last_destination() {
            self.position = goal;
        }
    }
}

impl WalkableSurface for ScriptedNav {
    fn sample_position(&self, approx: Point3, _: f32) -> Option<Point3> {
        self.walkable.then_some(approx)
    }

    fn triangulation_vertices(&self) -> Vec<Point3> {
        self.vertices.clone()
    }
}

impl NavigationService for ScriptedNav {
    fn position(&self) -> Point3 {
        self.position
    }

    fn set_destination(&mut self, point: Point3) {
        self.destinations.push(point);
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    fn calculate_path(&self, _: Point3) -> PathStatus {
        self.path_status
    }

    fn progress(&self) -> NavProgress {
        self.progress
    }
}
