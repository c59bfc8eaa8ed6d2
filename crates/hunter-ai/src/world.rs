//! Interfaces to the collaborators the controller consumes.
//!
//! The controller never owns geometry or pathfinding. It talks to the
//! navigation agent, the walkable surface, the physics query surface and
//! the target reference through these narrow traits, so each can be
//! replaced with a deterministic double.

use glam::Vec3;
use hunter_common::{EntityId, LayerMask, Point3};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

/// Feasibility of a path to a requested point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStatus {
    /// The point is reachable
    Complete,
    /// Only part of the way is walkable
    Partial,
    /// No path could be built
    Invalid,
}

impl PathStatus {
    /// Returns whether the path reaches its goal.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Live progress of the navigation agent toward its current destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavProgress {
    /// A path request is still being computed
    pub path_pending: bool,
    /// Distance left along the current path
    pub remaining_distance: f32,
}

impl NavProgress {
    /// Progress reported while no path has settled yet.
    pub const PENDING: Self = Self {
        path_pending: true,
        remaining_distance: f32::INFINITY,
    };
}

/// The navigable-area representation.
pub trait WalkableSurface {
    /// Nearest walkable point within `max_radius` of `approx`.
    fn sample_position(&self, approx: Point3, max_radius: f32) -> Option<Point3>;

    /// Vertices of the surface triangulation.
    fn triangulation_vertices(&self) -> Vec<Point3>;
}

/// The navigation agent that physically moves the hunter.
pub trait NavigationService: WalkableSurface {
    /// Current position of the agent.
    fn position(&self) -> Point3;

    /// Requests a path to `point`.
    fn set_destination(&mut self, point: Point3);

    /// Sets the agent's movement speed.
    fn set_speed(&mut self, speed: f32);

    /// Checks whether a full path to `point` exists.
    fn calculate_path(&self, point: Point3) -> PathStatus;

    /// Progress toward the current destination.
    fn progress(&self) -> NavProgress;
}

/// Result of an occlusion ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Contact point
    pub point: Point3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Physics query surface used for line of sight.
pub trait SpatialQuery {
    /// First hit along a ray against colliders on `mask`.
    fn raycast(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn raycast(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, mask)
    }
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for Arc<T> {
    fn raycast(
        &self,
        origin: Point3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        (**self).raycast(origin, direction, max_distance, mask)
    }
}

/// Where the pursued agent is this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    /// Entity of the target
    pub id: EntityId,
    /// World position
    pub position: Point3,
}

impl TargetSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(id: EntityId, position: Point3) -> Self {
        Self { id, position }
    }
}

/// Live reference to the target; `None` until it has spawned.
pub trait TargetProvider {
    /// Current target snapshot, if any.
    fn target(&self) -> Option<TargetSnapshot>;
}

impl TargetProvider for Option<TargetSnapshot> {
    fn target(&self) -> Option<TargetSnapshot> {
        *self
    }
}

/// Shared, single-threaded handle the driver updates as the target moves.
#[derive(Debug, Clone, Default)]
pub struct TargetHandle(Rc<Cell<Option<TargetSnapshot>>>);

impl TargetHandle {
    /// Creates an empty handle (target not spawned).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes the target's current state.
    pub fn set(&self, snapshot: TargetSnapshot) {
        self.0.set(Some(snapshot));
    }

    /// Moves the target, keeping its id. No-op when absent.
    pub fn move_to(&self, position: Point3) {
        if let Some(mut snapshot) = self.0.get() {
            snapshot.position = position;
            self.0.set(Some(snapshot));
        }
    }

    /// Removes the target (despawned).
    pub fn clear(&self) {
        self.0.set(None);
    }
}

impl TargetProvider for TargetHandle {
    fn target(&self) -> Option<TargetSnapshot> {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_handle_shares_state() {
        let handle = TargetHandle::new();
        let reader = handle.clone();
        assert!(reader.target().is_none());

        let id = EntityId::from_raw(9);
        handle.set(TargetSnapshot::new(id, Point3::ZERO));
        handle.move_to(Point3::new(1.0, 0.0, 2.0));

        let snapshot = reader.target().expect("target should be set");
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.position, Point3::new(1.0, 0.0, 2.0));

        handle.clear();
        assert!(reader.target().is_none());
    }

    #[test]
    fn test_move_without_target_is_noop() {
        let handle = TargetHandle::new();
        handle.move_to(Point3::ONE);
        assert!(handle.target().is_none());
    }

    #[test]
    fn test_path_status_complete() {
        assert!(PathStatus::Complete.is_complete());
        assert!(!PathStatus::Partial.is_complete());
        assert!(!PathStatus::Invalid.is_complete());
    }
}
