//! Sight and hearing.
//!
//! Every query is a pure function of positions and world geometry: the
//! service keeps no memory between calls and never mutates the world.

use crate::config::PerceptionConfig;
use crate::rng::HunterRng;
use crate::world::{SpatialQuery, TargetSnapshot};
use hunter_common::{EntityId, LayerMask, Point3};
use serde::{Deserialize, Serialize};

/// Outcome of one sight query.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerceptionResult {
    /// Where the target was seen, when it was seen
    pub target_position: Option<Point3>,
}

impl PerceptionResult {
    /// Target not seen.
    pub const HIDDEN: Self = Self {
        target_position: None,
    };

    /// Target seen at `position`.
    #[must_use]
    pub const fn visible_at(position: Point3) -> Self {
        Self {
            target_position: Some(position),
        }
    }

    /// Returns whether the target was seen.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.target_position.is_some()
    }
}

/// Something audible happened in the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseEvent {
    /// Where the sound originated
    pub position: Point3,
    /// Who made it, if known
    pub source: Option<EntityId>,
}

impl NoiseEvent {
    /// Creates a noise event.
    #[must_use]
    pub const fn new(position: Point3, source: Option<EntityId>) -> Self {
        Self { position, source }
    }
}

/// Line-of-sight and noise intake.
#[derive(Debug, Clone)]
pub struct PerceptionService<S: SpatialQuery> {
    spatial: S,
    obstacle_mask: LayerMask,
    hearing_jitter: f32,
}

impl<S: SpatialQuery> PerceptionService<S> {
    /// Creates a perception service over a physics query surface.
    #[must_use]
    pub fn new(spatial: S, config: &PerceptionConfig) -> Self {
        Self {
            spatial,
            obstacle_mask: config.obstacle_mask,
            hearing_jitter: config.hearing_jitter,
        }
    }

    /// Checks whether `target_pos` is within `sight_range` and not occluded.
    #[must_use]
    pub fn can_see_target(&self, self_pos: Point3, sight_range: f32, target_pos: Point3) -> bool {
        let distance = self_pos.distance(target_pos);
        if distance > sight_range {
            return false;
        }
        if distance <= f32::EPSILON {
            return true;
        }

        let direction = (target_pos - self_pos) / distance;
        self.spatial
            .raycast(self_pos, direction, distance, self.obstacle_mask)
            .is_none()
    }

    /// Runs a sight query against an optional target.
    #[must_use]
    pub fn perceive(
        &self,
        self_pos: Point3,
        sight_range: f32,
        target: Option<TargetSnapshot>,
    ) -> PerceptionResult {
        match target {
            Some(t) if self.can_see_target(self_pos, sight_range, t.position) => {
                PerceptionResult::visible_at(t.position)
            },
            _ => PerceptionResult::HIDDEN,
        }
    }

    /// Checks whether a noise at `noise_pos` is within `hearing_range`.
    #[must_use]
    pub fn hear_noise(noise_pos: Point3, hearing_range: f32, self_pos: Point3) -> bool {
        self_pos.distance(noise_pos) <= hearing_range
    }

    /// Point to investigate for a heard noise, offset by the hearing jitter.
    pub fn investigate_point(&self, noise_pos: Point3, rng: &mut HunterRng) -> Point3 {
        noise_pos + rng.planar_offset(self.hearing_jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{OpenSpace, WallQuery};
    use glam::Vec3;
    use hunter_common::Aabb;

    fn config() -> PerceptionConfig {
        PerceptionConfig::default()
    }

    #[test]
    fn test_visible_in_range_without_obstacles() {
        let perception = PerceptionService::new(OpenSpace, &config());
        assert!(perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_not_visible_beyond_range() {
        let perception = PerceptionService::new(OpenSpace, &config());
        assert!(!perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(15.5, 0.0, 0.0)));
        assert!(perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(15.0, 0.0, 0.0)));
    }

    #[test]
    fn test_wall_blocks_sight() {
        let wall = Aabb::new(Vec3::new(4.0, -1.0, -5.0), Vec3::new(5.0, 3.0, 5.0));
        let perception = PerceptionService::new(WallQuery::new(vec![wall]), &config());

        assert!(!perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(10.0, 0.0, 0.0)));
        assert!(perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_wall_on_other_layer_ignored() {
        let wall = Aabb::new(Vec3::new(4.0, -1.0, -5.0), Vec3::new(5.0, 3.0, 5.0));
        let query = WallQuery::new(vec![wall]).on_layer(LayerMask::TARGET);
        let perception = PerceptionService::new(query, &config());

        assert!(perception.can_see_target(Vec3::ZERO, 15.0, Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_missing_target_is_hidden() {
        let perception = PerceptionService::new(OpenSpace, &config());
        let result = perception.perceive(Vec3::ZERO, 15.0, None);
        assert!(!result.is_visible());
        assert_eq!(result, PerceptionResult::HIDDEN);
    }

    #[test]
    fn test_perceive_reports_position() {
        let perception = PerceptionService::new(OpenSpace, &config());
        let target = TargetSnapshot::new(EntityId::from_raw(2), Vec3::new(1.0, 0.0, 1.0));
        let result = perception.perceive(Vec3::ZERO, 15.0, Some(target));
        assert_eq!(result.target_position, Some(Vec3::new(1.0, 0.0, 1.0)));
    }

    #[test]
    fn test_hearing_range_inclusive() {
        let self_pos = Vec3::ZERO;
        assert!(PerceptionService::<OpenSpace>::hear_noise(
            Vec3::new(25.0, 0.0, 0.0),
            25.0,
            self_pos
        ));
        assert!(!PerceptionService::<OpenSpace>::hear_noise(
            Vec3::new(25.1, 0.0, 0.0),
            25.0,
            self_pos
        ));
    }

    #[test]
    fn test_investigate_point_within_jitter() {
        let perception = PerceptionService::new(OpenSpace, &config());
        let mut rng = HunterRng::new(3);
        let noise = Vec3::new(8.0, 0.0, -3.0);
        for _ in 0..50 {
            let point = perception.investigate_point(noise, &mut rng);
            assert!(point.distance(noise) <= config().hearing_jitter + 1e-4);
        }
    }
}
