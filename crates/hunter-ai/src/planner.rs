//! Destination selection for roaming, searching, and enraged nudging.
//!
//! Every selector draws a bounded number of random candidates against a
//! geometric predicate and then falls back to a fixed point, so each call
//! ends after at most its attempt budget and always yields a destination.

use crate::config::PlannerConfig;
use crate::rng::HunterRng;
use crate::world::WalkableSurface;
use glam::Vec3;
use hunter_common::{planar_direction, Point3};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Bounded FIFO of recently chosen roam destinations.
#[derive(Debug, Clone)]
pub struct NavTargetPool {
    entries: VecDeque<Point3>,
    capacity: usize,
}

impl NavTargetPool {
    /// Creates an empty pool holding at most `capacity` points.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Checks for an exact match.
    #[must_use]
    pub fn contains(&self, point: Point3) -> bool {
        self.entries.contains(&point)
    }

    /// Records a point as most recent, evicting the oldest beyond capacity.
    pub fn record(&mut self, point: Point3) {
        if let Some(i) = self.entries.iter().position(|p| *p == point) {
            self.entries.remove(i);
        }
        self.entries.push_back(point);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Oldest recorded point.
    #[must_use]
    pub fn oldest(&self) -> Option<Point3> {
        self.entries.front().copied()
    }

    /// Most recently recorded point.
    #[must_use]
    pub fn latest(&self) -> Option<Point3> {
        self.entries.back().copied()
    }

    /// Number of recorded points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of points kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Produces candidate destinations on the walkable surface.
#[derive(Debug, Clone)]
pub struct NavTargetPlanner {
    config: PlannerConfig,
    points: Vec<Point3>,
    history: NavTargetPool,
}

impl NavTargetPlanner {
    /// Creates a planner over an explicit set of roam points.
    #[must_use]
    pub fn new(config: PlannerConfig, points: Vec<Point3>) -> Self {
        let history = NavTargetPool::new(config.roam_history_capacity);
        Self {
            config,
            points,
            history,
        }
    }

    /// Samples the surface triangulation once and keeps every vertex that
    /// projects back onto the surface.
    pub fn precompute<W: WalkableSurface + ?Sized>(surface: &W, config: PlannerConfig) -> Self {
        let radius = config.walkable_projection_radius;
        let mut seen = HashSet::new();
        let points: Vec<Point3> = surface
            .triangulation_vertices()
            .into_iter()
            .filter_map(|v| surface.sample_position(v, radius))
            .filter(|p| seen.insert(p.to_array().map(f32::to_bits)))
            .collect();

        debug!(count = points.len(), "Precomputed walkable roam points");
        Self::new(config, points)
    }

    /// Sampled roam points.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Picks a roam destination that is not among the recent ones.
    ///
    /// Falls back to the agent's own position when there are no points.
    pub fn roam_target(&mut self, agent_pos: Point3, rng: &mut HunterRng) -> Point3 {
        if self.points.is_empty() {
            trace!("No roam points, staying in place");
            return agent_pos;
        }

        for _ in 0..self.config.roam_attempts {
            let Some(i) = rng.index(self.points.len()) else {
                break;
            };
            let candidate = self.points[i];
            if !self.history.contains(candidate) {
                self.history.record(candidate);
                return candidate;
            }
        }

        let eligible: Vec<Point3> = self
            .points
            .iter()
            .copied()
            .filter(|p| !self.history.contains(*p))
            .collect();
        let chosen = match rng.index(eligible.len()) {
            Some(i) => {
                trace!("Roam draws exhausted, picked from eligible points");
                eligible[i]
            },
            None => {
                // Every point is recent: reuse the least recent one.
                trace!("All roam points recent, reusing the oldest");
                self.history.oldest().unwrap_or(self.points[0])
            },
        };
        self.history.record(chosen);
        chosen
    }

    /// Picks a waypoint near the last-seen position, biased toward the side
    /// of it facing away from the agent.
    pub fn search_waypoint<W: WalkableSurface + ?Sized>(
        &self,
        surface: &W,
        agent_pos: Point3,
        last_seen: Point3,
        rng: &mut HunterRng,
    ) -> Point3 {
        let cfg = &self.config;
        let toward = planar_direction(agent_pos, last_seen);

        for _ in 0..cfg.search_attempts {
            let candidate = last_seen + rng.planar_offset(cfg.search_radius);
            if toward != Vec3::ZERO {
                let heading = planar_direction(agent_pos, candidate);
                if heading.dot(toward) < cfg.search_direction_similarity {
                    continue;
                }
            }
            if let Some(point) = surface.sample_position(candidate, cfg.search_sample_radius) {
                return point;
            }
        }

        let ahead = last_seen + toward * cfg.search_radius;
        if let Some(point) = surface.sample_position(ahead, cfg.search_sample_radius) {
            trace!("Search draws exhausted, continuing past last-seen position");
            return point;
        }

        trace!("Search sampling failed, returning to last-seen position");
        last_seen
    }

    /// Picks a point around the target that is closer to it than the agent.
    ///
    /// Falls back to the target itself when no draw qualifies, and to the
    /// last-seen position when the chosen point is not walkable.
    pub fn nudge_target<W: WalkableSurface + ?Sized>(
        &self,
        surface: &W,
        agent_pos: Point3,
        target_pos: Point3,
        last_seen: Point3,
        rng: &mut HunterRng,
    ) -> Point3 {
        let cfg = &self.config;
        let current = agent_pos.distance(target_pos);

        let mut chosen = target_pos;
        for _ in 0..cfg.nudge_attempts {
            let candidate = target_pos + rng.planar_offset(cfg.nudge_radius);
            if candidate.distance(target_pos) < current {
                chosen = candidate;
                break;
            }
        }

        match surface.sample_position(chosen, cfg.nudge_sample_radius) {
            Some(point) => point,
            None => {
                trace!("Nudge point not walkable, heading to last-seen position");
                last_seen
            },
        }
    }
}
