//! Controller configuration.
//!
//! Every tuning value the hunter uses lives here, grouped by concern.
//! Configuration can be loaded from and saved to a TOML file; missing
//! fields fall back to their defaults.

use hunter_common::{ConfigError, LayerMask};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// Baseline movement and sensing values plus their enraged increases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Walking speed (m/s)
    pub walk_speed: f32,
    /// Running speed (m/s)
    pub run_speed: f32,
    /// Sight range (m)
    pub sight_range: f32,
    /// Hearing range (m)
    pub hearing_range: f32,
    /// Added to walk speed while enraged
    pub rage_walk_increase: f32,
    /// Added to run speed while enraged
    pub rage_run_increase: f32,
    /// Added to sight range while enraged
    pub rage_sight_increase: f32,
    /// Added to hearing range while enraged
    pub rage_hearing_increase: f32,
    /// Distance under which a destination counts as reached
    pub arrival_tolerance: f32,
    /// Contact distance between the hunter and the target
    pub capture_radius: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 3.5,
            run_speed: 6.0,
            sight_range: 15.0,
            hearing_range: 25.0,
            rage_walk_increase: 1.5,
            rage_run_increase: 3.0,
            rage_sight_increase: 10.0,
            rage_hearing_increase: 10.0,
            arrival_tolerance: 2.0,
            capture_radius: 1.2,
        }
    }
}

/// Sight and hearing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Layers that block line of sight
    pub obstacle_mask: LayerMask,
    /// Radius of the random offset applied to heard noise positions
    pub hearing_jitter: f32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            obstacle_mask: LayerMask::OBSTACLE,
            hearing_jitter: 2.0,
        }
    }
}

/// Rage meter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RageConfig {
    /// Upper bound of the meter
    pub max: f32,
    /// Growth per second while the target is visible
    pub increase_rate: f32,
    /// Decay per second (before the multiplier) once the grace period ends
    pub decrease_rate: f32,
    /// Decay multiplier restored whenever the target is seen
    pub base_decrease_multiplier: f32,
    /// Growth per second of the decay multiplier while the target is unseen
    pub decrease_multiplier_growth: f32,
    /// Fraction of `max` below which an enraged hunter calms down
    pub threshold: f32,
    /// Seconds out of sight before rage starts decaying
    pub grace_period: f32,
    /// Seconds after calming during which rage cannot re-trigger
    pub cooldown: f32,
}

impl Default for RageConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            increase_rate: 10.0,
            decrease_rate: 5.0,
            base_decrease_multiplier: 1.0,
            decrease_multiplier_growth: 0.5,
            threshold: 0.5,
            grace_period: 4.0,
            cooldown: 5.0,
        }
    }
}

impl RageConfig {
    /// Absolute rage value of the calm-down threshold.
    #[must_use]
    pub fn threshold_value(&self) -> f32 {
        self.threshold * self.max
    }
}

/// Destination sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Number of recent roam destinations kept to avoid repeats
    pub roam_history_capacity: usize,
    /// Random draws before falling back to a scan of eligible points
    pub roam_attempts: u32,
    /// Max distance a triangulation vertex may move when projected onto the surface
    pub walkable_projection_radius: f32,
    /// Radius around the last-seen position searched for waypoints
    pub search_radius: f32,
    /// Max distance a search candidate may move when sampled onto the surface
    pub search_sample_radius: f32,
    /// Random draws for a search waypoint
    pub search_attempts: u32,
    /// Minimum cosine between the candidate direction and the
    /// agent-to-last-seen direction; `-1.0` accepts every direction
    pub search_direction_similarity: f32,
    /// Radius around the target sampled for nudge destinations
    pub nudge_radius: f32,
    /// Random draws for a nudge destination
    pub nudge_attempts: u32,
    /// Max distance a nudge point may move when validated against the surface
    pub nudge_sample_radius: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            roam_history_capacity: 10,
            roam_attempts: 10,
            walkable_projection_radius: 1.0,
            search_radius: 15.0,
            search_sample_radius: 5.0,
            search_attempts: 10,
            search_direction_similarity: 0.25,
            nudge_radius: 25.0,
            nudge_attempts: 10,
            nudge_sample_radius: 2.0,
        }
    }
}

/// Complete hunter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Seconds spent heading for one roam destination before picking another
    pub roam_interval: f32,
    /// Search waypoints visited without resight before searching gives up
    pub search_waypoints: u32,
    /// Minimum seconds between enraged nudge requests
    pub nudge_cooldown: f32,
    /// Seed for all random sampling
    pub seed: u64,

    /// Movement and sensing
    pub movement: MovementConfig,
    /// Sight and hearing
    pub perception: PerceptionConfig,
    /// Rage meter
    pub rage: RageConfig,
    /// Destination sampling
    pub planner: PlannerConfig,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            roam_interval: 30.0,
            search_waypoints: 1,
            nudge_cooldown: 2.0,
            seed: 0x5EED,
            movement: MovementConfig::default(),
            perception: PerceptionConfig::default(),
            rage: RageConfig::default(),
            planner: PlannerConfig::default(),
        }
    }
}

impl BehaviorConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Behavior config not found at {}, using defaults", path.display());
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded behavior config from {}", path.display());
                    config
                },
                Err(e) => {
                    warn!("Failed to parse behavior config: {e}");
                    Self::default()
                },
            },
            Err(e) => {
                warn!("Failed to read behavior config: {e}");
                Self::default()
            },
        }
    }

    /// Parse a TOML document, clamp it into range, and reject values that
    /// cannot be repaired.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        config.validate();
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)?;

        info!("Saved behavior config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.roam_interval = self.roam_interval.max(0.1);
        self.search_waypoints = self.search_waypoints.max(1);
        self.nudge_cooldown = self.nudge_cooldown.max(0.0);

        let m = &mut self.movement;
        m.walk_speed = m.walk_speed.max(0.0);
        m.run_speed = m.run_speed.max(m.walk_speed);
        m.sight_range = m.sight_range.max(0.0);
        m.hearing_range = m.hearing_range.max(0.0);
        m.rage_walk_increase = m.rage_walk_increase.max(0.0);
        m.rage_run_increase = m.rage_run_increase.max(0.0);
        m.rage_sight_increase = m.rage_sight_increase.max(0.0);
        m.rage_hearing_increase = m.rage_hearing_increase.max(0.0);
        m.arrival_tolerance = m.arrival_tolerance.clamp(0.05, 50.0);
        m.capture_radius = m.capture_radius.max(0.0);

        self.perception.hearing_jitter = self.perception.hearing_jitter.max(0.0);

        let r = &mut self.rage;
        r.max = r.max.max(1.0);
        r.increase_rate = r.increase_rate.max(0.0);
        r.decrease_rate = r.decrease_rate.max(0.0);
        r.base_decrease_multiplier = r.base_decrease_multiplier.max(1.0);
        r.decrease_multiplier_growth = r.decrease_multiplier_growth.max(0.0);
        r.threshold = r.threshold.clamp(0.05, 0.95);
        r.grace_period = r.grace_period.max(0.0);
        r.cooldown = r.cooldown.max(0.0);

        let p = &mut self.planner;
        p.roam_history_capacity = p.roam_history_capacity.max(1);
        p.roam_attempts = p.roam_attempts.max(1);
        p.search_attempts = p.search_attempts.max(1);
        p.nudge_attempts = p.nudge_attempts.max(1);
        p.walkable_projection_radius = p.walkable_projection_radius.max(0.0);
        p.search_radius = p.search_radius.max(0.0);
        p.search_sample_radius = p.search_sample_radius.max(0.0);
        p.nudge_radius = p.nudge_radius.max(0.0);
        p.nudge_sample_radius = p.nudge_sample_radius.max(0.0);
        p.search_direction_similarity = p.search_direction_similarity.clamp(-1.0, 1.0);
    }

    /// Reject values clamping cannot repair (NaN and infinities).
    pub fn check(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        let r = &self.rage;
        let p = &self.planner;
        let fields: [(&'static str, f32); 27] = [
            ("roam_interval", self.roam_interval),
            ("nudge_cooldown", self.nudge_cooldown),
            ("movement.walk_speed", m.walk_speed),
            ("movement.run_speed", m.run_speed),
            ("movement.sight_range", m.sight_range),
            ("movement.hearing_range", m.hearing_range),
            ("movement.rage_walk_increase", m.rage_walk_increase),
            ("movement.rage_run_increase", m.rage_run_increase),
            ("movement.rage_sight_increase", m.rage_sight_increase),
            ("movement.rage_hearing_increase", m.rage_hearing_increase),
            ("movement.arrival_tolerance", m.arrival_tolerance),
            ("movement.capture_radius", m.capture_radius),
            ("perception.hearing_jitter", self.perception.hearing_jitter),
            ("rage.max", r.max),
            ("rage.increase_rate", r.increase_rate),
            ("rage.decrease_rate", r.decrease_rate),
            ("rage.base_decrease_multiplier", r.base_decrease_multiplier),
            ("rage.decrease_multiplier_growth", r.decrease_multiplier_growth),
            ("rage.threshold", r.threshold),
            ("rage.grace_period", r.grace_period),
            ("rage.cooldown", r.cooldown),
            ("planner.search_radius", p.search_radius),
            ("planner.search_sample_radius", p.search_sample_radius),
            ("planner.search_direction_similarity", p.search_direction_similarity),
            ("planner.nudge_radius", p.nudge_radius),
            ("planner.nudge_sample_radius", p.nudge_sample_radius),
            ("planner.walkable_projection_radius", p.walkable_projection_radius),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("{value} is not finite")));
            }
        }
        Ok(())
    }
}
