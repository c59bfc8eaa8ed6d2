//! Simulation configuration.
//!
//! A single TOML file describes the arena, the scripted player, the
//! hunter's spawn point and its `[behavior]` tuning.

use hunter_ai::BehaviorConfig;
use hunter_common::{ConfigError, HunterError, HunterResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// One box obstacle, given by its planar corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleConfig {
    /// Minimum (x, z) corner
    pub min: [f32; 2],
    /// Maximum (x, z) corner
    pub max: [f32; 2],
    /// Height of the box
    pub height: f32,
}

/// Walkable floor and the obstacles on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Minimum (x, z) corner of the floor
    pub min: [f32; 2],
    /// Maximum (x, z) corner of the floor
    pub max: [f32; 2],
    /// Spacing of the floor triangulation grid
    pub grid_step: f32,
    /// Radius of the agents' collision circle
    pub agent_radius: f32,
    /// Boxes that block movement and sight
    pub obstacles: Vec<ObstacleConfig>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min: [-30.0, -30.0],
            max: [30.0, 30.0],
            grid_step: 5.0,
            agent_radius: 0.4,
            obstacles: vec![
                ObstacleConfig {
                    min: [-12.0, -2.0],
                    max: [-8.0, 2.0],
                    height: 3.0,
                },
                ObstacleConfig {
                    min: [8.0, -2.0],
                    max: [12.0, 2.0],
                    height: 3.0,
                },
                ObstacleConfig {
                    min: [-2.0, 10.0],
                    max: [2.0, 14.0],
                    height: 3.0,
                },
            ],
        }
    }
}

/// The scripted player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Spawn (x, z)
    pub spawn: [f32; 2],
    /// Seconds before the player appears
    pub spawn_delay: f32,
    /// Walking speed
    pub speed: f32,
    /// Loop of (x, z) points walked in order
    pub waypoints: Vec<[f32; 2]>,
    /// Seconds between footstep noises (0 disables)
    pub noise_interval: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: [20.0, 20.0],
            spawn_delay: 2.0,
            speed: 3.0,
            waypoints: vec![[20.0, 20.0], [20.0, -20.0], [-20.0, -20.0], [-20.0, 20.0]],
            noise_interval: 1.5,
        }
    }
}

/// Whole-run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed tick length in seconds
    pub dt: f32,
    /// Simulated seconds before giving up
    pub duration: f32,
    /// Hunter spawn (x, z)
    pub hunter_spawn: [f32; 2],
    /// Write a per-tick JSON trace here
    pub trace_path: Option<PathBuf>,
    /// Floor and obstacles
    pub arena: ArenaConfig,
    /// Scripted player
    pub player: PlayerConfig,
    /// Hunter tuning
    pub behavior: BehaviorConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.05,
            duration: 120.0,
            hunter_spawn: [-20.0, -20.0],
            trace_path: None,
            arena: ArenaConfig::default(),
            player: PlayerConfig::default(),
            behavior: BehaviorConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> HunterResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> HunterResult<Self> {
        let mut config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.behavior.check()?;
        config.behavior.validate();
        config.check()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml_string(&self) -> HunterResult<String> {
        toml::to_string_pretty(self).map_err(|e| HunterError::Serialization(e.to_string()))
    }

    /// Reject settings the simulation cannot run with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ConfigError::invalid("dt", "must be positive"));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(ConfigError::invalid("duration", "must be positive"));
        }
        let a = &self.arena;
        if a.min[0] >= a.max[0] || a.min[1] >= a.max[1] {
            return Err(ConfigError::invalid("arena", "min corner must be below max corner"));
        }
        if !(a.grid_step.is_finite() && a.grid_step > 0.0) {
            return Err(ConfigError::invalid("arena.grid_step", "must be positive"));
        }
        if !(self.player.speed.is_finite() && self.player.speed >= 0.0) {
            return Err(ConfigError::invalid("player.speed", "must be non-negative"));
        }
        Ok(())
    }
}
