//! Movement profiles and speed selection.

use crate::config::MovementConfig;
use crate::state::AgentState;
use serde::{Deserialize, Serialize};

/// Speeds and sensor ranges for one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfile {
    /// Walking speed
    pub walk_speed: f32,
    /// Running speed
    pub run_speed: f32,
    /// Sight range
    pub sight_range: f32,
    /// Hearing range
    pub hearing_range: f32,
}

/// Baseline and rage-boosted profiles, computed once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProfiles {
    /// Values used while calm
    pub baseline: MovementProfile,
    /// Values used while enraged above the threshold
    pub rage: MovementProfile,
}

impl MovementProfiles {
    /// Caches baseline values and derives `rage = baseline + increase`.
    #[must_use]
    pub fn from_config(config: &MovementConfig) -> Self {
        let baseline = MovementProfile {
            walk_speed: config.walk_speed,
            run_speed: config.run_speed,
            sight_range: config.sight_range,
            hearing_range: config.hearing_range,
        };
        let rage = MovementProfile {
            walk_speed: config.walk_speed + config.rage_walk_increase,
            run_speed: config.run_speed + config.rage_run_increase,
            sight_range: config.sight_range + config.rage_sight_increase,
            hearing_range: config.hearing_range + config.rage_hearing_increase,
        };
        Self { baseline, rage }
    }
}

/// Values the hunter moves and senses with for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveMovement {
    /// Movement speed handed to the navigation agent
    pub speed: f32,
    /// Sight range for perception queries
    pub sight_range: f32,
    /// Hearing range for noise intake
    pub hearing_range: f32,
}

/// Stateless speed and sensor selection.
pub struct SpeedController;

impl SpeedController {
    /// Picks the profile: rage-boosted only while `boost_active`.
    #[must_use]
    pub fn profile(profiles: &MovementProfiles, boost_active: bool) -> &MovementProfile {
        if boost_active {
            &profiles.rage
        } else {
            &profiles.baseline
        }
    }

    /// Speed and ranges for `state` under the selected profile.
    #[must_use]
    pub fn select(
        state: AgentState,
        boost_active: bool,
        profiles: &MovementProfiles,
    ) -> ActiveMovement {
        let profile = Self::profile(profiles, boost_active);
        let speed = if state.is_fast() {
            profile.run_speed
        } else {
            profile.walk_speed
        };
        ActiveMovement {
            speed,
            sight_range: profile.sight_range,
            hearing_range: profile.hearing_range,
        }
    }
}
