//! Rage meter.
//!
//! Rage builds while the target is in sight and decays once it has been
//! out of sight for longer than the grace period, faster the longer it
//! stays unseen. Reaching the maximum enrages the hunter; falling below
//! the threshold calms it and starts a cooldown during which it cannot
//! enrage again.

use crate::config::RageConfig;
use serde::{Deserialize, Serialize};

/// Persistent rage values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RageState {
    /// Meter value, always within `[0, max]`
    pub current: f32,
    /// Enraged mode is active
    pub is_enraged: bool,
    /// Re-entering enraged mode is blocked
    pub in_cooldown: bool,
    /// Seconds left in the cooldown
    pub cooldown_remaining: f32,
    /// Seconds since the target was last seen
    pub out_of_sight_elapsed: f32,
    /// Current decay multiplier, never below 1
    pub decrease_multiplier: f32,
}

/// Edge produced by a meter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RageTransition {
    /// Rage hit the maximum with no cooldown active
    Enraged,
    /// Rage fell below the threshold while enraged
    Calmed,
}

/// Integrates rage over time.
#[derive(Debug, Clone)]
pub struct RageMeter {
    config: RageConfig,
    state: RageState,
}

impl RageMeter {
    /// Creates an empty meter.
    #[must_use]
    pub fn new(config: RageConfig) -> Self {
        let state = RageState {
            current: 0.0,
            is_enraged: false,
            in_cooldown: false,
            cooldown_remaining: 0.0,
            out_of_sight_elapsed: 0.0,
            decrease_multiplier: config.base_decrease_multiplier,
        };
        Self { config, state }
    }

    /// Returns the meter's state.
    #[must_use]
    pub fn state(&self) -> &RageState {
        &self.state
    }

    /// Returns the meter's configuration.
    #[must_use]
    pub fn config(&self) -> &RageConfig {
        &self.config
    }

    /// Returns whether enraged mode is active.
    #[must_use]
    pub fn is_enraged(&self) -> bool {
        self.state.is_enraged
    }

    /// Returns whether the meter sits at or above the calm-down threshold.
    #[must_use]
    pub fn above_threshold(&self) -> bool {
        self.state.current >= self.config.threshold_value()
    }

    /// Returns whether rage-boosted values apply this tick.
    #[must_use]
    pub fn boost_active(&self) -> bool {
        self.state.is_enraged && self.above_threshold()
    }

    /// Advances the meter by `dt` seconds.
    ///
    /// Returns the enraged/calmed edge crossed during this update, if any.
    pub fn update(&mut self, target_visible: bool, dt: f32) -> Option<RageTransition> {
        let cfg = &self.config;
        let s = &mut self.state;

        if target_visible {
            s.out_of_sight_elapsed = 0.0;
            s.decrease_multiplier = cfg.base_decrease_multiplier;
            s.current += cfg.increase_rate * dt;
        } else {
            s.out_of_sight_elapsed += dt;
            if s.out_of_sight_elapsed >= cfg.grace_period {
                s.decrease_multiplier += cfg.decrease_multiplier_growth * dt;
                s.current -= cfg.decrease_rate * s.decrease_multiplier * dt;
            }
        }
        s.current = s.current.clamp(0.0, cfg.max);

        // The cooldown started by a calm-down counts from the next update.
        if s.in_cooldown {
            s.cooldown_remaining = (s.cooldown_remaining - dt).max(0.0);
            if s.cooldown_remaining <= 0.0 {
                s.in_cooldown = false;
            }
        }

        if !s.is_enraged && !s.in_cooldown && s.current >= cfg.max {
            s.is_enraged = true;
            return Some(RageTransition::Enraged);
        }

        if s.is_enraged && s.current < cfg.threshold_value() {
            s.is_enraged = false;
            s.in_cooldown = true;
            s.cooldown_remaining = cfg.cooldown;
            return Some(RageTransition::Calmed);
        }

        None
    }
}
