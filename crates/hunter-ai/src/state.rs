//! Behavior states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the hunter is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    /// Wandering between sampled walkable points
    #[default]
    Roaming,
    /// Running at the visible target
    Chasing,
    /// Walking to a heard noise
    Investigating,
    /// Looking around the last-seen position
    Searching,
    /// Boosted pursuit while rage is maxed out
    Enraged,
}

impl AgentState {
    /// Get display name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Roaming => "Roaming",
            Self::Chasing => "Chasing",
            Self::Investigating => "Investigating",
            Self::Searching => "Searching",
            Self::Enraged => "Enraged",
        }
    }

    /// Returns whether this state moves at run speed.
    #[must_use]
    pub const fn is_fast(self) -> bool {
        matches!(self, Self::Chasing | Self::Enraged)
    }

    /// Returns whether this state reacts to noise events.
    #[must_use]
    pub const fn accepts_noise(self) -> bool {
        matches!(self, Self::Roaming | Self::Searching | Self::Investigating)
    }

    /// Get all states.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Roaming,
            Self::Chasing,
            Self::Investigating,
            Self::Searching,
            Self::Enraged,
        ]
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
