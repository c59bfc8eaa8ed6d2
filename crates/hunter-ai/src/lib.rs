//! # Hunter AI
//!
//! Behavior controller for a single pursuing hunter.
//!
//! This crate decides, every simulation tick, where the hunter moves and
//! why:
//! - Perception (line of sight, noise intake)
//! - Rage meter with cooldown-guarded enraged mode
//! - Destination planning (roam, search, enraged nudge)
//! - Speed and sensor profiles
//! - Behavior state machine
//! - Event bus for observers
//!
//! Navigation, physics queries and the target reference are supplied by
//! the embedding game through the traits in [`world`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod controller;
pub mod events;
pub mod perception;
pub mod planner;
pub mod profile;
pub mod rage;
pub mod rng;
pub mod state;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::controller::*;
    pub use crate::events::*;
    pub use crate::perception::*;
    pub use crate::planner::*;
    pub use crate::profile::*;
    pub use crate::rage::*;
    pub use crate::rng::*;
    pub use crate::state::*;
    pub use crate::world::*;
}

pub use prelude::*;
