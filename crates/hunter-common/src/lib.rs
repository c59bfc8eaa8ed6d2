//! # Hunter Common
//!
//! Common types, utilities, and shared abstractions for the hunter controller.
//!
//! This crate provides foundational types used by the controller and its
//! drivers:
//! - Geometry (points, planar helpers, axis-aligned boxes)
//! - ID types (EntityId, LayerMask)
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;
