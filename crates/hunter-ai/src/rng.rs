//! Seeded random source for destination sampling.

use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

/// Deterministic random number generator shared by every sampler.
///
/// Two controllers built with the same seed and fed the same ticks make
/// the same choices.
#[derive(Debug, Clone)]
pub struct HunterRng {
    inner: fastrand::Rng,
}

impl HunterRng {
    /// Create a new RNG with seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: fastrand::Rng::with_seed(seed),
        }
    }

    /// Random f32 in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        self.inner.f32()
    }

    /// Random index into a collection of `len` items.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.inner.usize(..len))
    }

    /// Uniform point inside the unit disc.
    pub fn in_unit_disc(&mut self) -> Vec2 {
        let angle = self.next_f32() * TAU;
        let radius = self.next_f32().sqrt();
        Vec2::new(angle.cos(), angle.sin()) * radius
    }

    /// Uniform horizontal offset of length at most `radius`.
    pub fn planar_offset(&mut self, radius: f32) -> Vec3 {
        let d = self.in_unit_disc() * radius;
        Vec3::new(d.x, 0.0, d.y)
    }
}
