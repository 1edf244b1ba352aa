//! Seeded pseudo-random numbers for particle creation and wander jitter.

use std::f32::consts::TAU;

/// xorshift32 generator. Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        // xorshift never leaves the zero state
        Self { state: seed.max(1) }
    }

    /// Returns a float in [0, 1].
    pub fn next(&mut self) -> f32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        (self.state as f32) / (u32::MAX as f32)
    }

    pub fn next_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next() * (max - min)
    }

    /// Uniform angle in [0, 2π].
    pub fn next_angle(&mut self) -> f32 {
        self.next() * TAU
    }

    /// Symmetric jitter in [-amount, amount].
    pub fn jitter(&mut self, amount: f32) -> f32 {
        (self.next() - 0.5) * 2.0 * amount
    }
}
