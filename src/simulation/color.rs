//! Two-stage color lag.
//!
//! The global color eases toward the target, and each particle eases toward
//! the global color, so a new dominant color sweeps in gradually.

use glam::Vec3;

use super::particle::Particle;

/// Fraction of the remaining gap closed per tick by the global color.
pub const GLOBAL_COLOR_RATE: f32 = 0.03;
/// Fraction of the remaining gap closed per tick by each particle.
pub const PARTICLE_COLOR_RATE: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalColor {
    pub current: Vec3,
    pub target: Vec3,
}

impl GlobalColor {
    pub fn new(color: Vec3) -> Self {
        Self {
            current: color,
            target: color,
        }
    }

    pub fn set_target(&mut self, color: [f32; 3]) {
        self.target = Vec3::from_array(color).clamp(Vec3::ZERO, Vec3::ONE);
    }

    /// Advance `current` one tick toward `target`.
    pub fn step(&mut self) {
        self.current = self.current.lerp(self.target, GLOBAL_COLOR_RATE);
    }

    pub fn is_settled(&self, epsilon: f32) -> bool {
        self.current.abs_diff_eq(self.target, epsilon)
    }
}

/// Advance one particle's color toward the current global color.
pub fn follow_global(particle: &mut Particle, global: &GlobalColor) {
    particle.target_color = global.current;
    particle.color = particle.color.lerp(particle.target_color, PARTICLE_COLOR_RATE);
}
