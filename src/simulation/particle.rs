//! Particle records and the store that owns them.

use glam::{Vec2, Vec3};

use super::rng::Rng;

/// Hard ceiling on the number of particles, regardless of viewport or config.
pub const MAX_PARTICLES: usize = 150;

/// Distance outside the viewport a particle may travel before it wraps.
pub const WRAP_MARGIN: f32 = 20.0;

/// Per-particle steering personality, randomized at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringParams {
    /// Heading offset of the wander target. The only field that changes after creation.
    pub wander_angle: f32,
    pub cohesion_radius: f32,
    pub separation_radius: f32,
    pub alignment_radius: f32,
    /// Speed limit in pixels per reference frame.
    pub max_speed: f32,
    /// Magnitude limit for a single steering force.
    pub max_force: f32,
}

impl SteeringParams {
    pub fn random(rng: &mut Rng) -> Self {
        Self {
            wander_angle: rng.next_angle(),
            cohesion_radius: rng.next_range(50.0, 100.0),
            separation_radius: rng.next_range(20.0, 40.0),
            alignment_radius: rng.next_range(40.0, 80.0),
            max_speed: rng.next_range(0.4, 1.2),
            max_force: rng.next_range(0.02, 0.06),
        }
    }
}

/// One simulated agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Stable index, used for disperse grid placement.
    pub id: usize,
    /// Position in device pixels.
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub base_size: f32,
    pub opacity: f32,
    pub base_opacity: f32,
    /// Offset for breathing so agents pulse out of sync.
    pub phase: f32,
    pub behavior: SteeringParams,
    pub color: Vec3,
    pub target_color: Vec3,
    /// Seconds alive.
    pub age: f32,
}

impl Particle {
    /// Create a particle at a random position inside `viewport`.
    pub fn spawn(id: usize, viewport: Vec2, color: Vec3, rng: &mut Rng) -> Self {
        let position = Vec2::new(rng.next() * viewport.x, rng.next() * viewport.y);
        let heading = rng.next_angle();
        let speed = rng.next_range(0.0, 0.5);
        let base_size = rng.next_range(1.5, 3.5);
        let base_opacity = rng.next_range(0.3, 0.8);

        Self {
            id,
            position,
            velocity: Vec2::from_angle(heading) * speed,
            size: base_size,
            base_size,
            opacity: base_opacity,
            base_opacity,
            phase: rng.next_angle(),
            behavior: SteeringParams::random(rng),
            color,
            target_color: color,
            age: 0.0,
        }
    }
}

/// Outcome of [`ParticleStore::resize_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKind {
    Unchanged,
    /// Excess particles dropped from the end.
    Truncated,
    /// Whole array discarded and recreated.
    Reinitialized,
}

/// Authoritative particle array.
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything and create `count` fresh particles.
    pub fn populate(&mut self, count: usize, viewport: Vec2, color: Vec3, rng: &mut Rng) {
        let count = count.min(MAX_PARTICLES);
        self.particles.clear();
        self.particles.reserve(count);
        self.particles
            .extend((0..count).map(|id| Particle::spawn(id, viewport, color, rng)));
    }

    /// Bring the array to `target` particles.
    ///
    /// Shrinking truncates so surviving particles keep flying; growing
    /// reinitializes because new behaviors need randomizing anyway.
    pub fn resize_to(
        &mut self,
        target: usize,
        viewport: Vec2,
        color: Vec3,
        rng: &mut Rng,
    ) -> ResizeKind {
        let target = target.min(MAX_PARTICLES);
        match target.cmp(&self.particles.len()) {
            std::cmp::Ordering::Equal => ResizeKind::Unchanged,
            std::cmp::Ordering::Less => {
                self.particles.truncate(target);
                ResizeKind::Truncated
            }
            std::cmp::Ordering::Greater => {
                self.populate(target, viewport, color, rng);
                ResizeKind::Reinitialized
            }
        }
    }

    /// Map surviving positions from `from` onto `to` proportionally, so a
    /// viewport change keeps the field evenly spread.
    pub fn rescale(&mut self, from: Vec2, to: Vec2) {
        if from == to || from.min_element() <= 0.0 {
            return;
        }
        let ratio = to / from;
        for particle in &mut self.particles {
            particle.position *= ratio;
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}

/// Wrap one coordinate so it re-enters from the opposite edge once it
/// leaves `[-margin, extent + margin]`. Overshoot of more than one span is
/// folded back into the band instead of pinned to an edge.
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32, margin: f32) -> f32 {
    let span = extent + 2.0 * margin;
    if value < -margin - span || value > extent + margin + span {
        (value + margin).rem_euclid(span) - margin
    } else if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}
