//! Steering forces and kinematic integration.
//!
//! All force functions are pure: they read one particle, the pre-tick
//! snapshot of every particle and the current interaction state. Neighbor
//! search is a brute-force scan, O(n) per particle. The only randomness is
//! the wander jitter, which is applied in [`advance_wander`] before any
//! force is computed.

use glam::Vec2;

use super::interaction::{HoverFocus, InteractionState, PointerState};
use super::particle::{wrap_coordinate, Particle, WRAP_MARGIN};
use super::rng::Rng;

/// Motion is expressed in pixels per frame at this rate.
pub const REFERENCE_FPS: f32 = 60.0;
/// Isotropic per-tick velocity damping.
pub const DRAG: f32 = 0.99;

const COHESION_WEIGHT: f32 = 0.3;
const SEPARATION_WEIGHT: f32 = 1.5;
const ALIGNMENT_WEIGHT: f32 = 0.5;
const WANDER_WEIGHT: f32 = 0.8;

/// Below this distance seek ramps its desired speed down linearly.
const ARRIVAL_RADIUS: f32 = 100.0;

const WANDER_JITTER: f32 = 0.15;
const WANDER_DISTANCE: f32 = 30.0;
const WANDER_RADIUS: f32 = 15.0;

const POINTER_PUSH: f32 = 0.5;
const POINTER_PULL: f32 = 0.3;
const POINTER_SPEED_BOOST: f32 = 0.05;
const POINTER_VORTEX: f32 = 0.01;

pub const HOVER_RADIUS: f32 = 120.0;
const HOVER_STRENGTH: f32 = 0.3;

pub const DISPERSE_COLUMNS: usize = 10;
/// Rate (per second) at which velocity converges on the grid-seeking velocity.
const DISPERSE_RESPONSE: f32 = 6.0;
/// Extra speed allowance during a transition, as a multiple of `max_speed`.
const DISPERSE_SPEED_BOOST: f32 = 8.0;
const DISPERSE_FADE: f32 = 0.6;

const BREATH_SIZE_AMPLITUDE: f32 = 0.2;
const BREATH_SIZE_RATE: f32 = 2.0;
const BREATH_OPACITY_AMPLITUDE: f32 = 0.2;
const BREATH_OPACITY_RATE: f32 = 1.5;

/// Steer toward `target`, slowing down inside the arrival radius.
pub fn seek(particle: &Particle, target: Vec2) -> Vec2 {
    let offset = target - particle.position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return Vec2::ZERO;
    }

    let max_speed = particle.behavior.max_speed;
    let speed = if distance < ARRIVAL_RADIUS {
        max_speed * (distance / ARRIVAL_RADIUS)
    } else {
        max_speed
    };
    let desired = offset / distance * speed;
    (desired - particle.velocity).clamp_length_max(particle.behavior.max_force)
}

/// Turn a summed direction into a force toward `max_speed` along it.
fn steer_along(particle: &Particle, direction: Vec2) -> Vec2 {
    match direction.try_normalize() {
        Some(dir) => (dir * particle.behavior.max_speed - particle.velocity)
            .clamp_length_max(particle.behavior.max_force),
        None => Vec2::ZERO,
    }
}

/// Other particles strictly within `radius`, paired with their distance.
fn neighbors<'a>(
    particle: &'a Particle,
    all: &'a [Particle],
    radius: f32,
) -> impl Iterator<Item = (&'a Particle, f32)> + 'a {
    all.iter().filter_map(move |other| {
        if other.id == particle.id {
            return None;
        }
        let distance = particle.position.distance(other.position);
        (distance > 0.0 && distance < radius).then_some((other, distance))
    })
}

pub fn cohesion(particle: &Particle, all: &[Particle]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for (other, _) in neighbors(particle, all, particle.behavior.cohesion_radius) {
        sum += other.position;
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    seek(particle, sum / count as f32)
}

pub fn separation(particle: &Particle, all: &[Particle]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for (other, distance) in neighbors(particle, all, particle.behavior.separation_radius) {
        let away = (particle.position - other.position) / distance;
        sum += away / distance;
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    steer_along(particle, sum / count as f32)
}

pub fn alignment(particle: &Particle, all: &[Particle]) -> Vec2 {
    let mut sum = Vec2::ZERO;
    let mut count = 0u32;
    for (other, _) in neighbors(particle, all, particle.behavior.alignment_radius) {
        sum += other.velocity;
        count += 1;
    }
    if count == 0 {
        return Vec2::ZERO;
    }
    steer_along(particle, sum / count as f32)
}

/// Nudge the persistent wander angle. Runs once per tick before forces.
pub fn advance_wander(particle: &mut Particle, rng: &mut Rng) {
    particle.behavior.wander_angle += rng.jitter(WANDER_JITTER);
}

/// Seek a point on a circle projected ahead of the particle.
pub fn wander(particle: &Particle) -> Vec2 {
    let heading = particle.velocity.try_normalize().unwrap_or(Vec2::X);
    let center = particle.position + heading * WANDER_DISTANCE;
    let offset = heading.rotate(Vec2::from_angle(particle.behavior.wander_angle)) * WANDER_RADIUS;
    seek(particle, center + offset)
}

/// Weighted sum of the four flocking behaviors.
pub fn flocking(particle: &Particle, all: &[Particle]) -> Vec2 {
    cohesion(particle, all) * COHESION_WEIGHT
        + separation(particle, all) * SEPARATION_WEIGHT
        + alignment(particle, all) * ALIGNMENT_WEIGHT
        + wander(particle) * WANDER_WEIGHT
}

/// Radial push (or pull while pressed) plus a speed-driven swirl.
pub fn pointer_force(particle: &Particle, pointer: &PointerState) -> Vec2 {
    if !pointer.present {
        return Vec2::ZERO;
    }
    let offset = particle.position - pointer.position;
    let distance = offset.length();
    let radius = pointer.influence_radius;
    if distance >= radius || distance <= f32::EPSILON {
        return Vec2::ZERO;
    }

    let dir = offset / distance;
    let falloff = 1.0 - distance / radius;
    let speed = pointer.speed();
    let radial = if pointer.is_down {
        -dir * POINTER_PULL * falloff
    } else {
        dir * POINTER_PUSH * falloff * (1.0 + speed * POINTER_SPEED_BOOST)
    };
    let vortex = dir.perp() * speed * POINTER_VORTEX * falloff;
    radial + vortex
}

/// Purely tangential force around an active hover focal point.
pub fn hover_force(particle: &Particle, hover: &HoverFocus) -> Vec2 {
    if !hover.active {
        return Vec2::ZERO;
    }
    let offset = particle.position - hover.position;
    let distance = offset.length();
    if distance >= HOVER_RADIUS || distance <= f32::EPSILON {
        return Vec2::ZERO;
    }
    (offset / distance).perp() * HOVER_STRENGTH * (1.0 - distance / HOVER_RADIUS)
}

/// Grid cell center for `id` when `count` particles form a 10-column grid.
pub fn disperse_target(id: usize, count: usize, viewport: Vec2) -> Vec2 {
    let rows = count.div_ceil(DISPERSE_COLUMNS).max(1);
    let col = id % DISPERSE_COLUMNS;
    let row = (id / DISPERSE_COLUMNS).min(rows - 1);
    let cell = Vec2::new(
        viewport.x / DISPERSE_COLUMNS as f32,
        viewport.y / rows as f32,
    );
    Vec2::new((col as f32 + 0.5) * cell.x, (row as f32 + 0.5) * cell.y)
}

/// Speed limit for the current transition progress.
pub fn speed_limit(particle: &Particle, disperse_amount: f32) -> f32 {
    particle.behavior.max_speed * (1.0 + DISPERSE_SPEED_BOOST * disperse_amount)
}

/// Pull toward the particle's grid cell, scaled by transition progress.
pub fn disperse_force(particle: &Particle, count: usize, viewport: Vec2, amount: f32) -> Vec2 {
    let target = disperse_target(particle.id, count, viewport);
    let offset = target - particle.position;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return -particle.velocity * DISPERSE_RESPONSE * amount;
    }
    let top_speed = speed_limit(particle, amount);
    let speed = top_speed * (distance / ARRIVAL_RADIUS).min(1.0);
    let desired = offset / distance * speed;
    (desired - particle.velocity) * DISPERSE_RESPONSE * amount
}

/// Total force for one particle this tick.
pub fn total_force(
    particle: &Particle,
    all: &[Particle],
    interaction: &InteractionState,
    viewport: Vec2,
) -> Vec2 {
    let amount = interaction.disperse_amount;
    if amount > 0.0 {
        return disperse_force(particle, all.len(), viewport, amount);
    }
    flocking(particle, all)
        + pointer_force(particle, &interaction.pointer)
        + hover_force(particle, &interaction.hover)
}

/// Apply `force`, drag and the speed clamp, then move and wrap.
pub fn integrate(particle: &mut Particle, force: Vec2, dt: f32, viewport: Vec2, disperse: f32) {
    particle.velocity += force * dt;
    particle.velocity *= DRAG;
    particle.velocity = particle
        .velocity
        .clamp_length_max(speed_limit(particle, disperse));
    particle.position += particle.velocity * dt * REFERENCE_FPS;
    particle.position.x = wrap_coordinate(particle.position.x, viewport.x, WRAP_MARGIN);
    particle.position.y = wrap_coordinate(particle.position.y, viewport.y, WRAP_MARGIN);
    particle.age += dt;
}

/// Cosmetic pulse of size and opacity around their base values.
pub fn breathe(particle: &mut Particle, time: f32, disperse: f32) {
    let size_wave = (time * BREATH_SIZE_RATE + particle.phase).sin();
    particle.size = particle.base_size * (1.0 + BREATH_SIZE_AMPLITUDE * size_wave);

    let opacity_wave = (time * BREATH_OPACITY_RATE + particle.phase).sin();
    let fade = 1.0 - DISPERSE_FADE * disperse;
    particle.opacity =
        (particle.base_opacity * (1.0 + BREATH_OPACITY_AMPLITUDE * opacity_wave) * fade)
            .clamp(0.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::particle::SteeringParams;
    use glam::Vec3;

    fn particle_at(id: usize, x: f32, y: f32) -> Particle {
        Particle {
            id,
            position: Vec2::new(x, y),
            velocity: Vec2::ZERO,
            size: 2.0,
            base_size: 2.0,
            opacity: 0.5,
            base_opacity: 0.5,
            phase: 0.0,
            behavior: SteeringParams {
                wander_angle: 0.0,
                cohesion_radius: 80.0,
                separation_radius: 30.0,
                alignment_radius: 60.0,
                max_speed: 1.0,
                max_force: 0.05,
            },
            color: Vec3::ONE,
            target_color: Vec3::ONE,
            age: 0.0,
        }
    }

    #[test]
    fn test_seek_points_at_target() {
        let p = particle_at(0, 0.0, 0.0);
        let force = seek(&p, Vec2::new(500.0, 0.0));
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6);
        assert!(force.length() <= p.behavior.max_force + 1e-6);
    }

    #[test]
    fn test_seek_arrival_slows_down() {
        let mut p = particle_at(0, 0.0, 0.0);
        p.behavior.max_force = 10.0;
        let far = seek(&p, Vec2::new(500.0, 0.0));
        let near = seek(&p, Vec2::new(10.0, 0.0));
        assert!((far.x - 1.0).abs() < 1e-5);
        assert!((near.x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_cohesion_without_neighbors_is_zero() {
        let all = vec![particle_at(0, 0.0, 0.0), particle_at(1, 500.0, 500.0)];
        assert_eq!(cohesion(&all[0], &all), Vec2::ZERO);
    }

    #[test]
    fn test_cohesion_toward_centroid() {
        let all = vec![
            particle_at(0, 0.0, 0.0),
            particle_at(1, 40.0, 10.0),
            particle_at(2, 40.0, -10.0),
        ];
        let force = cohesion(&all[0], &all);
        assert!(force.x > 0.0);
        assert!(force.y.abs() < 1e-6);
    }

    #[test]
    fn test_separation_pushes_away() {
        let all = vec![particle_at(0, 0.0, 0.0), particle_at(1, 10.0, 0.0)];
        let force = separation(&all[0], &all);
        assert!(force.x < 0.0);
        assert!(force.length() <= all[0].behavior.max_force + 1e-6);
    }

    #[test]
    fn test_neighbor_radius_is_exclusive() {
        let all = vec![particle_at(0, 0.0, 0.0), particle_at(1, 30.0, 0.0)];
        // exactly at separation_radius: not a neighbor
        assert_eq!(separation(&all[0], &all), Vec2::ZERO);
    }

    #[test]
    fn test_alignment_matches_neighbor_heading() {
        let mut all = vec![particle_at(0, 0.0, 0.0), particle_at(1, 20.0, 0.0)];
        all[1].velocity = Vec2::new(0.0, 1.0);
        let force = alignment(&all[0], &all);
        assert!(force.y > 0.0);
        assert!(force.length() <= all[0].behavior.max_force + 1e-6);
    }

    #[test]
    fn test_wander_is_deterministic_for_fixed_angle() {
        let mut p = particle_at(0, 100.0, 100.0);
        p.velocity = Vec2::new(1.0, 0.0);
        assert_eq!(wander(&p), wander(&p));
        assert!(wander(&p).length() <= p.behavior.max_force + 1e-6);
    }

    #[test]
    fn test_pointer_pushes_when_released() {
        let p = particle_at(0, 110.0, 100.0);
        let pointer = PointerState {
            position: Vec2::new(100.0, 100.0),
            present: true,
            ..Default::default()
        };
        assert!(pointer_force(&p, &pointer).x > 0.0);
    }

    #[test]
    fn test_pointer_pulls_when_pressed() {
        let p = particle_at(0, 110.0, 100.0);
        let pointer = PointerState {
            position: Vec2::new(100.0, 100.0),
            present: true,
            is_down: true,
            ..Default::default()
        };
        assert!(pointer_force(&p, &pointer).x < 0.0);
    }

    #[test]
    fn test_pointer_vortex_needs_motion() {
        let p = particle_at(0, 110.0, 100.0);
        let still = PointerState {
            position: Vec2::new(100.0, 100.0),
            present: true,
            ..Default::default()
        };
        assert!(pointer_force(&p, &still).y.abs() < 1e-6);

        let moving = PointerState {
            velocity: Vec2::new(20.0, 0.0),
            ..still
        };
        assert!(pointer_force(&p, &moving).y.abs() > 0.0);
    }

    #[test]
    fn test_pointer_outside_radius_or_absent() {
        let p = particle_at(0, 400.0, 100.0);
        let pointer = PointerState {
            position: Vec2::new(100.0, 100.0),
            present: true,
            ..Default::default()
        };
        assert_eq!(pointer_force(&p, &pointer), Vec2::ZERO);

        let near = particle_at(0, 105.0, 100.0);
        let absent = PointerState { present: false, ..pointer };
        assert_eq!(pointer_force(&near, &absent), Vec2::ZERO);
    }

    #[test]
    fn test_hover_force_is_tangential() {
        let p = particle_at(0, 150.0, 100.0);
        let hover = HoverFocus {
            position: Vec2::new(100.0, 100.0),
            active: true,
        };
        let force = hover_force(&p, &hover);
        let radial = (p.position - hover.position).normalize();
        assert!(force.dot(radial).abs() < 1e-6);
        assert!(force.length() > 0.0);

        let inactive = HoverFocus { active: false, ..hover };
        assert_eq!(hover_force(&p, &inactive), Vec2::ZERO);
    }

    #[test]
    fn test_disperse_targets_form_ten_columns() {
        let viewport = Vec2::new(1000.0, 400.0);
        assert_eq!(disperse_target(0, 40, viewport), Vec2::new(50.0, 50.0));
        assert_eq!(disperse_target(9, 40, viewport), Vec2::new(950.0, 50.0));
        assert_eq!(disperse_target(10, 40, viewport), Vec2::new(50.0, 150.0));
        assert_eq!(disperse_target(39, 40, viewport), Vec2::new(950.0, 350.0));
    }

    #[test]
    fn test_disperse_bypasses_flocking() {
        let viewport = Vec2::new(1000.0, 400.0);
        let all = vec![particle_at(0, 500.0, 300.0), particle_at(1, 505.0, 300.0)];
        let state = InteractionState {
            disperse_amount: 1.0,
            ..Default::default()
        };
        let force = total_force(&all[0], &all, &state, viewport);
        let expected = disperse_force(&all[0], 2, viewport, 1.0);
        assert_eq!(force, expected);
        // target is cell (0, 0) at (50, 200)
        assert!(force.x < 0.0);
    }

    #[test]
    fn test_integrate_wraps_and_clamps() {
        let viewport = Vec2::new(100.0, 100.0);
        let mut p = particle_at(0, 119.9, 50.0);
        p.velocity = Vec2::new(5.0, 0.0);
        integrate(&mut p, Vec2::ZERO, 1.0 / 60.0, viewport, 0.0);
        assert!(p.velocity.length() <= p.behavior.max_speed + 1e-6);
        assert_eq!(p.position.x, -20.0);
        assert!((p.age - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_breathe_stays_near_base() {
        let mut p = particle_at(0, 0.0, 0.0);
        for step in 0..100 {
            breathe(&mut p, step as f32 * 0.1, 0.0);
            assert!((p.size - p.base_size).abs() <= p.base_size * 0.2 + 1e-5);
            assert!((p.opacity - p.base_opacity).abs() <= p.base_opacity * 0.2 + 1e-5);
        }
        breathe(&mut p, 0.0, 1.0);
        assert!(p.opacity < p.base_opacity);
    }
}
