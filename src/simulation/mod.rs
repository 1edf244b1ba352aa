//! CPU side of the particle field.
//!
//! [`Simulation`] owns every piece of mutable state the field needs:
//! the particle array, interaction state, color, tier governor and the
//! transition animator. Each call to [`Simulation::step`] runs one tick in
//! a fixed order:
//!
//! 1. apply any pending tier-driven resize
//! 2. advance the transition tween
//! 3. ease the global color
//! 4. update every particle (forces are computed from the pre-tick
//!    snapshot before any particle moves)

pub mod color;
pub mod governor;
pub mod interaction;
pub mod particle;
pub mod rng;
pub mod steering;
pub mod tween;

pub use color::GlobalColor;
pub use governor::{PerformanceGovernor, PerformanceTier};
pub use interaction::{HoverFocus, InteractionState, InteractionTracker, PointerState};
pub use particle::{Particle, ParticleStore, ResizeKind, SteeringParams, MAX_PARTICLES, WRAP_MARGIN};
pub use tween::{Animator, Easing, Tween};

use glam::{Vec2, Vec3};

use crate::config::FieldConfig;
use rng::Rng;

/// Animator key for the wallpaper transition.
pub const DISPERSE_TWEEN: &str = "disperse";

pub struct Simulation {
    store: ParticleStore,
    tracker: InteractionTracker,
    color: GlobalColor,
    governor: PerformanceGovernor,
    animator: Animator,
    rng: Rng,
    width: u32,
    height: u32,
    visible: bool,
    configured_count: usize,
    transition_secs: f64,
    elapsed: f64,
    forces: Vec<Vec2>,
}

impl Simulation {
    pub fn new(config: &FieldConfig, width: u32, height: u32) -> Self {
        let config = config.clone().validated();
        let color = Vec3::from_array(config.initial_rgb());
        let mut sim = Self {
            store: ParticleStore::new(),
            tracker: InteractionTracker::new(config.influence_radius),
            color: GlobalColor::new(color),
            governor: PerformanceGovernor::new(),
            animator: Animator::new(),
            rng: Rng::new(config.seed),
            width: width.max(1),
            height: height.max(1),
            visible: true,
            configured_count: config.particle_count,
            transition_secs: config.transition_secs,
            elapsed: 0.0,
            forces: Vec::new(),
        };
        let target = sim.target_count();
        let viewport = sim.viewport();
        sim.store.populate(target, viewport, color, &mut sim.rng);
        sim
    }

    // ==================== Inbound events ====================

    /// New viewport size in device pixels. Zero-sized viewports are ignored.
    pub fn resize(&mut self, width: u32, height: u32, now: f64) -> ResizeKind {
        if width == 0 || height == 0 {
            log::warn!("Ignoring zero-sized viewport {}x{}", width, height);
            return ResizeKind::Unchanged;
        }
        let old_viewport = self.viewport();
        self.width = width;
        self.height = height;
        self.governor.note_resize(now);
        let kind = self.apply_target_count();
        if kind != ResizeKind::Reinitialized {
            self.store.rescale(old_viewport, self.viewport());
        }
        kind
    }

    pub fn set_visible(&mut self, visible: bool, now: f64) -> ResizeKind {
        if self.visible == visible {
            return ResizeKind::Unchanged;
        }
        self.visible = visible;
        self.governor.note_resize(now);
        self.apply_target_count()
    }

    pub fn apply_config(&mut self, config: &FieldConfig, now: f64) -> ResizeKind {
        let config = config.clone().validated();
        self.tracker.set_influence_radius(config.influence_radius);
        self.transition_secs = config.transition_secs;
        if config.particle_count == self.configured_count {
            return ResizeKind::Unchanged;
        }
        self.configured_count = config.particle_count;
        self.governor.note_resize(now);
        self.apply_target_count()
    }

    pub fn set_target_color(&mut self, rgb: [f32; 3]) {
        self.color.set_target(rgb);
    }

    pub fn record_fps(&mut self, fps: f32) -> bool {
        self.governor.record_fps(fps)
    }

    pub fn set_tier(&mut self, tier: PerformanceTier) {
        self.governor.set_tier(tier);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.tracker.pointer_moved(x, y);
    }

    pub fn set_pointer_down(&mut self, down: bool) {
        self.tracker.set_pointer_down(down);
    }

    pub fn pointer_left(&mut self) {
        self.tracker.pointer_left();
    }

    pub fn set_hover(&mut self, x: f32, y: f32, active: bool) {
        self.tracker.set_hover(x, y, active);
    }

    /// Start the disperse ramp 0 → 1 → 0. A trigger during a running
    /// transition is ignored so the ramp never jumps.
    pub fn trigger_transition(&mut self, now: f64) -> bool {
        if self.animator.is_active(DISPERSE_TWEEN) {
            log::debug!("Transition already running, ignoring trigger");
            return false;
        }
        let tween = Tween::new(now, self.transition_secs, 0.0, 1.0)
            .with_easing(Easing::EaseInOutCubic)
            .auto_reverse(true);
        self.animator.start(DISPERSE_TWEEN, tween);
        true
    }

    // ==================== Tick ====================

    /// Advance one tick of `dt` seconds ending at absolute time `now`.
    pub fn step(&mut self, dt: f32, now: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        if self.governor.should_resize(now) {
            self.apply_target_count();
        }

        self.animator.update(now);
        let disperse = self.animator.value(DISPERSE_TWEEN).unwrap_or(0.0);
        self.tracker.set_disperse_amount(disperse);

        self.color.step();

        self.elapsed += dt as f64;
        self.update_particles(dt);
        self.tracker.decay();
    }

    fn update_particles(&mut self, dt: f32) {
        let viewport = self.viewport();
        let interaction = *self.tracker.state();
        let disperse = interaction.disperse_amount;

        for particle in self.store.as_mut_slice() {
            steering::advance_wander(particle, &mut self.rng);
        }

        let snapshot = self.store.as_slice();
        self.forces.clear();
        self.forces.extend(
            snapshot
                .iter()
                .map(|p| steering::total_force(p, snapshot, &interaction, viewport)),
        );

        let time = self.elapsed as f32;
        for (particle, force) in self.store.as_mut_slice().iter_mut().zip(&self.forces) {
            steering::integrate(particle, *force, dt, viewport, disperse);
            color::follow_global(particle, &self.color);
            steering::breathe(particle, time, disperse);
        }
    }

    fn apply_target_count(&mut self) -> ResizeKind {
        let target = self.target_count();
        let viewport = self.viewport();
        let kind = self
            .store
            .resize_to(target, viewport, self.color.current, &mut self.rng);
        if kind != ResizeKind::Unchanged {
            log::debug!("Particle count -> {} ({:?})", self.store.len(), kind);
        }
        kind
    }

    // ==================== Accessors ====================

    pub fn target_count(&self) -> usize {
        governor::target_count(
            self.configured_count,
            self.width,
            self.height,
            self.governor.tier(),
            self.visible,
        )
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn tier(&self) -> PerformanceTier {
        self.governor.tier()
    }

    pub fn governor(&self) -> &PerformanceGovernor {
        &self.governor
    }

    pub fn interaction(&self) -> &InteractionState {
        self.tracker.state()
    }

    pub fn global_color(&self) -> &GlobalColor {
        &self.color
    }

    pub fn disperse_amount(&self) -> f32 {
        self.tracker.state().disperse_amount
    }

    pub fn is_transitioning(&self) -> bool {
        self.animator.is_active(DISPERSE_TWEEN)
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}
