//! Pointer and hover state fed by host events.
//!
//! Events arrive between frames and simply overwrite the latest values;
//! the next tick reads whatever is current. Pointer velocity is estimated
//! from successive move events and decays every tick so a resting pointer
//! stops stirring the field.

use glam::Vec2;

/// Default pointer influence radius in pixels.
pub const DEFAULT_INFLUENCE_RADIUS: f32 = 150.0;

/// Per-tick multiplier applied to the estimated pointer velocity.
const VELOCITY_DECAY: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub is_down: bool,
    /// Whether the pointer is over the page at all.
    pub present: bool,
    /// Pixels moved per event, decayed per tick.
    pub velocity: Vec2,
    pub influence_radius: f32,
}

impl PointerState {
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            is_down: false,
            present: false,
            velocity: Vec2::ZERO,
            influence_radius: DEFAULT_INFLUENCE_RADIUS,
        }
    }
}

/// Focal point reported by hovered UI elements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverFocus {
    pub position: Vec2,
    pub active: bool,
}

/// Snapshot read by the steering engine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    pub pointer: PointerState,
    pub hover: HoverFocus,
    /// Wallpaper transition progress in [0, 1]; 0 means normal steering.
    pub disperse_amount: f32,
}

/// Accumulates pointer/hover events into an [`InteractionState`].
#[derive(Debug, Default)]
pub struct InteractionTracker {
    state: InteractionState,
}

impl InteractionTracker {
    pub fn new(influence_radius: f32) -> Self {
        let mut tracker = Self::default();
        tracker.set_influence_radius(influence_radius);
        tracker
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let next = Vec2::new(x, y);
        if !next.is_finite() {
            log::warn!("Ignoring non-finite pointer position ({x}, {y})");
            return;
        }
        let pointer = &mut self.state.pointer;
        pointer.velocity = if pointer.present {
            next - pointer.position
        } else {
            Vec2::ZERO
        };
        pointer.position = next;
        pointer.present = true;
    }

    pub fn set_pointer_down(&mut self, down: bool) {
        self.state.pointer.is_down = down;
    }

    pub fn pointer_left(&mut self) {
        let pointer = &mut self.state.pointer;
        pointer.present = false;
        pointer.is_down = false;
        pointer.velocity = Vec2::ZERO;
    }

    pub fn set_influence_radius(&mut self, radius: f32) {
        if radius.is_finite() && radius > 0.0 {
            self.state.pointer.influence_radius = radius;
        }
    }

    pub fn set_hover(&mut self, x: f32, y: f32, active: bool) {
        let position = Vec2::new(x, y);
        if active && !position.is_finite() {
            log::warn!("Ignoring non-finite hover position ({x}, {y})");
            return;
        }
        self.state.hover = HoverFocus { position, active };
    }

    pub fn set_disperse_amount(&mut self, amount: f32) {
        self.state.disperse_amount = if amount.is_finite() {
            amount.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Per-tick decay of transient pointer motion.
    pub fn decay(&mut self) {
        let pointer = &mut self.state.pointer;
        pointer.velocity *= VELOCITY_DECAY;
        if pointer.velocity.length_squared() < 1e-6 {
            pointer.velocity = Vec2::ZERO;
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_has_no_velocity() {
        let mut tracker = InteractionTracker::new(150.0);
        tracker.pointer_moved(100.0, 100.0);
        assert!(tracker.state().pointer.present);
        assert_eq!(tracker.state().pointer.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_velocity_from_successive_moves() {
        let mut tracker = InteractionTracker::new(150.0);
        tracker.pointer_moved(100.0, 100.0);
        tracker.pointer_moved(110.0, 95.0);
        assert_eq!(tracker.state().pointer.velocity, Vec2::new(10.0, -5.0));
    }

    #[test]
    fn test_velocity_decays_to_zero() {
        let mut tracker = InteractionTracker::new(150.0);
        tracker.pointer_moved(0.0, 0.0);
        tracker.pointer_moved(30.0, 0.0);
        let mut last = tracker.state().pointer.speed();
        for _ in 0..200 {
            tracker.decay();
            let speed = tracker.state().pointer.speed();
            assert!(speed <= last);
            last = speed;
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_pointer_left_clears_press() {
        let mut tracker = InteractionTracker::new(150.0);
        tracker.pointer_moved(5.0, 5.0);
        tracker.set_pointer_down(true);
        tracker.pointer_left();
        let pointer = tracker.state().pointer;
        assert!(!pointer.present);
        assert!(!pointer.is_down);
    }

    #[test]
    fn test_disperse_amount_clamped() {
        let mut tracker = InteractionTracker::default();
        tracker.set_disperse_amount(1.7);
        assert_eq!(tracker.state().disperse_amount, 1.0);
        tracker.set_disperse_amount(f32::NAN);
        assert_eq!(tracker.state().disperse_amount, 0.0);
    }

    #[test]
    fn test_invalid_radius_ignored() {
        let mut tracker = InteractionTracker::new(-1.0);
        assert_eq!(tracker.state().pointer.influence_radius, DEFAULT_INFLUENCE_RADIUS);
    }
}
