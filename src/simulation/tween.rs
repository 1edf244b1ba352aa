//! Small time-based tween library.
//!
//! Each active tween is plain data keyed by name in an [`Animator`]; one
//! sweep per tick samples every tween against the current time. Sampling
//! uses absolute time, so a tween completes on schedule regardless of how
//! many frames were rendered in between.

use std::collections::HashMap;
use std::f32::consts::PI;

/// Named easing curves mapping normalized time in [0, 1] to progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInOutCubic,
    EaseInOutSine,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => t * (2.0 - t),
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let f = -2.0 * t + 2.0;
                    1.0 - f * f * f / 2.0
                }
            }
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// One scalar animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// Seconds, on the same clock passed to [`Tween::sample`].
    pub start_time: f64,
    /// Seconds for one from→to leg. Must be positive.
    pub duration: f64,
    pub easing: Easing,
    pub from: f32,
    pub to: f32,
    /// Restart indefinitely instead of finishing.
    pub looping: bool,
    /// Play to→from after from→to before finishing or looping.
    pub auto_reverse: bool,
}

impl Tween {
    pub fn new(start_time: f64, duration: f64, from: f32, to: f32) -> Self {
        Self {
            start_time,
            duration: duration.max(f64::EPSILON),
            easing: Easing::Linear,
            from,
            to,
            looping: false,
            auto_reverse: false,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    /// Length of one full cycle, including the reverse leg.
    pub fn cycle_duration(&self) -> f64 {
        if self.auto_reverse {
            self.duration * 2.0
        } else {
            self.duration
        }
    }

    /// Value at `now`, and whether the tween has finished.
    pub fn sample(&self, now: f64) -> (f32, bool) {
        let elapsed = (now - self.start_time).max(0.0);
        let cycle = self.cycle_duration();

        let (position, finished) = if self.looping {
            (elapsed % cycle, false)
        } else if elapsed >= cycle {
            (cycle, true)
        } else {
            (elapsed, false)
        };

        let t = if self.auto_reverse && position > self.duration {
            (cycle - position) / self.duration
        } else {
            position / self.duration
        };
        let eased = self.easing.apply(t as f32);
        (self.from + (self.to - self.from) * eased, finished)
    }
}

/// Active tweens keyed by name plus their last sampled values.
#[derive(Debug, Default)]
pub struct Animator {
    active: HashMap<String, Tween>,
    values: HashMap<String, f32>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or replace) the tween called `name`.
    pub fn start(&mut self, name: &str, tween: Tween) {
        self.values
            .insert(name.to_string(), tween.sample(tween.start_time).0);
        self.active.insert(name.to_string(), tween);
    }

    pub fn cancel(&mut self, name: &str) -> bool {
        self.active.remove(name).is_some()
    }

    /// Sample every active tween at `now`; finished tweens are dropped
    /// after recording their final value.
    pub fn update(&mut self, now: f64) {
        let values = &mut self.values;
        self.active.retain(|name, tween| {
            let (value, finished) = tween.sample(now);
            values.insert(name.clone(), value);
            !finished
        });
    }

    /// Last sampled value for `name`, if it was ever started.
    pub fn value(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::EaseInQuad,
            Easing::EaseOutQuad,
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutSine,
        ] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_linear_tween_midpoint() {
        let tween = Tween::new(10.0, 2.0, 0.0, 4.0);
        assert_eq!(tween.sample(11.0), (2.0, false));
        assert_eq!(tween.sample(12.5), (4.0, true));
        assert_eq!(tween.sample(5.0), (0.0, false));
    }

    #[test]
    fn test_auto_reverse_returns_to_start() {
        let tween = Tween::new(0.0, 1.0, 0.0, 1.0).auto_reverse(true);
        assert_eq!(tween.sample(1.0), (1.0, false));
        assert_eq!(tween.sample(1.5), (0.5, false));
        assert_eq!(tween.sample(2.0), (0.0, true));
    }

    #[test]
    fn test_looping_never_finishes() {
        let tween = Tween::new(0.0, 1.0, 0.0, 1.0).looping(true);
        let (value, finished) = tween.sample(3.25);
        assert!(!finished);
        assert!((value - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_animator_keeps_final_value() {
        let mut animator = Animator::new();
        animator.start("fade", Tween::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(animator.value("fade"), Some(0.0));
        animator.update(0.5);
        assert_eq!(animator.value("fade"), Some(0.5));
        assert!(animator.is_active("fade"));
        animator.update(2.0);
        assert_eq!(animator.value("fade"), Some(1.0));
        assert!(!animator.is_active("fade"));
        assert_eq!(animator.active_count(), 0);
        assert_eq!(animator.value("missing"), None);
    }
}
