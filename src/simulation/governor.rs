//! Frame-rate driven quality governor.
//!
//! Watches achieved FPS and steps the performance tier down when the frame
//! rate stays below a tier-specific floor for several consecutive samples.
//! Tiers never step back up on their own; recovery is an explicit call.

use std::fmt;

use super::particle::MAX_PARTICLES;

/// Consecutive low samples required before a downgrade.
pub const SUSTAIN_SAMPLES: u32 = 3;
/// Minimum seconds between two particle-count changes driven by FPS.
pub const RESIZE_COOLDOWN_SECS: f64 = 3.0;
/// Count multiplier applied while the page is hidden.
pub const HIDDEN_MULTIPLIER: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PerformanceTier {
    #[default]
    High,
    Medium,
    Low,
}

impl PerformanceTier {
    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Scale applied to the configured particle count.
    pub fn count_multiplier(&self) -> f32 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.8,
            Self::Low => 0.5,
        }
    }

    /// Screen area (px²) budgeted per particle.
    pub fn pixels_per_particle(&self) -> f32 {
        match self {
            Self::High => 8000.0,
            Self::Medium => 10000.0,
            Self::Low => 14000.0,
        }
    }

    /// FPS below which this tier steps down, if it can.
    pub fn downgrade_threshold(&self) -> Option<f32> {
        match self {
            Self::High => Some(45.0),
            Self::Medium => Some(25.0),
            Self::Low => None,
        }
    }

    /// Whether the companion renderer should spend on shadows and bloom.
    pub fn effects_enabled(&self) -> bool {
        matches!(self, Self::High)
    }

    fn next_lower(&self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Particle ceiling derived from viewport area for a tier.
pub fn max_by_screen_area(width: u32, height: u32, tier: PerformanceTier) -> usize {
    let area = width as f32 * height as f32;
    let by_area = (area / tier.pixels_per_particle()).floor() as usize;
    by_area.min(MAX_PARTICLES)
}

/// Target particle count for the given inputs. Always at least one.
pub fn target_count(
    configured: usize,
    width: u32,
    height: u32,
    tier: PerformanceTier,
    visible: bool,
) -> usize {
    let base = configured.min(max_by_screen_area(width, height, tier));
    let visibility = if visible { 1.0 } else { HIDDEN_MULTIPLIER };
    let scaled = (base as f32 * tier.count_multiplier() * visibility).floor() as usize;
    scaled.clamp(1, MAX_PARTICLES)
}

#[derive(Debug)]
pub struct PerformanceGovernor {
    tier: PerformanceTier,
    low_streak: u32,
    last_resize: Option<f64>,
    pending: bool,
    last_fps: Option<f32>,
}

impl Default for PerformanceGovernor {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceGovernor {
    pub fn new() -> Self {
        Self {
            tier: PerformanceTier::High,
            low_streak: 0,
            last_resize: None,
            pending: false,
            last_fps: None,
        }
    }

    pub fn tier(&self) -> PerformanceTier {
        self.tier
    }

    pub fn last_fps(&self) -> Option<f32> {
        self.last_fps
    }

    /// Feed one FPS sample. Returns true if the tier dropped.
    pub fn record_fps(&mut self, fps: f32) -> bool {
        if !fps.is_finite() || fps < 0.0 {
            log::warn!("Ignoring invalid FPS sample {fps}");
            return false;
        }
        self.last_fps = Some(fps);

        let Some(threshold) = self.tier.downgrade_threshold() else {
            return false;
        };
        if fps >= threshold {
            self.low_streak = 0;
            return false;
        }

        self.low_streak += 1;
        if self.low_streak < SUSTAIN_SAMPLES {
            return false;
        }

        let previous = self.tier;
        self.tier = previous.next_lower();
        self.low_streak = 0;
        self.pending = true;
        log::info!(
            "Performance tier {} -> {} (sustained {:.1} fps < {:.0})",
            previous,
            self.tier,
            fps,
            threshold
        );
        true
    }

    /// Force a tier, e.g. when the user asks for full quality again.
    pub fn set_tier(&mut self, tier: PerformanceTier) {
        if tier != self.tier {
            log::info!("Performance tier set to {}", tier);
            self.tier = tier;
            self.pending = true;
        }
        self.low_streak = 0;
    }

    pub fn reset_tier(&mut self) {
        self.set_tier(PerformanceTier::High);
    }

    /// Whether a tier change is waiting to be applied to the particle set.
    pub fn has_pending_resize(&self) -> bool {
        self.pending
    }

    /// Returns true once per tier change, no sooner than the cooldown after
    /// the previous applied resize.
    pub fn should_resize(&mut self, now: f64) -> bool {
        if !self.pending {
            return false;
        }
        if let Some(last) = self.last_resize {
            if now - last < RESIZE_COOLDOWN_SECS {
                return false;
            }
        }
        self.pending = false;
        self.last_resize = Some(now);
        true
    }

    /// Record a resize that happened for reasons other than FPS
    /// (viewport, visibility, configuration).
    pub fn note_resize(&mut self, now: f64) {
        self.last_resize = Some(now);
    }
}
