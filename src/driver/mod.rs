//! Render loop driver and the public handle embedders hold.
//!
//! The host owns scheduling: it calls [`ParticleField::frame`] once per
//! display refresh and stops when the returned [`FrameStatus`] says so.
//! Every other method is an inbound event that mutates state read by the
//! next frame. Nothing here returns an error to the host; failures are
//! logged and show up as a [`LifecycleState`] or a skipped frame.

pub mod backend;
pub mod clock;

pub use backend::{gpu_backend_factory, BackendFactory, RenderBackend};
pub use clock::{FrameClock, Tick};

use std::fmt;
use std::path::Path;

use crate::config::{parse_hex_color, FieldConfig};
use crate::gpu::{save_png, FrameUniforms, GpuError, ParticleAttributes, RenderError};
use crate::simulation::{Particle, PerformanceTier, Simulation, MAX_PARTICLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No renderer yet; the next frame tries to create one.
    Uninitialized,
    Initializing,
    Running,
    /// No usable GPU. Frames are refused until the field is dropped.
    Disabled,
    Disposed,
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Disabled => "disabled",
            Self::Disposed => "disposed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one [`ParticleField::frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Rendered,
    /// Simulation ran but nothing was drawn this frame. Retry next frame.
    Skipped,
    /// The field can't render here; stop scheduling frames.
    Disabled,
    /// The field was destroyed; stop scheduling frames.
    Stopped,
}

impl FrameStatus {
    /// Whether the host should schedule another frame.
    pub fn should_continue(&self) -> bool {
        matches!(self, Self::Rendered | Self::Skipped)
    }
}

/// An interactive particle background bound to one viewport.
pub struct ParticleField {
    config: FieldConfig,
    sim: Simulation,
    attributes: ParticleAttributes,
    backend: Option<Box<dyn RenderBackend>>,
    factory: BackendFactory,
    state: LifecycleState,
    clock: FrameClock,
    host_fps: bool,
    reinit_count: u32,
}

impl ParticleField {
    /// Field rendered with wgpu. The device is created on the first frame
    /// or on an explicit [`ParticleField::initialize`].
    pub fn new(config: FieldConfig, width: u32, height: u32) -> Self {
        Self::with_backend_factory(config, width, height, gpu_backend_factory())
    }

    pub fn with_backend_factory(
        config: FieldConfig,
        width: u32,
        height: u32,
        factory: BackendFactory,
    ) -> Self {
        let config = config.validated();
        let sim = Simulation::new(&config, width, height);
        Self {
            config,
            sim,
            attributes: ParticleAttributes::with_capacity(MAX_PARTICLES),
            backend: None,
            factory,
            state: LifecycleState::Uninitialized,
            clock: FrameClock::new(),
            host_fps: false,
            reinit_count: 0,
        }
    }

    /// Create the renderer now instead of on the first frame.
    pub fn initialize(&mut self) -> LifecycleState {
        if self.state == LifecycleState::Uninitialized {
            self.try_initialize();
        }
        self.state
    }

    fn try_initialize(&mut self) -> bool {
        self.state = LifecycleState::Initializing;
        let (width, height) = self.sim.size();
        match (self.factory)(width, height) {
            Ok(backend) => {
                self.backend = Some(backend);
                self.state = LifecycleState::Running;
                log::info!("Particle field running at {}x{}", width, height);
                true
            }
            Err(GpuError::Shader(diagnostic)) => {
                log::error!("Particle shader rejected:\n{}", diagnostic);
                self.state = LifecycleState::Disabled;
                false
            }
            Err(e) => {
                log::warn!("Particle field disabled: {}", e);
                self.state = LifecycleState::Disabled;
                false
            }
        }
    }

    fn teardown(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.release();
        }
    }

    // ==================== Render loop ====================

    /// Run one simulation tick and draw it. `now` is a monotonic host
    /// timestamp in seconds.
    pub fn frame(&mut self, now: f64) -> FrameStatus {
        match self.state {
            LifecycleState::Disposed => return FrameStatus::Stopped,
            LifecycleState::Disabled => return FrameStatus::Disabled,
            LifecycleState::Uninitialized | LifecycleState::Initializing => {
                if !self.try_initialize() {
                    return FrameStatus::Disabled;
                }
            }
            LifecycleState::Running => {}
        }

        if self.backend.as_ref().is_some_and(|b| b.is_context_lost()) {
            log::warn!("GPU context lost, reinitializing particle renderer");
            self.teardown();
            self.reinit_count += 1;
            if !self.try_initialize() {
                return FrameStatus::Disabled;
            }
        }

        let Some(tick) = self.clock.tick(now) else {
            log::debug!("Ignoring non-monotonic frame timestamp {}", now);
            return FrameStatus::Skipped;
        };

        if let Some(fps) = tick.fps_sample {
            if !self.host_fps {
                self.sim.record_fps(fps);
            }
        }
        self.sim.step(tick.dt, tick.time);
        self.attributes.fill_from(self.sim.particles());

        let (width, height) = self.sim.size();
        let uniforms = FrameUniforms::new(
            width,
            height,
            self.sim.elapsed() as f32,
            self.config.opacity,
            self.sim.is_visible(),
        );

        let Some(backend) = self.backend.as_mut() else {
            return FrameStatus::Disabled;
        };
        if let Err(e) = backend.upload(&self.attributes) {
            log::debug!("Skipping frame, upload failed: {}", e);
            return FrameStatus::Skipped;
        }
        if let Err(e) = backend.draw(&uniforms) {
            log::debug!("Skipping frame, draw failed: {}", e);
            return FrameStatus::Skipped;
        }
        FrameStatus::Rendered
    }

    /// Release the renderer and stop the loop. Safe to call repeatedly and
    /// before initialization.
    pub fn destroy(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        self.teardown();
        self.state = LifecycleState::Disposed;
        log::info!("Particle field disposed");
    }

    // ==================== Inbound events ====================

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring zero-sized viewport {}x{}", width, height);
            return;
        }
        self.sim.resize(width, height, self.clock.time());
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
    }

    /// Ease the particle tint toward a `#rrggbb` color.
    pub fn set_dominant_color(&mut self, hex: &str) {
        match parse_hex_color(hex) {
            Some(rgb) => self.sim.set_target_color(rgb),
            None => log::warn!("Ignoring invalid dominant color {:?}", hex),
        }
    }

    /// Report a frame rate measured by the host. Once called, the field
    /// stops sampling its own frame rate.
    pub fn update_fps(&mut self, fps: f32) {
        if !self.host_fps {
            log::debug!("Host reports FPS, disabling internal sampling");
            self.host_fps = true;
        }
        self.sim.record_fps(fps);
    }

    pub fn set_bookmark_hover(&mut self, x: f32, y: f32, active: bool) {
        self.sim.set_hover(x, y, active);
    }

    /// Scatter particles into a grid and bring them back.
    pub fn trigger_wallpaper_change(&mut self) {
        self.sim.trigger_transition(self.clock.time());
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.sim.pointer_moved(x, y);
    }

    pub fn set_pointer_down(&mut self, down: bool) {
        self.sim.set_pointer_down(down);
    }

    pub fn pointer_left(&mut self) {
        self.sim.pointer_left();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.sim.set_visible(visible, self.clock.time());
    }

    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = config.validated();
        self.sim.apply_config(&self.config, self.clock.time());
    }

    /// Return to the high tier after the host decides conditions improved.
    pub fn reset_tier(&mut self) {
        self.sim.set_tier(PerformanceTier::High);
    }

    pub fn set_tier(&mut self, tier: PerformanceTier) {
        self.sim.set_tier(tier);
    }

    // ==================== Accessors ====================

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn particle_count(&self) -> usize {
        self.sim.particle_count()
    }

    pub fn tier(&self) -> PerformanceTier {
        self.sim.tier()
    }

    pub fn particles(&self) -> &[Particle] {
        self.sim.particles()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// How many times the renderer was rebuilt after a context loss.
    pub fn reinit_count(&self) -> u32 {
        self.reinit_count
    }

    /// RGBA8 pixels of the last drawn frame.
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        self.backend
            .as_ref()
            .ok_or(RenderError::NoRenderer)?
            .read_pixels()
    }

    /// Write the last drawn frame to a PNG file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let pixels = self.read_pixels()?;
        let (width, height) = self
            .backend
            .as_ref()
            .and_then(|b| b.target_size())
            .unwrap_or(self.sim.size());
        save_png(path, width, height, pixels)
    }
}

impl Drop for ParticleField {
    fn drop(&mut self) {
        self.teardown();
    }
}
