//! Particle Field
//!
//! Interactive flocking particle background rendered with wgpu.
//!
//! # Features
//!
//! - Reynolds-style steering (cohesion, separation, alignment, wander)
//! - Pointer push/pull with a velocity-driven vortex, and a hover swirl
//! - Wallpaper transition that scatters particles into a grid and back
//! - Frame-rate governor that steps quality down under sustained load
//! - Instanced soft-disc rendering with backend fallback (primary, then GL)
//!
//! The embedder creates a [`ParticleField`], forwards input events to it,
//! and calls [`ParticleField::frame`] once per display refresh.

pub mod config;
pub mod driver;
pub mod gpu;
pub mod simulation;

// Re-export commonly used types
pub use config::{parse_hex_color, ConfigError, FieldConfig};
pub use driver::{
    gpu_backend_factory, BackendFactory, FrameStatus, LifecycleState, ParticleField, RenderBackend,
};
pub use gpu::{FrameUniforms, GpuContext, GpuError, ParticleAttributes, ParticleRenderer, RenderError};
pub use simulation::{
    Easing, GlobalColor, InteractionState, Particle, PerformanceTier, Simulation, Tween,
    MAX_PARTICLES,
};
