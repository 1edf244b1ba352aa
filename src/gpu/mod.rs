//! GPU rendering using wgpu.
//!
//! Particles are drawn as instanced quads, one triangle strip per particle,
//! with a soft-disc fragment stage and alpha blending. Per-particle data
//! lives in five persistent vertex buffers that grow on demand. Context
//! creation falls back from the primary backends to GL, and the shader is
//! validated with naga before any pipeline is built.

pub mod attributes;
pub mod buffers;
pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod shader;
pub mod textures;

pub use attributes::{FrameUniforms, ParticleAttributes};
pub use context::{BackendTier, GpuContext, GpuError};
pub use pipeline::ParticlePipeline;
pub use renderer::{save_png, ParticleRenderer, RenderError, TARGET_FORMAT};
