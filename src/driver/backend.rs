//! The seam between the driver and whatever puts pixels on screen.

use crate::gpu::{FrameUniforms, GpuError, ParticleAttributes, ParticleRenderer, RenderError};

/// Operations the driver needs from a renderer.
pub trait RenderBackend {
    fn resize(&mut self, width: u32, height: u32);

    fn upload(&mut self, attributes: &ParticleAttributes) -> Result<(), RenderError>;

    fn draw(&mut self, uniforms: &FrameUniforms) -> Result<(), RenderError>;

    /// True once the underlying device has gone away.
    fn is_context_lost(&self) -> bool;

    /// Free every resource. Must tolerate repeated calls.
    fn release(&mut self);

    fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::Unsupported)
    }

    /// Size of the pixels `read_pixels` returns, when it differs from the
    /// requested viewport.
    fn target_size(&self) -> Option<(u32, u32)> {
        None
    }
}

/// Builds a backend for a viewport. Called at startup and again after a
/// context loss.
pub type BackendFactory = Box<dyn FnMut(u32, u32) -> Result<Box<dyn RenderBackend>, GpuError>>;

impl RenderBackend for ParticleRenderer {
    fn resize(&mut self, width: u32, height: u32) {
        ParticleRenderer::resize(self, width, height);
    }

    fn upload(&mut self, attributes: &ParticleAttributes) -> Result<(), RenderError> {
        ParticleRenderer::upload(self, attributes)
    }

    fn draw(&mut self, uniforms: &FrameUniforms) -> Result<(), RenderError> {
        ParticleRenderer::draw(self, uniforms)
    }

    fn is_context_lost(&self) -> bool {
        ParticleRenderer::is_context_lost(self)
    }

    fn release(&mut self) {
        ParticleRenderer::release(self);
    }

    fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        ParticleRenderer::read_pixels(self)
    }

    fn target_size(&self) -> Option<(u32, u32)> {
        Some(self.size())
    }
}

/// Factory for the wgpu renderer, blocking on device creation.
pub fn gpu_backend_factory() -> BackendFactory {
    Box::new(|width, height| {
        let renderer = pollster::block_on(ParticleRenderer::new(width, height))?;
        log::info!(
            "Particle renderer ready on {}",
            renderer.adapter_info().name
        );
        Ok(Box::new(renderer) as Box<dyn RenderBackend>)
    })
}
