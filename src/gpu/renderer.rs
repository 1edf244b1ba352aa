//! Headless particle renderer.

use std::path::Path;

use wgpu::{TextureFormat, TextureView};

use super::{
    attributes::{FrameUniforms, ParticleAttributes},
    buffers::{ParticleBuffers, INITIAL_CAPACITY},
    context::{GpuContext, GpuError},
    pipeline::ParticlePipeline,
    textures::{clamp_to_limit, ReadbackBuffer, RenderTarget},
};

/// Format of the offscreen target.
pub const TARGET_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Per-frame rendering failures. None of these are fatal to the host.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("GPU context lost")]
    ContextLost,
    #[error("Renderer already released")]
    Released,
    #[error("Pixel readback failed: {0}")]
    Readback(String),
    #[error("Pixel readback not supported by this backend")]
    Unsupported,
    #[error("No renderer available")]
    NoRenderer,
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Draws the particle set as instanced quads into an offscreen target.
pub struct ParticleRenderer {
    ctx: GpuContext,
    pipeline: ParticlePipeline,
    buffers: ParticleBuffers,
    target: RenderTarget,
    instance_count: usize,
    released: bool,
}

impl ParticleRenderer {
    /// Create a renderer on the best available backend.
    pub async fn new(width: u32, height: u32) -> Result<Self, GpuError> {
        let ctx = GpuContext::new().await?;
        Self::with_context(ctx, width, height)
    }

    pub fn with_context(ctx: GpuContext, width: u32, height: u32) -> Result<Self, GpuError> {
        let pipeline = ParticlePipeline::new(&ctx.device, TARGET_FORMAT)?;
        let buffers = ParticleBuffers::new(&ctx.device, INITIAL_CAPACITY);
        let (width, height) = target_size(&ctx, width, height);
        let target =
            RenderTarget::for_output(&ctx.device, "particle_target", width, height, TARGET_FORMAT);

        Ok(Self {
            ctx,
            pipeline,
            buffers,
            target,
            instance_count: 0,
            released: false,
        })
    }

    fn ensure_usable(&self) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Released);
        }
        if self.ctx.is_lost() {
            return Err(RenderError::ContextLost);
        }
        Ok(())
    }

    /// Recreate the offscreen target at a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = target_size(&self.ctx, width, height);
        if self.released || self.target.size() == size {
            return;
        }
        self.target.destroy();
        self.target =
            RenderTarget::for_output(&self.ctx.device, "particle_target", size.0, size.1, TARGET_FORMAT);
    }

    /// Push this frame's attributes to the GPU.
    pub fn upload(&mut self, attributes: &ParticleAttributes) -> Result<(), RenderError> {
        self.ensure_usable()?;
        self.buffers.ensure_capacity(&self.ctx.device, attributes.len());
        self.buffers.write(&self.ctx.queue, attributes);
        self.instance_count = attributes.len();
        Ok(())
    }

    /// Draw the uploaded particles into the offscreen target.
    pub fn draw(&mut self, uniforms: &FrameUniforms) -> Result<(), RenderError> {
        self.ensure_usable()?;
        self.submit_pass(self.target.view(), uniforms);
        Ok(())
    }

    /// Draw the uploaded particles into a host-provided view, e.g. a
    /// surface texture. The view must use [`TARGET_FORMAT`].
    pub fn draw_to_view(&self, view: &TextureView, uniforms: &FrameUniforms) -> Result<(), RenderError> {
        self.ensure_usable()?;
        self.submit_pass(view, uniforms);
        Ok(())
    }

    fn submit_pass(&self, view: &TextureView, uniforms: &FrameUniforms) {
        self.ctx.queue.write_buffer(
            &self.pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(uniforms),
        );

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("particle_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particle_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if self.instance_count > 0 {
                render_pass.set_pipeline(&self.pipeline.pipeline);
                render_pass.set_bind_group(0, &self.pipeline.bind_group, &[]);
                self.buffers.bind(&mut render_pass, self.instance_count);
                // 4 vertices per particle (triangle strip quad)
                render_pass.draw(0..4, 0..self.instance_count as u32);
            }
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copy the offscreen target back as RGBA8 rows.
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        self.ensure_usable()?;
        let (width, height) = self.target.size();
        let readback = ReadbackBuffer::new(&self.ctx.device, width, height)?;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        readback.copy_from(&mut encoder, &self.target);
        self.ctx.queue.submit(std::iter::once(encoder.finish()));

        readback.read_pixels(&self.ctx.device)
    }

    /// Free GPU resources now. Later calls are no-ops, and every other
    /// operation returns [`RenderError::Released`] afterwards.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.buffers.destroy();
        self.target.destroy();
        self.pipeline.uniform_buffer.destroy();
        self.instance_count = 0;
        self.released = true;
        log::debug!("Particle renderer released");
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_context_lost(&self) -> bool {
        self.ctx.is_lost()
    }

    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffers.capacity()
    }

    pub fn size(&self) -> (u32, u32) {
        self.target.size()
    }

    pub fn context(&self) -> &GpuContext {
        &self.ctx
    }

    /// Get GPU adapter info.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.ctx.adapter_info()
    }
}

/// Requested size clamped to what the device can allocate as a texture.
fn target_size(ctx: &GpuContext, width: u32, height: u32) -> (u32, u32) {
    let max = ctx.device.limits().max_texture_dimension_2d;
    let size = clamp_to_limit(width, height, max);
    if size != (width.max(1), height.max(1)) {
        log::warn!(
            "Viewport {}x{} exceeds the {} px texture limit, rendering at {}x{}",
            width,
            height,
            max,
            size.0,
            size.1
        );
    }
    size
}

/// Write RGBA8 pixels to a PNG file.
pub fn save_png<P: AsRef<Path>>(
    path: P,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
) -> Result<(), RenderError> {
    let image = image::RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        RenderError::Readback(format!("pixel buffer does not match {}x{}", width, height))
    })?;
    image.save(path)?;
    Ok(())
}
