//! Offscreen target and CPU readback.

use wgpu::{Device, Texture, TextureFormat, TextureUsages, TextureView};

use super::renderer::RenderError;

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch for a texture-to-buffer copy of `width` RGBA8 pixels.
pub fn padded_row_bytes(width: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    (width * BYTES_PER_PIXEL).div_ceil(align) * align
}

/// Clamp a requested target size to `[1, max_dimension]` on both axes.
pub fn clamp_to_limit(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let max_dimension = max_dimension.max(1);
    (width.clamp(1, max_dimension), height.clamp(1, max_dimension))
}

/// Bytes a readback of `width` x `height` pixels needs, row padding included.
pub fn readback_size(width: u32, height: u32) -> u64 {
    padded_row_bytes(width) as u64 * height as u64
}

/// A render target that owns both texture and view.
/// The texture must outlive its view, so we keep them together.
pub struct RenderTarget {
    texture: Texture,
    view: TextureView,
    width: u32,
    height: u32,
}

impl RenderTarget {
    /// Create a target that can be drawn to and copied back to the CPU.
    pub fn for_output(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    pub fn view(&self) -> &TextureView {
        &self.view
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// Readback buffer for copying GPU texture data to CPU.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
    padded_row_bytes: u32,
}

impl ReadbackBuffer {
    /// Fails instead of asking for a buffer the device can't allocate.
    pub fn new(device: &Device, width: u32, height: u32) -> Result<Self, RenderError> {
        let size = readback_size(width, height);
        let max = device.limits().max_buffer_size;
        if size > max {
            return Err(RenderError::Readback(format!(
                "{}x{} needs {} bytes, device allows {}",
                width, height, size, max
            )));
        }
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Ok(Self {
            buffer,
            width,
            height,
            padded_row_bytes: padded_row_bytes(width),
        })
    }

    /// Record a copy of `target` into this buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, target: &RenderTarget) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row_bytes),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the buffer and return tightly packed RGBA rows.
    pub fn read_pixels(&self, device: &Device) -> Result<Vec<u8>, RenderError> {
        let buffer_slice = self.buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| RenderError::Readback(e.to_string()))?;
        receiver
            .recv()
            .map_err(|e| RenderError::Readback(e.to_string()))?
            .map_err(|e| RenderError::Readback(e.to_string()))?;

        let unpadded = self.width as usize * BYTES_PER_PIXEL as usize;
        let mut pixels = Vec::with_capacity(unpadded * self.height as usize);
        {
            let data = buffer_slice.get_mapped_range();
            for row in 0..self.height as usize {
                let start = row * self.padded_row_bytes as usize;
                pixels.extend_from_slice(&data[start..start + unpadded]);
            }
        }
        self.buffer.unmap();
        Ok(pixels)
    }
}
