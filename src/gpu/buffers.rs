//! Persistent per-attribute vertex buffers.

use wgpu::{Buffer, Device, Queue};

use super::attributes::ParticleAttributes;

/// Capacity the buffers start with.
pub const INITIAL_CAPACITY: usize = 64;

const BYTES_PER_PARTICLE: [(&str, u64); 5] = [
    ("particle_positions", 8),
    ("particle_sizes", 4),
    ("particle_opacities", 4),
    ("particle_colors", 12),
    ("particle_phases", 4),
];

/// One vertex buffer per attribute. Buffers are reused across frames and
/// reallocated only when the particle count outgrows them.
pub struct ParticleBuffers {
    buffers: Vec<Buffer>,
    capacity: usize,
    destroyed: bool,
}

impl ParticleBuffers {
    pub fn new(device: &Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffers: Self::allocate(device, capacity),
            capacity,
            destroyed: false,
        }
    }

    fn allocate(device: &Device, capacity: usize) -> Vec<Buffer> {
        BYTES_PER_PARTICLE
            .iter()
            .map(|&(label, bytes)| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(label),
                    size: bytes * capacity as u64,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect()
    }

    /// Grow to hold at least `count` particles. Returns true if the
    /// buffers were reallocated.
    pub fn ensure_capacity(&mut self, device: &Device, count: usize) -> bool {
        if count <= self.capacity {
            return false;
        }
        let capacity = count.next_power_of_two();
        for buffer in &self.buffers {
            buffer.destroy();
        }
        self.buffers = Self::allocate(device, capacity);
        self.capacity = capacity;
        log::debug!("Particle buffers grown to {} slots", capacity);
        true
    }

    /// Copy staged attributes into the buffers. The caller must have
    /// ensured capacity first.
    pub fn write(&self, queue: &Queue, attributes: &ParticleAttributes) {
        if attributes.is_empty() {
            return;
        }
        let streams: [&[u8]; 5] = [
            bytemuck::cast_slice(attributes.positions()),
            bytemuck::cast_slice(attributes.sizes()),
            bytemuck::cast_slice(attributes.opacities()),
            bytemuck::cast_slice(attributes.colors()),
            bytemuck::cast_slice(attributes.phases()),
        ];
        for (buffer, bytes) in self.buffers.iter().zip(streams) {
            queue.write_buffer(buffer, 0, bytes);
        }
    }

    /// Bind every stream to its slot on `pass`, limited to `count` particles.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, count: usize) {
        for (slot, (buffer, &(_, bytes))) in self.buffers.iter().zip(&BYTES_PER_PARTICLE).enumerate() {
            pass.set_vertex_buffer(slot as u32, buffer.slice(..bytes * count as u64));
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Free GPU memory now instead of on drop. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        for buffer in &self.buffers {
            buffer.destroy();
        }
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
