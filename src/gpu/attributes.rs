//! CPU-side staging for per-instance particle data.

use crate::simulation::Particle;

/// Uniform data passed to shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Viewport in device pixels.
    pub resolution: [f32; 2],
    /// Seconds since the field started.
    pub time: f32,
    pub global_opacity: f32,
    /// 1.0 when the page is visible, 0.0 when hidden.
    pub visible: f32,
    pub _padding: [f32; 3],
}

impl FrameUniforms {
    pub fn new(width: u32, height: u32, time: f32, global_opacity: f32, visible: bool) -> Self {
        Self {
            resolution: [width.max(1) as f32, height.max(1) as f32],
            time,
            global_opacity: global_opacity.clamp(0.0, 1.0),
            visible: if visible { 1.0 } else { 0.0 },
            _padding: [0.0; 3],
        }
    }
}

/// One vertex stream per attribute, refilled in place every frame.
#[derive(Debug, Default, Clone)]
pub struct ParticleAttributes {
    positions: Vec<[f32; 2]>,
    sizes: Vec<f32>,
    opacities: Vec<f32>,
    colors: Vec<[f32; 3]>,
    phases: Vec<f32>,
}

impl ParticleAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            sizes: Vec::with_capacity(capacity),
            opacities: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
            phases: Vec::with_capacity(capacity),
        }
    }

    /// Replace the contents with the current particle state. Existing
    /// allocations are reused.
    pub fn fill_from(&mut self, particles: &[Particle]) {
        self.clear();
        for p in particles {
            self.positions.push(p.position.to_array());
            self.sizes.push(p.size);
            self.opacities.push(p.opacity);
            self.colors.push(p.color.to_array());
            self.phases.push(p.phase);
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.sizes.clear();
        self.opacities.clear();
        self.colors.clear();
        self.phases.clear();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Allocated slots, i.e. how many particles fit without growing.
    pub fn capacity(&self) -> usize {
        self.positions.capacity()
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn phases(&self) -> &[f32] {
        &self.phases
    }
}
