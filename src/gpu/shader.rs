//! Particle shader source and pre-flight validation.

use super::context::GpuError;

/// WGSL for the instanced particle pipeline.
pub const PARTICLE_SHADER: &str = include_str!("shaders/particles.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Parse and validate WGSL with naga, returning the compiler diagnostic
/// on failure.
pub fn validate_wgsl(source: &str) -> Result<(), GpuError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|err| GpuError::Shader(err.emit_to_string(source)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|err| GpuError::Shader(format!("{}", err)))?;

    for entry in [VERTEX_ENTRY, FRAGMENT_ENTRY] {
        if !module.entry_points.iter().any(|ep| ep.name == entry) {
            return Err(GpuError::Shader(format!("missing entry point '{}'", entry)));
        }
    }
    Ok(())
}

/// Validate the bundled shader and wrap it in a module.
pub fn create_particle_module(device: &wgpu::Device) -> Result<wgpu::ShaderModule, GpuError> {
    validate_wgsl(PARTICLE_SHADER)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("particle_shader"),
        source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
    }))
}
