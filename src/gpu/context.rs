//! GPU context initialization and management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wgpu::{Adapter, Device, Instance, Queue};

/// Errors that can occur while bringing up the GPU side.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
    #[error("Shader validation failed: {0}")]
    Shader(String),
}

/// Backend groups tried in order when creating a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTier {
    /// Vulkan, Metal, DX12 or browser WebGPU.
    Primary,
    /// OpenGL ES / WebGL2.
    Gl,
}

impl BackendTier {
    pub fn fallback_chain() -> &'static [Self] {
        &[Self::Primary, Self::Gl]
    }

    pub fn backends(&self) -> wgpu::Backends {
        match self {
            Self::Primary => wgpu::Backends::PRIMARY,
            Self::Gl => wgpu::Backends::GL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Gl => "gl",
        }
    }
}

/// GPU context holding device and queue for rendering.
pub struct GpuContext {
    pub instance: Instance,
    pub adapter: Arc<Adapter>,
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub backend: BackendTier,
    lost: Arc<AtomicBool>,
}

impl GpuContext {
    /// Create a context on the best available backend, falling back from
    /// the primary backends to GL.
    pub async fn new() -> Result<Self, GpuError> {
        let mut last_error = GpuError::NoAdapter;
        for &tier in BackendTier::fallback_chain() {
            match Self::with_backend(tier).await {
                Ok(ctx) => return Ok(ctx),
                Err(e) => {
                    log::warn!("GPU backend '{}' unavailable: {}", tier.name(), e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Create a context restricted to one backend group.
    pub async fn with_backend(tier: BackendTier) -> Result<Self, GpuError> {
        let instance = Instance::new(&wgpu::InstanceDescriptor {
            backends: tier.backends(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("particle-field"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;

        let lost = Arc::new(AtomicBool::new(false));
        let flag = lost.clone();
        device.set_device_lost_callback(move |reason, message| {
            // Destroyed is our own teardown, not a loss.
            if !matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                log::warn!("GPU device lost ({:?}): {}", reason, message);
                flag.store(true, Ordering::SeqCst);
            }
        });

        let info = adapter.get_info();
        log::info!(
            "GPU context on {} backend: {} ({:?})",
            tier.name(),
            info.name,
            info.backend
        );

        Ok(Self {
            instance,
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
            backend: tier,
            lost,
        })
    }

    /// Whether the device has been lost since creation.
    pub fn is_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }
}
