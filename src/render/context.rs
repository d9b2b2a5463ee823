//! GPU device acquisition shared by the windowed and headless pipelines

/// Depth buffer format of every pass
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Adapter, device and queue
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Create a wgpu instance on all backends.
pub fn create_instance() -> wgpu::Instance {
    wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    })
}

impl GpuContext {
    /// Request an adapter (compatible with `surface` when given) and a device.
    pub async fn new(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
        label: &str,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: Some(label),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(RenderError::RequestDevice)?;

        Ok(Self {
            adapter,
            device,
            queue,
        })
    }
}

/// Create a depth attachment matching a `width` x `height` color target.
pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// Errors raised while setting up the GPU
#[derive(Debug)]
pub enum RenderError {
    /// No adapter satisfies the request
    NoAdapter,
    /// The adapter refused the device request
    RequestDevice(wgpu::RequestDeviceError),
    /// The window surface could not be created
    CreateSurface(wgpu::CreateSurfaceError),
    /// The surface reports no usable texture format
    UnsupportedSurface,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::NoAdapter => write!(f, "No suitable GPU adapter found"),
            RenderError::RequestDevice(e) => write!(f, "Failed to create GPU device: {}", e),
            RenderError::CreateSurface(e) => write!(f, "Failed to create window surface: {}", e),
            RenderError::UnsupportedSurface => write!(f, "Window surface is not supported by the adapter"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::NoAdapter | RenderError::UnsupportedSurface => None,
            RenderError::RequestDevice(e) => Some(e),
            RenderError::CreateSurface(e) => Some(e),
        }
    }
}
