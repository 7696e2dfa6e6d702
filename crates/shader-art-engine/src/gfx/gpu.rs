use anyhow::{Context, Result};

use super::block::UniformBlock;
use super::context::GraphicsContext;
use super::program::{Program, UniformLocation};

/// Initialization parameters for the headless GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Adapter preference; uniform traffic is tiny, so low power is the default.
    pub power_preference: wgpu::PowerPreference,

    /// Force the software fallback adapter (useful on CI machines without a GPU).
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::LowPower,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
        }
    }
}

/// Owns a wgpu adapter, device and queue without a surface.
pub struct Gpu {
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    /// Acquires an adapter and device.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; callers without
    /// an executor can drive it with `pollster::block_on`.
    pub async fn new(init: GpuInit) -> Result<Self> {
        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("shader-art device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let info = adapter.get_info();
        log::info!("using adapter '{}' ({:?})", info.name, info.backend);

        Ok(Self { adapter, device, queue })
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

/// A [`UniformBlock`] mirrored into a wgpu uniform buffer.
///
/// Uploads only touch the CPU staging copy; [`flush`](Self::flush) pushes it
/// to the GPU, typically once per frame.
pub struct GpuUniforms {
    block: UniformBlock,
    buffer: wgpu::Buffer,
}

impl GpuUniforms {
    pub fn new(device: &wgpu::Device, program: &Program) -> Self {
        let block = UniformBlock::new(program);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shader-art uniforms"),
            size: program.block_size() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { block, buffer }
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    /// The buffer to bind at the program's uniform binding.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Writes the staged block to the buffer if anything changed since the
    /// last flush. Returns whether a write was queued.
    pub fn flush(&self, queue: &wgpu::Queue) -> bool {
        if !self.block.take_dirty() {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, &self.block.snapshot());
        log::trace!("flushed {} byte uniform block", self.buffer.size());
        true
    }
}

impl GraphicsContext for GpuUniforms {
    fn uniform_location(&self, program: &Program, name: &str) -> Option<UniformLocation> {
        self.block.uniform_location(program, name)
    }

    fn uniform1f(&self, location: Option<&UniformLocation>, x: f32) {
        self.block.uniform1f(location, x)
    }

    fn uniform1i(&self, location: Option<&UniformLocation>, x: i32) {
        self.block.uniform1i(location, x)
    }

    fn uniform2fv(&self, location: Option<&UniformLocation>, v: [f32; 2]) {
        self.block.uniform2fv(location, v)
    }

    fn uniform3fv(&self, location: Option<&UniformLocation>, v: [f32; 3]) {
        self.block.uniform3fv(location, v)
    }

    fn uniform4fv(&self, location: Option<&UniformLocation>, v: [f32; 4]) {
        self.block.uniform4fv(location, v)
    }
}
