//! GPU context and initialization
//!
//! This module handles GPU device initialization and capability detection.
//! It distinguishes between "no GPU found" (expected on some systems) and
//! "GPU found but failed to initialize" (potential driver issue).

/// Result of GPU initialization attempt
///
/// This enum distinguishes between different failure modes:
/// - `NoGpuFound`: No compatible GPU adapter (silent fallback to CPU)
/// - `InitFailed`: GPU found but initialization failed (log warning)
#[derive(Debug)]
pub enum GpuInitResult {
    /// GPU initialized successfully
    #[cfg(feature = "gpu")]
    Success(GpuContext),
    /// No GPU adapter found (silent fallback to CPU)
    NoGpuFound,
    /// GPU found but initialization failed (log warning, fallback to CPU)
    InitFailed {
        /// Name of the adapter that failed
        adapter_name: String,
        /// Error message
        error: String,
    },
}

// All GPU-specific code is conditionally compiled only when "gpu" feature is enabled
#[cfg(feature = "gpu")]
mod gpu_impl {
    use super::GpuInitResult;
    use tracing::{debug, info};

    /// GPU context managing device and queue
    ///
    /// Wraps wgpu device and queue along with adapter information.
    #[derive(Debug)]
    pub struct GpuContext {
        device: wgpu::Device,
        queue: wgpu::Queue,
        adapter_info: wgpu::AdapterInfo,
    }

    impl GpuContext {
        /// Initialize GPU context
        ///
        /// # Returns
        ///
        /// - `GpuInitResult::Success` - GPU ready to use
        /// - `GpuInitResult::NoGpuFound` - No compatible GPU adapter
        /// - `GpuInitResult::InitFailed` - GPU found but initialization failed
        #[allow(clippy::new_ret_no_self)]
        pub fn new() -> GpuInitResult {
            info!("Attempting to initialize GPU context");

            let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = if let Some(a) =
                pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::HighPerformance,
                    compatible_surface: None,
                    force_fallback_adapter: false,
                })) {
                debug!("Found GPU adapter: {}", a.get_info().name);
                a
            } else {
                debug!("No GPU adapter found");
                return GpuInitResult::NoGpuFound;
            };

            let adapter_info = adapter.get_info();
            let adapter_name = adapter_info.name.clone();

            // Device creation can fail even with a valid adapter
            match pollster::block_on(adapter.request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("HeatedPlate GPU"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )) {
                Ok((device, queue)) => {
                    info!("GPU context initialized successfully: {}", adapter_name);
                    GpuInitResult::Success(Self {
                        device,
                        queue,
                        adapter_info,
                    })
                }
                Err(e) => {
                    debug!("Failed to create GPU device: {}", e);
                    GpuInitResult::InitFailed {
                        adapter_name,
                        error: e.to_string(),
                    }
                }
            }
        }

        /// Get adapter name for logging
        #[must_use]
        pub fn adapter_name(&self) -> &str {
            &self.adapter_info.name
        }

        /// Get optimal workgroup size for this GPU vendor
        ///
        /// # Returns
        ///
        /// Tuple of (width, height) for compute workgroup size
        #[must_use]
        pub fn optimal_workgroup_size(&self) -> (u32, u32) {
            // NVIDIA/AMD prefer 16x16, Intel prefers 8x8
            match self.adapter_info.vendor {
                0x10DE | 0x1002 => (16, 16), // NVIDIA (0x10DE), AMD (0x1002)
                _ => (8, 8),                 // Intel and others
            }
        }

        /// Check if the device can hold a plate of `cols × rows` interior cells
        ///
        /// Two storage buffers and one staging buffer of `(cols + 2) × (rows + 2)`
        /// floats must each fit the binding and buffer limits, and the dispatch
        /// must fit the workgroup count limit.
        #[must_use]
        pub fn can_allocate(&self, cols: usize, rows: usize) -> bool {
            let cells = (cols as u64 + 2) * (rows as u64 + 2);
            let buffer_bytes = cells * std::mem::size_of::<f32>() as u64;

            let limits = self.device.limits();
            if buffer_bytes > u64::from(limits.max_storage_buffer_binding_size)
                || buffer_bytes > limits.max_buffer_size
            {
                return false;
            }

            let (wg_x, wg_y) = self.optimal_workgroup_size();
            let groups_x = (cols as u64).div_ceil(u64::from(wg_x));
            let groups_y = (rows as u64).div_ceil(u64::from(wg_y));
            let max_groups = u64::from(limits.max_compute_workgroups_per_dimension);
            groups_x <= max_groups && groups_y <= max_groups
        }

        /// Split the context into its device, queue, and adapter info
        #[must_use]
        pub fn into_device_queue(self) -> (wgpu::Device, wgpu::Queue, wgpu::AdapterInfo) {
            (self.device, self.queue, self.adapter_info)
        }
    }

}

// Re-export GpuContext only when GPU feature is enabled
#[cfg(feature = "gpu")]
pub use gpu_impl::GpuContext;
