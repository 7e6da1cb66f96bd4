//! GPU-based stencil solver implementation
//!
//! This module provides a GPU implementation of the `StencilSolver` trait using
//! a wgpu compute shader and storage buffers. This backend is only available
//! when the `gpu` feature is enabled.
//!
//! # Shader Files
//!
//! - `shaders/stencil.wgsl` - four-neighbour averaging sweep
//!
//! # Implementation
//!
//! Both grids live in GPU storage buffers. Two bind groups are built up front,
//! one per direction (A→B and B→A), and a role flag picks which one a sweep
//! dispatches. Every sweep is submitted on its own inside a wgpu error scope,
//! so a failed dispatch is reported before the next sweep starts. Queue
//! submission order makes each sweep's writes visible to the next one.

use super::context::GpuContext;
use super::StencilSolver;
use crate::error::PlateError;
use crate::grid::PlateGrid;
use bytemuck::{Pod, Zeroable};
use std::borrow::Cow;
use tracing::debug;
use wgpu::util::DeviceExt;

/// Stencil shader parameters (must match WGSL struct layout)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct StencilParams {
    cols: u32,
    rows: u32,
    stride: u32,
    _padding: u32,
}

/// Convert a popped error scope into a solver error
fn check_scope(
    device: &wgpu::Device,
    what: &str,
    on_error: impl FnOnce(String) -> PlateError,
) -> Result<(), PlateError> {
    match pollster::block_on(device.pop_error_scope()) {
        Some(e) => {
            debug!("{} failed: {}", what, e);
            Err(on_error(format!("{what}: {e}")))
        }
        None => Ok(()),
    }
}

/// GPU stencil solver using a wgpu compute shader
///
/// Uses one compute pipeline and a pair of storage buffers with a role flag
/// naming the current one, plus a staging buffer for CPU readback.
pub struct GpuStencilSolver {
    // GPU handles
    device: wgpu::Device,
    queue: wgpu::Queue,
    adapter_name: String,

    // Interior dimensions
    cols: u32,
    rows: u32,
    workgroup_size: (u32, u32),

    // Storage buffers A and B, plus staging for readback
    buffers: [wgpu::Buffer; 2],
    staging: wgpu::Buffer,
    byte_len: u64,

    // bind_groups[i] reads buffers[i] and writes the other one
    bind_groups: [wgpu::BindGroup; 2],
    pipeline: wgpu::ComputePipeline,

    // Ping-pong state (index of the current buffer)
    current: usize,
    iteration: u32,
}

impl GpuStencilSolver {
    /// Create a new GPU stencil solver
    ///
    /// Uploads `initial` into both storage buffers (so both carry the boundary
    /// ring), builds the shader for the adapter's workgroup size, and creates
    /// the compute pipeline.
    ///
    /// # Errors
    ///
    /// [`PlateError::Allocation`] if the device runs out of memory,
    /// [`PlateError::Device`] for any validation failure during setup.
    pub fn new(context: GpuContext, initial: &PlateGrid) -> Result<Self, PlateError> {
        let workgroup_size = context.optimal_workgroup_size();
        let (device, queue, adapter_info) = context.into_device_queue();

        let cols = u32::try_from(initial.cols())
            .map_err(|_| PlateError::Device(format!("{} columns exceed u32", initial.cols())))?;
        let rows = u32::try_from(initial.rows())
            .map_err(|_| PlateError::Device(format!("{} rows exceed u32", initial.rows())))?;
        let stride = cols + 2;
        let byte_len = initial.byte_len();

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        // Create storage buffers
        let storage_usage = wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_SRC
            | wgpu::BufferUsages::COPY_DST;

        let buffer_a = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plate A"),
            contents: bytemuck::cast_slice(initial.as_slice()),
            usage: storage_usage,
        });

        let buffer_b = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plate B"),
            contents: bytemuck::cast_slice(initial.as_slice()),
            usage: storage_usage,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Plate Staging"),
            size: byte_len,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params = StencilParams {
            cols,
            rows,
            stride,
            _padding: 0,
        };

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Stencil Params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        // Workgroup size is baked into the shader source
        let source = include_str!("shaders/stencil.wgsl")
            .replace("WG_X", &workgroup_size.0.to_string())
            .replace("WG_Y", &workgroup_size.1.to_string());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Stencil Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(source)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Stencil Bind Group Layout"),
            entries: &[
                // prev (binding 0)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // next (binding 1)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // params (binding 2)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let make_bind_group = |label: &str, prev: &wgpu::Buffer, next: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: prev.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: next.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        };

        let bind_groups = [
            make_bind_group("Stencil A->B", &buffer_a, &buffer_b),
            make_bind_group("Stencil B->A", &buffer_b, &buffer_a),
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Stencil Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Stencil Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "main",
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        check_scope(&device, "Stencil pipeline setup", PlateError::Device)?;
        check_scope(&device, "Plate buffer allocation", |_| PlateError::Allocation {
            bytes: byte_len * 3,
        })?;

        debug!(
            "GPU stencil ready on {}: {}x{} interior, workgroup {}x{}",
            adapter_info.name, cols, rows, workgroup_size.0, workgroup_size.1
        );

        Ok(Self {
            device,
            queue,
            adapter_name: adapter_info.name,
            cols,
            rows,
            workgroup_size,
            buffers: [buffer_a, buffer_b],
            staging,
            byte_len,
            bind_groups,
            pipeline,
            current: 0,
            iteration: 0,
        })
    }

    /// Adapter the solver runs on
    #[must_use]
    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    /// Calculate workgroup count for dispatch
    fn workgroup_count(&self) -> (u32, u32) {
        (
            self.cols.div_ceil(self.workgroup_size.0),
            self.rows.div_ceil(self.workgroup_size.1),
        )
    }
}

impl StencilSolver for GpuStencilSolver {
    fn step(&mut self) -> Result<(), PlateError> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Stencil Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Stencil Pass"),
                timestamp_writes: None,
            });

            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_groups[self.current], &[]);

            let (wg_x, wg_y) = self.workgroup_count();
            compute_pass.dispatch_workgroups(wg_x, wg_y, 1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        check_scope(
            &self.device,
            &format!("Stencil dispatch {}", self.iteration),
            PlateError::Device,
        )?;

        // Flip ping-pong
        self.current ^= 1;
        self.iteration += 1;
        Ok(())
    }

    fn read_grid(&self) -> Result<Cow<'_, [f32]>, PlateError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Plate Readback Encoder"),
            });

        encoder.copy_buffer_to_buffer(
            &self.buffers[self.current],
            0,
            &self.staging,
            0,
            self.byte_len,
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        // Map and read
        let buffer_slice = self.staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        let maintain = self.device.poll(wgpu::Maintain::Wait);
        debug!("Readback poll: queue empty = {}", maintain.is_queue_empty());
        rx.recv()
            .map_err(|e| PlateError::Device(format!("Readback channel closed: {e}")))?
            .map_err(|e| PlateError::Device(format!("Readback mapping failed: {e}")))?;

        let data = buffer_slice.get_mapped_range();
        let result: Vec<f32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        self.staging.unmap();

        Ok(Cow::Owned(result))
    }

    fn iteration(&self) -> u32 {
        self.iteration
    }

    fn current_buffer(&self) -> usize {
        self.current
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.cols as usize, self.rows as usize)
    }

    fn backend_name(&self) -> &str {
        "gpu"
    }

    fn is_gpu_accelerated(&self) -> bool {
        true
    }
}
