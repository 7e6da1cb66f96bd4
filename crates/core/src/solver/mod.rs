//! Plate stencil solver module
//!
//! This module provides a unified GPU/CPU abstraction for the double-buffered
//! four-neighbour relaxation. The core abstraction is the `StencilSolver`
//! trait, which has both CPU and GPU implementations.
//!
//! # Feature Flags
//!
//! - `gpu` (default): Enables GPU acceleration via wgpu. Disable with `--no-default-features`
//!   for environments without GPU access.
//!
//! # Backend Selection
//!
//! With [`Backend::Auto`] the best available backend is used:
//! 1. Try GPU (if `gpu` feature enabled, hardware available, and the grid fits)
//! 2. Fall back to CPU (always available)
//!
//! # Example
//!
//! ```rust,ignore
//! use heated_plate_core::solver::create_stencil_solver;
//! use heated_plate_core::{Backend, PlateConfig, PlateGrid};
//!
//! let grid = PlateGrid::initialized(&PlateConfig::new(100, 100, 10))?;
//! let mut solver = create_stencil_solver(grid, Backend::Auto)?;
//! solver.run(10)?;
//! ```

mod context;
mod cpu;
pub mod profiler;
pub mod stencil;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

#[cfg(feature = "gpu")]
mod gpu;

// Re-exports
pub use context::GpuInitResult;
pub use cpu::CpuStencilSolver;
pub use profiler::ProfilerScope;
pub use r#trait::StencilSolver;
pub use stencil::{step_stencil_cpu, step_stencil_sequential};

#[cfg(feature = "gpu")]
pub use context::GpuContext;
#[cfg(feature = "gpu")]
pub use gpu::GpuStencilSolver;

use crate::config::Backend;
use crate::error::PlateError;
use crate::grid::PlateGrid;
use tracing::info;

#[cfg(feature = "gpu")]
use tracing::warn;

/// Create a stencil solver for `initial` on the requested backend
///
/// With [`Backend::Auto`] the GPU is tried first and any GPU problem falls
/// back to the CPU with a log message. [`Backend::Gpu`] turns those problems
/// into errors instead.
///
/// # Errors
///
/// - [`PlateError::GpuUnavailable`] when `Backend::Gpu` is requested and no
///   usable device exists (or the `gpu` feature is disabled)
/// - [`PlateError::Allocation`] when the second buffer cannot be allocated
/// - [`PlateError::Device`] when GPU setup fails for an explicit GPU request
pub fn create_stencil_solver(
    initial: PlateGrid,
    backend: Backend,
) -> Result<Box<dyn StencilSolver>, PlateError> {
    if backend == Backend::Cpu {
        info!("Using CPU backend (requested)");
        return Ok(Box::new(CpuStencilSolver::new(initial)?));
    }

    #[cfg(feature = "gpu")]
    {
        let required = backend == Backend::Gpu;
        match GpuContext::new() {
            GpuInitResult::Success(gpu_context) => {
                let (cols, rows) = (initial.cols(), initial.rows());
                if gpu_context.can_allocate(cols, rows) {
                    let adapter = gpu_context.adapter_name().to_owned();
                    match GpuStencilSolver::new(gpu_context, &initial) {
                        Ok(solver) => {
                            info!("Using GPU backend: {} ({}x{} grid)", adapter, cols, rows);
                            return Ok(Box::new(solver));
                        }
                        Err(e) if required => return Err(e),
                        Err(e) => {
                            warn!("GPU '{}' setup failed: {}. Falling back to CPU.", adapter, e);
                        }
                    }
                } else if required {
                    return Err(PlateError::GpuUnavailable(format!(
                        "insufficient device limits for {cols}x{rows} grid"
                    )));
                } else {
                    warn!(
                        "GPU has insufficient memory for {}x{} grid, falling back to CPU",
                        cols, rows
                    );
                }
            }
            GpuInitResult::NoGpuFound => {
                if required {
                    return Err(PlateError::GpuUnavailable("no GPU adapter found".into()));
                }
                info!("No GPU found, using CPU backend");
            }
            GpuInitResult::InitFailed {
                adapter_name,
                error,
            } => {
                if required {
                    return Err(PlateError::GpuUnavailable(format!(
                        "'{adapter_name}' failed to initialize: {error}"
                    )));
                }
                warn!(
                    "GPU '{}' found but failed to initialize: {}. Falling back to CPU.",
                    adapter_name, error
                );
            }
        }
    }

    #[cfg(not(feature = "gpu"))]
    {
        if backend == Backend::Gpu {
            return Err(PlateError::GpuUnavailable("gpu feature disabled".into()));
        }
        info!("GPU feature disabled, using CPU backend");
    }

    Ok(Box::new(CpuStencilSolver::new(initial)?))
}
