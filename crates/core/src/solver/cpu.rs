//! CPU-based stencil solver implementation
//!
//! This module provides a CPU implementation of the `StencilSolver` trait using
//! a pair of `PlateGrid` buffers and Rayon for parallelism. This backend is
//! always available and serves as a fallback when GPU acceleration is not
//! available.

use super::stencil::step_stencil_cpu;
use super::StencilSolver;
use crate::error::PlateError;
use crate::grid::PlateGrid;
use std::borrow::Cow;

/// CPU stencil solver using Rayon for parallelism
///
/// Holds two separately owned grids and a role flag naming the one that is
/// current. Each sweep reads the current grid, writes the other, then flips
/// the flag.
pub struct CpuStencilSolver {
    // Ping-pong buffers (read from one, write to other, then flip)
    buffers: [PlateGrid; 2],
    current: usize,
    iteration: u32,
}

impl CpuStencilSolver {
    /// Create a new CPU stencil solver
    ///
    /// `initial` becomes buffer 0. Buffer 1 starts as a copy so both carry the
    /// same boundary ring; its interior is overwritten by the first sweep.
    ///
    /// # Errors
    ///
    /// [`PlateError::Allocation`] if the second buffer cannot be allocated.
    pub fn new(initial: PlateGrid) -> Result<Self, PlateError> {
        let back = initial.try_clone()?;
        Ok(Self {
            buffers: [initial, back],
            current: 0,
            iteration: 0,
        })
    }

    /// Borrow one of the two buffers
    ///
    /// # Panics
    ///
    /// Panics if `index` is not 0 or 1.
    pub fn buffer(&self, index: usize) -> &PlateGrid {
        &self.buffers[index]
    }
}

impl StencilSolver for CpuStencilSolver {
    fn step(&mut self) -> Result<(), PlateError> {
        let [a, b] = &mut self.buffers;
        let (src, dst) = if self.current == 0 {
            (&*a, b)
        } else {
            (&*b, a)
        };

        step_stencil_cpu(src.as_slice(), dst.as_mut_slice(), src.cols(), src.rows());

        // Flip roles
        self.current ^= 1;
        self.iteration += 1;
        Ok(())
    }

    fn read_grid(&self) -> Result<Cow<'_, [f32]>, PlateError> {
        Ok(Cow::Borrowed(self.buffers[self.current].as_slice()))
    }

    fn iteration(&self) -> u32 {
        self.iteration
    }

    fn current_buffer(&self) -> usize {
        self.current
    }

    fn dimensions(&self) -> (usize, usize) {
        let grid = &self.buffers[0];
        (grid.cols(), grid.rows())
    }

    fn backend_name(&self) -> &str {
        "cpu"
    }

    fn is_gpu_accelerated(&self) -> bool {
        false
    }

    fn snapshot_grid(&self) -> Result<PlateGrid, PlateError> {
        self.buffers[self.current].try_clone()
    }
}
