//! Stencil solver trait definition
//!
//! This module defines the `StencilSolver` trait, the backend-agnostic
//! interface for the double-buffered plate relaxation. Both CPU and GPU
//! implementations implement this trait.

use crate::error::PlateError;
use crate::grid::PlateGrid;
use std::borrow::Cow;

/// Backend-agnostic interface for the plate stencil
///
/// A solver owns two grids of identical shape. Every [`step`](Self::step)
/// reads the current grid, writes the interior of the other one, and flips the
/// role flag. Boundary cells are never recomputed.
pub trait StencilSolver: Send + Sync {
    /// Run one full sweep
    ///
    /// All writes of this sweep are complete and visible when the call
    /// returns, so the next sweep never observes a partially updated grid.
    ///
    /// # Errors
    ///
    /// [`PlateError::Device`] if the backend reports a dispatch failure.
    fn step(&mut self) -> Result<(), PlateError>;

    /// Run `iterations` sweeps in sequence
    ///
    /// # Errors
    ///
    /// Stops at the first failing sweep and returns its error.
    fn run(&mut self, iterations: u32) -> Result<(), PlateError> {
        for _ in 0..iterations {
            self.step()?;
        }
        Ok(())
    }

    /// Read the grid holding the most recent state (boundary included)
    ///
    /// Row-major with stride `cols + 2`. The CPU backend returns a borrowed
    /// slice, the GPU backend an owned readback.
    ///
    /// # Errors
    ///
    /// [`PlateError::Device`] if a GPU readback fails.
    fn read_grid(&self) -> Result<Cow<'_, [f32]>, PlateError>;

    /// Completed sweeps since construction
    fn iteration(&self) -> u32;

    /// Index (0 or 1) of the buffer holding the most recent state
    ///
    /// Buffer 0 holds the initial state, so this is the parity of
    /// [`iteration`](Self::iteration).
    fn current_buffer(&self) -> usize {
        (self.iteration() % 2) as usize
    }

    /// Interior dimensions as `(cols, rows)`
    fn dimensions(&self) -> (usize, usize);

    /// Short backend name for logs and reports
    fn backend_name(&self) -> &str;

    /// Check if this is the GPU backend
    fn is_gpu_accelerated(&self) -> bool;

    /// Copy the most recent state into an owned [`PlateGrid`]
    ///
    /// # Errors
    ///
    /// Propagates readback failures.
    fn snapshot_grid(&self) -> Result<PlateGrid, PlateError> {
        let (cols, rows) = self.dimensions();
        PlateGrid::from_raw(cols, rows, self.read_grid()?.into_owned())
    }
}
