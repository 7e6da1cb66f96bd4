//! Heated plate iteration driver
//!
//! Owns the lifecycle of one run: allocate and initialize the buffer pair,
//! pick a backend, run the configured number of sweeps, and hand back the
//! grid selected by the final parity together with timing information.

use crate::config::PlateConfig;
use crate::error::PlateError;
use crate::grid::PlateGrid;
use crate::solver::{create_stencil_solver, ProfilerScope, StencilSolver};
use std::time::Duration;
use tracing::info;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct SimulationReport {
    /// Completed sweeps
    pub iterations: u32,
    /// Backend the sweeps ran on (`"cpu"` or `"gpu"`)
    pub backend: String,
    /// Wall time spent in the sweep loop
    pub kernel_time: Duration,
    /// Buffer index (0 or 1) the final state was read from
    pub final_buffer: usize,
    /// Final state, boundary included
    pub final_grid: PlateGrid,
}

/// A configured plate ready to run
pub struct HeatedPlate {
    config: PlateConfig,
    solver: Box<dyn StencilSolver>,
}

impl HeatedPlate {
    /// Build a plate from its configuration
    ///
    /// The interior starts at `config.initial_value` and the ghost ring at
    /// `config.boundary`.
    ///
    /// # Errors
    ///
    /// Invalid dimensions, allocation failure, or an unavailable GPU when one
    /// was explicitly requested.
    pub fn new(config: PlateConfig) -> Result<Self, PlateError> {
        config.validate()?;
        let grid = PlateGrid::initialized(&config)?;
        Self::from_grid(config, grid)
    }

    /// Build a plate from an already initialized grid
    ///
    /// Lets callers start from an arbitrary interior. The grid's boundary ring
    /// is taken as is.
    ///
    /// # Errors
    ///
    /// [`PlateError::InvalidDimensions`] if the grid does not match the
    /// configured size, plus everything [`HeatedPlate::new`] can return.
    pub fn from_grid(config: PlateConfig, grid: PlateGrid) -> Result<Self, PlateError> {
        config.validate()?;
        if grid.cols() != config.cols || grid.rows() != config.rows {
            return Err(PlateError::InvalidDimensions {
                cols: grid.cols(),
                rows: grid.rows(),
            });
        }

        let solver = create_stencil_solver(grid, config.backend)?;
        info!(
            "Grid: {}x{}, Iterations: {} ({} backend)",
            config.cols,
            config.rows,
            config.iterations,
            solver.backend_name()
        );
        Ok(Self { config, solver })
    }

    /// Configuration this plate was built from
    pub fn config(&self) -> &PlateConfig {
        &self.config
    }

    /// Underlying solver
    pub fn solver(&self) -> &dyn StencilSolver {
        self.solver.as_ref()
    }

    /// Run all configured sweeps and read back the final grid
    ///
    /// # Errors
    ///
    /// The first sweep or readback failure; the run is abandoned.
    pub fn run(mut self) -> Result<SimulationReport, PlateError> {
        let iterations = self.config.iterations;

        let scope = ProfilerScope::new("Kernel execution");
        self.solver.run(iterations)?;
        let kernel_time = scope.elapsed();
        drop(scope);

        let final_buffer = self.solver.current_buffer();
        let final_grid = self.solver.snapshot_grid()?;

        info!(
            "Completed {} iterations on {} in {:.3} s (final buffer {})",
            iterations,
            self.solver.backend_name(),
            kernel_time.as_secs_f64(),
            final_buffer
        );

        Ok(SimulationReport {
            iterations,
            backend: self.solver.backend_name().to_owned(),
            kernel_time,
            final_buffer,
            final_grid,
        })
    }
}

/// Build and run a plate in one call
///
/// # Errors
///
/// Same as [`HeatedPlate::new`] and [`HeatedPlate::run`].
pub fn solve(config: PlateConfig) -> Result<SimulationReport, PlateError> {
    HeatedPlate::new(config)?.run()
}
