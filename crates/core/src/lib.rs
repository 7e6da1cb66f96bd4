//! Heated Plate Core Library
//!
//! Simulates heat flowing through a two-dimensional plate whose edges are held
//! at fixed temperatures. Each iteration replaces every interior cell with the
//! average of its four neighbours from the previous iteration (Jacobi
//! relaxation), using a pair of grids that swap roles so no sweep ever reads a
//! value written by itself.
//!
//! ## Backends
//!
//! - CPU: Rayon over grid rows, always available
//! - GPU: wgpu compute shader (default `gpu` feature), with automatic fallback
//!
//! ## Example
//!
//! ```rust,ignore
//! use heated_plate_core::{solve, PlateConfig};
//!
//! let report = solve(PlateConfig::new(500, 500, 250))?;
//! heated_plate_core::snapshot::create_snapshot(&report.final_grid, ".".as_ref(), 250)?;
//! ```

pub mod config;
pub mod error;
pub mod grid;
pub mod simulation;
pub mod snapshot;
pub mod solver;

// Re-export core types
pub use config::{Backend, BoundaryValues, PlateConfig};
pub use error::{Axis, PlateError};
pub use grid::PlateGrid;
pub use simulation::{solve, HeatedPlate, SimulationReport};
pub use solver::{create_stencil_solver, CpuStencilSolver, StencilSolver};

#[cfg(feature = "gpu")]
pub use solver::GpuStencilSolver;
