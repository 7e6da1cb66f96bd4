//! Plate configuration
//!
//! Grid size, iteration count, boundary constants, and backend preference.
//! `PlateConfig::default()` is the reference configuration: a 1000×1000 plate
//! run for 100 iterations with a cold top and left edge and a hot bottom and
//! right edge.

use crate::error::PlateError;
use serde::{Deserialize, Serialize};

/// Default interior columns
pub const DEFAULT_COLS: usize = 1000;
/// Default interior rows
pub const DEFAULT_ROWS: usize = 1000;
/// Default iteration count
pub const DEFAULT_ITERATIONS: u32 = 100;
/// Default value of every interior cell before the first iteration
pub const INITIAL_CELL_VALUE: f32 = 50.0;

/// Fixed (Dirichlet) values held by the ghost ring around the interior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryValues {
    /// Row 0
    pub top: f32,
    /// Row `rows + 1`
    pub bottom: f32,
    /// Column 0
    pub left: f32,
    /// Column `cols + 1`
    pub right: f32,
}

impl BoundaryValues {
    /// Same value on all four edges
    pub const fn uniform(value: f32) -> Self {
        Self {
            top: value,
            bottom: value,
            left: value,
            right: value,
        }
    }

    /// Arithmetic mean of the four edge constants
    pub fn mean(&self) -> f32 {
        0.25 * (self.top + self.bottom + self.left + self.right)
    }
}

impl Default for BoundaryValues {
    fn default() -> Self {
        Self {
            top: 0.0,
            bottom: 100.0,
            left: 0.0,
            right: 100.0,
        }
    }
}

/// Which execution backend to run the stencil on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Backend {
    /// GPU when available and large enough, CPU otherwise
    #[default]
    Auto,
    /// Rayon on the host
    Cpu,
    /// wgpu compute; fails instead of falling back
    Gpu,
}

/// Full description of one plate run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateConfig {
    /// Interior columns (grid width)
    pub cols: usize,
    /// Interior rows (grid height)
    pub rows: usize,
    /// Number of stencil iterations
    pub iterations: u32,
    /// Ghost ring constants
    pub boundary: BoundaryValues,
    /// Uniform starting value of the interior
    pub initial_value: f32,
    /// Backend preference
    pub backend: Backend,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            iterations: DEFAULT_ITERATIONS,
            boundary: BoundaryValues::default(),
            initial_value: INITIAL_CELL_VALUE,
            backend: Backend::Auto,
        }
    }
}

impl PlateConfig {
    /// Reference configuration with the given size and iteration count
    pub fn new(cols: usize, rows: usize, iterations: u32) -> Self {
        Self {
            cols,
            rows,
            iterations,
            ..Self::default()
        }
    }

    /// Replace the boundary constants
    pub fn with_boundary(mut self, boundary: BoundaryValues) -> Self {
        self.boundary = boundary;
        self
    }

    /// Replace the interior starting value
    pub fn with_initial_value(mut self, value: f32) -> Self {
        self.initial_value = value;
        self
    }

    /// Replace the backend preference
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Check that the grid has an interior
    ///
    /// # Errors
    ///
    /// Returns [`PlateError::InvalidDimensions`] when either axis is zero.
    pub fn validate(&self) -> Result<(), PlateError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(PlateError::InvalidDimensions {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_configuration() {
        let config = PlateConfig::default();
        assert_eq!(config.cols, 1000);
        assert_eq!(config.rows, 1000);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.boundary.top, 0.0);
        assert_eq!(config.boundary.bottom, 100.0);
        assert_eq!(config.boundary.left, 0.0);
        assert_eq!(config.boundary.right, 100.0);
        assert_eq!(config.initial_value, 50.0);
        assert_eq!(config.backend, Backend::Auto);
    }

    #[test]
    fn test_boundary_mean() {
        assert_eq!(BoundaryValues::default().mean(), 50.0);
        assert_eq!(BoundaryValues::uniform(7.0).mean(), 7.0);
    }

    #[test]
    fn test_validate_rejects_empty_interior() {
        assert!(PlateConfig::new(10, 10, 0).validate().is_ok());
        assert!(matches!(
            PlateConfig::new(0, 10, 5).validate(),
            Err(PlateError::InvalidDimensions { cols: 0, rows: 10 })
        ));
        assert!(PlateConfig::new(10, 0, 5).validate().is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = PlateConfig::new(4, 3, 2)
            .with_boundary(BoundaryValues::uniform(1.0))
            .with_initial_value(0.5)
            .with_backend(Backend::Cpu);
        assert_eq!(config.boundary, BoundaryValues::uniform(1.0));
        assert_eq!(config.initial_value, 0.5);
        assert_eq!(config.backend, Backend::Cpu);
    }
}
