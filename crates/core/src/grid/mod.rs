//! Plate grid data model
//!
//! See [`PlateGrid`] for the storage layout.

mod plate_grid;

pub use plate_grid::PlateGrid;
