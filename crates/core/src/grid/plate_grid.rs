//! Plate grid storage
//!
//! A plate of `cols × rows` interior cells is stored with a one-cell ghost ring
//! holding the fixed boundary values, so the stored grid is
//! `(cols + 2) × (rows + 2)`. Cells live in a single flat `Vec<f32>` in
//! row-major order with stride `cols + 2`, which keeps rows contiguous for bulk
//! upload to the GPU.

use crate::config::{BoundaryValues, PlateConfig};
use crate::error::PlateError;
use std::fmt;

/// Flat row-major plate grid including the boundary ring
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid {
    data: Vec<f32>,
    cols: usize,
    rows: usize,
}

/// Cell count of a grid with its boundary ring, `None` on overflow
fn stored_len(cols: usize, rows: usize) -> Option<usize> {
    cols.checked_add(2)
        .and_then(|w| rows.checked_add(2).and_then(|h| w.checked_mul(h)))
}

/// Allocate a zeroed buffer without aborting on allocation failure
fn try_alloc(len: usize) -> Result<Vec<f32>, PlateError> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PlateError::Allocation {
            bytes: (len as u64).saturating_mul(std::mem::size_of::<f32>() as u64),
        })?;
    data.resize(len, 0.0);
    Ok(data)
}

impl PlateGrid {
    /// Allocate a zeroed grid with `cols × rows` interior cells
    ///
    /// # Errors
    ///
    /// [`PlateError::InvalidDimensions`] for an empty interior,
    /// [`PlateError::Allocation`] when the buffer cannot be reserved.
    pub fn allocate(cols: usize, rows: usize) -> Result<Self, PlateError> {
        if cols == 0 || rows == 0 {
            return Err(PlateError::InvalidDimensions { cols, rows });
        }
        let len = stored_len(cols, rows).ok_or(PlateError::Allocation { bytes: u64::MAX })?;
        Ok(Self {
            data: try_alloc(len)?,
            cols,
            rows,
        })
    }

    /// Allocate a grid and apply the configured boundary and interior values
    ///
    /// # Errors
    ///
    /// Same as [`PlateGrid::allocate`].
    pub fn initialized(config: &PlateConfig) -> Result<Self, PlateError> {
        let mut grid = Self::allocate(config.cols, config.rows)?;
        grid.write_boundary(config.boundary);
        grid.fill_interior(config.initial_value);
        Ok(grid)
    }

    /// Wrap an existing buffer (e.g. a GPU readback)
    ///
    /// # Errors
    ///
    /// [`PlateError::InvalidDimensions`] when the buffer length does not match.
    pub fn from_raw(cols: usize, rows: usize, data: Vec<f32>) -> Result<Self, PlateError> {
        if cols == 0 || rows == 0 || stored_len(cols, rows) != Some(data.len()) {
            return Err(PlateError::InvalidDimensions { cols, rows });
        }
        Ok(Self { data, cols, rows })
    }

    /// Fallible deep copy, used for the second half of the buffer pair
    ///
    /// # Errors
    ///
    /// [`PlateError::Allocation`] when the copy cannot be reserved.
    pub fn try_clone(&self) -> Result<Self, PlateError> {
        let mut data = Vec::new();
        data.try_reserve_exact(self.data.len())
            .map_err(|_| PlateError::Allocation {
                bytes: self.byte_len(),
            })?;
        data.extend_from_slice(&self.data);
        Ok(Self {
            data,
            cols: self.cols,
            rows: self.rows,
        })
    }

    /// Write the ghost ring
    ///
    /// Top and bottom rows span the full stored width, so the four corner
    /// cells take the top/bottom value. Corners are never read by the stencil.
    pub fn write_boundary(&mut self, boundary: BoundaryValues) {
        let stride = self.stride();
        let last_row = self.rows + 1;
        self.data[..stride].fill(boundary.top);
        self.data[last_row * stride..].fill(boundary.bottom);
        for y in 1..=self.rows {
            self.data[y * stride] = boundary.left;
            self.data[y * stride + self.cols + 1] = boundary.right;
        }
    }

    /// Set every interior cell to `value`
    pub fn fill_interior(&mut self, value: f32) {
        let stride = self.stride();
        for y in 1..=self.rows {
            self.data[y * stride + 1..y * stride + 1 + self.cols].fill(value);
        }
    }

    /// Interior columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Interior rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Distance in cells between vertically adjacent cells (`cols + 2`)
    pub fn stride(&self) -> usize {
        self.cols + 2
    }

    /// Stored height including the boundary ring (`rows + 2`)
    pub fn stored_rows(&self) -> usize {
        self.rows + 2
    }

    /// Size of the backing buffer in bytes
    pub fn byte_len(&self) -> u64 {
        (self.data.len() * std::mem::size_of::<f32>()) as u64
    }

    /// Flat index of stored coordinate `(x, y)`
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.stride() + x
    }

    /// Whether `(x, y)` lies in the evolving interior
    #[inline]
    pub fn is_interior(&self, x: usize, y: usize) -> bool {
        (1..=self.cols).contains(&x) && (1..=self.rows).contains(&y)
    }

    /// Value at stored coordinate `(x, y)`, boundary included
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(
            x < self.stride() && y < self.stored_rows(),
            "Coordinates out of bounds"
        );
        self.data[self.index(x, y)]
    }

    /// Set the value at stored coordinate `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        assert!(
            x < self.stride() && y < self.stored_rows(),
            "Coordinates out of bounds"
        );
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Interior cells of stored row `y` (`1..=rows`)
    pub fn interior_row(&self, y: usize) -> &[f32] {
        let start = self.index(1, y);
        &self.data[start..start + self.cols]
    }

    /// Boundary ring in a fixed order: top row, bottom row, then the
    /// left and right cells of each interior row
    pub fn boundary_ring(&self) -> Vec<f32> {
        let stride = self.stride();
        let last_row = self.rows + 1;
        let mut ring = Vec::with_capacity(2 * stride + 2 * self.rows);
        ring.extend_from_slice(&self.data[..stride]);
        ring.extend_from_slice(&self.data[last_row * stride..]);
        for y in 1..=self.rows {
            ring.push(self.data[y * stride]);
            ring.push(self.data[y * stride + self.cols + 1]);
        }
        ring
    }

    /// Mean of the interior cells
    pub fn interior_mean(&self) -> f32 {
        let sum: f64 = (1..=self.rows)
            .flat_map(|y| self.interior_row(y).iter())
            .map(|&v| f64::from(v))
            .sum();
        (sum / (self.cols * self.rows) as f64) as f32
    }

    /// Whole grid, boundary included, row-major
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Mutable access to the whole grid
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

impl fmt::Display for PlateGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.stride()) {
            for (x, value) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{value:6.2}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
