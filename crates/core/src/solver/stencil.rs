//! Four-neighbour averaging stencil
//!
//! One Jacobi relaxation sweep over the interior of a plate grid:
//!
//! ```text
//! next[y][x] = 0.25 × (prev[y][x+1] + prev[y][x-1] + prev[y+1][x] + prev[y-1][x])
//! ```
//!
//! for `1 ≤ x ≤ cols`, `1 ≤ y ≤ rows`. Reads come only from `prev`; only
//! interior cells of `next` are written, so its boundary ring keeps whatever
//! values it was initialized with.

use rayon::prelude::*;

/// Averaged value of interior cell `idx` from its four neighbours in `prev`
#[inline(always)]
fn average_neighbours(prev: &[f32], idx: usize, stride: usize) -> f32 {
    0.25 * (prev[idx + 1] + prev[idx - 1] + prev[idx + stride] + prev[idx - stride])
}

/// Update the interior cells of one stored row
#[inline]
fn relax_row(prev: &[f32], row: &mut [f32], y: usize, cols: usize, stride: usize) {
    let base = y * stride;
    for (x, cell) in row.iter_mut().enumerate().take(cols + 1).skip(1) {
        *cell = average_neighbours(prev, base + x, stride);
    }
}

/// Parallel stencil sweep (Rayon)
///
/// Each stored row of `next` is an independent task with exclusive write
/// access to its cells; boundary rows are skipped. Returns once every row is
/// written, which is the barrier between iterations.
///
/// # Arguments
///
/// * `prev` - Grid from the previous iteration, `(cols + 2) × (rows + 2)`
/// * `next` - Destination grid of the same shape
/// * `cols` - Interior columns
/// * `rows` - Interior rows
///
/// # Panics
///
/// Panics if either slice does not hold `(cols + 2) × (rows + 2)` cells.
pub fn step_stencil_cpu(prev: &[f32], next: &mut [f32], cols: usize, rows: usize) {
    let stride = cols + 2;
    assert_eq!(prev.len(), stride * (rows + 2), "source grid has wrong shape");
    assert_eq!(next.len(), prev.len(), "destination grid has wrong shape");

    next.par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| (1..=rows).contains(y))
        .for_each(|(y, row)| relax_row(prev, row, y, cols, stride));
}

/// Single-threaded stencil sweep
///
/// Same update as [`step_stencil_cpu`], evaluated row by row on the calling
/// thread. Used as the reference the parallel kernels are checked against.
///
/// # Panics
///
/// Panics if either slice does not hold `(cols + 2) × (rows + 2)` cells.
pub fn step_stencil_sequential(prev: &[f32], next: &mut [f32], cols: usize, rows: usize) {
    let stride = cols + 2;
    assert_eq!(prev.len(), stride * (rows + 2), "source grid has wrong shape");
    assert_eq!(next.len(), prev.len(), "destination grid has wrong shape");

    for (y, row) in next.chunks_mut(stride).enumerate() {
        if (1..=rows).contains(&y) {
            relax_row(prev, row, y, cols, stride);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlateConfig;
    use crate::grid::PlateGrid;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_corner_cell_after_one_sweep() {
        let prev = PlateGrid::initialized(&PlateConfig::new(8, 8, 1)).unwrap();
        let mut next = prev.clone();

        step_stencil_cpu(prev.as_slice(), next.as_mut_slice(), 8, 8);

        // left = 0, top = 0, two interior neighbours at 50
        assert_eq!(next.get(1, 1), 25.0);
        // bottom-right corner cell sees right = 100 and bottom = 100
        assert_eq!(next.get(8, 8), 75.0);
        // Untouched by the boundary
        assert_eq!(next.get(4, 4), 50.0);
    }

    #[test]
    fn test_no_writes_outside_interior() {
        let cols = 7;
        let rows = 5;
        let prev = PlateGrid::initialized(&PlateConfig::new(cols, rows, 1)).unwrap();
        let mut next = vec![-1.0_f32; prev.as_slice().len()];

        step_stencil_cpu(prev.as_slice(), &mut next, cols, rows);

        for y in 0..rows + 2 {
            for x in 0..cols + 2 {
                let value = next[y * (cols + 2) + x];
                if prev.is_interior(x, y) {
                    assert!(value >= 0.0, "interior cell ({x},{y}) was not written");
                } else {
                    assert_eq!(value, -1.0, "boundary cell ({x},{y}) was written");
                }
            }
        }
    }

    #[test]
    fn test_reads_only_previous_buffer() {
        // A single hot cell spreads exactly one cell per sweep
        let mut prev = PlateGrid::allocate(5, 5).unwrap();
        prev.set(3, 3, 100.0);
        let mut next = PlateGrid::allocate(5, 5).unwrap();

        step_stencil_cpu(prev.as_slice(), next.as_mut_slice(), 5, 5);

        assert_eq!(next.get(3, 3), 0.0);
        assert_eq!(next.get(2, 3), 25.0);
        assert_eq!(next.get(4, 3), 25.0);
        assert_eq!(next.get(3, 2), 25.0);
        assert_eq!(next.get(3, 4), 25.0);
        assert_eq!(next.get(1, 3), 0.0, "value travelled two cells in one sweep");
    }

    #[test]
    fn test_parallel_matches_sequential_bitwise() {
        let cols = 33;
        let rows = 17;
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED);
        let prev: Vec<f32> = (0..(cols + 2) * (rows + 2))
            .map(|_| rng.random_range(-100.0..100.0_f32))
            .collect();
        let mut parallel = prev.clone();
        let mut sequential = prev.clone();

        step_stencil_cpu(&prev, &mut parallel, cols, rows);
        step_stencil_sequential(&prev, &mut sequential, cols, rows);

        for (i, (p, s)) in parallel.iter().zip(sequential.iter()).enumerate() {
            assert_eq!(p.to_bits(), s.to_bits(), "mismatch at index {i}");
        }
    }

    #[test]
    #[should_panic(expected = "wrong shape")]
    fn test_shape_mismatch_panics() {
        let prev = vec![0.0; 16];
        let mut next = vec![0.0; 15];
        step_stencil_cpu(&prev, &mut next, 2, 2);
    }
}
