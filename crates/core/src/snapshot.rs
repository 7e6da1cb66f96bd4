//! Plain-text PPM snapshot of the plate interior
//!
//! The interior is downscaled so neither side of the image exceeds
//! [`MAX_SNAPSHOT_PIXELS`]. A side longer than the cap must be an exact
//! multiple of it; each pixel is then the mean of a `scale_x × scale_y` block.
//! A cell value `v` (truncated to an integer) is written as the colour
//! `v 0 100-v`, so hot cells are red and cold cells blue. The boundary ring is
//! not part of the image.

use crate::error::{Axis, PlateError};
use crate::grid::PlateGrid;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest width or height of a snapshot image
pub const MAX_SNAPSHOT_PIXELS: usize = 1000;

/// Maximum channel value in the PPM header
const MAX_CHANNEL: i32 = 100;

/// Downscale factor for one axis
///
/// # Errors
///
/// [`PlateError::SnapshotDimensions`] when `len` exceeds the cap and is not a
/// multiple of it.
pub fn snapshot_scale(len: usize, axis: Axis) -> Result<usize, PlateError> {
    if len <= MAX_SNAPSHOT_PIXELS {
        Ok(1)
    } else if len % MAX_SNAPSHOT_PIXELS == 0 {
        Ok(len / MAX_SNAPSHOT_PIXELS)
    } else {
        Err(PlateError::SnapshotDimensions { axis, len })
    }
}

/// File name used for the snapshot after `id` iterations
pub fn snapshot_file_name(id: u32) -> String {
    format!("snapshot.{id}.ppm")
}

/// Encode the interior of `grid` as a P3 image into `out`
///
/// # Errors
///
/// [`PlateError::SnapshotDimensions`] before anything is written if the grid
/// cannot be reduced to the pixel cap, [`PlateError::Io`] on write failure.
pub fn write_snapshot<W: Write>(grid: &PlateGrid, out: &mut W) -> Result<(), PlateError> {
    let scale_x = snapshot_scale(grid.cols(), Axis::Columns)?;
    let scale_y = snapshot_scale(grid.rows(), Axis::Rows)?;

    let width = grid.cols() / scale_x;
    let height = grid.rows() / scale_y;
    writeln!(out, "P3 {width} {height} {MAX_CHANNEL}")?;

    let inverse_cells_per_pixel = 1.0 / (scale_x * scale_y) as f32;

    for y in (1..=grid.rows()).step_by(scale_y) {
        for x in (1..=grid.cols()).step_by(scale_x) {
            let mut sum = 0.0_f32;
            for j in y..y + scale_y {
                sum += grid.interior_row(j)[x - 1..x - 1 + scale_x]
                    .iter()
                    .sum::<f32>();
            }
            let average = (sum * inverse_cells_per_pixel) as i32;
            write!(out, "{} 0 {}\t", average, MAX_CHANNEL - average)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write `snapshot.<id>.ppm` for `grid` into `dir`
///
/// Dimensions are validated before the file is created, so a rejected
/// snapshot leaves nothing behind.
///
/// # Errors
///
/// Same as [`write_snapshot`], plus [`PlateError::Io`] if the file cannot be
/// created.
pub fn create_snapshot(grid: &PlateGrid, dir: &Path, id: u32) -> Result<PathBuf, PlateError> {
    snapshot_scale(grid.cols(), Axis::Columns)?;
    snapshot_scale(grid.rows(), Axis::Rows)?;

    let path = dir.join(snapshot_file_name(id));
    let mut out = BufWriter::new(File::create(&path)?);
    write_snapshot(grid, &mut out)?;
    out.flush()?;

    debug!("Wrote snapshot {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlateConfig;

    #[test]
    fn test_scale_factors() {
        assert_eq!(snapshot_scale(1, Axis::Columns).unwrap(), 1);
        assert_eq!(snapshot_scale(1000, Axis::Columns).unwrap(), 1);
        assert_eq!(snapshot_scale(3000, Axis::Rows).unwrap(), 3);
        assert!(matches!(
            snapshot_scale(1500, Axis::Rows),
            Err(PlateError::SnapshotDimensions {
                axis: Axis::Rows,
                len: 1500
            })
        ));
    }

    #[test]
    fn test_small_grid_encoding() {
        let mut grid = PlateGrid::initialized(&PlateConfig::new(3, 2, 0)).unwrap();
        grid.set(1, 1, 99.9);
        grid.set(3, 2, 0.4);

        let mut out = Vec::new();
        write_snapshot(&grid, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "P3 3 2 100\n99 0 1\t50 0 50\t50 0 50\t\n50 0 50\t50 0 50\t0 0 100\t\n"
        );
    }

    #[test]
    fn test_downscaled_block_average() {
        // 2000 columns reduce by 2; each pixel averages a horizontal pair
        let mut grid = PlateGrid::allocate(2000, 1).unwrap();
        for x in 1..=2000 {
            grid.set(x, 1, if x % 2 == 1 { 10.0 } else { 30.0 });
        }

        let mut out = Vec::new();
        write_snapshot(&grid, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("P3 1000 1 100"));
        let row = lines.next().unwrap();
        assert_eq!(row.split('\t').filter(|p| !p.is_empty()).count(), 1000);
        assert!(row.split('\t').filter(|p| !p.is_empty()).all(|p| p == "20 0 80"));
    }

    #[test]
    fn test_rejected_dimensions_write_nothing() {
        let grid = PlateGrid::allocate(1001, 4).unwrap();
        let mut out = Vec::new();
        let err = write_snapshot(&grid, &mut out).unwrap_err();
        assert!(matches!(
            err,
            PlateError::SnapshotDimensions {
                axis: Axis::Columns,
                len: 1001
            }
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_create_snapshot_file() {
        let dir = std::env::temp_dir().join(format!("plate-snapshot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let grid = PlateGrid::initialized(&PlateConfig::new(4, 4, 0)).unwrap();
        let path = create_snapshot(&grid, &dir, 7).unwrap();

        assert_eq!(path.file_name().unwrap(), "snapshot.7.ppm");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("P3 4 4 100\n"));

        let bad = PlateGrid::allocate(1200, 2).unwrap();
        assert!(create_snapshot(&bad, &dir, 8).is_err());
        assert!(!dir.join("snapshot.8.ppm").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
