//! Error types for the heated plate solver
//!
//! Errors fall into two groups. Fatal errors (allocation, device failures,
//! invalid configuration) abort a run. Snapshot errors are reported by the
//! caller and the run continues without an output file.

use std::fmt;

/// Grid axis, used to report which snapshot dimension was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Column count (x direction)
    Columns,
    /// Row count (y direction)
    Rows,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Columns => write!(f, "x"),
            Self::Rows => write!(f, "y"),
        }
    }
}

/// Errors produced while building, running, or exporting a plate simulation
#[derive(Debug)]
pub enum PlateError {
    /// A grid buffer could not be allocated
    Allocation {
        /// Requested size in bytes
        bytes: u64,
    },
    /// The requested grid has no interior cells
    InvalidDimensions {
        /// Requested interior columns
        cols: usize,
        /// Requested interior rows
        rows: usize,
    },
    /// Snapshot axis exceeds the pixel cap and cannot be reduced evenly
    SnapshotDimensions {
        /// Offending axis
        axis: Axis,
        /// Interior length along that axis
        len: usize,
    },
    /// GPU backend was requested explicitly but could not be initialized
    GpuUnavailable(String),
    /// Dispatch, validation, or readback failure reported by the device
    Device(String),
    /// Snapshot file could not be written
    Io(std::io::Error),
}

impl PlateError {
    /// Whether this error must terminate the run
    ///
    /// Snapshot and I/O errors only skip the output artifact.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::SnapshotDimensions { .. } | Self::Io(_))
    }
}

impl fmt::Display for PlateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { bytes } => {
                write!(f, "Error allocating grid buffer of {bytes} bytes")
            }
            Self::InvalidDimensions { cols, rows } => {
                write!(f, "Grid must have at least one interior cell, got {cols}x{rows}")
            }
            Self::SnapshotDimensions { axis, len } => write!(
                f,
                "Cannot create snapshot for {axis}-dimensions >1,000 that are not multiples of 1,000 (got {len})"
            ),
            Self::GpuUnavailable(reason) => write!(f, "GPU backend unavailable: {reason}"),
            Self::Device(msg) => write!(f, "GPU device error: {msg}"),
            Self::Io(e) => write!(f, "Error creating snapshot file: {e}"),
        }
    }
}

impl std::error::Error for PlateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlateError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(PlateError::Allocation { bytes: 16 }.is_fatal());
        assert!(PlateError::Device("lost".into()).is_fatal());
        assert!(!PlateError::SnapshotDimensions {
            axis: Axis::Columns,
            len: 1500
        }
        .is_fatal());
        assert!(!PlateError::Io(std::io::Error::other("disk full")).is_fatal());
    }

    #[test]
    fn test_snapshot_message_names_axis() {
        let err = PlateError::SnapshotDimensions {
            axis: Axis::Rows,
            len: 1234,
        };
        let msg = err.to_string();
        assert!(msg.contains("y-dimensions"), "unexpected message: {msg}");
        assert!(msg.contains("1234"));
    }
}
