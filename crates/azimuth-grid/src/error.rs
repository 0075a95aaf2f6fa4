//! Error types for grid construction and particle-range snapping.

use azimuth_core::ConfigError;
use std::fmt;

/// Errors arising from grid construction or grid queries.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// An axis has zero cells.
    EmptyAxis {
        /// Axis name (`"z"` or `"r"`).
        axis: &'static str,
    },
    /// An axis has a non-finite or non-increasing extent.
    InvalidExtent {
        /// Axis name.
        axis: &'static str,
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Snapping needs at least two grid points to infer the spacing.
    TooFewPoints {
        /// Number of points supplied.
        len: usize,
    },
    /// Grid coordinates must be strictly increasing.
    NotIncreasing {
        /// Index of the first offending point.
        index: usize,
    },
    /// No azimuthal modes requested.
    NoModes,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyAxis { axis } => write!(f, "axis {axis} must have at least one cell"),
            Self::InvalidExtent { axis, min, max } => {
                write!(f, "axis {axis} extent [{min}, {max}] is not a finite increasing range")
            }
            Self::TooFewPoints { len } => {
                write!(f, "need at least 2 grid points to snap, got {len}")
            }
            Self::NotIncreasing { index } => {
                write!(f, "grid coordinates not strictly increasing at index {index}")
            }
            Self::NoModes => write!(f, "at least one azimuthal mode is required"),
        }
    }
}

impl std::error::Error for GridError {}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        ConfigError::InvalidGrid {
            reason: e.to_string(),
        }
    }
}
