//! Boundary, particle-shape and stencil options.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Longitudinal boundary condition of the global simulation box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Boundaries {
    /// Fields and particles wrap around the box.
    #[default]
    Periodic,
    /// Fields are damped and particles dropped at the global edges.
    Open,
}

impl fmt::Display for Boundaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Periodic => f.write_str("periodic"),
            Self::Open => f.write_str("open"),
        }
    }
}

impl FromStr for Boundaries {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic" => Ok(Self::Periodic),
            "open" => Ok(Self::Open),
            other => Err(ConfigError::UnknownBoundaries {
                name: other.to_string(),
            }),
        }
    }
}

/// Shape factor used to spread a macro-particle onto the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParticleShape {
    /// First-order (cloud-in-cell) shape.
    #[default]
    Linear,
    /// First-order shape with a deposition scheme that avoids atomics.
    /// Numerically identical to `Linear`.
    LinearNonAtomic,
    /// Third-order B-spline shape.
    Cubic,
}

impl ParticleShape {
    /// Number of cells, on either side of the particle's cell, that the
    /// widest supported shape can touch.
    ///
    /// The exchange period keeps particles at least this far from the
    /// outer edge of the guard region.
    pub const MAX_STENCIL_REACH: usize = 3;

    /// Polynomial order of the shape factor.
    pub fn order(self) -> usize {
        match self {
            Self::Linear | Self::LinearNonAtomic => 1,
            Self::Cubic => 3,
        }
    }

    /// Canonical configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::LinearNonAtomic => "linear_non_atomic",
            Self::Cubic => "cubic",
        }
    }
}

impl fmt::Display for ParticleShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticleShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "linear_non_atomic" => Ok(Self::LinearNonAtomic),
            "cubic" => Ok(Self::Cubic),
            other => Err(ConfigError::UnknownParticleShape {
                name: other.to_string(),
            }),
        }
    }
}

/// Order of the longitudinal derivative stencil of the field solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilOrder {
    /// Spectrally exact derivatives.
    #[default]
    Infinite,
    /// Finite, positive, even order; the stencil reaches about
    /// `2 * order` cells on each side.
    Finite(usize),
}

impl StencilOrder {
    /// Guard cells used when none are configured explicitly.
    pub const INFINITE_ORDER_GUARD: usize = 30;

    /// Parse the conventional integer form, where `-1` means infinite.
    pub fn from_n_order(n_order: i64) -> Result<Self, ConfigError> {
        match n_order {
            -1 => Ok(Self::Infinite),
            n if n > 0 && n % 2 == 0 => Ok(Self::Finite(n as usize)),
            n => Err(ConfigError::InvalidGrid {
                reason: format!("stencil order must be -1 or a positive even number, got {n}"),
            }),
        }
    }

    /// Default guard-region width for this order.
    pub fn default_guard_cells(self) -> usize {
        match self {
            Self::Infinite => Self::INFINITE_ORDER_GUARD,
            Self::Finite(n) => 2 * n,
        }
    }
}

impl fmt::Display for StencilOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::Finite(n) => write!(f, "{n}"),
        }
    }
}
