//! Field grids for the azimuth particle-in-cell engine.
//!
//! Every azimuthal mode carries two views of the same field data:
//!
//! - an [`InterpGrid`]: complex samples on a cell-centred `(z, r)` mesh,
//!   read by particle gathering and written by deposition;
//! - a [`SpectralGrid`]: the same quantities Fourier-transformed along
//!   `z`, where the field push and source filtering happen.
//!
//! The two views are never current at the same time. [`Fields`] is the
//! contract the orchestrator drives; [`GridFields`] is the reference
//! container, which delegates the Maxwell update to a pluggable
//! [`SpectralSolver`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod adapt;
pub mod error;
pub mod fields;
pub mod grid_fields;
pub mod interp;
pub mod spectral;

pub use adapt::{adapt_to_grid, LoadingRange};
pub use error::GridError;
pub use fields::{Fields, SpectralSolver};
pub use grid_fields::GridFields;
pub use interp::{Component, InterpGrid};
pub use spectral::{SpectralGrid, SpectralSlot, ZTransform};

/// Complex sample type used by every field array.
pub type Complex64 = num_complex::Complex<f64>;
