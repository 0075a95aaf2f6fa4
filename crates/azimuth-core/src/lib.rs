//! Core types and traits for the azimuth particle-in-cell engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace:
//! physical constants, the iteration counter, the closed set of field
//! kinds used by deposition and guard exchange, boundary and particle
//! shape options, error types, and the [`Resident`] capability.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod constants;
pub mod error;
pub mod id;
pub mod kind;
pub mod options;
pub mod traits;

pub use error::{
    ConfigError, DepositError, DiagnosticError, ExchangeError, FieldsError, SpeciesError,
    StagingError, StepError,
};
pub use id::Iteration;
pub use kind::{DepositKind, ExchangeKind, SourceField, TransformKind};
pub use options::{Boundaries, ParticleShape, StencilOrder};
pub use traits::Resident;
