//! Azimuth: a spectral, quasi-cylindrical particle-in-cell engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all azimuth sub-crates. For most users, adding `azimuth` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use azimuth::prelude::*;
//! use azimuth::grid::SpectralGrid;
//!
//! // A solver that leaves E and B alone.
//! struct Frozen;
//! impl SpectralSolver for Frozen {
//!     fn name(&self) -> &str { "frozen" }
//!     fn push(&mut self, _: &mut [SpectralGrid], _: f64, _: bool) -> Result<(), FieldsError> {
//!         Ok(())
//!     }
//!     fn correct_currents(&mut self, _: &mut [SpectralGrid], _: f64) -> Result<(), FieldsError> {
//!         Ok(())
//!     }
//!     fn correct_div_e(&mut self, _: &mut [SpectralGrid]) -> Result<(), FieldsError> {
//!         Ok(())
//!     }
//! }
//!
//! let mut config = SimulationConfig::default();
//! config.plasma.n_e = 1e24;
//! config.verbosity = 0;
//! let mut sim = Simulation::new(config, Box::new(Frozen)).unwrap();
//!
//! let options = StepOptions { show_progress: false, ..StepOptions::default() };
//! let metrics = sim.step(3, &options).unwrap();
//! assert_eq!(metrics.steps, 3);
//! assert_eq!(sim.iteration(), Iteration(3));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `azimuth-core` | Constants, iteration counter, field kinds, options, errors |
//! | [`grid`] | `azimuth-grid` | Interpolation and spectral grids, the `Fields` contract |
//! | [`particles`] | `azimuth-particles` | Species, loading, shape kernels, antennas |
//! | [`domain`] | `azimuth-domain` | Decomposition, guard exchange, moving window, boosts |
//! | [`engine`] | `azimuth-engine` | Configuration, the PIC loop, diagnostics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core vocabulary (`azimuth-core`).
///
/// Physical constants, [`types::Iteration`], the closed sets of field
/// kinds, boundary and shape options, and every error type.
pub use azimuth_core as types;

/// Field storage (`azimuth-grid`).
///
/// [`grid::InterpGrid`] holds one azimuthal mode on the real-space grid;
/// [`grid::Fields`] is the contract the orchestrator drives.
pub use azimuth_grid as grid;

/// Particle species (`azimuth-particles`).
pub use azimuth_particles as particles;

/// Multi-domain plumbing (`azimuth-domain`).
///
/// [`domain::BoundaryCommunicator`] over a [`domain::Transport`], the
/// [`domain::MovingWindow`] and the Lorentz [`domain::BoostConverter`].
pub use azimuth_domain as domain;

/// The orchestrator (`azimuth-engine`).
pub use azimuth_engine as engine;

/// Common imports for typical azimuth usage.
///
/// ```rust
/// use azimuth::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use azimuth_core::{
        Boundaries, DepositKind, Iteration, ParticleShape, SourceField, StencilOrder,
    };

    // Errors
    pub use azimuth_core::{ConfigError, FieldsError, SpeciesError, StepError};

    // Fields and particles
    pub use azimuth_grid::{Fields, InterpGrid, SpectralSolver};
    pub use azimuth_particles::{MacroParticles, Species};

    // Domain
    pub use azimuth_domain::{Communicator, WindowConfig};

    // Engine
    pub use azimuth_engine::{Diagnostic, Simulation, SimulationConfig, StepMetrics, StepOptions};
}
