//! Time-stepping orchestration for the azimuth particle-in-cell engine.
//!
//! [`Simulation`] owns the state of one rank and advances it through the
//! PIC cycle with [`Simulation::step`]. Construction either follows the
//! standard path from a [`SimulationConfig`] (uniform plasma, derived
//! guard widths and exchange period, optional boosted frame) or
//! assembles custom collaborators with [`Simulation::from_parts`].
//!
//! # Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`SimulationConfig`], [`StepOptions`], [`WindowConfig`] |
//! | [`setup`] | exchange period, [`Frame`], boosted inputs |
//! | [`simulation`] | the orchestrator |
//! | [`diagnostic`] | [`Diagnostic`] trait and [`FieldEnergyProbe`] |
//! | [`metrics`] | [`StepMetrics`] |
//! | [`progress`] | terminal [`ProgressBar`] |
//! | [`summary`] | setup summary |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod diagnostic;
pub mod metrics;
pub mod progress;
pub mod setup;
pub mod simulation;
pub mod summary;

pub use config::{
    DomainConfig, GridConfig, PlasmaConfig, SimulationConfig, SolverConfig, StepOptions,
    WindowConfig,
};
pub use diagnostic::{
    Diagnostic, DiagnosticContext, EnergyHistory, EnergySample, FieldEnergyProbe,
};
pub use metrics::{Phase, StepMetrics};
pub use progress::ProgressBar;
pub use setup::{cells_per_step, exchange_period, Frame, FrameInputs};
pub use simulation::{Simulation, SimulationParts};
pub use summary::SetupInfo;
