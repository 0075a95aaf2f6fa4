//! Macro-particle species for the azimuth particle-in-cell engine.
//!
//! The step loop drives particles through the [`Species`] trait:
//! gather fields, push momenta, half-push positions twice, and deposit
//! charge and current. [`MacroParticles`] is the reference species, with
//! B-spline shape factors ([`ModalShapeKernel`]) and a Boris pusher.
//! [`LaserAntenna`], [`ExternalField`] and [`Ionizer`] are the hooks for
//! laser emission, analytic fields and ionization.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod antenna;
pub mod arrays;
pub mod external;
pub mod ionization;
pub mod loading;
pub mod push;
pub mod shape;
pub mod species;

pub use antenna::LaserAntenna;
pub use arrays::{GatheredField, Particle, ParticleArrays};
pub use external::{ExternalField, ExternalFieldExpr, ExternalFieldExprBuilder, FieldProfile};
pub use ionization::{Ionized, Ionizer};
pub use loading::{DensityFn, LoadingProfile, UniformBlock};
pub use shape::{ModalShapeKernel, ShapeKernel, Stencil};
pub use species::{MacroParticles, Species};
