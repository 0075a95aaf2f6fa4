//! Ionization hook.

use azimuth_core::SpeciesError;

use crate::arrays::ParticleArrays;

/// Electrons released by one ionization pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ionized {
    /// Name of the species that receives the electrons.
    pub target: String,
    /// The new electrons.
    pub electrons: ParticleArrays,
}

/// An ionization model attached to an ion species.
///
/// Called once per step after `rho_prev` is deposited, with the
/// gathered fields of the ions still valid.
pub trait Ionizer: Send {
    /// Name of the species that receives released electrons.
    fn target(&self) -> &str;

    /// Update the ions' charge state and return released electrons.
    fn ionize(&mut self, ions: &mut ParticleArrays, dt: f64) -> Result<Ionized, SpeciesError>;
}
