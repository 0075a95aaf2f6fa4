//! Laser antennas: virtual particles that emit a laser by depositing
//! current.

use azimuth_core::{Resident, SourceField, SpeciesError};
use azimuth_grid::InterpGrid;

/// A set of virtual particles driven on a prescribed trajectory.
///
/// Antennas follow the half-step position schedule of real particles
/// but never receive a momentum push.
pub trait LaserAntenna: Resident + Send {
    /// Set the antenna particles' velocities for time `t`.
    fn update_v(&mut self, t: f64);

    /// Advance antenna positions by `dt / 2`.
    fn halfpush_x(&mut self, dt: f64);

    /// Add the antenna's charge or current to `source`.
    fn deposit(&mut self, grids: &mut [InterpGrid], source: SourceField)
        -> Result<(), SpeciesError>;
}
