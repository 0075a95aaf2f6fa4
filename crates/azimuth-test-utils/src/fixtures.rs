//! Ready-made solvers, configurations and simulations for tests.

use azimuth_core::{Boundaries, FieldsError, ParticleShape, StencilOrder};
use azimuth_engine::{Frame, SimulationConfig, SimulationParts};
use azimuth_grid::{SpectralGrid, SpectralSolver};
use azimuth_particles::Species;

use crate::{EventLog, RecordingCommunicator, RecordingFields, RecordingSpecies};

/// Solver that leaves the spectral fields untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrozenSolver;

impl SpectralSolver for FrozenSolver {
    fn name(&self) -> &str {
        "frozen"
    }

    fn push(
        &mut self,
        _grids: &mut [SpectralGrid],
        _dt: f64,
        _use_true_rho: bool,
    ) -> Result<(), FieldsError> {
        Ok(())
    }

    fn correct_currents(
        &mut self,
        _grids: &mut [SpectralGrid],
        _dt: f64,
    ) -> Result<(), FieldsError> {
        Ok(())
    }

    fn correct_div_e(&mut self, _grids: &mut [SpectralGrid]) -> Result<(), FieldsError> {
        Ok(())
    }
}

/// Shape of a simulation assembled entirely from recording mocks.
#[derive(Clone, Debug)]
pub struct RecordingSetup {
    pub log: EventLog,
    pub nm: usize,
    pub nz: usize,
    pub nr: usize,
    pub zmin: f64,
    pub zmax: f64,
    pub dt: f64,
    pub n_guard: usize,
    pub boundaries: Boundaries,
    pub exchange_period: u64,
    pub frame: Frame,
    pub use_device: bool,
    pub filter_currents: bool,
}

impl RecordingSetup {
    /// Two modes of 32 x 4 unit cells, periodic, exchanging every step.
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            nm: 2,
            nz: 32,
            nr: 4,
            zmin: 0.0,
            zmax: 32.0,
            dt: 0.1,
            n_guard: 0,
            boundaries: Boundaries::Periodic,
            exchange_period: 1,
            frame: Frame::Lab,
            use_device: false,
            filter_currents: true,
        }
    }

    /// One [`RecordingSpecies`] per name, sharing the log.
    pub fn species(&self, names: &[&str]) -> Vec<Box<dyn Species>> {
        names
            .iter()
            .map(|n| Box::new(RecordingSpecies::new(*n, self.log.clone())) as Box<dyn Species>)
            .collect()
    }

    pub fn parts(&self, species: Vec<Box<dyn Species>>) -> SimulationParts {
        SimulationParts {
            dt: self.dt,
            exchange_period: self.exchange_period,
            fields: Box::new(RecordingFields::new(
                self.log.clone(),
                self.nm,
                self.nz,
                self.zmin,
                self.zmax,
                self.nr,
                self.dt,
            )),
            species,
            comm: Box::new(RecordingCommunicator::new(
                self.log.clone(),
                self.n_guard,
                self.boundaries,
            )),
            filter_currents: self.filter_currents,
            frame: self.frame,
            boost: None,
            use_device: self.use_device,
            stencil: StencilOrder::Infinite,
            particle_shape: ParticleShape::Linear,
            verbosity: 0,
        }
    }
}

/// Default recording simulation with one species per name.
pub fn recording_parts(log: &EventLog, names: &[&str]) -> SimulationParts {
    let setup = RecordingSetup::new(log.clone());
    let species = setup.species(names);
    setup.parts(species)
}

/// Small uniform plasma of density `n_e` on a periodic box, silent.
pub fn uniform_plasma_config(n_e: f64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.grid.nz = 32;
    config.grid.nr = 8;
    config.grid.nm = 2;
    config.plasma.p_zmax = config.grid.zmax;
    config.plasma.p_rmax = config.grid.rmax;
    config.plasma.n_e = n_e;
    config.verbosity = 0;
    config
}

/// Open-boundary configuration on a 64-cell, 20 um box at
/// `dt = 1e-16` s with 20 guard cells, where particles have to be
/// exchanged every 88 steps.
pub fn open_boundary_config() -> SimulationConfig {
    let mut config = uniform_plasma_config(0.0);
    config.grid.nz = 64;
    config.domain.boundaries = Boundaries::Open;
    config.domain.n_guard = Some(20);
    config.domain.n_damp = 4;
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_parts_share_one_log() {
        let log = EventLog::new();
        let mut parts = recording_parts(&log, &["a", "b"]);
        assert_eq!(parts.species.len(), 2);
        assert_eq!(parts.fields.nm(), 2);
        parts.fields.erase(azimuth_core::SourceField::J);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn configs_validate() {
        uniform_plasma_config(1e24).validate().unwrap();
        open_boundary_config().validate().unwrap();
    }
}
