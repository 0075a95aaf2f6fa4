//! Test utilities and recording mocks for azimuth development.
//!
//! Every mock appends what it is asked to do to a shared [`EventLog`],
//! so tests can assert on the exact order in which the orchestrator
//! drives its collaborators. [`fixtures`] builds complete simulations
//! out of these mocks.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::sync::{Arc, Mutex, PoisonError};

use azimuth_core::{
    Boundaries, ConfigError, DiagnosticError, ExchangeError, ExchangeKind, FieldsError, Resident,
    SourceField, SpeciesError, StagingError, TransformKind,
};
use azimuth_domain::{Communicator, LocalDomain, MovingWindow, WindowConfig, WindowGeometry};
use azimuth_engine::{Diagnostic, DiagnosticContext};
use azimuth_grid::{Fields, InterpGrid};
use azimuth_particles::{
    ExternalField, Ionized, LaserAntenna, Particle, ParticleArrays, Species,
};

pub use fixtures::{recording_parts, FrozenSolver, RecordingSetup};

// ── EventLog ───────────────────────────────────────────────────────

/// One call observed by a recording mock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    StageIn(String),
    StageOut(String),
    Diagnostic(u64),
    MoveGrids,
    ExchangeFields(ExchangeKind),
    ExchangeParticles(String),
    Damp,
    Gather(String),
    ExternalField(String),
    Unsorted(String),
    Erase(SourceField),
    Deposit(String, SourceField),
    AntennaDeposit(SourceField),
    DivideByVolume(SourceField),
    Interp2Spect(TransformKind),
    Spect2Interp(TransformKind),
    Filter(TransformKind),
    PushFields { use_true_rho: bool },
    CorrectCurrents,
    CorrectDivE,
    Ionize(String),
    PushP(String),
    HalfPushX(String),
    AntennaUpdateV,
    AntennaHalfPush,
}

/// Shared, append-only record of [`Event`]s.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first occurrence of `event`.
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Number of occurrences of `event`.
    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }
}

// ── RecordingFields ────────────────────────────────────────────────

/// [`Fields`] over real interpolation grids that records every call
/// and has no spectral side.
pub struct RecordingFields {
    log: EventLog,
    dt: f64,
    grids: Vec<InterpGrid>,
}

impl RecordingFields {
    /// `nm` modes of `nz x nr` cells over `[zmin, zmax] x [0, 1]`.
    pub fn new(log: EventLog, nm: usize, nz: usize, zmin: f64, zmax: f64, nr: usize, dt: f64) -> Self {
        let grids = (0..nm)
            .map(|m| InterpGrid::new(m, nz, zmin, zmax, nr, 1.0))
            .collect::<Result<Vec<_>, _>>()
            .unwrap_or_else(|e| panic!("invalid recording grid: {e}"));
        Self { log, dt, grids }
    }
}

impl Resident for RecordingFields {
    fn stage_in(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageIn("fields".into()));
        Ok(())
    }

    fn stage_out(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageOut("fields".into()));
        Ok(())
    }
}

impl Fields for RecordingFields {
    fn nm(&self) -> usize {
        self.grids.len()
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn interp(&self) -> &[InterpGrid] {
        &self.grids
    }

    fn interp_mut(&mut self) -> &mut [InterpGrid] {
        &mut self.grids
    }

    fn erase(&mut self, source: SourceField) {
        self.log.push(Event::Erase(source));
        for g in &mut self.grids {
            g.erase(source);
        }
    }

    fn divide_by_volume(&mut self, source: SourceField) {
        self.log.push(Event::DivideByVolume(source));
        for g in &mut self.grids {
            g.divide_by_volume(source);
        }
    }

    fn interp2spect(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        self.log.push(Event::Interp2Spect(kind));
        Ok(())
    }

    fn spect2interp(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        self.log.push(Event::Spect2Interp(kind));
        Ok(())
    }

    fn filter_spect(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        self.log.push(Event::Filter(kind));
        Ok(())
    }

    fn push(&mut self, use_true_rho: bool) -> Result<(), FieldsError> {
        self.log.push(Event::PushFields { use_true_rho });
        Ok(())
    }

    fn correct_currents(&mut self) -> Result<(), FieldsError> {
        self.log.push(Event::CorrectCurrents);
        Ok(())
    }

    fn correct_div_e(&mut self) -> Result<(), FieldsError> {
        self.log.push(Event::CorrectDivE);
        Ok(())
    }
}

// ── RecordingSpecies ───────────────────────────────────────────────

/// [`Species`] that records calls and never moves its particles.
///
/// Depositing adds the species charge to `rho` (or 1 to `Jz`) in the
/// first cell of every grid, so tests can see that it happened.
pub struct RecordingSpecies {
    name: String,
    log: EventLog,
    arrays: ParticleArrays,
    sorted: bool,
    ionizes_into: Option<String>,
    fail_gather: bool,
}

impl RecordingSpecies {
    pub fn new(name: impl Into<String>, log: EventLog) -> Self {
        Self {
            name: name.into(),
            log,
            arrays: ParticleArrays::new(),
            sorted: true,
            ionizes_into: None,
            fail_gather: false,
        }
    }

    /// Release one electron into `target` on every ionization pass.
    pub fn ionizing_into(mut self, target: impl Into<String>) -> Self {
        self.ionizes_into = Some(target.into());
        self
    }

    /// Make every gather fail.
    pub fn failing_gather(mut self) -> Self {
        self.fail_gather = true;
        self
    }
}

impl Resident for RecordingSpecies {
    fn stage_in(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageIn(self.name.clone()));
        Ok(())
    }

    fn stage_out(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageOut(self.name.clone()));
        Ok(())
    }
}

impl Species for RecordingSpecies {
    fn name(&self) -> &str {
        &self.name
    }

    fn charge(&self) -> f64 {
        -1.0
    }

    fn mass(&self) -> f64 {
        1.0
    }

    fn arrays(&self) -> &ParticleArrays {
        &self.arrays
    }

    fn arrays_mut(&mut self) -> &mut ParticleArrays {
        &mut self.arrays
    }

    fn is_sorted(&self) -> bool {
        self.sorted
    }

    fn set_sorted(&mut self, sorted: bool) {
        if !sorted {
            self.log.push(Event::Unsorted(self.name.clone()));
        }
        self.sorted = sorted;
    }

    fn gather(&mut self, _grids: &[InterpGrid]) -> Result<(), SpeciesError> {
        self.log.push(Event::Gather(self.name.clone()));
        if self.fail_gather {
            return Err(SpeciesError::ExecutionFailed {
                reason: "gather refused".into(),
            });
        }
        Ok(())
    }

    fn deposit(&mut self, grids: &mut [InterpGrid], source: SourceField) -> Result<(), SpeciesError> {
        self.log.push(Event::Deposit(self.name.clone(), source));
        let (component, value) = match source {
            SourceField::Rho => (azimuth_grid::Component::Rho, self.charge()),
            SourceField::J => (azimuth_grid::Component::Jz, 1.0),
        };
        for g in grids {
            g.component_mut(component)[0] += azimuth_grid::Complex64::new(value, 0.0);
        }
        Ok(())
    }

    fn push_p(&mut self) -> Result<(), SpeciesError> {
        self.log.push(Event::PushP(self.name.clone()));
        Ok(())
    }

    fn halfpush_x(&mut self) -> Result<(), SpeciesError> {
        self.log.push(Event::HalfPushX(self.name.clone()));
        Ok(())
    }

    fn handle_ionization(&mut self) -> Result<Option<Ionized>, SpeciesError> {
        self.log.push(Event::Ionize(self.name.clone()));
        let Some(target) = self.ionizes_into.clone() else {
            return Ok(None);
        };
        let mut electrons = ParticleArrays::new();
        electrons.push(Particle {
            position: [0.0; 3],
            momentum: [0.0; 3],
            w: 1.0,
        });
        Ok(Some(Ionized { target, electrons }))
    }
}

// ── RecordingCommunicator ──────────────────────────────────────────

/// Single-rank [`Communicator`] that records calls and moves nothing,
/// except for an attached moving window, which is driven for real.
pub struct RecordingCommunicator {
    log: EventLog,
    n_guard: usize,
    boundaries: Boundaries,
    window: Option<MovingWindow>,
}

impl RecordingCommunicator {
    pub fn new(log: EventLog, n_guard: usize, boundaries: Boundaries) -> Self {
        Self {
            log,
            n_guard,
            boundaries,
            window: None,
        }
    }
}

impl Communicator for RecordingCommunicator {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn n_guard(&self) -> usize {
        self.n_guard
    }

    fn n_damp(&self) -> usize {
        0
    }

    fn boundaries(&self) -> Boundaries {
        self.boundaries
    }

    fn divide_into_domain(
        &mut self,
        zmin: f64,
        zmax: f64,
        p_zmin: f64,
        p_zmax: f64,
    ) -> Result<LocalDomain, ConfigError> {
        Err(ConfigError::InvalidDomain {
            reason: format!(
                "recording communicator cannot divide [{zmin}, {zmax}] / [{p_zmin}, {p_zmax}]"
            ),
        })
    }

    fn exchange_fields(
        &mut self,
        _grids: &mut [InterpGrid],
        kind: ExchangeKind,
    ) -> Result<(), ExchangeError> {
        self.log.push(Event::ExchangeFields(kind));
        Ok(())
    }

    fn exchange_particles(
        &mut self,
        species: &mut dyn Species,
        grids: &[InterpGrid],
        time: f64,
    ) -> Result<(), ExchangeError> {
        self.log.push(Event::ExchangeParticles(species.name().to_string()));
        if let (Some(window), Some(grid)) = (self.window.as_mut(), grids.first()) {
            let phys_zmax = grid.zmax() - self.n_guard as f64 * grid.dz();
            window.inject(species, phys_zmax, time);
        }
        Ok(())
    }

    fn damp_guard_eb(&mut self, _grids: &mut [InterpGrid]) {
        self.log.push(Event::Damp);
    }

    fn move_grids(&mut self, grids: &mut [InterpGrid], dt: f64, _time: f64) -> usize {
        self.log.push(Event::MoveGrids);
        match self.window.as_mut() {
            Some(w) => w.move_grids(grids, dt),
            None => 0,
        }
    }

    fn set_moving_window(
        &mut self,
        config: &WindowConfig,
        grids: &[InterpGrid],
        grid_v: f64,
        exchange_period: u64,
        dt: f64,
        time: f64,
    ) -> Result<(), ConfigError> {
        let grid = grids.first().ok_or_else(|| ConfigError::InvalidWindow {
            reason: "no grid".into(),
        })?;
        let geometry = WindowGeometry {
            n_right: self.n_guard,
            is_last: true,
        };
        self.window = Some(MovingWindow::new(
            config,
            grid,
            geometry,
            grid_v,
            exchange_period,
            dt,
            time,
        )?);
        Ok(())
    }

    fn moving_window(&self) -> Option<&MovingWindow> {
        self.window.as_ref()
    }

    fn moving_window_mut(&mut self) -> Option<&mut MovingWindow> {
        self.window.as_mut()
    }
}

// ── Optional collaborators ─────────────────────────────────────────

/// [`LaserAntenna`] that records calls.
pub struct RecordingAntenna {
    log: EventLog,
}

impl RecordingAntenna {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl Resident for RecordingAntenna {
    fn stage_in(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageIn("antenna".into()));
        Ok(())
    }

    fn stage_out(&mut self) -> Result<(), StagingError> {
        self.log.push(Event::StageOut("antenna".into()));
        Ok(())
    }
}

impl LaserAntenna for RecordingAntenna {
    fn update_v(&mut self, _t: f64) {
        self.log.push(Event::AntennaUpdateV);
    }

    fn halfpush_x(&mut self, _dt: f64) {
        self.log.push(Event::AntennaHalfPush);
    }

    fn deposit(&mut self, _grids: &mut [InterpGrid], source: SourceField) -> Result<(), SpeciesError> {
        self.log.push(Event::AntennaDeposit(source));
        Ok(())
    }
}

/// [`ExternalField`] that records which species it was applied to.
pub struct RecordingExternalField {
    log: EventLog,
}

impl RecordingExternalField {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl ExternalField for RecordingExternalField {
    fn apply(&self, species: &mut dyn Species, _t: f64) {
        self.log.push(Event::ExternalField(species.name().to_string()));
    }
}

/// [`Diagnostic`] that records the iteration it was written at, and
/// optionally fails from a given iteration on.
pub struct RecordingDiagnostic {
    log: EventLog,
    fail_from: Option<u64>,
}

impl RecordingDiagnostic {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_from: None,
        }
    }

    pub fn failing_from(mut self, iteration: u64) -> Self {
        self.fail_from = Some(iteration);
        self
    }
}

impl Diagnostic for RecordingDiagnostic {
    fn name(&self) -> &str {
        "recording"
    }

    fn write(&mut self, ctx: &DiagnosticContext<'_>) -> Result<(), DiagnosticError> {
        self.log.push(Event::Diagnostic(ctx.iteration.0));
        match self.fail_from {
            Some(from) if ctx.iteration.0 >= from => Err(DiagnosticError::WriteFailed {
                reason: "disk full".into(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_shared_between_clones() {
        let log = EventLog::new();
        let other = log.clone();
        other.push(Event::Damp);
        log.push(Event::MoveGrids);
        assert_eq!(log.events(), vec![Event::Damp, Event::MoveGrids]);
        assert_eq!(other.position(&Event::MoveGrids), Some(1));
        assert_eq!(log.count(&Event::Damp), 1);
        log.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn recording_species_deposits_marker() {
        let log = EventLog::new();
        let mut s = RecordingSpecies::new("e", log.clone());
        let mut grids = vec![InterpGrid::new(0, 4, 0.0, 4.0, 2, 1.0).unwrap()];
        s.deposit(&mut grids, SourceField::Rho).unwrap();
        assert_eq!(grids[0].component(azimuth_grid::Component::Rho)[0].re, -1.0);
        assert_eq!(log.events(), vec![Event::Deposit("e".into(), SourceField::Rho)]);
    }
}
