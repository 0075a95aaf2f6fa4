//! The PIC orchestrator.
//!
//! [`Simulation`] owns the clock, the fields, the species, the
//! communicator and the optional collaborators (antennas, external
//! fields, diagnostics, moving window). [`step()`](Simulation::step)
//! advances everything through the leapfrog cycle:
//!
//! ```text
//! diagnostics → window → E/B exchange → [particle exchange]
//!   → gather → external fields → rho_prev → ionize
//!   → push p → ½ push x → J → ½ push x → rho_next
//!   → correct J → damp → E,B to spectral → push fields → E,B to interp
//! ```
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] so a rank can run on its own thread. All
//! mutating methods take `&mut self`; there is no global state.

use std::time::Instant;

use azimuth_core::constants::{E, M_E, M_P};
use azimuth_core::{
    ConfigError, DepositKind, ExchangeKind, Iteration, ParticleShape, SpeciesError, StagingError,
    StencilOrder, StepError, TransformKind,
};
use azimuth_domain::{
    BoostConverter, BoundaryCommunicator, Communicator, Loopback, Transport, WindowConfig,
};
use azimuth_grid::{adapt_to_grid, Fields, GridFields, InterpGrid, SpectralSolver};
use azimuth_particles::{
    ExternalField, Ionized, LaserAntenna, LoadingProfile, MacroParticles, Species, UniformBlock,
};

use crate::config::{SimulationConfig, StepOptions};
use crate::diagnostic::{Diagnostic, DiagnosticContext};
use crate::metrics::{Phase, StepMetrics};
use crate::progress::ProgressBar;
use crate::setup::{self, Frame, FrameInputs};
use crate::summary::SetupInfo;

// Compile-time assertion: a Simulation can be moved to a rank thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Simulation>();
    }
};

// ── SimulationParts ────────────────────────────────────────────────

/// Pre-built collaborators for [`Simulation::from_parts`].
pub struct SimulationParts {
    /// Timestep in seconds.
    pub dt: f64,
    /// Steps between particle exchanges.
    pub exchange_period: u64,
    /// Field storage and solver.
    pub fields: Box<dyn Fields>,
    /// Particle species.
    pub species: Vec<Box<dyn Species>>,
    /// Cross-domain operations.
    pub comm: Box<dyn Communicator>,
    /// Smooth deposited sources in spectral space.
    pub filter_currents: bool,
    /// Field-solver frame.
    pub frame: Frame,
    /// Boost of the simulation frame, if any.
    pub boost: Option<BoostConverter>,
    /// Stage state to an accelerator around each call.
    pub use_device: bool,
    /// Stencil order, for the setup summary.
    pub stencil: StencilOrder,
    /// Shape of the species, for the setup summary.
    pub particle_shape: ParticleShape,
    /// Setup summary detail.
    pub verbosity: u8,
}

// ── Simulation ─────────────────────────────────────────────────────

/// A running PIC simulation on one rank.
pub struct Simulation {
    time: f64,
    iteration: Iteration,
    dt: f64,
    exchange_period: u64,
    fields: Box<dyn Fields>,
    species: Vec<Box<dyn Species>>,
    comm: Box<dyn Communicator>,
    antennas: Vec<Box<dyn LaserAntenna>>,
    external_fields: Vec<Box<dyn ExternalField>>,
    diagnostics: Vec<Box<dyn Diagnostic>>,
    filter_currents: bool,
    frame: Frame,
    boost: Option<BoostConverter>,
    use_device: bool,
    stencil: StencilOrder,
    particle_shape: ParticleShape,
}

impl Simulation {
    /// Single-process simulation of a uniform plasma.
    pub fn new(
        config: SimulationConfig,
        solver: Box<dyn SpectralSolver>,
    ) -> Result<Self, ConfigError> {
        Self::with_transport(config, solver, Loopback::new())
    }

    /// One rank of a decomposed simulation of a uniform plasma.
    ///
    /// Converts the inputs to the boosted frame if requested, carves out
    /// this rank's slab, derives the exchange period, builds the fields,
    /// then loads electrons (and optionally ions) on the cells of the
    /// slab that the plasma covers.
    pub fn with_transport<T: Transport + 'static>(
        config: SimulationConfig,
        solver: Box<dyn SpectralSolver>,
        transport: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let (inputs, boost) = FrameInputs::from_config(&config)?;
        let frame = Frame::from_solver(&config.solver);

        let mut comm = BoundaryCommunicator::new(
            transport,
            config.grid.nz,
            config.domain.n_guard,
            config.solver.stencil,
            config.domain.n_damp,
            config.domain.boundaries,
        );
        let local = comm.divide_into_domain(inputs.zmin, inputs.zmax, inputs.p_zmin, inputs.p_zmax)?;

        let cells_per_step = setup::cells_per_step(inputs.dt, local.zmin, local.zmax, local.nz());
        let exchange_period = setup::exchange_period(
            cells_per_step,
            comm.n_guard(),
            comm.size(),
            config.domain.boundaries,
            config.domain.exchange_period,
        )?;

        let fields = GridFields::new(
            local.nz(),
            local.zmin,
            local.zmax,
            config.grid.nr,
            config.grid.rmax,
            config.grid.nm,
            inputs.dt,
            solver,
        )?;

        let plasma = &config.plasma;
        let grid = &fields.interp()[0];
        let z = adapt_to_grid(grid.z(), local.p_zmin, local.p_zmax, plasma.p_nz, 0)?;
        let r = adapt_to_grid(grid.r(), plasma.p_rmin, plasma.p_rmax, plasma.p_nr, 0)?;
        let profile = LoadingProfile {
            density: inputs.n_e,
            p_nz: plasma.p_nz,
            p_nr: plasma.p_nr,
            p_nt: plasma.p_nt,
            rmin: r.min,
            rmax: r.max,
            nr_count: r.count,
            dens_func: plasma.dens_func.clone(),
        };
        let block = UniformBlock {
            zmin: z.min,
            zmax: z.max,
            nz_count: z.count,
            u_mean: [0.0, 0.0, inputs.uz_m],
        };

        let mut charges = vec![("electrons", -E, M_E)];
        if plasma.initialize_ions {
            charges.push(("ions", E, M_P));
        }
        let species: Vec<Box<dyn Species>> = charges
            .into_iter()
            .map(|(name, q, m)| {
                let s = MacroParticles::new(
                    name,
                    q,
                    m,
                    inputs.dt,
                    profile.load(&block),
                    plasma.particle_shape,
                )
                .with_loading(profile.clone());
                Box::new(s) as Box<dyn Species>
            })
            .collect();

        log::debug!(
            "rank {}: {} cells in [{:.6e}, {:.6e}], {} particles per species",
            comm.rank(),
            local.nz(),
            local.zmin,
            local.zmax,
            species.first().map_or(0, |s| s.arrays().len())
        );

        Self::from_parts(SimulationParts {
            dt: inputs.dt,
            exchange_period,
            fields: Box::new(fields),
            species,
            comm: Box::new(comm),
            filter_currents: config.solver.filter_currents,
            frame,
            boost,
            use_device: config.use_device,
            stencil: config.solver.stencil,
            particle_shape: plasma.particle_shape,
            verbosity: config.verbosity,
        })
    }

    /// Assemble a simulation from custom collaborators.
    pub fn from_parts(parts: SimulationParts) -> Result<Self, ConfigError> {
        if !parts.dt.is_finite() || parts.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: parts.dt });
        }
        if parts.exchange_period == 0 {
            return Err(ConfigError::InvalidDomain {
                reason: "exchange_period must be at least 1".into(),
            });
        }
        if parts.fields.nm() == 0 {
            return Err(ConfigError::InvalidGrid {
                reason: "at least one azimuthal mode is required".into(),
            });
        }
        let sim = Self {
            time: 0.0,
            iteration: Iteration::default(),
            dt: parts.dt,
            exchange_period: parts.exchange_period,
            fields: parts.fields,
            species: parts.species,
            comm: parts.comm,
            antennas: Vec::new(),
            external_fields: Vec::new(),
            diagnostics: Vec::new(),
            filter_currents: parts.filter_currents,
            frame: parts.frame,
            boost: parts.boost,
            use_device: parts.use_device,
            stencil: parts.stencil,
            particle_shape: parts.particle_shape,
        };
        sim.setup_info().log(sim.comm.rank(), parts.verbosity);
        Ok(sim)
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Completed iterations.
    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    /// Timestep in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Steps between particle exchanges.
    pub fn exchange_period(&self) -> u64 {
        self.exchange_period
    }

    /// Field-solver frame.
    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Boost of the simulation frame, if any.
    pub fn boost(&self) -> Option<&BoostConverter> {
        self.boost.as_ref()
    }

    /// Field storage.
    pub fn fields(&self) -> &dyn Fields {
        self.fields.as_ref()
    }

    /// Particle species, in registration order.
    pub fn species(&self) -> &[Box<dyn Species>] {
        &self.species
    }

    /// Species called `name`.
    pub fn species_named(&self, name: &str) -> Option<&dyn Species> {
        self.species
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    /// Cross-domain operations.
    pub fn comm(&self) -> &dyn Communicator {
        self.comm.as_ref()
    }

    /// What the setup summary reports.
    pub fn setup_info(&self) -> SetupInfo {
        SetupInfo {
            use_device: self.use_device,
            size: self.comm.size(),
            stencil: self.stencil,
            particle_shape: self.particle_shape,
            boundaries: self.comm.boundaries(),
            n_guard: self.comm.n_guard(),
            n_damp: self.comm.n_damp(),
            exchange_period: self.exchange_period,
            gamma_boost: self.boost.map(|b| b.gamma0()),
            frame: self.frame,
        }
    }

    // ── Registration ───────────────────────────────────────────────

    /// Add a particle species.
    pub fn add_species(&mut self, species: Box<dyn Species>) {
        self.species.push(species);
    }

    /// Add a laser antenna.
    pub fn add_antenna(&mut self, antenna: Box<dyn LaserAntenna>) {
        self.antennas.push(antenna);
    }

    /// Add an external field applied after every gather.
    pub fn add_external_field(&mut self, field: Box<dyn ExternalField>) {
        self.external_fields.push(field);
    }

    /// Add a diagnostic written at the start of every step.
    pub fn add_diagnostic(&mut self, diagnostic: Box<dyn Diagnostic>) {
        self.diagnostics.push(diagnostic);
    }

    /// Attach a moving window. Requires open boundaries.
    pub fn set_moving_window(&mut self, config: &WindowConfig) -> Result<(), ConfigError> {
        self.comm.set_moving_window(
            config,
            self.fields.interp(),
            self.frame.galilean_velocity().unwrap_or(0.0),
            self.exchange_period,
            self.dt,
            self.time,
        )
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Advance the simulation by `n` steps.
    ///
    /// Device-resident state is staged in once before the first step and
    /// staged out once after the last. Particles are always exchanged on
    /// the first step of a call, so that they start inside their slab.
    ///
    /// # Errors
    ///
    /// Any collaborator failure aborts the remaining steps. Device state
    /// is still staged out before the first error is returned; the
    /// simulation is then in an unspecified intermediate state.
    pub fn step(&mut self, n: usize, options: &StepOptions) -> Result<StepMetrics, StepError> {
        let call_start = Instant::now();
        let mut metrics = StepMetrics::default();
        let mut progress = (options.show_progress && self.comm.rank() == 0 && n > 0)
            .then(|| ProgressBar::new(n));

        if self.use_device {
            let t = Instant::now();
            self.stage_in()?;
            metrics.record_since(Phase::Staging, t);
        }

        let mut outcome = Ok(());
        for i_step in 0..n {
            if let Some(bar) = progress.as_mut() {
                bar.time(i_step);
                bar.print_progress();
            }
            if let Err(e) = self.one_step(i_step == 0, options, &mut metrics) {
                log::error!("step {} failed: {e}", self.iteration);
                outcome = Err(e);
                break;
            }
            metrics.steps += 1;
        }

        if self.use_device {
            let t = Instant::now();
            let staged = self.stage_out().map_err(StepError::from);
            metrics.record_since(Phase::Staging, t);
            outcome = outcome.and(staged);
        }
        outcome?;

        if let Some(bar) = progress.as_mut() {
            bar.time(n);
            bar.print_summary();
        }
        metrics.total_us = call_start.elapsed().as_micros() as u64;
        Ok(metrics)
    }

    fn one_step(
        &mut self,
        first: bool,
        options: &StepOptions,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        let dt = self.dt;

        let t = Instant::now();
        self.write_diagnostics()?;
        metrics.record_since(Phase::Diagnostics, t);

        let t = Instant::now();
        let moved = self.comm.move_grids(self.fields.interp_mut(), dt, self.time);
        metrics.cells_moved += moved as u64;
        metrics.record_since(Phase::MovingWindow, t);

        let t = Instant::now();
        self.comm
            .exchange_fields(self.fields.interp_mut(), ExchangeKind::EB)?;
        if first || self.iteration.is_multiple_of(self.exchange_period) {
            self.exchange_particles()?;
            metrics.particle_exchanges += 1;
        }
        metrics.record_since(Phase::Exchange, t);

        // Fields at t = n dt.
        let t = Instant::now();
        let grids = self.fields.interp();
        for_each_species(&mut self.species, |s| s.gather(grids))?;
        for field in &self.external_fields {
            for s in self.species.iter_mut() {
                field.apply(s.as_mut(), self.time);
            }
        }
        for s in self.species.iter_mut() {
            s.set_sorted(false);
        }
        metrics.record_since(Phase::Gather, t);

        let t = Instant::now();
        self.deposit(DepositKind::RhoPrev)?;
        metrics.record_since(Phase::Deposit, t);

        // Particles to t = (n + 1/2) dt.
        let t = Instant::now();
        self.handle_ionization()?;
        if options.move_momenta {
            for_each_species(&mut self.species, |s| s.push_p())?;
        }
        if options.move_positions {
            for_each_species(&mut self.species, |s| s.halfpush_x())?;
        }
        for antenna in self.antennas.iter_mut() {
            antenna.update_v(self.time + 0.5 * dt);
            antenna.halfpush_x(dt);
        }
        self.shift_galilean_boundaries();
        metrics.record_since(Phase::Push, t);

        let t = Instant::now();
        self.deposit(DepositKind::J)?;
        metrics.record_since(Phase::Deposit, t);

        // Particles to t = (n + 1) dt.
        let t = Instant::now();
        if options.move_positions {
            for_each_species(&mut self.species, |s| s.halfpush_x())?;
        }
        for antenna in self.antennas.iter_mut() {
            antenna.halfpush_x(dt);
        }
        self.shift_galilean_boundaries();
        metrics.record_since(Phase::Push, t);

        let t = Instant::now();
        self.deposit(DepositKind::RhoNext)?;
        metrics.record_since(Phase::Deposit, t);

        let t = Instant::now();
        if options.correct_currents {
            self.fields.correct_currents()?;
        }
        self.comm.damp_guard_eb(self.fields.interp_mut());
        self.fields.interp2spect(TransformKind::E)?;
        self.fields.interp2spect(TransformKind::B)?;
        self.fields.push(options.use_true_rho)?;
        if options.correct_div_e {
            self.fields.correct_div_e()?;
        }
        self.fields.spect2interp(TransformKind::E)?;
        self.fields.spect2interp(TransformKind::B)?;
        metrics.record_since(Phase::FieldSolve, t);

        self.time += dt;
        self.iteration = self.iteration.next();
        Ok(())
    }

    fn write_diagnostics(&mut self) -> Result<(), StepError> {
        let ctx = DiagnosticContext {
            iteration: self.iteration,
            time: self.time,
            rank: self.comm.rank(),
            grids: self.fields.interp(),
            species: &self.species,
        };
        for diag in self.diagnostics.iter_mut() {
            diag.write(&ctx).map_err(|reason| StepError::Diagnostic {
                name: diag.name().to_string(),
                reason,
            })?;
        }
        Ok(())
    }

    fn exchange_particles(&mut self) -> Result<(), StepError> {
        for s in self.species.iter_mut() {
            self.comm
                .exchange_particles(s.as_mut(), self.fields.interp(), self.time)?;
        }
        // Every species has now been refilled.
        if let Some(window) = self.comm.moving_window_mut() {
            window.clear_injection();
        }
        Ok(())
    }

    fn handle_ionization(&mut self) -> Result<(), StepError> {
        let mut produced: Vec<Ionized> = Vec::new();
        for s in self.species.iter_mut() {
            match s.handle_ionization() {
                Ok(Some(ionized)) => produced.push(ionized),
                Ok(None) => {}
                Err(reason) => {
                    return Err(StepError::Species {
                        name: s.name().to_string(),
                        reason,
                    })
                }
            }
        }
        for Ionized { target, electrons } in produced {
            if electrons.is_empty() {
                continue;
            }
            let Some(dest) = self.species.iter_mut().find(|s| s.name() == target) else {
                return Err(StepError::Species {
                    name: target.clone(),
                    reason: SpeciesError::Ionization {
                        reason: format!("no species named '{target}' receives ionized electrons"),
                    },
                });
            };
            dest.arrays_mut().extend(electrons);
            dest.set_sorted(false);
        }
        Ok(())
    }

    /// Shift every mode's `z` boundaries by half a step of the Galilean
    /// velocity. Field values are untouched. No-op outside a Galilean
    /// frame.
    pub fn shift_galilean_boundaries(&mut self) {
        let Some(v) = self.frame.galilean_velocity() else {
            return;
        };
        let distance = v * 0.5 * self.dt;
        for grid in self.fields.interp_mut() {
            grid.shift_boundaries(distance);
        }
    }

    // ── Deposition ─────────────────────────────────────────────────

    /// Deposit `kind` from every species and antenna and bring it to its
    /// spectral slot.
    pub fn deposit(&mut self, kind: DepositKind) -> Result<(), StepError> {
        let source = kind.source();
        self.fields.erase(source);
        let grids: &mut [InterpGrid] = self.fields.interp_mut();
        for_each_species(&mut self.species, |s| s.deposit(grids, source))?;
        for antenna in self.antennas.iter_mut() {
            antenna
                .deposit(grids, source)
                .map_err(|reason| StepError::Species {
                    name: "antenna".into(),
                    reason,
                })?;
        }
        self.fields.divide_by_volume(source);
        self.comm
            .exchange_fields(self.fields.interp_mut(), kind.exchange())?;

        let transform = TransformKind::from(kind);
        self.fields.interp2spect(transform)?;
        if self.filter_currents {
            self.fields.filter_spect(transform)?;
        }
        Ok(())
    }

    /// [`deposit`](Self::deposit) by name (`rho_prev`, `rho_next` or
    /// `J`). Unknown names fail before anything is touched.
    pub fn deposit_named(&mut self, kind: &str) -> Result<(), StepError> {
        let kind: DepositKind = kind.parse()?;
        self.deposit(kind)
    }

    // ── Staging ────────────────────────────────────────────────────

    fn stage_in(&mut self) -> Result<(), StagingError> {
        self.fields.stage_in()?;
        for s in self.species.iter_mut() {
            s.stage_in()?;
        }
        for a in self.antennas.iter_mut() {
            a.stage_in()?;
        }
        Ok(())
    }

    fn stage_out(&mut self) -> Result<(), StagingError> {
        self.fields.stage_out()?;
        for s in self.species.iter_mut() {
            s.stage_out()?;
        }
        for a in self.antennas.iter_mut() {
            a.stage_out()?;
        }
        Ok(())
    }
}

/// Run `f` on every species, tagging a failure with the species name.
fn for_each_species<F>(species: &mut [Box<dyn Species>], mut f: F) -> Result<(), StepError>
where
    F: FnMut(&mut dyn Species) -> Result<(), SpeciesError>,
{
    for s in species.iter_mut() {
        f(s.as_mut()).map_err(|reason| StepError::Species {
            name: s.name().to_string(),
            reason,
        })?;
    }
    Ok(())
}
