//! Simulation configuration and validation.
//!
//! [`SimulationConfig`] is the input of the standard construction path,
//! [`Simulation::new`](crate::Simulation::new). All quantities are given
//! in the lab frame and SI units; a boosted frame is applied during
//! construction. [`validate()`](SimulationConfig::validate) checks
//! everything that can be checked without building grids.

use std::fmt;

use azimuth_core::{Boundaries, ConfigError, ParticleShape, StencilOrder};
use azimuth_domain::BoostConverter;
use azimuth_particles::DensityFn;

pub use azimuth_domain::WindowConfig;

// ── GridConfig ─────────────────────────────────────────────────────

/// Global extent and resolution of the field grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Cells along `z`.
    pub nz: usize,
    /// Lower edge of the box in `z`.
    pub zmin: f64,
    /// Upper edge of the box in `z`.
    pub zmax: f64,
    /// Cells along `r`.
    pub nr: usize,
    /// Radial extent of the box.
    pub rmax: f64,
    /// Number of azimuthal modes.
    pub nm: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nz: 64,
            zmin: 0.0,
            zmax: 20e-6,
            nr: 32,
            rmax: 20e-6,
            nm: 2,
        }
    }
}

// ── PlasmaConfig ───────────────────────────────────────────────────

/// The uniform plasma loaded at construction.
#[derive(Clone)]
pub struct PlasmaConfig {
    /// Lower `z` bound of the plasma.
    pub p_zmin: f64,
    /// Upper `z` bound of the plasma.
    pub p_zmax: f64,
    /// Lower `r` bound of the plasma.
    pub p_rmin: f64,
    /// Upper `r` bound of the plasma.
    pub p_rmax: f64,
    /// Macro-particles per cell along `z`.
    pub p_nz: usize,
    /// Macro-particles per cell along `r`.
    pub p_nr: usize,
    /// Macro-particles along `theta`.
    pub p_nt: usize,
    /// Electron density in particles per cubic metre.
    pub n_e: f64,
    /// Mean longitudinal normalised momentum of the plasma.
    pub uz_m: f64,
    /// Optional relative density profile `f(z, r)`.
    pub dens_func: Option<DensityFn>,
    /// Also load neutralising ions.
    pub initialize_ions: bool,
    /// Shape factor of every loaded species.
    pub particle_shape: ParticleShape,
}

impl Default for PlasmaConfig {
    fn default() -> Self {
        Self {
            p_zmin: 0.0,
            p_zmax: 20e-6,
            p_rmin: 0.0,
            p_rmax: 20e-6,
            p_nz: 2,
            p_nr: 2,
            p_nt: 4,
            n_e: 0.0,
            uz_m: 0.0,
            dens_func: None,
            initialize_ions: false,
            particle_shape: ParticleShape::Linear,
        }
    }
}

impl fmt::Debug for PlasmaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlasmaConfig")
            .field("p_zmin", &self.p_zmin)
            .field("p_zmax", &self.p_zmax)
            .field("p_rmin", &self.p_rmin)
            .field("p_rmax", &self.p_rmax)
            .field("p_nz", &self.p_nz)
            .field("p_nr", &self.p_nr)
            .field("p_nt", &self.p_nt)
            .field("n_e", &self.n_e)
            .field("uz_m", &self.uz_m)
            .field("dens_func", &self.dens_func.is_some())
            .field("initialize_ions", &self.initialize_ions)
            .field("particle_shape", &self.particle_shape)
            .finish()
    }
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Options of the field update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    /// Order of the longitudinal stencil. Default: infinite.
    pub stencil: StencilOrder,
    /// Smooth deposited sources in spectral space. Default: true.
    pub filter_currents: bool,
    /// Velocity of the comoving frame, if any.
    pub v_comoving: Option<f64>,
    /// Shift the grid with `v_comoving` instead of solving in comoving
    /// variables. Default: false.
    pub use_galilean: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            stencil: StencilOrder::Infinite,
            filter_currents: true,
            v_comoving: None,
            use_galilean: false,
        }
    }
}

// ── DomainConfig ───────────────────────────────────────────────────

/// Decomposition and exchange options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DomainConfig {
    /// Guard cells per interior boundary. `None` derives it from the
    /// stencil order.
    pub n_guard: Option<usize>,
    /// Absorbing cells at open global edges. Default: 30.
    pub n_damp: usize,
    /// Steps between particle exchanges. `None` derives it from the
    /// guard width and the timestep.
    pub exchange_period: Option<u64>,
    /// Behaviour at the global `z` edges. Default: periodic.
    pub boundaries: Boundaries,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            n_guard: None,
            n_damp: 30,
            exchange_period: None,
            boundaries: Boundaries::Periodic,
        }
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Complete input of [`Simulation::new`](crate::Simulation::new).
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Field grid.
    pub grid: GridConfig,
    /// Timestep in seconds.
    pub dt: f64,
    /// Initial plasma.
    pub plasma: PlasmaConfig,
    /// Field update options.
    pub solver: SolverConfig,
    /// Decomposition options.
    pub domain: DomainConfig,
    /// Lorentz factor of a boosted simulation frame.
    pub gamma_boost: Option<f64>,
    /// Stage fields and particles to an accelerator around each call.
    pub use_device: bool,
    /// Setup summary detail: 0 silent, 1 basic, 2 detailed. Default: 1.
    pub verbosity: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            dt: 1e-16,
            plasma: PlasmaConfig::default(),
            solver: SolverConfig::default(),
            domain: DomainConfig::default(),
            gamma_boost: None,
            use_device: false,
            verbosity: 1,
        }
    }
}

impl SimulationConfig {
    /// Check all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.grid;
        if g.nz == 0 || g.nr == 0 {
            return Err(ConfigError::InvalidGrid {
                reason: format!("grid needs at least one cell per axis, got {}x{}", g.nz, g.nr),
            });
        }
        if g.nm == 0 {
            return Err(ConfigError::InvalidGrid {
                reason: "at least one azimuthal mode is required".into(),
            });
        }
        if !g.zmin.is_finite() || !g.zmax.is_finite() || g.zmax <= g.zmin {
            return Err(ConfigError::InvalidGrid {
                reason: format!("zmax ({}) must exceed zmin ({})", g.zmax, g.zmin),
            });
        }
        if !g.rmax.is_finite() || g.rmax <= 0.0 {
            return Err(ConfigError::InvalidGrid {
                reason: format!("rmax must be finite and positive, got {}", g.rmax),
            });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimestep { value: self.dt });
        }

        let p = &self.plasma;
        if p.p_nz == 0 || p.p_nr == 0 || p.p_nt == 0 {
            return Err(ConfigError::InvalidPlasma {
                reason: "particles per cell must be at least 1 along every axis".into(),
            });
        }
        if !p.n_e.is_finite() || p.n_e < 0.0 {
            return Err(ConfigError::InvalidPlasma {
                reason: format!("density must be finite and >= 0, got {}", p.n_e),
            });
        }
        if [p.p_zmin, p.p_zmax, p.p_rmin, p.p_rmax].iter().any(|v| v.is_nan()) {
            return Err(ConfigError::InvalidPlasma {
                reason: "plasma bounds must not be NaN".into(),
            });
        }
        if p.p_zmax < p.p_zmin || p.p_rmax < p.p_rmin {
            return Err(ConfigError::InvalidPlasma {
                reason: format!(
                    "plasma bounds [{}, {}] x [{}, {}] are reversed",
                    p.p_zmin, p.p_zmax, p.p_rmin, p.p_rmax
                ),
            });
        }
        if !p.uz_m.is_finite() {
            return Err(ConfigError::InvalidPlasma {
                reason: format!("mean momentum must be finite, got {}", p.uz_m),
            });
        }

        if let Some(v) = self.solver.v_comoving {
            if !v.is_finite() {
                return Err(ConfigError::InvalidGrid {
                    reason: format!("v_comoving must be finite, got {v}"),
                });
            }
        }
        if self.domain.exchange_period == Some(0) {
            return Err(ConfigError::InvalidDomain {
                reason: "exchange_period must be at least 1".into(),
            });
        }
        if let Some(gamma) = self.gamma_boost {
            BoostConverter::new(gamma)?;
        }
        Ok(())
    }
}

// ── StepOptions ────────────────────────────────────────────────────

/// Per-call switches of [`Simulation::step`](crate::Simulation::step).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOptions {
    /// Make J consistent with the two charge snapshots. Default: true.
    pub correct_currents: bool,
    /// Project E onto Gauss's law after the push. Default: false.
    pub correct_div_e: bool,
    /// Use the deposited `rho_next` in the push. Default: false.
    pub use_true_rho: bool,
    /// Advance particle positions. Default: true.
    pub move_positions: bool,
    /// Advance particle momenta. Default: true.
    pub move_momenta: bool,
    /// Render a progress bar on rank 0. Default: true.
    pub show_progress: bool,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            correct_currents: true,
            correct_div_e: false,
            use_true_rho: false,
            move_positions: true,
            move_momenta: true,
            show_progress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn timestep_must_be_positive() {
        for dt in [0.0, -1e-16, f64::NAN, f64::INFINITY] {
            let c = SimulationConfig {
                dt,
                ..SimulationConfig::default()
            };
            assert!(matches!(
                c.validate(),
                Err(ConfigError::InvalidTimestep { .. })
            ));
        }
    }

    #[test]
    fn empty_grid_rejected() {
        let mut c = SimulationConfig::default();
        c.grid.nz = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidGrid { .. })));
        let mut c = SimulationConfig::default();
        c.grid.nm = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidGrid { .. })));
        let mut c = SimulationConfig::default();
        c.grid.zmax = c.grid.zmin;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidGrid { .. })));
    }

    #[test]
    fn plasma_checks() {
        let mut c = SimulationConfig::default();
        c.plasma.p_nt = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidPlasma { .. })));
        let mut c = SimulationConfig::default();
        c.plasma.n_e = -1.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidPlasma { .. })));
        let mut c = SimulationConfig::default();
        c.plasma.p_zmax = -1.0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidPlasma { .. })));
    }

    #[test]
    fn zero_exchange_period_rejected() {
        let mut c = SimulationConfig::default();
        c.domain.exchange_period = Some(0);
        assert!(matches!(c.validate(), Err(ConfigError::InvalidDomain { .. })));
    }

    #[test]
    fn sub_luminal_boost_rejected() {
        let c = SimulationConfig {
            gamma_boost: Some(0.5),
            ..SimulationConfig::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::InvalidBoost { gamma: 0.5 }));
    }

    #[test]
    fn step_option_defaults() {
        let o = StepOptions::default();
        assert!(o.correct_currents && o.move_positions && o.move_momenta && o.show_progress);
        assert!(!o.correct_div_e && !o.use_true_rho);
    }
}
