//! Derived setup parameters: reference frame, boosted inputs and the
//! particle exchange period.

use std::fmt;

use azimuth_core::constants::C;
use azimuth_core::{Boundaries, ConfigError, ParticleShape};
use azimuth_domain::BoostConverter;

use crate::config::{SimulationConfig, SolverConfig};

// ── Frame ──────────────────────────────────────────────────────────

/// Frame in which the field equations are solved.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Frame {
    /// Plain lab (or boosted) frame.
    #[default]
    Lab,
    /// Comoving variables handled inside the solver; the grid is fixed.
    Comoving {
        /// Comoving velocity in m/s.
        v: f64,
    },
    /// Galilean frame: the grid boundaries drift at `v`.
    Galilean {
        /// Drift velocity in m/s.
        v: f64,
    },
}

impl Frame {
    /// Frame selected by the solver options.
    pub fn from_solver(solver: &SolverConfig) -> Self {
        match (solver.v_comoving, solver.use_galilean) {
            (Some(v), true) => Self::Galilean { v },
            (Some(v), false) => Self::Comoving { v },
            (None, true) => {
                log::warn!("use_galilean has no effect without v_comoving");
                Self::Lab
            }
            (None, false) => Self::Lab,
        }
    }

    /// Drift velocity of the grid boundaries, if they drift.
    pub fn galilean_velocity(self) -> Option<f64> {
        match self {
            Self::Galilean { v } => Some(v),
            Self::Lab | Self::Comoving { .. } => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lab => f.write_str("lab"),
            Self::Comoving { v } => write!(f, "comoving (v = {v:.4e} m/s)"),
            Self::Galilean { v } => write!(f, "galilean (v = {v:.4e} m/s)"),
        }
    }
}

// ── FrameInputs ────────────────────────────────────────────────────

/// The inputs that change when the simulation runs in a boosted frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs {
    /// Lower box edge.
    pub zmin: f64,
    /// Upper box edge.
    pub zmax: f64,
    /// Timestep.
    pub dt: f64,
    /// Lower plasma edge.
    pub p_zmin: f64,
    /// Upper plasma edge.
    pub p_zmax: f64,
    /// Electron density.
    pub n_e: f64,
    /// Mean longitudinal normalised momentum.
    pub uz_m: f64,
}

impl FrameInputs {
    /// Lab-frame inputs of `config`, converted into the boosted frame
    /// when `gamma_boost` is set. Returns the converter alongside.
    pub fn from_config(
        config: &SimulationConfig,
    ) -> Result<(Self, Option<BoostConverter>), ConfigError> {
        let lab = Self {
            zmin: config.grid.zmin,
            zmax: config.grid.zmax,
            dt: config.dt,
            p_zmin: config.plasma.p_zmin,
            p_zmax: config.plasma.p_zmax,
            n_e: config.plasma.n_e,
            uz_m: config.plasma.uz_m,
        };
        match config.gamma_boost {
            None => Ok((lab, None)),
            Some(gamma) => {
                let boost = BoostConverter::new(gamma)?;
                Ok((lab.boosted(&boost), Some(boost)))
            }
        }
    }

    /// These inputs seen from the frame of `boost`.
    pub fn boosted(&self, boost: &BoostConverter) -> Self {
        let [zmin, zmax, dt] = boost.copropag_length([self.zmin, self.zmax, self.dt]);
        let [p_zmin, p_zmax] = boost.static_length([self.p_zmin, self.p_zmax]);
        let [n_e] = boost.static_density([self.n_e]);
        let [uz_m] = boost.longitudinal_momentum([self.uz_m]);
        Self {
            zmin,
            zmax,
            dt,
            p_zmin,
            p_zmax,
            n_e,
            uz_m,
        }
    }
}

// ── Exchange period ────────────────────────────────────────────────

/// Upper bound on the cells a particle crosses in one step, with a
/// safety factor of 2 for moving windows and Galilean frames.
pub fn cells_per_step(dt: f64, zmin: f64, zmax: f64, nz: usize) -> f64 {
    2.0 * C * dt / ((zmax - zmin) / nz as f64)
}

/// Steps between particle exchanges.
///
/// Particles may travel until they are [`ParticleShape::MAX_STENCIL_REACH`]
/// cells from the outer edge of the guard region. A single periodic rank
/// exchanges every step, and an explicit `requested` period is used
/// as given, without checking it against the guard region.
///
/// The one exception is `Some(0)`, which is rejected with
/// [`ConfigError::InvalidDomain`] so the period stays at least 1.
pub fn exchange_period(
    cells_per_step: f64,
    n_guard: usize,
    size: usize,
    boundaries: Boundaries,
    requested: Option<u64>,
) -> Result<u64, ConfigError> {
    if let Some(period) = requested {
        if period == 0 {
            return Err(ConfigError::InvalidDomain {
                reason: "exchange_period must be at least 1".into(),
            });
        }
        return Ok(period);
    }
    if size == 1 && boundaries == Boundaries::Periodic {
        return Ok(1);
    }
    let reach = ParticleShape::MAX_STENCIL_REACH as f64;
    let period = ((n_guard as f64 - reach) / cells_per_step).trunc() as i64;
    if period < 1 {
        return Err(ConfigError::GuardRegionTooSmall {
            n_guard,
            cells_per_step,
            exchange_period: period,
        });
    }
    Ok(period as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_scenario_gives_88() {
        let cps = cells_per_step(1e-16, 0.0, 20e-6, 64);
        assert!((cps - 0.191_867).abs() < 1e-5);
        assert_eq!(exchange_period(cps, 20, 2, Boundaries::Periodic, None), Ok(88));
        assert_eq!(exchange_period(cps, 20, 1, Boundaries::Open, None), Ok(88));
    }

    #[test]
    fn single_periodic_rank_exchanges_every_step() {
        assert_eq!(exchange_period(10.0, 0, 1, Boundaries::Periodic, None), Ok(1));
    }

    #[test]
    fn narrow_guard_rejected() {
        for n_guard in [0, 2, 3] {
            assert!(matches!(
                exchange_period(0.5, n_guard, 2, Boundaries::Open, None),
                Err(ConfigError::GuardRegionTooSmall { .. })
            ));
        }
    }

    #[test]
    fn explicit_period_used_as_is() {
        assert_eq!(exchange_period(100.0, 4, 4, Boundaries::Open, Some(7)), Ok(7));
        assert!(matches!(
            exchange_period(0.1, 40, 4, Boundaries::Open, Some(0)),
            Err(ConfigError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn galilean_only_with_velocity() {
        let solver = SolverConfig {
            v_comoving: Some(-C),
            use_galilean: true,
            ..SolverConfig::default()
        };
        assert_eq!(Frame::from_solver(&solver).galilean_velocity(), Some(-C));
        let solver = SolverConfig {
            use_galilean: false,
            ..solver
        };
        assert_eq!(Frame::from_solver(&solver), Frame::Comoving { v: -C });
        let solver = SolverConfig {
            v_comoving: None,
            use_galilean: true,
            ..solver
        };
        assert_eq!(Frame::from_solver(&solver), Frame::Lab);
    }

    #[test]
    fn boosted_inputs() {
        let config = SimulationConfig {
            gamma_boost: Some(10.0),
            ..SimulationConfig::default()
        };
        let (boosted, boost) = FrameInputs::from_config(&config).unwrap();
        let boost = boost.unwrap();
        let f = boost.gamma0() * (1.0 + boost.beta0());
        assert!((boosted.zmax - config.grid.zmax * f).abs() < 1e-18);
        assert!((boosted.dt - config.dt * f).abs() < 1e-28);
        assert!((boosted.p_zmax - config.plasma.p_zmax / 10.0).abs() < 1e-18);
        assert!(boosted.uz_m < -9.9);

        let (lab, none) = FrameInputs::from_config(&SimulationConfig::default()).unwrap();
        assert!(none.is_none());
        assert_eq!(lab.dt, 1e-16);
    }

    proptest! {
        #[test]
        fn period_keeps_particles_inside_guards(
            n_guard in 4usize..64,
            cps in 0.01f64..2.0,
        ) {
            if let Ok(p) = exchange_period(cps, n_guard, 2, Boundaries::Open, None) {
                prop_assert!(p >= 1);
                let travelled = p as f64 * cps;
                prop_assert!(travelled <= n_guard as f64 - 3.0 + 1e-9);
                prop_assert!((p + 1) as f64 * cps > n_guard as f64 - 3.0 - 1e-9);
            }
        }

        #[test]
        fn period_shrinks_with_timestep(dt in 1e-18f64..1e-15) {
            let slow = exchange_period(
                cells_per_step(dt, 0.0, 20e-6, 64), 30, 2, Boundaries::Open, None);
            let fast = exchange_period(
                cells_per_step(2.0 * dt, 0.0, 20e-6, 64), 30, 2, Boundaries::Open, None);
            if let (Ok(s), Ok(f)) = (slow, fast) {
                prop_assert!(f <= s);
            }
        }
    }
}
