//! A simulation window that follows the physics at a fixed velocity.
//!
//! The window advances in whole cells. Fields slide down the local
//! grid, the exposed upper rows start at zero, and the number of newly
//! exposed physical cells accumulates in `nz_inject` until the next
//! particle exchange fills them with fresh plasma on the rank that owns
//! the upper global edge.
//!
//! The window tracks where the lower edge of mode 0 should be and moves
//! the grid only by the whole cells it lags behind. In a Galilean frame
//! the grid already drifts on its own, and that drift is not counted
//! twice.

use azimuth_core::constants::C;
use azimuth_core::ConfigError;
use azimuth_grid::InterpGrid;
use azimuth_particles::{Species, UniformBlock};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::boost::BoostConverter;

/// Moving-window parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowConfig {
    /// Window velocity in m/s (default: `c`).
    pub v: f64,
    /// Mean normalised momentum of injected particles.
    pub u_mean: [f64; 3],
    /// Thermal spread of injected normalised momenta.
    pub u_th: [f64; 3],
    /// Lorentz factor of the simulation frame. When set, `u_mean[2]` is
    /// given in the lab frame and converted.
    pub gamma_boost: Option<f64>,
    /// Seed of the injection RNG.
    pub seed: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            v: C,
            u_mean: [0.0; 3],
            u_th: [0.0; 3],
            gamma_boost: None,
            seed: 0,
        }
    }
}

impl WindowConfig {
    /// Check the window parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.v.is_finite() || self.v < 0.0 {
            return Err(ConfigError::InvalidWindow {
                reason: format!("velocity must be finite and >= 0, got {}", self.v),
            });
        }
        if self.v > C {
            return Err(ConfigError::InvalidWindow {
                reason: format!("velocity {} exceeds the speed of light", self.v),
            });
        }
        if self.u_th.iter().chain(&self.u_mean).any(|u| !u.is_finite()) {
            return Err(ConfigError::InvalidWindow {
                reason: "injected momenta must be finite".into(),
            });
        }
        if self.u_th.iter().any(|&u| u < 0.0) {
            return Err(ConfigError::InvalidWindow {
                reason: "thermal spread must be >= 0".into(),
            });
        }
        Ok(())
    }
}

/// Local geometry the window needs from the communicator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowGeometry {
    /// Cells above the owned region.
    pub n_right: usize,
    /// Whether this rank owns the upper global edge.
    pub is_last: bool,
}

/// State of an active moving window.
#[derive(Debug)]
pub struct MovingWindow {
    v: f64,
    u_mean: [f64; 3],
    u_th: [f64; 3],
    geometry: WindowGeometry,
    dz: f64,
    zmin_target: f64,
    cells_moved: u64,
    nz_inject: usize,
    rng: ChaCha8Rng,
}

impl MovingWindow {
    /// Attach a window to the grid of mode 0.
    ///
    /// `grid_v` is the velocity at which the grid boundaries drift
    /// without the window's help (non-zero in a Galilean frame).
    ///
    /// Fails if the window can expose more cells between two particle
    /// exchanges than the upper guard region holds.
    pub fn new(
        config: &WindowConfig,
        grid: &InterpGrid,
        geometry: WindowGeometry,
        grid_v: f64,
        exchange_period: u64,
        dt: f64,
        time: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut u_mean = config.u_mean;
        if let Some(gamma) = config.gamma_boost {
            let boost = BoostConverter::new(gamma)?;
            let [uz] = boost.longitudinal_momentum([u_mean[2]]);
            u_mean[2] = uz;
        }

        let dz = grid.dz();
        let lag_v = (config.v - grid_v).max(0.0);
        let per_exchange = (lag_v * dt / dz * exchange_period as f64).ceil();
        if per_exchange > geometry.n_right as f64 {
            return Err(ConfigError::InvalidWindow {
                reason: format!(
                    "window crosses {per_exchange} cells between particle exchanges, \
                     but only {} cells lie above the domain",
                    geometry.n_right
                ),
            });
        }

        log::debug!(
            "moving window at v = {:.4e} m/s attached at t = {time:.4e} s (zmin = {:.6e})",
            config.v,
            grid.zmin()
        );

        Ok(Self {
            v: config.v,
            u_mean,
            u_th: config.u_th,
            geometry,
            dz,
            zmin_target: grid.zmin(),
            cells_moved: 0,
            nz_inject: 0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        })
    }

    /// Window velocity in m/s.
    pub fn v(&self) -> f64 {
        self.v
    }

    /// Mean normalised momentum of injected particles, in the
    /// simulation frame.
    pub fn u_mean(&self) -> [f64; 3] {
        self.u_mean
    }

    /// Physical cells exposed since the last particle exchange.
    pub fn nz_inject(&self) -> usize {
        self.nz_inject
    }

    /// Mutable access to the exposed-cell counter.
    pub fn nz_inject_mut(&mut self) -> &mut usize {
        &mut self.nz_inject
    }

    /// Forget the exposed cells once every species has been refilled.
    pub fn clear_injection(&mut self) {
        self.nz_inject = 0;
    }

    /// Total cells moved since the window was attached.
    pub fn cells_moved(&self) -> u64 {
        self.cells_moved
    }

    /// Advance the window by `v * dt` and shift every grid by the whole
    /// cells its lower edge lags behind the window. Returns the number
    /// of cells moved.
    pub fn move_grids(&mut self, grids: &mut [InterpGrid], dt: f64) -> usize {
        self.zmin_target += self.v * dt;
        let Some(first) = grids.first() else {
            return 0;
        };
        let lag = (self.zmin_target - first.zmin()) / self.dz;
        // Absorb rounding in the accumulated boundary positions.
        let n = (lag + 1e-9).floor().max(0.0) as usize;
        if n == 0 {
            return 0;
        }
        for grid in grids.iter_mut() {
            grid.shift_cells(n);
        }
        self.cells_moved += n as u64;
        self.nz_inject += n;
        log::debug!(
            "window moved {n} cells (total {}, pending injection {})",
            self.cells_moved,
            self.nz_inject
        );
        n
    }

    /// Fill the cells exposed since the last exchange with fresh
    /// particles of `species`, below the upper physical edge
    /// `phys_zmax`. Returns the number of particles added.
    ///
    /// Only the rank owning the upper global edge injects, and only
    /// species with a loading profile are refilled.
    pub fn inject(&mut self, species: &mut dyn Species, phys_zmax: f64, time: f64) -> usize {
        if !self.geometry.is_last || self.nz_inject == 0 {
            return 0;
        }
        let Some(profile) = species.loading() else {
            return 0;
        };
        let block = UniformBlock {
            zmin: phys_zmax - self.nz_inject as f64 * self.dz,
            zmax: phys_zmax,
            nz_count: self.nz_inject * profile.p_nz,
            u_mean: self.u_mean,
        };
        let mut fresh = profile.load(&block);

        if self.u_th.iter().any(|&u| u > 0.0) {
            for i in 0..fresh.len() {
                fresh.ux[i] += self.u_th[0] * box_muller(&mut self.rng);
                fresh.uy[i] += self.u_th[1] * box_muller(&mut self.rng);
                fresh.uz[i] += self.u_th[2] * box_muller(&mut self.rng);
                let (ux, uy, uz) = (fresh.ux[i], fresh.uy[i], fresh.uz[i]);
                fresh.inv_gamma[i] = 1.0 / (1.0 + ux * ux + uy * uy + uz * uz).sqrt();
            }
        }

        let added = fresh.len();
        log::debug!(
            "injected {added} {} particles in [{:.6e}, {:.6e}] at t = {time:.4e} s",
            species.name(),
            block.zmin,
            block.zmax
        );
        species.arrays_mut().extend(fresh);
        species.set_sorted(false);
        added
    }
}

/// Standard normal sample from two uniforms.
fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-300);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use azimuth_core::ParticleShape;
    use azimuth_particles::{LoadingProfile, MacroParticles, ParticleArrays};

    fn grid() -> InterpGrid {
        InterpGrid::new(0, 32, 0.0, 32.0, 4, 4.0).unwrap()
    }

    fn geometry() -> WindowGeometry {
        WindowGeometry {
            n_right: 10,
            is_last: true,
        }
    }

    fn window(config: WindowConfig) -> MovingWindow {
        // dt chosen so the window crosses half a cell per step.
        MovingWindow::new(&config, &grid(), geometry(), 0.0, 4, 0.5 / config.v, 0.0).unwrap()
    }

    fn plasma() -> MacroParticles {
        let profile = LoadingProfile {
            density: 1.0,
            p_nz: 2,
            p_nr: 1,
            p_nt: 1,
            rmin: 0.0,
            rmax: 4.0,
            nr_count: 4,
            dens_func: None,
        };
        MacroParticles::new("e", -1.0, 1.0, 1.0, ParticleArrays::new(), ParticleShape::Linear)
            .with_loading(profile)
    }

    #[test]
    fn rejects_invalid_velocity() {
        for v in [f64::NAN, -1.0, 2.0 * C] {
            let config = WindowConfig {
                v,
                ..WindowConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidWindow { .. })
            ));
        }
    }

    #[test]
    fn rejects_window_outrunning_guard() {
        let config = WindowConfig::default();
        let r = MovingWindow::new(&config, &grid(), geometry(), 0.0, 100, 1.0 / C, 0.0);
        assert!(matches!(r, Err(ConfigError::InvalidWindow { .. })));
    }

    #[test]
    fn guard_check_counts_grid_drift() {
        // One cell per step, six steps between exchanges.
        let config = WindowConfig::default();
        let attach = |grid_v: f64| {
            MovingWindow::new(&config, &grid(), geometry(), grid_v, 6, 1.0 / C, 0.0)
        };
        assert!(attach(0.0).is_ok());
        // A grid drifting along with the window leaves it nothing to do.
        assert!(attach(C).is_ok());
        // A grid drifting backwards doubles the cells exposed.
        assert!(matches!(attach(-C), Err(ConfigError::InvalidWindow { .. })));
    }

    #[test]
    fn drifted_grid_is_not_moved_twice() {
        let mut w = window(WindowConfig {
            v: 1.0,
            ..WindowConfig::default()
        });
        let mut grids = vec![grid()];
        grids[0].shift_boundaries(1.5);
        let moved: usize = (0..4).map(|_| w.move_grids(&mut grids, 0.5)).sum();
        assert_eq!(moved, 0);
        assert_eq!(grids[0].zmin(), 1.5);

        assert_eq!(w.move_grids(&mut grids, 0.5), 1);
        assert_eq!(grids[0].zmin(), 2.5);
        assert_eq!(w.cells_moved(), 1);
        assert_eq!(w.nz_inject(), 1);
    }

    #[test]
    fn moves_whole_cells_and_counts_injection() {
        let mut w = window(WindowConfig {
            v: 1.0,
            ..WindowConfig::default()
        });
        let mut grids = vec![grid()];
        let dt = 0.5;
        let moved: Vec<usize> = (0..4).map(|_| w.move_grids(&mut grids, dt)).collect();
        assert_eq!(moved.iter().sum::<usize>(), 2);
        assert_eq!(w.nz_inject(), 2);
        assert_eq!(grids[0].zmin(), 2.0);
        w.clear_injection();
        assert_eq!(w.nz_inject(), 0);
        assert_eq!(w.cells_moved(), 2);
    }

    #[test]
    fn injects_exposed_cells_only_on_last_rank() {
        let mut w = window(WindowConfig::default());
        *w.nz_inject_mut() = 3;
        let mut s = plasma();
        let added = w.inject(&mut s, 22.0, 0.0);
        assert_eq!(added, 3 * 2 * 4);
        assert!(s.arrays().z.iter().all(|&z| (19.0..22.0).contains(&z)));

        let mut inner = MovingWindow::new(
            &WindowConfig::default(),
            &grid(),
            WindowGeometry {
                n_right: 10,
                is_last: false,
            },
            0.0,
            4,
            0.5 / C,
            0.0,
        )
        .unwrap();
        *inner.nz_inject_mut() = 3;
        let mut s = plasma();
        assert_eq!(inner.inject(&mut s, 22.0, 0.0), 0);
    }

    #[test]
    fn thermal_injection_is_seeded() {
        let config = WindowConfig {
            u_th: [0.1, 0.1, 0.1],
            seed: 7,
            ..WindowConfig::default()
        };
        let run = || {
            let mut w = window(config);
            *w.nz_inject_mut() = 1;
            let mut s = plasma();
            w.inject(&mut s, 10.0, 0.0);
            s.arrays().ux.clone()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.iter().any(|&u| u != 0.0));
    }

    #[test]
    fn boost_converts_mean_momentum() {
        let config = WindowConfig {
            gamma_boost: Some(10.0),
            ..WindowConfig::default()
        };
        let w = window(config);
        assert!(w.u_mean()[2] < -9.0);
    }
}
