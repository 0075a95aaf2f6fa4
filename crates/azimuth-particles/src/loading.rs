//! Uniform particle loading on a snapped `(z, r, theta)` lattice.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::arrays::{Particle, ParticleArrays};

/// Relative density profile `f(z, r)`, expected in `[0, 1]`.
pub type DensityFn = Arc<dyn Fn(f64, f64) -> f64 + Send + Sync>;

/// How a species is (re)loaded into empty cells.
///
/// Stored on a species so that a moving window can inject fresh plasma
/// with the same radial layout and density as the initial load.
#[derive(Clone)]
pub struct LoadingProfile {
    /// Peak density in particles per cubic metre.
    pub density: f64,
    /// Macro-particles per cell along `z`.
    pub p_nz: usize,
    /// Macro-particles per cell along `r`.
    pub p_nr: usize,
    /// Macro-particles along `theta`.
    pub p_nt: usize,
    /// Snapped lower radial bound.
    pub rmin: f64,
    /// Snapped upper radial bound.
    pub rmax: f64,
    /// Number of radial positions between `rmin` and `rmax`.
    pub nr_count: usize,
    /// Optional density modulation.
    pub dens_func: Option<DensityFn>,
}

impl fmt::Debug for LoadingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadingProfile")
            .field("density", &self.density)
            .field("p_nz", &self.p_nz)
            .field("p_nr", &self.p_nr)
            .field("p_nt", &self.p_nt)
            .field("rmin", &self.rmin)
            .field("rmax", &self.rmax)
            .field("nr_count", &self.nr_count)
            .field("dens_func", &self.dens_func.is_some())
            .finish()
    }
}

/// A rectangular block of the `(z, r)` plane filled with evenly spaced
/// macro-particles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformBlock {
    /// Lower `z` bound.
    pub zmin: f64,
    /// Upper `z` bound.
    pub zmax: f64,
    /// Number of positions along `z`.
    pub nz_count: usize,
    /// Mean normalised momentum.
    pub u_mean: [f64; 3],
}

impl LoadingProfile {
    /// Fill `block` with particles following this profile.
    ///
    /// Positions sit at the centres of an even `nz_count x nr_count x
    /// p_nt` lattice. Each weight is the number of physical particles in
    /// the lattice cell, `n r dr dz dtheta`, scaled by `dens_func` when
    /// present. Particles whose scaled weight is zero are skipped.
    pub fn load(&self, block: &UniformBlock) -> ParticleArrays {
        let mut out = ParticleArrays::new();
        if block.nz_count == 0 || self.nr_count == 0 || self.p_nt == 0 {
            return out;
        }
        let dz = (block.zmax - block.zmin) / block.nz_count as f64;
        let dr = (self.rmax - self.rmin) / self.nr_count as f64;
        let dtheta = 2.0 * PI / self.p_nt as f64;

        for iz in 0..block.nz_count {
            let z = block.zmin + (iz as f64 + 0.5) * dz;
            for ir in 0..self.nr_count {
                let r = self.rmin + (ir as f64 + 0.5) * dr;
                let mut w = self.density * r * dr * dz * dtheta;
                if let Some(f) = &self.dens_func {
                    w *= f(z, r);
                }
                if w == 0.0 {
                    continue;
                }
                for it in 0..self.p_nt {
                    let theta = (it as f64 + 0.5) * dtheta;
                    out.push(Particle {
                        position: [r * theta.cos(), r * theta.sin(), z],
                        momentum: block.u_mean,
                        w,
                    });
                }
            }
        }
        out
    }
}
