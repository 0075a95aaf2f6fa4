//! Shape-factor gather and deposition on azimuthal-mode grids.
//!
//! Deposition projects each macro-particle onto mode `m` with the
//! factor `exp(-i m theta)`; gathering reconstructs the real field as
//! `F(theta) = Re F_0 + 2 sum_{m>0} Re(F_m exp(i m theta))`. Radial
//! stencil points below the axis fold back onto the mirror cell with
//! the component's parity; points beyond the last radial cell are
//! dropped. Longitudinal stencil points wrap around the local grid.

use azimuth_core::constants::C;
use azimuth_core::{ParticleShape, SourceField};
use azimuth_grid::{Complex64, Component, InterpGrid};
use smallvec::SmallVec;

use crate::arrays::ParticleArrays;

/// Stencil along one axis: `(cell index, weight)` pairs.
pub type Stencil = SmallVec<[(isize, f64); 4]>;

/// Gather/deposit kernel used by a species.
pub trait ShapeKernel: Send + Sync {
    /// The shape this kernel implements.
    fn shape(&self) -> ParticleShape;

    /// Interpolate E and B onto every particle.
    fn gather(&self, particles: &mut ParticleArrays, grids: &[InterpGrid]);

    /// Accumulate charge (`Rho`) or current (`J`) of particles carrying
    /// charge `q` per physical particle.
    fn deposit(
        &self,
        particles: &ParticleArrays,
        q: f64,
        grids: &mut [InterpGrid],
        source: SourceField,
    );
}

/// B-spline shape factors of order 1 or 3 on cell-centred grids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModalShapeKernel {
    shape: ParticleShape,
}

impl ModalShapeKernel {
    /// Kernel for `shape`. `LinearNonAtomic` shares the linear weights.
    pub fn new(shape: ParticleShape) -> Self {
        Self { shape }
    }

    /// Stencil for a coordinate measured in cells from the first cell
    /// centre.
    pub fn stencil(&self, u: f64) -> Stencil {
        let i0 = u.floor();
        let t = u - i0;
        let i0 = i0 as isize;
        let mut s = Stencil::new();
        match self.shape {
            ParticleShape::Linear | ParticleShape::LinearNonAtomic => {
                s.push((i0, 1.0 - t));
                s.push((i0 + 1, t));
            }
            ParticleShape::Cubic => {
                let t2 = t * t;
                let t3 = t2 * t;
                let omt = 1.0 - t;
                s.push((i0 - 1, omt * omt * omt / 6.0));
                s.push((i0, (4.0 - 6.0 * t2 + 3.0 * t3) / 6.0));
                s.push((i0 + 1, (1.0 + 3.0 * t + 3.0 * t2 - 3.0 * t3) / 6.0));
                s.push((i0 + 2, t3 / 6.0));
            }
        }
        s
    }
}

/// Map a radial stencil index onto storage: `(index, mirrored)`.
fn fold_radial(j: isize, nr: usize) -> Option<(usize, bool)> {
    if j < 0 {
        let mirror = (-1 - j) as usize;
        (mirror < nr).then_some((mirror, true))
    } else {
        let j = j as usize;
        (j < nr).then_some((j, false))
    }
}

fn wrap_z(k: isize, nz: usize) -> usize {
    k.rem_euclid(nz as isize) as usize
}

fn parity_sign(c: Component, m: usize, mirrored: bool) -> f64 {
    if mirrored && c.is_odd_on_axis(m) {
        -1.0
    } else {
        1.0
    }
}

/// `(cos theta, sin theta, r)` of a particle, with `theta = 0` on axis.
fn polar(x: f64, y: f64) -> (f64, f64, f64) {
    let r = x.hypot(y);
    if r == 0.0 {
        (1.0, 0.0, 0.0)
    } else {
        (x / r, y / r, r)
    }
}

/// `exp(i m theta)` from `exp(i theta)`.
fn phase(cos: f64, sin: f64, m: usize) -> Complex64 {
    Complex64::new(cos, sin).powu(m as u32)
}

impl ModalShapeKernel {
    fn interpolate(
        &self,
        grid: &InterpGrid,
        c: Component,
        zs: &Stencil,
        rs: &Stencil,
    ) -> Complex64 {
        let data = grid.component(c);
        let mut acc = Complex64::new(0.0, 0.0);
        for &(k, wz) in zs {
            let iz = wrap_z(k, grid.nz());
            for &(j, wr) in rs {
                if let Some((ir, mirrored)) = fold_radial(j, grid.nr()) {
                    let sign = parity_sign(c, grid.m(), mirrored);
                    acc += data[grid.index(iz, ir)] * (sign * wz * wr);
                }
            }
        }
        acc
    }

    fn scatter(
        grid: &mut InterpGrid,
        c: Component,
        zs: &Stencil,
        rs: &Stencil,
        value: Complex64,
    ) {
        let (nz, nr, m) = (grid.nz(), grid.nr(), grid.m());
        let idx: SmallVec<[(usize, f64); 16]> = zs
            .iter()
            .flat_map(|&(k, wz)| {
                rs.iter().filter_map(move |&(j, wr)| {
                    fold_radial(j, nr).map(|(ir, mirrored)| {
                        (
                            wrap_z(k, nz) * nr + ir,
                            parity_sign(c, m, mirrored) * wz * wr,
                        )
                    })
                })
            })
            .collect();
        let data = grid.component_mut(c);
        for (i, w) in idx {
            data[i] += value * w;
        }
    }

    fn stencils(&self, grid: &InterpGrid, z: f64, r: f64) -> (Stencil, Stencil) {
        let uz = (z - grid.zmin()) / grid.dz() - 0.5;
        let ur = r / grid.dr() - 0.5;
        (self.stencil(uz), self.stencil(ur))
    }
}

impl ShapeKernel for ModalShapeKernel {
    fn shape(&self) -> ParticleShape {
        self.shape
    }

    fn gather(&self, p: &mut ParticleArrays, grids: &[InterpGrid]) {
        for i in 0..p.len() {
            let (cos, sin, r) = polar(p.x[i], p.y[i]);
            let mut f = [0.0f64; 6];
            for grid in grids {
                let (zs, rs) = self.stencils(grid, p.z[i], r);
                let m = grid.m();
                let factor = if m == 0 { 1.0 } else { 2.0 };
                let ph = phase(cos, sin, m);
                for (slot, c) in Component::EB.into_iter().enumerate() {
                    f[slot] += factor * (self.interpolate(grid, c, &zs, &rs) * ph).re;
                }
            }
            let [er, et, ez, br, bt, bz] = f;
            p.ex[i] = cos * er - sin * et;
            p.ey[i] = sin * er + cos * et;
            p.ez[i] = ez;
            p.bx[i] = cos * br - sin * bt;
            p.by[i] = sin * br + cos * bt;
            p.bz[i] = bz;
        }
    }

    fn deposit(
        &self,
        p: &ParticleArrays,
        q: f64,
        grids: &mut [InterpGrid],
        source: SourceField,
    ) {
        for i in 0..p.len() {
            let (cos, sin, r) = polar(p.x[i], p.y[i]);
            let qw = q * p.w[i];
            for grid in grids.iter_mut() {
                let (zs, rs) = self.stencils(grid, p.z[i], r);
                let proj = phase(cos, sin, grid.m()).conj();
                match source {
                    SourceField::Rho => {
                        Self::scatter(grid, Component::Rho, &zs, &rs, proj * qw);
                    }
                    SourceField::J => {
                        let vscale = qw * C * p.inv_gamma[i];
                        let jx = vscale * p.ux[i];
                        let jy = vscale * p.uy[i];
                        let jz = vscale * p.uz[i];
                        let jr = cos * jx + sin * jy;
                        let jt = cos * jy - sin * jx;
                        Self::scatter(grid, Component::Jr, &zs, &rs, proj * jr);
                        Self::scatter(grid, Component::Jt, &zs, &rs, proj * jt);
                        Self::scatter(grid, Component::Jz, &zs, &rs, proj * jz);
                    }
                }
            }
        }
    }
}
