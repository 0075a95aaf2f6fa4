//! Spectral grid and the `z`-axis Fourier transform.

use std::fmt;
use std::sync::Arc;

use azimuth_core::TransformKind;
use rustfft::{Fft, FftPlanner};

use crate::interp::{Component, InterpGrid};
use crate::Complex64;

/// One array stored on a [`SpectralGrid`].
///
/// Charge density has two slots so that the current correction can see
/// both ends of the step at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpectralSlot {
    /// Radial electric field.
    Er,
    /// Azimuthal electric field.
    Et,
    /// Longitudinal electric field.
    Ez,
    /// Radial magnetic field.
    Br,
    /// Azimuthal magnetic field.
    Bt,
    /// Longitudinal magnetic field.
    Bz,
    /// Radial current density.
    Jr,
    /// Azimuthal current density.
    Jt,
    /// Longitudinal current density.
    Jz,
    /// Charge density at the start of the step.
    RhoPrev,
    /// Charge density at the end of the step.
    RhoNext,
}

impl SpectralSlot {
    /// Interpolation component and spectral slot pairs moved by one
    /// transform of `kind`.
    pub fn pairs(kind: TransformKind) -> &'static [(Component, SpectralSlot)] {
        match kind {
            TransformKind::E => &[
                (Component::Er, SpectralSlot::Er),
                (Component::Et, SpectralSlot::Et),
                (Component::Ez, SpectralSlot::Ez),
            ],
            TransformKind::B => &[
                (Component::Br, SpectralSlot::Br),
                (Component::Bt, SpectralSlot::Bt),
                (Component::Bz, SpectralSlot::Bz),
            ],
            TransformKind::RhoPrev => &[(Component::Rho, SpectralSlot::RhoPrev)],
            TransformKind::RhoNext => &[(Component::Rho, SpectralSlot::RhoNext)],
            TransformKind::J => &[
                (Component::Jr, SpectralSlot::Jr),
                (Component::Jt, SpectralSlot::Jt),
                (Component::Jz, SpectralSlot::Jz),
            ],
        }
    }
}

/// Fourier coefficients along `z` of every field quantity of one mode.
///
/// Layout matches [`InterpGrid`]: index `ikz * nr + ir`.
#[derive(Clone, Debug)]
pub struct SpectralGrid {
    m: usize,
    nz: usize,
    nr: usize,
    dz: f64,
    kz: Vec<f64>,
    slots: [Vec<Complex64>; 11],
}

impl SpectralGrid {
    /// Create a zero-filled spectral grid matching `interp`.
    pub fn matching(interp: &InterpGrid) -> Self {
        let nz = interp.nz();
        let nr = interp.nr();
        let dz = interp.dz();
        let zeros = vec![Complex64::new(0.0, 0.0); nz * nr];
        Self {
            m: interp.m(),
            nz,
            nr,
            dz,
            kz: wavenumbers(nz, dz),
            slots: std::array::from_fn(|_| zeros.clone()),
        }
    }

    /// Azimuthal mode number.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of longitudinal wavenumbers.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Number of radial cells.
    pub fn nr(&self) -> usize {
        self.nr
    }

    /// Cell length along `z` of the matching interpolation grid.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Angular wavenumbers in FFT order.
    pub fn kz(&self) -> &[f64] {
        &self.kz
    }

    /// Read one slot.
    pub fn slot(&self, slot: SpectralSlot) -> &[Complex64] {
        &self.slots[slot as usize]
    }

    /// Mutable access to one slot.
    pub fn slot_mut(&mut self, slot: SpectralSlot) -> &mut [Complex64] {
        &mut self.slots[slot as usize]
    }

    /// Two distinct slots, one mutable, for solvers that update one
    /// quantity from another.
    pub fn slot_pair_mut(
        &mut self,
        write: SpectralSlot,
        read: SpectralSlot,
    ) -> Option<(&mut [Complex64], &[Complex64])> {
        let (w, r) = (write as usize, read as usize);
        if w == r {
            return None;
        }
        if w < r {
            let (lo, hi) = self.slots.split_at_mut(r);
            Some((&mut lo[w], &hi[0]))
        } else {
            let (lo, hi) = self.slots.split_at_mut(w);
            Some((&mut hi[0], &lo[r]))
        }
    }

    /// Multiply every coefficient of the slots in `kind` by
    /// `cos^2(kz dz / 2)`, the transfer function of a 1-2-1 binomial
    /// smoother along `z`.
    pub fn filter(&mut self, kind: TransformKind) {
        let nr = self.nr;
        let half_dz = 0.5 * self.dz;
        let gains: Vec<f64> = self
            .kz
            .iter()
            .map(|k| {
                let c = (k * half_dz).cos();
                c * c
            })
            .collect();
        for &(_, slot) in SpectralSlot::pairs(kind) {
            for (row, &g) in self.slots[slot as usize].chunks_exact_mut(nr).zip(&gains) {
                for v in row {
                    *v *= g;
                }
            }
        }
    }
}

/// Angular wavenumbers `2 pi fftfreq(nz, dz)`.
fn wavenumbers(nz: usize, dz: f64) -> Vec<f64> {
    let span = nz as f64 * dz;
    let positive = nz.div_ceil(2);
    (0..nz)
        .map(|k| {
            let n = if k < positive {
                k as f64
            } else {
                k as f64 - nz as f64
            };
            2.0 * std::f64::consts::PI * n / span
        })
        .collect()
}

// ── ZTransform ─────────────────────────────────────────────────────

/// Planned forward and inverse FFTs along `z`, applied column by column.
#[derive(Clone)]
pub struct ZTransform {
    nz: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for ZTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZTransform").field("nz", &self.nz).finish()
    }
}

impl ZTransform {
    /// Plan transforms of length `nz`.
    pub fn new(nz: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            nz,
            forward: planner.plan_fft_forward(nz),
            inverse: planner.plan_fft_inverse(nz),
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.nz
    }

    /// Whether the transform is empty.
    pub fn is_empty(&self) -> bool {
        self.nz == 0
    }

    /// Transform `src` (real space) into `dst` (spectral space).
    pub fn forward(&self, src: &[Complex64], dst: &mut [Complex64], nr: usize) {
        self.columns(&*self.forward, src, dst, nr, 1.0);
    }

    /// Transform `src` (spectral space) into `dst` (real space),
    /// normalised so that `inverse(forward(x)) == x`.
    pub fn inverse(&self, src: &[Complex64], dst: &mut [Complex64], nr: usize) {
        let scale = if self.nz == 0 { 1.0 } else { 1.0 / self.nz as f64 };
        self.columns(&*self.inverse, src, dst, nr, scale);
    }

    fn columns(
        &self,
        fft: &dyn Fft<f64>,
        src: &[Complex64],
        dst: &mut [Complex64],
        nr: usize,
        scale: f64,
    ) {
        let mut column = vec![Complex64::new(0.0, 0.0); self.nz];
        for ir in 0..nr {
            for (iz, v) in column.iter_mut().enumerate() {
                *v = src[iz * nr + ir];
            }
            fft.process(&mut column);
            for (iz, v) in column.iter().enumerate() {
                dst[iz * nr + ir] = *v * scale;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wavenumbers_follow_fft_order() {
        let k = wavenumbers(4, 0.5);
        let base = 2.0 * std::f64::consts::PI / 2.0;
        assert_eq!(k, vec![0.0, base, -2.0 * base, -base]);
        let k = wavenumbers(5, 1.0);
        assert!(k[2] > 0.0 && k[3] < 0.0);
    }

    #[test]
    fn forward_then_inverse_restores_samples() {
        let nz = 8;
        let nr = 3;
        let t = ZTransform::new(nz);
        let src: Vec<Complex64> = (0..nz * nr)
            .map(|i| Complex64::new(i as f64, -(i as f64) * 0.5))
            .collect();
        let mut spec = vec![Complex64::new(0.0, 0.0); nz * nr];
        let mut back = spec.clone();
        t.forward(&src, &mut spec, nr);
        t.inverse(&spec, &mut back, nr);
        for (a, b) in src.iter().zip(&back) {
            assert!((a - b).norm() < 1e-10);
        }
    }

    #[test]
    fn constant_column_has_only_dc() {
        let nz = 6;
        let t = ZTransform::new(nz);
        let src = vec![Complex64::new(2.0, 0.0); nz];
        let mut spec = vec![Complex64::new(0.0, 0.0); nz];
        t.forward(&src, &mut spec, 1);
        assert!((spec[0].re - 12.0).abs() < 1e-12);
        assert!(spec[1..].iter().all(|v| v.norm() < 1e-12));
    }

    #[test]
    fn filter_keeps_dc_and_kills_nyquist() {
        let interp = InterpGrid::new(0, 4, 0.0, 4.0, 1, 1.0).unwrap();
        let mut g = SpectralGrid::matching(&interp);
        g.slot_mut(SpectralSlot::Jz).fill(Complex64::new(1.0, 0.0));
        g.slot_mut(SpectralSlot::RhoNext).fill(Complex64::new(1.0, 0.0));
        g.filter(TransformKind::J);
        let jz = g.slot(SpectralSlot::Jz);
        assert_eq!(jz[0].re, 1.0);
        assert!(jz[2].re.abs() < 1e-15);
        assert!(g.slot(SpectralSlot::RhoNext).iter().all(|v| v.re == 1.0));
    }

    #[test]
    fn slot_pair_rejects_aliasing() {
        let interp = InterpGrid::new(0, 2, 0.0, 1.0, 1, 1.0).unwrap();
        let mut g = SpectralGrid::matching(&interp);
        assert!(g.slot_pair_mut(SpectralSlot::Ez, SpectralSlot::Ez).is_none());
        let (w, r) = g.slot_pair_mut(SpectralSlot::Bz, SpectralSlot::Er).unwrap();
        assert_eq!(w.len(), r.len());
    }
}
