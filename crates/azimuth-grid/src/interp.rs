//! Interpolation grid: real-space samples of one azimuthal mode.

use crate::error::GridError;
use crate::Complex64;
use azimuth_core::SourceField;
use std::f64::consts::PI;

/// One complex field component stored on an [`InterpGrid`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Component {
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
    /// Charge density.
    Rho,
}

impl Component {
    /// Electric field components.
    pub const E: [Component; 3] = [Self::Er, Self::Et, Self::Ez];
    /// Magnetic field components.
    pub const B: [Component; 3] = [Self::Br, Self::Bt, Self::Bz];
    /// Electric and magnetic field components.
    pub const EB: [Component; 6] = [
        Self::Er,
        Self::Et,
        Self::Ez,
        Self::Br,
        Self::Bt,
        Self::Bz,
    ];
    /// Current density components.
    pub const J: [Component; 3] = [Self::Jr, Self::Jt, Self::Jz];
    /// Every stored component.
    pub const ALL: [Component; 10] = [
        Self::Er,
        Self::Et,
        Self::Ez,
        Self::Br,
        Self::Bt,
        Self::Bz,
        Self::Jr,
        Self::Jt,
        Self::Jz,
        Self::Rho,
    ];

    /// Components that make up a source accumulator.
    pub fn of_source(source: SourceField) -> &'static [Component] {
        match source {
            SourceField::Rho => &[Component::Rho],
            SourceField::J => &Self::J,
        }
    }

    /// Whether the component changes sign under `r -> -r` for mode `m`.
    ///
    /// Scalars and longitudinal components of mode `m` have parity
    /// `(-1)^m`; radial and azimuthal components have parity
    /// `(-1)^(m+1)`.
    pub fn is_odd_on_axis(self, m: usize) -> bool {
        let transverse = matches!(
            self,
            Self::Er | Self::Et | Self::Br | Self::Bt | Self::Jr | Self::Jt
        );
        (m % 2 == 1) != transverse
    }
}

/// Real-space samples of every field component for azimuthal mode `m`.
///
/// Cells are centred: `z[k] = zmin + (k + 1/2) dz` and
/// `r[j] = (j + 1/2) dr`. Arrays are stored row-major with `z` as the
/// slow axis, so a slab of whole `z`-cells is contiguous.
#[derive(Clone, Debug)]
pub struct InterpGrid {
    m: usize,
    nz: usize,
    nr: usize,
    zmin: f64,
    zmax: f64,
    rmax: f64,
    dz: f64,
    dr: f64,
    z: Vec<f64>,
    r: Vec<f64>,
    inv_volume: Vec<f64>,
    er: Vec<Complex64>,
    et: Vec<Complex64>,
    ez: Vec<Complex64>,
    br: Vec<Complex64>,
    bt: Vec<Complex64>,
    bz: Vec<Complex64>,
    jr: Vec<Complex64>,
    jt: Vec<Complex64>,
    jz: Vec<Complex64>,
    rho: Vec<Complex64>,
}

impl InterpGrid {
    /// Create a zero-filled grid for mode `m` covering
    /// `[zmin, zmax] x [0, rmax]` with `nz x nr` cells.
    pub fn new(
        m: usize,
        nz: usize,
        zmin: f64,
        zmax: f64,
        nr: usize,
        rmax: f64,
    ) -> Result<Self, GridError> {
        if nz == 0 {
            return Err(GridError::EmptyAxis { axis: "z" });
        }
        if nr == 0 {
            return Err(GridError::EmptyAxis { axis: "r" });
        }
        if !(zmin.is_finite() && zmax.is_finite() && zmax > zmin) {
            return Err(GridError::InvalidExtent {
                axis: "z",
                min: zmin,
                max: zmax,
            });
        }
        if !(rmax.is_finite() && rmax > 0.0) {
            return Err(GridError::InvalidExtent {
                axis: "r",
                min: 0.0,
                max: rmax,
            });
        }

        let dz = (zmax - zmin) / nz as f64;
        let dr = rmax / nr as f64;
        let z = (0..nz).map(|k| zmin + (k as f64 + 0.5) * dz).collect();
        let r = (0..nr).map(|j| (j as f64 + 0.5) * dr).collect();
        // Annulus between j*dr and (j+1)*dr, one cell long in z.
        let inv_volume = (0..nr)
            .map(|j| 1.0 / (PI * dz * dr * dr * (2 * j + 1) as f64))
            .collect();
        let zeros = vec![Complex64::new(0.0, 0.0); nz * nr];

        Ok(Self {
            m,
            nz,
            nr,
            zmin,
            zmax,
            rmax,
            dz,
            dr,
            z,
            r,
            inv_volume,
            er: zeros.clone(),
            et: zeros.clone(),
            ez: zeros.clone(),
            br: zeros.clone(),
            bt: zeros.clone(),
            bz: zeros.clone(),
            jr: zeros.clone(),
            jt: zeros.clone(),
            jz: zeros.clone(),
            rho: zeros,
        })
    }

    /// Azimuthal mode number.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Number of cells along `z`.
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Number of cells along `r`.
    pub fn nr(&self) -> usize {
        self.nr
    }

    /// Lower `z` edge of the first cell.
    pub fn zmin(&self) -> f64 {
        self.zmin
    }

    /// Upper `z` edge of the last cell.
    pub fn zmax(&self) -> f64 {
        self.zmax
    }

    /// Upper `r` edge of the last cell.
    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    /// Cell length along `z`.
    pub fn dz(&self) -> f64 {
        self.dz
    }

    /// Cell length along `r`.
    pub fn dr(&self) -> f64 {
        self.dr
    }

    /// Cell-centre `z` coordinates.
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Cell-centre `r` coordinates.
    pub fn r(&self) -> &[f64] {
        &self.r
    }

    /// Inverse cell volume for each radial cell.
    pub fn inv_volume(&self) -> &[f64] {
        &self.inv_volume
    }

    /// Flat index of cell `(iz, ir)`.
    #[inline]
    pub fn index(&self, iz: usize, ir: usize) -> usize {
        iz * self.nr + ir
    }

    /// Read one component.
    pub fn component(&self, c: Component) -> &[Complex64] {
        match c {
            Component::Er => &self.er,
            Component::Et => &self.et,
            Component::Ez => &self.ez,
            Component::Br => &self.br,
            Component::Bt => &self.bt,
            Component::Bz => &self.bz,
            Component::Jr => &self.jr,
            Component::Jt => &self.jt,
            Component::Jz => &self.jz,
            Component::Rho => &self.rho,
        }
    }

    /// Mutable access to one component.
    pub fn component_mut(&mut self, c: Component) -> &mut [Complex64] {
        match c {
            Component::Er => &mut self.er,
            Component::Et => &mut self.et,
            Component::Ez => &mut self.ez,
            Component::Br => &mut self.br,
            Component::Bt => &mut self.bt,
            Component::Bz => &mut self.bz,
            Component::Jr => &mut self.jr,
            Component::Jt => &mut self.jt,
            Component::Jz => &mut self.jz,
            Component::Rho => &mut self.rho,
        }
    }

    /// The contiguous block of `count` whole `z`-cells starting at `iz`.
    pub fn slab(&self, c: Component, iz: usize, count: usize) -> &[Complex64] {
        let nr = self.nr;
        &self.component(c)[iz * nr..(iz + count) * nr]
    }

    /// Mutable block of `count` whole `z`-cells starting at `iz`.
    pub fn slab_mut(&mut self, c: Component, iz: usize, count: usize) -> &mut [Complex64] {
        let nr = self.nr;
        &mut self.component_mut(c)[iz * nr..(iz + count) * nr]
    }

    /// Zero a source accumulator.
    pub fn erase(&mut self, source: SourceField) {
        for &c in Component::of_source(source) {
            self.component_mut(c).fill(Complex64::new(0.0, 0.0));
        }
    }

    /// Turn deposited charge/current into a density by dividing by
    /// each cell's volume.
    pub fn divide_by_volume(&mut self, source: SourceField) {
        let nr = self.nr;
        let inv_volume = std::mem::take(&mut self.inv_volume);
        for &c in Component::of_source(source) {
            for row in self.component_mut(c).chunks_exact_mut(nr) {
                for (v, &iv) in row.iter_mut().zip(&inv_volume) {
                    *v *= iv;
                }
            }
        }
        self.inv_volume = inv_volume;
    }

    /// Multiply the `E` and `B` values of cell row `iz` by `factor`.
    pub fn scale_eb_row(&mut self, iz: usize, factor: f64) {
        for c in Component::EB {
            for v in self.slab_mut(c, iz, 1) {
                *v *= factor;
            }
        }
    }

    /// Translate the boundary markers and coordinates by `distance`.
    ///
    /// Field values are not resampled; only the position bookkeeping
    /// moves.
    pub fn shift_boundaries(&mut self, distance: f64) {
        self.zmin += distance;
        self.zmax += distance;
        for z in &mut self.z {
            *z += distance;
        }
    }

    /// Move the grid forward by `n` whole cells.
    ///
    /// Values slide towards lower `z` by `n` rows, the `n` newly exposed
    /// rows at the upper end are zeroed, and the boundary markers advance
    /// by `n * dz`.
    pub fn shift_cells(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        let nr = self.nr;
        let nz = self.nz;
        for c in Component::ALL {
            let data = self.component_mut(c);
            if n >= nz {
                data.fill(Complex64::new(0.0, 0.0));
                continue;
            }
            data.copy_within(n * nr.., 0);
            data[(nz - n) * nr..].fill(Complex64::new(0.0, 0.0));
        }
        self.shift_boundaries(n as f64 * self.dz);
    }

    /// Whether every stored component is exactly zero.
    pub fn is_zero(&self) -> bool {
        Component::ALL
            .iter()
            .all(|&c| self.component(c).iter().all(|v| v.re == 0.0 && v.im == 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> InterpGrid {
        InterpGrid::new(0, 8, 0.0, 8.0, 4, 2.0).unwrap()
    }

    #[test]
    fn rejects_degenerate_axes() {
        assert_eq!(
            InterpGrid::new(0, 0, 0.0, 1.0, 4, 1.0).unwrap_err(),
            GridError::EmptyAxis { axis: "z" }
        );
        assert_eq!(
            InterpGrid::new(0, 4, 0.0, 1.0, 0, 1.0).unwrap_err(),
            GridError::EmptyAxis { axis: "r" }
        );
        assert!(InterpGrid::new(0, 4, 1.0, 1.0, 4, 1.0).is_err());
        assert!(InterpGrid::new(0, 4, 0.0, 1.0, 4, f64::NAN).is_err());
    }

    #[test]
    fn coordinates_are_cell_centred() {
        let g = grid();
        assert_eq!(g.dz(), 1.0);
        assert_eq!(g.dr(), 0.5);
        assert_eq!(g.z()[0], 0.5);
        assert_eq!(g.z()[7], 7.5);
        assert_eq!(g.r()[0], 0.25);
        assert_eq!(g.r()[3], 1.75);
    }

    #[test]
    fn cell_volumes_sum_to_cylinder() {
        let g = grid();
        let per_row: f64 = g.inv_volume().iter().map(|iv| 1.0 / iv).sum();
        let cylinder = PI * g.rmax() * g.rmax() * g.dz();
        assert!((per_row - cylinder).abs() < 1e-12 * cylinder);
    }

    #[test]
    fn divide_by_volume_only_touches_source() {
        let mut g = grid();
        let idx = g.index(2, 1);
        g.component_mut(Component::Rho)[idx] = Complex64::new(1.0, 0.0);
        g.component_mut(Component::Jz)[idx] = Complex64::new(1.0, 0.0);
        g.divide_by_volume(SourceField::Rho);
        assert_eq!(g.component(Component::Rho)[idx].re, g.inv_volume()[1]);
        assert_eq!(g.component(Component::Jz)[idx].re, 1.0);
    }

    #[test]
    fn erase_zeroes_accumulator() {
        let mut g = grid();
        g.component_mut(Component::Jr).fill(Complex64::new(3.0, 1.0));
        g.component_mut(Component::Ez).fill(Complex64::new(2.0, 0.0));
        g.erase(SourceField::J);
        assert!(g.component(Component::Jr).iter().all(|v| v.norm() == 0.0));
        assert!(g.component(Component::Ez).iter().all(|v| v.re == 2.0));
    }

    #[test]
    fn shift_boundaries_moves_markers_only() {
        let mut g = grid();
        g.component_mut(Component::Ez)[0] = Complex64::new(5.0, 0.0);
        g.shift_boundaries(0.25);
        assert_eq!(g.zmin(), 0.25);
        assert_eq!(g.zmax(), 8.25);
        assert_eq!(g.z()[0], 0.75);
        assert_eq!(g.component(Component::Ez)[0].re, 5.0);
    }

    #[test]
    fn shift_cells_slides_values_and_zeroes_tail() {
        let mut g = grid();
        for iz in 0..g.nz() {
            let idx = g.index(iz, 0);
            g.component_mut(Component::Ez)[idx] = Complex64::new(iz as f64, 0.0);
        }
        g.shift_cells(3);
        assert_eq!(g.zmin(), 3.0);
        assert_eq!(g.zmax(), 11.0);
        let ez = g.component(Component::Ez);
        assert_eq!(ez[g.index(0, 0)].re, 3.0);
        assert_eq!(ez[g.index(4, 0)].re, 7.0);
        for iz in 5..8 {
            assert_eq!(ez[g.index(iz, 0)].re, 0.0);
        }
    }

    #[test]
    fn axis_parity() {
        assert!(!Component::Rho.is_odd_on_axis(0));
        assert!(Component::Rho.is_odd_on_axis(1));
        assert!(Component::Er.is_odd_on_axis(0));
        assert!(!Component::Er.is_odd_on_axis(1));
        assert!(!Component::Ez.is_odd_on_axis(2));
    }
}
