//! Structure-of-arrays storage for one species' phase space.

use azimuth_core::SpeciesError;

/// Field component gathered at particle positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GatheredField {
    /// Cartesian `Ex`.
    Ex,
    /// Cartesian `Ey`.
    Ey,
    /// Cartesian `Ez`.
    Ez,
    /// Cartesian `Bx`.
    Bx,
    /// Cartesian `By`.
    By,
    /// Cartesian `Bz`.
    Bz,
}

/// Positions, normalised momenta, weights and gathered fields.
///
/// Momenta are `u = p / (m c)`. `w` is the number of physical particles
/// a macro-particle represents. Gathered fields are scratch space
/// refreshed every step and are not carried across ranks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleArrays {
    /// Cartesian `x` positions.
    pub x: Vec<f64>,
    /// Cartesian `y` positions.
    pub y: Vec<f64>,
    /// Longitudinal positions.
    pub z: Vec<f64>,
    /// Normalised momentum along `x`.
    pub ux: Vec<f64>,
    /// Normalised momentum along `y`.
    pub uy: Vec<f64>,
    /// Normalised momentum along `z`.
    pub uz: Vec<f64>,
    /// `1 / gamma`.
    pub inv_gamma: Vec<f64>,
    /// Macro-particle weights.
    pub w: Vec<f64>,
    /// Gathered `Ex`.
    pub ex: Vec<f64>,
    /// Gathered `Ey`.
    pub ey: Vec<f64>,
    /// Gathered `Ez`.
    pub ez: Vec<f64>,
    /// Gathered `Bx`.
    pub bx: Vec<f64>,
    /// Gathered `By`.
    pub by: Vec<f64>,
    /// Gathered `Bz`.
    pub bz: Vec<f64>,
}

/// One particle's transported state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position `(x, y, z)`.
    pub position: [f64; 3],
    /// Normalised momentum `(ux, uy, uz)`.
    pub momentum: [f64; 3],
    /// Macro-particle weight.
    pub w: f64,
}

impl ParticleArrays {
    /// Values per particle in the flat transport layout.
    pub const PACKED_WIDTH: usize = 8;

    /// Empty arrays.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.z.len()
    }

    /// Whether there are no particles.
    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }

    fn columns(&self) -> [&Vec<f64>; 14] {
        [
            &self.x,
            &self.y,
            &self.z,
            &self.ux,
            &self.uy,
            &self.uz,
            &self.inv_gamma,
            &self.w,
            &self.ex,
            &self.ey,
            &self.ez,
            &self.bx,
            &self.by,
            &self.bz,
        ]
    }

    fn columns_mut(&mut self) -> [&mut Vec<f64>; 14] {
        [
            &mut self.x,
            &mut self.y,
            &mut self.z,
            &mut self.ux,
            &mut self.uy,
            &mut self.uz,
            &mut self.inv_gamma,
            &mut self.w,
            &mut self.ex,
            &mut self.ey,
            &mut self.ez,
            &mut self.bx,
            &mut self.by,
            &mut self.bz,
        ]
    }

    /// Check that every array has the same length.
    pub fn check_lengths(&self) -> Result<(), SpeciesError> {
        let expected = self.len();
        match self.columns().iter().find(|c| c.len() != expected) {
            Some(c) => Err(SpeciesError::LengthMismatch {
                expected,
                found: c.len(),
            }),
            None => Ok(()),
        }
    }

    /// Gathered-field array for `component`.
    pub fn gathered_mut(&mut self, component: GatheredField) -> &mut [f64] {
        match component {
            GatheredField::Ex => &mut self.ex,
            GatheredField::Ey => &mut self.ey,
            GatheredField::Ez => &mut self.ez,
            GatheredField::Bx => &mut self.bx,
            GatheredField::By => &mut self.by,
            GatheredField::Bz => &mut self.bz,
        }
    }

    /// Append one particle; `gamma` is derived from its momentum and
    /// gathered fields start at zero.
    pub fn push(&mut self, p: Particle) {
        let [x, y, z] = p.position;
        let [ux, uy, uz] = p.momentum;
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.ux.push(ux);
        self.uy.push(uy);
        self.uz.push(uz);
        self.inv_gamma
            .push(1.0 / (1.0 + ux * ux + uy * uy + uz * uz).sqrt());
        self.w.push(p.w);
        for c in [
            &mut self.ex,
            &mut self.ey,
            &mut self.ez,
            &mut self.bx,
            &mut self.by,
            &mut self.bz,
        ] {
            c.push(0.0);
        }
    }

    /// Append every particle of `other`.
    pub fn extend(&mut self, other: ParticleArrays) {
        for (dst, src) in self.columns_mut().into_iter().zip(other.columns()) {
            dst.extend_from_slice(src);
        }
    }

    /// Remove the particles whose `z` satisfies `leaving`, keeping the
    /// relative order of the rest, and return them.
    pub fn split_off_where(&mut self, mut leaving: impl FnMut(f64) -> bool) -> ParticleArrays {
        let mask: Vec<bool> = self.z.iter().map(|&z| leaving(z)).collect();
        let mut out = ParticleArrays::new();
        if !mask.contains(&true) {
            return out;
        }
        for (dst, src) in out.columns_mut().into_iter().zip(self.columns_mut()) {
            let mut kept = Vec::with_capacity(src.len());
            for (&v, &go) in src.iter().zip(&mask) {
                if go {
                    dst.push(v);
                } else {
                    kept.push(v);
                }
            }
            *src = kept;
        }
        out
    }

    /// Flatten the transported quantities into
    /// `[x, y, z, ux, uy, uz, inv_gamma, w]` records.
    pub fn to_packed(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * Self::PACKED_WIDTH);
        for i in 0..self.len() {
            out.extend_from_slice(&[
                self.x[i],
                self.y[i],
                self.z[i],
                self.ux[i],
                self.uy[i],
                self.uz[i],
                self.inv_gamma[i],
                self.w[i],
            ]);
        }
        out
    }

    /// Rebuild arrays from [`to_packed`](Self::to_packed) output.
    pub fn from_packed(data: &[f64]) -> Result<Self, SpeciesError> {
        if data.len() % Self::PACKED_WIDTH != 0 {
            return Err(SpeciesError::LengthMismatch {
                expected: data.len() / Self::PACKED_WIDTH * Self::PACKED_WIDTH,
                found: data.len(),
            });
        }
        let n = data.len() / Self::PACKED_WIDTH;
        let mut out = ParticleArrays::new();
        for c in out.columns_mut() {
            c.reserve(n);
        }
        for rec in data.chunks_exact(Self::PACKED_WIDTH) {
            out.x.push(rec[0]);
            out.y.push(rec[1]);
            out.z.push(rec[2]);
            out.ux.push(rec[3]);
            out.uy.push(rec[4]);
            out.uz.push(rec[5]);
            out.inv_gamma.push(rec[6]);
            out.w.push(rec[7]);
        }
        for c in [
            &mut out.ex,
            &mut out.ey,
            &mut out.ez,
            &mut out.bx,
            &mut out.by,
            &mut out.bz,
        ] {
            c.resize(n, 0.0);
        }
        Ok(out)
    }

    /// Shift every `z` by `dz`.
    pub fn translate_z(&mut self, dz: f64) {
        for z in &mut self.z {
            *z += dz;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(n: usize) -> ParticleArrays {
        let mut a = ParticleArrays::new();
        for i in 0..n {
            a.push(Particle {
                position: [0.1 * i as f64, 0.0, i as f64],
                momentum: [0.0, 0.0, 1.0],
                w: 2.0,
            });
        }
        a
    }

    #[test]
    fn push_derives_gamma() {
        let a = sample(1);
        assert!((a.inv_gamma[0] - 1.0 / 2f64.sqrt()).abs() < 1e-15);
        assert!(a.check_lengths().is_ok());
    }

    #[test]
    fn split_preserves_order_on_both_sides() {
        let mut a = sample(6);
        let gone = a.split_off_where(|z| z >= 2.0 && z < 4.0);
        assert_eq!(a.z, vec![0.0, 1.0, 4.0, 5.0]);
        assert_eq!(gone.z, vec![2.0, 3.0]);
        assert!(a.check_lengths().is_ok());
        assert!(gone.check_lengths().is_ok());
    }

    #[test]
    fn packed_transport_drops_gathered_fields() {
        let mut a = sample(3);
        a.ez.fill(7.0);
        let b = ParticleArrays::from_packed(&a.to_packed()).unwrap();
        assert_eq!(b.z, a.z);
        assert_eq!(b.w, a.w);
        assert!(b.ez.iter().all(|&v| v == 0.0));
        assert!(b.check_lengths().is_ok());
    }

    #[test]
    fn ragged_packed_data_rejected() {
        let err = ParticleArrays::from_packed(&[0.0; 9]).unwrap_err();
        assert_eq!(
            err,
            SpeciesError::LengthMismatch {
                expected: 8,
                found: 9
            }
        );
    }

    #[test]
    fn length_mismatch_detected() {
        let mut a = sample(2);
        a.ux.pop();
        assert_eq!(
            a.check_lengths(),
            Err(SpeciesError::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
