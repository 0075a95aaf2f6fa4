//! Lab-frame to boosted-frame conversion of simulation inputs.

use azimuth_core::ConfigError;

/// Converts lab-frame lengths, densities and momenta into a frame moving
/// along `+z` with Lorentz factor `gamma0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostConverter {
    gamma0: f64,
    beta0: f64,
}

impl BoostConverter {
    /// Converter for Lorentz factor `gamma0 >= 1`.
    pub fn new(gamma0: f64) -> Result<Self, ConfigError> {
        if !gamma0.is_finite() || gamma0 < 1.0 {
            return Err(ConfigError::InvalidBoost { gamma: gamma0 });
        }
        Ok(Self {
            gamma0,
            beta0: (1.0 - 1.0 / (gamma0 * gamma0)).sqrt(),
        })
    }

    /// Lorentz factor of the boost.
    pub fn gamma0(&self) -> f64 {
        self.gamma0
    }

    /// Boost velocity over `c`.
    pub fn beta0(&self) -> f64 {
        self.beta0
    }

    /// Lengths and times of objects that copropagate with the boost
    /// (the simulation box, a laser pulse, the timestep):
    /// `L' = gamma0 (1 + beta0) L`.
    pub fn copropag_length<const N: usize>(&self, values: [f64; N]) -> [f64; N] {
        let f = self.gamma0 * (1.0 + self.beta0);
        values.map(|v| v * f)
    }

    /// Lengths of objects at rest in the lab (a plasma):
    /// `L' = L / gamma0`.
    pub fn static_length<const N: usize>(&self, values: [f64; N]) -> [f64; N] {
        values.map(|v| v / self.gamma0)
    }

    /// Densities of objects at rest in the lab: `n' = gamma0 n`.
    pub fn static_density<const N: usize>(&self, values: [f64; N]) -> [f64; N] {
        values.map(|v| v * self.gamma0)
    }

    /// Longitudinal normalised momenta of particles without transverse
    /// momentum: `uz' = gamma0 uz - gamma0 beta0 sqrt(1 + uz^2)`.
    pub fn longitudinal_momentum<const N: usize>(&self, values: [f64; N]) -> [f64; N] {
        values.map(|uz| self.gamma0 * uz - self.gamma0 * self.beta0 * (1.0 + uz * uz).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_subluminal_gamma() {
        assert_eq!(
            BoostConverter::new(0.5),
            Err(ConfigError::InvalidBoost { gamma: 0.5 })
        );
        assert!(BoostConverter::new(f64::INFINITY).is_err());
    }

    #[test]
    fn unit_gamma_is_identity() {
        let b = BoostConverter::new(1.0).unwrap();
        assert_eq!(b.beta0(), 0.0);
        assert_eq!(b.copropag_length([2.0, 3.0]), [2.0, 3.0]);
        assert_eq!(b.static_length([2.0]), [2.0]);
        assert_eq!(b.static_density([5.0]), [5.0]);
        assert_eq!(b.longitudinal_momentum([0.7]), [0.7]);
    }

    #[test]
    fn known_values_at_gamma_ten() {
        let b = BoostConverter::new(10.0).unwrap();
        let beta = (1.0f64 - 0.01).sqrt();
        let [l] = b.copropag_length([1.0]);
        assert!((l - 10.0 * (1.0 + beta)).abs() < 1e-12);
        assert_eq!(b.static_length([1.0]), [0.1]);
        let [n] = b.static_density([1.0e24]);
        assert!((n - 1.0e25).abs() < 1e-12 * 1.0e25);
        let [uz] = b.longitudinal_momentum([0.0]);
        assert!((uz + 10.0 * beta).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn boosted_momentum_stays_on_mass_shell(gamma0 in 1.0f64..100.0, uz in -50.0f64..50.0) {
            let b = BoostConverter::new(gamma0).unwrap();
            let [uz_b] = b.longitudinal_momentum([uz]);
            let gamma = (1.0 + uz * uz).sqrt();
            let gamma_b = b.gamma0() * gamma - b.gamma0() * b.beta0() * uz;
            let shell = gamma_b * gamma_b - uz_b * uz_b;
            prop_assert!((shell - 1.0).abs() < 1e-8 * gamma_b * gamma_b);
        }

        #[test]
        fn static_then_copropag_scales_by_doppler(gamma0 in 1.0f64..100.0, l in 1e-9f64..1.0) {
            let b = BoostConverter::new(gamma0).unwrap();
            let [s] = b.static_length([l]);
            let [c] = b.copropag_length([s]);
            prop_assert!((c - l * (1.0 + b.beta0())).abs() <= 1e-12 * l * 2.0);
        }
    }
}
