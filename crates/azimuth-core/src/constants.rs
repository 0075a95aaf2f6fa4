//! Physical constants in SI units (CODATA 2018).

/// Speed of light in vacuum, m/s.
pub const C: f64 = 299_792_458.0;

/// Elementary charge, C.
pub const E: f64 = 1.602_176_634e-19;

/// Electron mass, kg.
pub const M_E: f64 = 9.109_383_701_5e-31;

/// Proton mass, kg.
pub const M_P: f64 = 1.672_621_923_69e-27;

/// Vacuum permittivity, F/m.
pub const EPSILON_0: f64 = 8.854_187_812_8e-12;

/// Vacuum permeability, H/m.
pub const MU_0: f64 = 1.256_637_062_12e-6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_speed_matches_vacuum_constants() {
        let c2 = 1.0 / (EPSILON_0 * MU_0);
        assert!((c2.sqrt() - C).abs() / C < 1e-9);
    }
}
