//! Relativistic leapfrog pushers in normalised momentum.

use azimuth_core::constants::C;

use crate::arrays::ParticleArrays;

/// Advance momenta by `dt` with the Boris scheme, using the gathered
/// fields. Charge `q` and mass `m` are per physical particle.
pub fn boris_push(p: &mut ParticleArrays, q: f64, m: f64, dt: f64) {
    let econst = q * dt / (2.0 * m * C);
    let bconst = q * dt / (2.0 * m);
    for i in 0..p.len() {
        // Half electric kick.
        let umx = p.ux[i] + econst * p.ex[i];
        let umy = p.uy[i] + econst * p.ey[i];
        let umz = p.uz[i] + econst * p.ez[i];
        let inv_gamma_m = 1.0 / (1.0 + umx * umx + umy * umy + umz * umz).sqrt();

        // Magnetic rotation.
        let tx = bconst * inv_gamma_m * p.bx[i];
        let ty = bconst * inv_gamma_m * p.by[i];
        let tz = bconst * inv_gamma_m * p.bz[i];
        let s = 2.0 / (1.0 + tx * tx + ty * ty + tz * tz);
        let upx = umx + (umy * tz - umz * ty);
        let upy = umy + (umz * tx - umx * tz);
        let upz = umz + (umx * ty - umy * tx);
        let urx = umx + s * (upy * tz - upz * ty);
        let ury = umy + s * (upz * tx - upx * tz);
        let urz = umz + s * (upx * ty - upy * tx);

        // Second half electric kick.
        let ux = urx + econst * p.ex[i];
        let uy = ury + econst * p.ey[i];
        let uz = urz + econst * p.ez[i];
        p.ux[i] = ux;
        p.uy[i] = uy;
        p.uz[i] = uz;
        p.inv_gamma[i] = 1.0 / (1.0 + ux * ux + uy * uy + uz * uz).sqrt();
    }
}

/// Advance positions by `dt / 2` at the current velocity.
pub fn halfpush_x(p: &mut ParticleArrays, dt: f64) {
    let chdt = 0.5 * C * dt;
    for i in 0..p.len() {
        let s = chdt * p.inv_gamma[i];
        p.x[i] += s * p.ux[i];
        p.y[i] += s * p.uy[i];
        p.z[i] += s * p.uz[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::Particle;
    use azimuth_core::constants::{E, M_E};

    fn at_rest() -> ParticleArrays {
        let mut a = ParticleArrays::new();
        a.push(Particle {
            position: [0.0; 3],
            momentum: [0.0; 3],
            w: 1.0,
        });
        a
    }

    #[test]
    fn electric_kick_matches_impulse() {
        let mut p = at_rest();
        p.ez[0] = 1.0e6;
        let dt = 1.0e-15;
        boris_push(&mut p, -E, M_E, dt);
        let expected = -E * 1.0e6 * dt / (M_E * C);
        assert!((p.uz[0] - expected).abs() < 1e-12 * expected.abs());
    }

    #[test]
    fn magnetic_rotation_preserves_energy() {
        let mut p = at_rest();
        p.ux[0] = 3.0;
        p.inv_gamma[0] = 1.0 / 10f64.sqrt();
        p.bz[0] = 50.0;
        for _ in 0..100 {
            boris_push(&mut p, -E, M_E, 1.0e-13);
        }
        let u2 = p.ux[0] * p.ux[0] + p.uy[0] * p.uy[0] + p.uz[0] * p.uz[0];
        assert!((u2 - 9.0).abs() < 1e-9);
        assert!(p.uy[0].abs() > 0.0);
    }

    #[test]
    fn halfpush_moves_at_velocity() {
        let mut p = at_rest();
        p.uz[0] = 1.0;
        p.inv_gamma[0] = 1.0 / 2f64.sqrt();
        halfpush_x(&mut p, 2.0e-15);
        let v = C / 2f64.sqrt();
        assert!((p.z[0] - v * 1.0e-15).abs() < 1e-12 * v * 1.0e-15);
    }
}
