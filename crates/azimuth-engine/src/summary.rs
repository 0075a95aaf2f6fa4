//! Human-readable description of a simulation's setup.

use azimuth_core::{Boundaries, ParticleShape, StencilOrder};

use crate::setup::Frame;

/// The facts reported by [`SetupInfo::render`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetupInfo {
    /// Fields and particles staged to an accelerator.
    pub use_device: bool,
    /// Number of ranks.
    pub size: usize,
    /// Longitudinal stencil order.
    pub stencil: StencilOrder,
    /// Shape factor of the loaded species.
    pub particle_shape: ParticleShape,
    /// Longitudinal boundaries.
    pub boundaries: Boundaries,
    /// Guard cells per interior boundary.
    pub n_guard: usize,
    /// Absorbing cells at open edges.
    pub n_damp: usize,
    /// Steps between particle exchanges.
    pub exchange_period: u64,
    /// Lorentz factor of the simulation frame, if boosted.
    pub gamma_boost: Option<f64>,
    /// Field-solver frame.
    pub frame: Frame,
}

impl SetupInfo {
    /// Summary at `verbosity` 1 (basic) or 2 (detailed); nothing at 0.
    pub fn render(&self, verbosity: u8) -> Option<String> {
        if verbosity == 0 {
            return None;
        }
        let mut msg = format!("azimuth ({})", env!("CARGO_PKG_VERSION"));
        if verbosity == 1 {
            msg.push_str(if self.use_device {
                "\nRunning on device"
            } else {
                "\nRunning on CPU"
            });
            if self.size > 1 {
                msg.push_str(&format!(" with {} processes", self.size));
            }
            return Some(msg);
        }

        msg.push_str(&format!("\nProcesses: {}", self.size));
        msg.push_str(if self.use_device {
            "\nCompute architecture: device"
        } else {
            "\nCompute architecture: CPU"
        });
        msg.push_str(&format!("\nStencil order: {}", self.stencil));
        msg.push_str(&format!("\nParticle shape: {}", self.particle_shape));
        msg.push_str(&format!("\nLongitudinal boundaries: {}", self.boundaries));
        msg.push_str("\nTransverse boundaries: reflective");
        msg.push_str(&format!("\nGuard region size: {} cells", self.n_guard));
        msg.push_str(&format!("\nDamping region size: {} cells", self.n_damp));
        msg.push_str(&format!(
            "\nParticle exchange period: every {} step",
            self.exchange_period
        ));
        match self.gamma_boost {
            Some(gamma) => {
                msg.push_str("\nBoosted frame: yes");
                msg.push_str(&format!("\nBoosted frame gamma: {gamma}"));
                let galilean = self.frame.galilean_velocity().is_some();
                msg.push_str(if galilean {
                    "\nGalilean frame: yes"
                } else {
                    "\nGalilean frame: no"
                });
            }
            None => msg.push_str("\nBoosted frame: no"),
        }
        Some(msg)
    }

    /// Log the summary on rank 0.
    pub fn log(&self, rank: usize, verbosity: u8) {
        if rank != 0 {
            return;
        }
        if let Some(msg) = self.render(verbosity) {
            for line in msg.lines() {
                log::info!("{line}");
            }
        }
    }
}
