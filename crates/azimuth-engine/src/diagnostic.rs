//! Diagnostics run at the start of every step.
//!
//! A [`Diagnostic`] sees the state at `iteration * dt` before anything is
//! mutated. Diagnostics decide themselves on which iterations to write.

use std::sync::{Arc, Mutex, PoisonError};

use azimuth_core::{DiagnosticError, Iteration};
use azimuth_grid::{Component, InterpGrid};
use azimuth_particles::Species;

/// Read-only view of the simulation handed to diagnostics.
pub struct DiagnosticContext<'a> {
    /// Iteration about to be advanced.
    pub iteration: Iteration,
    /// Simulation time in seconds.
    pub time: f64,
    /// Local rank.
    pub rank: usize,
    /// Interpolation grids, one per mode.
    pub grids: &'a [InterpGrid],
    /// Every particle species.
    pub species: &'a [Box<dyn Species>],
}

/// Output produced during a run.
pub trait Diagnostic: Send {
    /// Name used in error reports.
    fn name(&self) -> &str;

    /// Record whatever this diagnostic records at `ctx.iteration`.
    fn write(&mut self, ctx: &DiagnosticContext<'_>) -> Result<(), DiagnosticError>;
}

// ── FieldEnergyProbe ───────────────────────────────────────────────

/// One sample of the field energy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnergySample {
    /// Iteration of the sample.
    pub iteration: Iteration,
    /// Simulation time.
    pub time: f64,
    /// `sum |E|^2 + |B|^2` over every mode and cell of the local grid.
    pub energy: f64,
}

/// Shared handle on the samples of a [`FieldEnergyProbe`].
#[derive(Clone, Debug, Default)]
pub struct EnergyHistory(Arc<Mutex<Vec<EnergySample>>>);

impl EnergyHistory {
    /// Samples recorded so far.
    pub fn samples(&self) -> Vec<EnergySample> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, sample: EnergySample) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sample);
    }
}

/// Samples the unnormalised electromagnetic energy every `period`
/// iterations.
#[derive(Debug)]
pub struct FieldEnergyProbe {
    period: u64,
    history: EnergyHistory,
}

impl FieldEnergyProbe {
    /// Probe writing every `period` iterations.
    pub fn new(period: u64) -> Result<Self, String> {
        if period == 0 {
            return Err("period must be at least 1".into());
        }
        Ok(Self {
            period,
            history: EnergyHistory::default(),
        })
    }

    /// Handle for reading the samples once the probe is installed.
    pub fn history(&self) -> EnergyHistory {
        self.history.clone()
    }
}

fn field_energy(grids: &[InterpGrid]) -> f64 {
    let mut energy = 0.0;
    for grid in grids {
        for c in Component::EB {
            energy += grid.component(c).iter().map(|v| v.norm_sqr()).sum::<f64>();
        }
    }
    energy
}

impl Diagnostic for FieldEnergyProbe {
    fn name(&self) -> &str {
        "field_energy"
    }

    fn write(&mut self, ctx: &DiagnosticContext<'_>) -> Result<(), DiagnosticError> {
        if !ctx.iteration.is_multiple_of(self.period) {
            return Ok(());
        }
        let energy = field_energy(ctx.grids);
        if !energy.is_finite() {
            return Err(DiagnosticError::WriteFailed {
                reason: format!("field energy is {energy} at iteration {}", ctx.iteration),
            });
        }
        log::debug!(
            "rank {}: field energy {energy:.6e} at iteration {}",
            ctx.rank,
            ctx.iteration
        );
        self.history.push(EnergySample {
            iteration: ctx.iteration,
            time: ctx.time,
            energy,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azimuth_grid::Complex64;

    fn grids() -> Vec<InterpGrid> {
        vec![
            InterpGrid::new(0, 4, 0.0, 4.0, 2, 1.0).unwrap(),
            InterpGrid::new(1, 4, 0.0, 4.0, 2, 1.0).unwrap(),
        ]
    }

    fn ctx<'a>(iteration: u64, grids: &'a [InterpGrid]) -> DiagnosticContext<'a> {
        DiagnosticContext {
            iteration: Iteration(iteration),
            time: iteration as f64,
            rank: 0,
            grids,
            species: &[],
        }
    }

    #[test]
    fn zero_period_rejected() {
        assert!(FieldEnergyProbe::new(0).is_err());
    }

    #[test]
    fn samples_on_period_only() {
        let mut probe = FieldEnergyProbe::new(5).unwrap();
        let history = probe.history();
        let mut g = grids();
        g[1].component_mut(Component::Bt)[0] = Complex64::new(3.0, 4.0);
        for it in 0..11 {
            probe.write(&ctx(it, &g)).unwrap();
        }
        let samples = history.samples();
        let its: Vec<u64> = samples.iter().map(|s| s.iteration.0).collect();
        assert_eq!(its, vec![0, 5, 10]);
        assert!(samples.iter().all(|s| s.energy == 25.0));
    }

    #[test]
    fn non_finite_energy_fails() {
        let mut probe = FieldEnergyProbe::new(1).unwrap();
        let mut g = grids();
        g[0].component_mut(Component::Er)[0] = Complex64::new(f64::NAN, 0.0);
        assert!(matches!(
            probe.write(&ctx(0, &g)),
            Err(DiagnosticError::WriteFailed { .. })
        ));
    }
}
