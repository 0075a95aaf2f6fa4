//! Timing and bookkeeping for one call to `step()`.
//!
//! [`StepMetrics`] accumulates wall-clock time per [`Phase`] over every
//! iteration of the call, together with counters for the events that
//! only happen on some iterations.

use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;

/// A stage of the PIC cycle that is timed separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Host/device transfers at the start and end of the call.
    Staging,
    /// Diagnostic output.
    Diagnostics,
    /// Moving-window advance.
    MovingWindow,
    /// Guard-cell and particle exchange between domains.
    Exchange,
    /// Field gathering and external fields.
    Gather,
    /// Charge and current deposition, including their transforms.
    Deposit,
    /// Ionization and particle pushes.
    Push,
    /// Damping, transforms and the spectral field update.
    FieldSolve,
}

impl Phase {
    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Staging => "staging",
            Self::Diagnostics => "diagnostics",
            Self::MovingWindow => "moving_window",
            Self::Exchange => "exchange",
            Self::Gather => "gather",
            Self::Deposit => "deposit",
            Self::Push => "push",
            Self::FieldSolve => "field_solve",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metrics collected over one call to `step()`.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default)]
pub struct StepMetrics {
    /// Wall-clock time for the whole call.
    pub total_us: u64,
    /// Accumulated time per phase, in first-recorded order.
    pub phase_us: IndexMap<Phase, u64>,
    /// Iterations completed.
    pub steps: u64,
    /// Iterations that exchanged particles.
    pub particle_exchanges: u64,
    /// Cells the moving window advanced.
    pub cells_moved: u64,
}

impl StepMetrics {
    /// Add `us` microseconds to `phase`.
    pub fn record(&mut self, phase: Phase, us: u64) {
        *self.phase_us.entry(phase).or_insert(0) += us;
    }

    /// Add the time elapsed since `start` to `phase`.
    pub fn record_since(&mut self, phase: Phase, start: Instant) {
        self.record(phase, start.elapsed().as_micros() as u64);
    }

    /// Accumulated time of `phase`, zero if never recorded.
    pub fn phase(&self, phase: Phase) -> u64 {
        self.phase_us.get(&phase).copied().unwrap_or(0)
    }

    /// Mean wall-clock time per iteration.
    pub fn mean_step_us(&self) -> Option<u64> {
        (self.steps > 0).then(|| self.total_us / self.steps)
    }
}
