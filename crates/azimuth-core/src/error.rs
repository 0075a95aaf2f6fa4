//! Error types for the azimuth engine.
//!
//! Organised by subsystem: construction-time configuration, per-step
//! execution, deposition, field numerics, particle kernels, collective
//! exchange, device staging and diagnostics. Every error is fatal for
//! the run; nothing here is retried.

use std::error::Error;
use std::fmt;

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while constructing a simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The guard region cannot hold the worst-case particle travel
    /// between two particle exchanges at the chosen timestep.
    GuardRegionTooSmall {
        /// Guard cells on each side of a domain.
        n_guard: usize,
        /// Cells a particle may cross per step, with safety factor.
        cells_per_step: f64,
        /// The computed (rejected) exchange period.
        exchange_period: i64,
    },
    /// Grid dimensions or extents are invalid.
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },
    /// The timestep is NaN, infinite, zero or negative.
    InvalidTimestep {
        /// The rejected value.
        value: f64,
    },
    /// A Lorentz factor below 1 or not finite.
    InvalidBoost {
        /// The rejected Lorentz factor.
        gamma: f64,
    },
    /// Boundary mode name not recognised.
    UnknownBoundaries {
        /// The rejected name.
        name: String,
    },
    /// Particle shape name not recognised.
    UnknownParticleShape {
        /// The rejected name.
        name: String,
    },
    /// Domain decomposition parameters are inconsistent.
    InvalidDomain {
        /// Description of the problem.
        reason: String,
    },
    /// Particle loading parameters are invalid.
    InvalidPlasma {
        /// Description of the problem.
        reason: String,
    },
    /// A moving window was requested on periodic boundaries.
    WindowRequiresOpenBoundaries,
    /// Moving-window parameters are invalid.
    InvalidWindow {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GuardRegionTooSmall {
                n_guard,
                cells_per_step,
                exchange_period,
            } => write!(
                f,
                "guard region of {n_guard} cells is too small for the chosen timestep: \
                 particles cross {cells_per_step:.3} cells per step, \
                 giving an exchange period of {exchange_period}"
            ),
            Self::InvalidGrid { reason } => write!(f, "invalid grid: {reason}"),
            Self::InvalidTimestep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::InvalidBoost { gamma } => {
                write!(f, "gamma_boost must be finite and >= 1, got {gamma}")
            }
            Self::UnknownBoundaries { name } => {
                write!(f, "unknown boundaries '{name}' (expected 'periodic' or 'open')")
            }
            Self::UnknownParticleShape { name } => write!(
                f,
                "unknown particle shape '{name}' \
                 (expected 'linear', 'linear_non_atomic' or 'cubic')"
            ),
            Self::InvalidDomain { reason } => write!(f, "invalid domain: {reason}"),
            Self::InvalidPlasma { reason } => write!(f, "invalid plasma: {reason}"),
            Self::WindowRequiresOpenBoundaries => {
                write!(f, "a moving window requires open boundaries")
            }
            Self::InvalidWindow { reason } => write!(f, "invalid moving window: {reason}"),
        }
    }
}

impl Error for ConfigError {}

// ── DepositError ───────────────────────────────────────────────────

/// Errors from the deposition protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepositError {
    /// The requested field kind is not one of `rho_prev`, `rho_next`, `J`.
    UnknownFieldKind {
        /// The rejected name.
        name: String,
    },
}

impl fmt::Display for DepositError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFieldKind { name } => write!(f, "unknown field kind: {name}"),
        }
    }
}

impl Error for DepositError {}

// ── FieldsError ────────────────────────────────────────────────────

/// Errors from field storage, transforms and the spectral solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldsError {
    /// The spectral solver failed.
    SolverFailed {
        /// Name of the solver.
        solver: String,
        /// Description of the failure.
        reason: String,
    },
    /// Interpolation and spectral grids disagree in shape.
    ShapeMismatch {
        /// Description of the mismatch.
        reason: String,
    },
}

impl fmt::Display for FieldsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SolverFailed { solver, reason } => {
                write!(f, "solver '{solver}' failed: {reason}")
            }
            Self::ShapeMismatch { reason } => write!(f, "grid shape mismatch: {reason}"),
        }
    }
}

impl Error for FieldsError {}

// ── SpeciesError ───────────────────────────────────────────────────

/// Errors from particle kernels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeciesError {
    /// A kernel failed.
    ExecutionFailed {
        /// Description of the failure.
        reason: String,
    },
    /// Phase-space arrays have inconsistent lengths.
    LengthMismatch {
        /// Expected number of particles.
        expected: usize,
        /// Number found in the offending array.
        found: usize,
    },
    /// Ionization handling failed.
    Ionization {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for SpeciesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "phase-space length mismatch: expected {expected}, found {found}")
            }
            Self::Ionization { reason } => write!(f, "ionization failed: {reason}"),
        }
    }
}

impl Error for SpeciesError {}

// ── ExchangeError ──────────────────────────────────────────────────

/// Collective failures during guard-cell or particle exchange.
///
/// A failed exchange leaves the participating domains inconsistent, so
/// the whole run must stop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// A neighbouring rank is no longer reachable.
    Disconnected {
        /// Local rank.
        rank: usize,
        /// Unreachable peer.
        peer: usize,
    },
    /// The peer sent a payload of unexpected size.
    PayloadMismatch {
        /// Sending peer.
        peer: usize,
        /// Expected number of values.
        expected: usize,
        /// Number of values received.
        found: usize,
    },
    /// The peer sent a message of the wrong type, meaning the ranks
    /// have diverged in their step sequence.
    UnexpectedMessage {
        /// Sending peer.
        peer: usize,
        /// What was expected.
        expected: &'static str,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { rank, peer } => {
                write!(f, "rank {rank} lost connection to rank {peer}")
            }
            Self::PayloadMismatch {
                peer,
                expected,
                found,
            } => write!(
                f,
                "rank {peer} sent {found} values, expected {expected}"
            ),
            Self::UnexpectedMessage { peer, expected } => {
                write!(f, "rank {peer} sent an unexpected message (expected {expected})")
            }
        }
    }
}

impl Error for ExchangeError {}

// ── StagingError ───────────────────────────────────────────────────

/// Errors moving state between host and device memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StagingError {
    /// A host/device transfer failed.
    TransferFailed {
        /// The object being transferred.
        target: String,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for StagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransferFailed { target, reason } => {
                write!(f, "staging '{target}' failed: {reason}")
            }
        }
    }
}

impl Error for StagingError {}

// ── DiagnosticError ────────────────────────────────────────────────

/// Errors raised by a diagnostic while writing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticError {
    /// The diagnostic could not record its output.
    WriteFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed { reason } => write!(f, "write failed: {reason}"),
        }
    }
}

impl Error for DiagnosticError {}

// ── StepError ──────────────────────────────────────────────────────

/// Errors surfaced by a call to `step()` or `deposit()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// Field storage or the spectral solver failed.
    Fields(FieldsError),
    /// A particle species failed.
    Species {
        /// Name of the failing species.
        name: String,
        /// The underlying error.
        reason: SpeciesError,
    },
    /// A collective exchange failed.
    Exchange(ExchangeError),
    /// The deposition protocol rejected its input.
    Deposit(DepositError),
    /// A diagnostic failed.
    Diagnostic {
        /// Name of the failing diagnostic.
        name: String,
        /// The underlying error.
        reason: DiagnosticError,
    },
    /// Device staging failed.
    Staging(StagingError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields(e) => write!(f, "fields: {e}"),
            Self::Species { name, reason } => write!(f, "species '{name}': {reason}"),
            Self::Exchange(e) => write!(f, "exchange: {e}"),
            Self::Deposit(e) => write!(f, "deposit: {e}"),
            Self::Diagnostic { name, reason } => write!(f, "diagnostic '{name}': {reason}"),
            Self::Staging(e) => write!(f, "staging: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fields(e) => Some(e),
            Self::Species { reason, .. } => Some(reason),
            Self::Exchange(e) => Some(e),
            Self::Deposit(e) => Some(e),
            Self::Diagnostic { reason, .. } => Some(reason),
            Self::Staging(e) => Some(e),
        }
    }
}

impl From<FieldsError> for StepError {
    fn from(e: FieldsError) -> Self {
        Self::Fields(e)
    }
}

impl From<ExchangeError> for StepError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

impl From<DepositError> for StepError {
    fn from(e: DepositError) -> Self {
        Self::Deposit(e)
    }
}

impl From<StagingError> for StepError {
    fn from(e: StagingError) -> Self {
        Self::Staging(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_error_mentions_sizes() {
        let e = ConfigError::GuardRegionTooSmall {
            n_guard: 4,
            cells_per_step: 1.5,
            exchange_period: 0,
        };
        let msg = e.to_string();
        assert!(msg.contains("4 cells"));
        assert!(msg.contains("1.500"));
    }

    #[test]
    fn step_error_chains_source() {
        let e = StepError::Species {
            name: "electrons".into(),
            reason: SpeciesError::ExecutionFailed {
                reason: "boom".into(),
            },
        };
        assert_eq!(e.to_string(), "species 'electrons': execution failed: boom");
        assert!(e.source().is_some());
    }

    #[test]
    fn deposit_error_converts() {
        let e: StepError = DepositError::UnknownFieldKind { name: "E".into() }.into();
        assert_eq!(e.to_string(), "deposit: unknown field kind: E");
    }
}
