//! Strongly-typed iteration counter.

use std::fmt;

/// Monotonically increasing PIC iteration counter.
///
/// Starts at 0 and is incremented once at the very end of every
/// completed step. Fields are known at `iteration * dt`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iteration(pub u64);

impl Iteration {
    /// The iteration that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether this iteration is a multiple of `period`.
    ///
    /// A zero period never matches.
    pub fn is_multiple_of(self, period: u64) -> bool {
        period != 0 && self.0 % period == 0
    }
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Iteration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
