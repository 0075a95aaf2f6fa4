//! Closed sets of field kinds.
//!
//! Deposition, spectral transforms and guard-cell exchange each act on a
//! small, fixed set of fields. They are modelled as enums so that every
//! dispatch site is an exhaustive `match`; textual names are accepted
//! only through [`FromStr`], which rejects unknown names up front.

use std::fmt;
use std::str::FromStr;

use crate::error::DepositError;

/// Target of one deposition pass.
///
/// `RhoPrev` and `RhoNext` bracket the half-step current deposition so
/// that the spectral current correction can enforce discrete continuity
/// between the two charge snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepositKind {
    /// Charge density at `t = n dt`.
    RhoPrev,
    /// Charge density at `t = (n+1) dt`.
    RhoNext,
    /// Current density at `t = (n+1/2) dt`.
    J,
}

impl DepositKind {
    /// All deposition kinds, in step order.
    pub const ALL: [DepositKind; 3] = [Self::RhoPrev, Self::J, Self::RhoNext];

    /// The interpolation-grid accumulator this kind deposits into.
    pub fn source(self) -> SourceField {
        match self {
            Self::RhoPrev | Self::RhoNext => SourceField::Rho,
            Self::J => SourceField::J,
        }
    }

    /// The guard exchange performed after this deposition.
    pub fn exchange(self) -> ExchangeKind {
        match self {
            Self::RhoPrev | Self::RhoNext => ExchangeKind::Rho,
            Self::J => ExchangeKind::J,
        }
    }

    /// Canonical name (`rho_prev`, `rho_next`, `J`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RhoPrev => "rho_prev",
            Self::RhoNext => "rho_next",
            Self::J => "J",
        }
    }
}

impl fmt::Display for DepositKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositKind {
    type Err = DepositError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rho_prev" => Ok(Self::RhoPrev),
            "rho_next" => Ok(Self::RhoNext),
            "J" => Ok(Self::J),
            other => Err(DepositError::UnknownFieldKind {
                name: other.to_string(),
            }),
        }
    }
}

/// Source accumulator on the interpolation grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceField {
    /// Charge density `rho`.
    Rho,
    /// Current density `(Jr, Jt, Jz)`.
    J,
}

impl fmt::Display for SourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rho => f.write_str("rho"),
            Self::J => f.write_str("J"),
        }
    }
}

/// A field slot that can move between interpolation and spectral form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Electric field `(Er, Et, Ez)`.
    E,
    /// Magnetic field `(Br, Bt, Bz)`.
    B,
    /// Charge density, spectral slot at `t = n dt`.
    RhoPrev,
    /// Charge density, spectral slot at `t = (n+1) dt`.
    RhoNext,
    /// Current density.
    J,
}

impl From<DepositKind> for TransformKind {
    fn from(kind: DepositKind) -> Self {
        match kind {
            DepositKind::RhoPrev => Self::RhoPrev,
            DepositKind::RhoNext => Self::RhoNext,
            DepositKind::J => Self::J,
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::E => f.write_str("E"),
            Self::B => f.write_str("B"),
            Self::RhoPrev => f.write_str("rho_prev"),
            Self::RhoNext => f.write_str("rho_next"),
            Self::J => f.write_str("J"),
        }
    }
}

/// Which fields a guard-cell exchange moves between domains.
///
/// `EB` copies the neighbour's interior values into the local guard
/// cells. `Rho` and `J` sum the overlapping region on both sides, since
/// both domains deposit into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    /// Electric and magnetic fields.
    EB,
    /// Charge density.
    Rho,
    /// Current density.
    J,
}

impl ExchangeKind {
    /// Whether the exchange sums overlapping deposits instead of copying.
    pub fn is_additive(self) -> bool {
        matches!(self, Self::Rho | Self::J)
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EB => f.write_str("EB"),
            Self::Rho => f.write_str("rho"),
            Self::J => f.write_str("J"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_kinds() {
        assert_eq!("rho_prev".parse::<DepositKind>(), Ok(DepositKind::RhoPrev));
        assert_eq!("rho_next".parse::<DepositKind>(), Ok(DepositKind::RhoNext));
        assert_eq!("J".parse::<DepositKind>(), Ok(DepositKind::J));
    }

    #[test]
    fn parse_unknown_kind_is_rejected() {
        for name in ["rho", "j", "E", "", "rho_prev "] {
            match name.parse::<DepositKind>() {
                Err(DepositError::UnknownFieldKind { name: got }) => assert_eq!(got, name),
                other => panic!("expected UnknownFieldKind for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn names_round_trip() {
        for kind in DepositKind::ALL {
            assert_eq!(kind.as_str().parse::<DepositKind>(), Ok(kind));
            assert_eq!(kind.to_string(), TransformKind::from(kind).to_string());
        }
    }

    #[test]
    fn charge_kinds_share_accumulator() {
        assert_eq!(DepositKind::RhoPrev.source(), SourceField::Rho);
        assert_eq!(DepositKind::RhoNext.source(), SourceField::Rho);
        assert_eq!(DepositKind::J.source(), SourceField::J);
        assert_eq!(DepositKind::RhoNext.exchange(), ExchangeKind::Rho);
        assert_eq!(DepositKind::J.exchange(), ExchangeKind::J);
    }

    #[test]
    fn only_sources_are_additive() {
        assert!(!ExchangeKind::EB.is_additive());
        assert!(ExchangeKind::Rho.is_additive());
        assert!(ExchangeKind::J.is_additive());
    }
}
