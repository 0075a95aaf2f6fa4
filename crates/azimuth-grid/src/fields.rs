//! The field contract driven by the step loop.

use azimuth_core::{FieldsError, Resident, SourceField, TransformKind};

use crate::interp::InterpGrid;
use crate::spectral::SpectralGrid;

/// Dual-representation field storage for all azimuthal modes.
///
/// Interpolation-side mutations (deposition, damping, window moves) and
/// spectral-side updates (push, filtering, corrections) are separated by
/// explicit transforms. Callers are responsible for transforming before
/// reading the other representation.
pub trait Fields: Resident + Send {
    /// Number of azimuthal modes.
    fn nm(&self) -> usize;

    /// Timestep the spectral coefficients were prepared for.
    fn dt(&self) -> f64;

    /// Interpolation grids, one per mode.
    fn interp(&self) -> &[InterpGrid];

    /// Mutable interpolation grids, one per mode.
    fn interp_mut(&mut self) -> &mut [InterpGrid];

    /// Zero a source accumulator on every mode.
    fn erase(&mut self, source: SourceField) {
        for grid in self.interp_mut() {
            grid.erase(source);
        }
    }

    /// Divide a source accumulator by the cell volumes on every mode.
    fn divide_by_volume(&mut self, source: SourceField) {
        for grid in self.interp_mut() {
            grid.divide_by_volume(source);
        }
    }

    /// Transform `kind` from the interpolation grids into the spectral
    /// grids.
    fn interp2spect(&mut self, kind: TransformKind) -> Result<(), FieldsError>;

    /// Transform `kind` from the spectral grids back onto the
    /// interpolation grids.
    fn spect2interp(&mut self, kind: TransformKind) -> Result<(), FieldsError>;

    /// Smooth `kind` in spectral space.
    fn filter_spect(&mut self, kind: TransformKind) -> Result<(), FieldsError>;

    /// Advance E and B by one timestep in spectral space.
    fn push(&mut self, use_true_rho: bool) -> Result<(), FieldsError>;

    /// Make the spectral current consistent with the two charge
    /// snapshots of the step.
    fn correct_currents(&mut self) -> Result<(), FieldsError>;

    /// Project E so that Gauss's law holds against `rho_next`.
    fn correct_div_e(&mut self) -> Result<(), FieldsError>;
}

/// Maxwell update acting on spectral grids.
///
/// Implementations own the discretised equations; the field container
/// only moves data between representations.
pub trait SpectralSolver: Send {
    /// Human-readable solver name, used in error messages.
    fn name(&self) -> &str;

    /// Advance E and B on every mode by `dt`.
    fn push(
        &mut self,
        grids: &mut [SpectralGrid],
        dt: f64,
        use_true_rho: bool,
    ) -> Result<(), FieldsError>;

    /// Correct J against `rho_prev` and `rho_next`.
    fn correct_currents(&mut self, grids: &mut [SpectralGrid], dt: f64)
        -> Result<(), FieldsError>;

    /// Correct E against `rho_next`.
    fn correct_div_e(&mut self, grids: &mut [SpectralGrid]) -> Result<(), FieldsError>;
}
