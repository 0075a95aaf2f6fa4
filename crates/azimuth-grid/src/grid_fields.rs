//! Reference [`Fields`] container.

use azimuth_core::{FieldsError, Resident, TransformKind};

use crate::error::GridError;
use crate::fields::{Fields, SpectralSolver};
use crate::interp::InterpGrid;
use crate::spectral::{SpectralGrid, SpectralSlot, ZTransform};
use crate::Complex64;

/// Host-resident fields for `nm` modes with a pluggable spectral solver.
pub struct GridFields {
    dt: f64,
    interp: Vec<InterpGrid>,
    spect: Vec<SpectralGrid>,
    transform: ZTransform,
    solver: Box<dyn SpectralSolver>,
    scratch: Vec<Complex64>,
}

impl GridFields {
    /// Build zero-filled grids covering `[zmin, zmax] x [0, rmax]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nz: usize,
        zmin: f64,
        zmax: f64,
        nr: usize,
        rmax: f64,
        nm: usize,
        dt: f64,
        solver: Box<dyn SpectralSolver>,
    ) -> Result<Self, GridError> {
        if nm == 0 {
            return Err(GridError::NoModes);
        }
        let interp = (0..nm)
            .map(|m| InterpGrid::new(m, nz, zmin, zmax, nr, rmax))
            .collect::<Result<Vec<_>, _>>()?;
        let spect = interp.iter().map(SpectralGrid::matching).collect();
        Ok(Self {
            dt,
            interp,
            spect,
            transform: ZTransform::new(nz),
            solver,
            scratch: vec![Complex64::new(0.0, 0.0); nz * nr],
        })
    }

    /// Spectral grids, one per mode.
    pub fn spect(&self) -> &[SpectralGrid] {
        &self.spect
    }

    /// Mutable spectral grids, one per mode.
    pub fn spect_mut(&mut self) -> &mut [SpectralGrid] {
        &mut self.spect
    }

    /// Name of the installed solver.
    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    fn check_shapes(&self) -> Result<(), FieldsError> {
        for (i, s) in self.interp.iter().zip(&self.spect) {
            if i.nz() != s.nz() || i.nr() != s.nr() {
                return Err(FieldsError::ShapeMismatch {
                    reason: format!(
                        "mode {}: interp {}x{} vs spectral {}x{}",
                        i.m(),
                        i.nz(),
                        i.nr(),
                        s.nz(),
                        s.nr()
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Resident for GridFields {}

impl Fields for GridFields {
    fn nm(&self) -> usize {
        self.interp.len()
    }

    fn dt(&self) -> f64 {
        self.dt
    }

    fn interp(&self) -> &[InterpGrid] {
        &self.interp
    }

    fn interp_mut(&mut self) -> &mut [InterpGrid] {
        &mut self.interp
    }

    fn interp2spect(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        self.check_shapes()?;
        for (i, s) in self.interp.iter().zip(self.spect.iter_mut()) {
            for &(component, slot) in SpectralSlot::pairs(kind) {
                self.transform
                    .forward(i.component(component), s.slot_mut(slot), i.nr());
            }
        }
        Ok(())
    }

    fn spect2interp(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        self.check_shapes()?;
        for (i, s) in self.interp.iter_mut().zip(self.spect.iter()) {
            let nr = i.nr();
            for &(component, slot) in SpectralSlot::pairs(kind) {
                self.transform.inverse(s.slot(slot), &mut self.scratch, nr);
                i.component_mut(component).copy_from_slice(&self.scratch);
            }
        }
        Ok(())
    }

    fn filter_spect(&mut self, kind: TransformKind) -> Result<(), FieldsError> {
        for s in &mut self.spect {
            s.filter(kind);
        }
        Ok(())
    }

    fn push(&mut self, use_true_rho: bool) -> Result<(), FieldsError> {
        self.solver.push(&mut self.spect, self.dt, use_true_rho)
    }

    fn correct_currents(&mut self) -> Result<(), FieldsError> {
        self.solver.correct_currents(&mut self.spect, self.dt)
    }

    fn correct_div_e(&mut self) -> Result<(), FieldsError> {
        self.solver.correct_div_e(&mut self.spect)
    }
}
