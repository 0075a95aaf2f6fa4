//! The species contract and the reference macro-particle species.

use azimuth_core::{ParticleShape, Resident, SourceField, SpeciesError};
use azimuth_grid::InterpGrid;

use crate::arrays::ParticleArrays;
use crate::ionization::{Ionized, Ionizer};
use crate::loading::LoadingProfile;
use crate::push::{boris_push, halfpush_x};
use crate::shape::{ModalShapeKernel, ShapeKernel};

/// One macro-particle species as seen by the step loop.
pub trait Species: Resident + Send {
    /// Species name, used in logs and error messages.
    fn name(&self) -> &str;

    /// Charge of one physical particle, in coulombs.
    fn charge(&self) -> f64;

    /// Mass of one physical particle, in kilograms.
    fn mass(&self) -> f64;

    /// Phase-space arrays.
    fn arrays(&self) -> &ParticleArrays;

    /// Mutable phase-space arrays.
    fn arrays_mut(&mut self) -> &mut ParticleArrays;

    /// Whether the cached cell ordering is still valid.
    fn is_sorted(&self) -> bool;

    /// Mark the cached cell ordering valid or stale.
    fn set_sorted(&mut self, sorted: bool);

    /// Interpolate E and B onto every particle.
    fn gather(&mut self, grids: &[InterpGrid]) -> Result<(), SpeciesError>;

    /// Add this species' charge or current to `source` on every mode.
    fn deposit(&mut self, grids: &mut [InterpGrid], source: SourceField)
        -> Result<(), SpeciesError>;

    /// Advance momenta by one timestep using the gathered fields.
    fn push_p(&mut self) -> Result<(), SpeciesError>;

    /// Advance positions by half a timestep.
    fn halfpush_x(&mut self) -> Result<(), SpeciesError>;

    /// Run ionization, returning freshly created electrons and the name
    /// of the species they belong to.
    fn handle_ionization(&mut self) -> Result<Option<Ionized>, SpeciesError> {
        Ok(None)
    }

    /// Profile for re-loading this species into newly exposed cells.
    fn loading(&self) -> Option<&LoadingProfile> {
        None
    }
}

// ── MacroParticles ─────────────────────────────────────────────────

/// Host-resident species with B-spline shapes and a Boris pusher.
pub struct MacroParticles {
    name: String,
    q: f64,
    m: f64,
    dt: f64,
    arrays: ParticleArrays,
    sorted: bool,
    kernel: Box<dyn ShapeKernel>,
    ionizer: Option<Box<dyn Ionizer>>,
    loading: Option<LoadingProfile>,
}

impl MacroParticles {
    /// Species `name` with charge `q`, mass `m`, timestep `dt` and the
    /// reference kernel for `shape`.
    pub fn new(
        name: impl Into<String>,
        q: f64,
        m: f64,
        dt: f64,
        arrays: ParticleArrays,
        shape: ParticleShape,
    ) -> Self {
        Self {
            name: name.into(),
            q,
            m,
            dt,
            arrays,
            sorted: false,
            kernel: Box::new(ModalShapeKernel::new(shape)),
            ionizer: None,
            loading: None,
        }
    }

    /// Replace the gather/deposit kernel.
    pub fn with_kernel(mut self, kernel: Box<dyn ShapeKernel>) -> Self {
        self.kernel = kernel;
        self
    }

    /// Attach an ionization model.
    pub fn with_ionizer(mut self, ionizer: Box<dyn Ionizer>) -> Self {
        self.ionizer = Some(ionizer);
        self
    }

    /// Record how to re-load this species.
    pub fn with_loading(mut self, loading: LoadingProfile) -> Self {
        self.loading = Some(loading);
        self
    }

    /// Particle shape of the installed kernel.
    pub fn shape(&self) -> ParticleShape {
        self.kernel.shape()
    }

    fn checked(&self) -> Result<(), SpeciesError> {
        self.arrays.check_lengths()
    }
}

impl Resident for MacroParticles {}

impl Species for MacroParticles {
    fn name(&self) -> &str {
        &self.name
    }

    fn charge(&self) -> f64 {
        self.q
    }

    fn mass(&self) -> f64 {
        self.m
    }

    fn arrays(&self) -> &ParticleArrays {
        &self.arrays
    }

    fn arrays_mut(&mut self) -> &mut ParticleArrays {
        &mut self.arrays
    }

    fn is_sorted(&self) -> bool {
        self.sorted
    }

    fn set_sorted(&mut self, sorted: bool) {
        self.sorted = sorted;
    }

    fn gather(&mut self, grids: &[InterpGrid]) -> Result<(), SpeciesError> {
        self.checked()?;
        self.kernel.gather(&mut self.arrays, grids);
        Ok(())
    }

    fn deposit(
        &mut self,
        grids: &mut [InterpGrid],
        source: SourceField,
    ) -> Result<(), SpeciesError> {
        self.checked()?;
        self.kernel.deposit(&self.arrays, self.q, grids, source);
        Ok(())
    }

    fn push_p(&mut self) -> Result<(), SpeciesError> {
        self.checked()?;
        boris_push(&mut self.arrays, self.q, self.m, self.dt);
        Ok(())
    }

    fn halfpush_x(&mut self) -> Result<(), SpeciesError> {
        self.checked()?;
        halfpush_x(&mut self.arrays, self.dt);
        self.sorted = false;
        Ok(())
    }

    fn handle_ionization(&mut self) -> Result<Option<Ionized>, SpeciesError> {
        match self.ionizer.as_mut() {
            Some(ionizer) => ionizer.ionize(&mut self.arrays, self.dt).map(Some),
            None => Ok(None),
        }
    }

    fn loading(&self) -> Option<&LoadingProfile> {
        self.loading.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::Particle;
    use azimuth_core::constants::{E, M_E};

    struct Always;

    impl Ionizer for Always {
        fn target(&self) -> &str {
            "electrons"
        }

        fn ionize(
            &mut self,
            ions: &mut ParticleArrays,
            _dt: f64,
        ) -> Result<Ionized, SpeciesError> {
            let mut electrons = ParticleArrays::new();
            for i in 0..ions.len() {
                electrons.push(Particle {
                    position: [ions.x[i], ions.y[i], ions.z[i]],
                    momentum: [0.0; 3],
                    w: ions.w[i],
                });
            }
            Ok(Ionized {
                target: self.target().to_string(),
                electrons,
            })
        }
    }

    fn species() -> MacroParticles {
        let mut a = ParticleArrays::new();
        a.push(Particle {
            position: [0.5, 0.0, 1.0],
            momentum: [0.0, 0.0, 1.0],
            w: 1.0,
        });
        MacroParticles::new("electrons", -E, M_E, 1.0e-15, a, ParticleShape::Linear)
    }

    #[test]
    fn halfpush_invalidates_sort() {
        let mut s = species();
        s.set_sorted(true);
        s.halfpush_x().unwrap();
        assert!(!s.is_sorted());
        assert!(s.arrays().z[0] > 1.0);
    }

    #[test]
    fn ragged_arrays_fail_kernels() {
        let mut s = species();
        s.arrays_mut().w.clear();
        let err = s.push_p().unwrap_err();
        assert!(matches!(err, SpeciesError::LengthMismatch { .. }));
    }

    #[test]
    fn ionization_is_optional() {
        let mut s = species();
        assert!(s.handle_ionization().unwrap().is_none());
        let mut s = species().with_ionizer(Box::new(Always));
        let out = s.handle_ionization().unwrap().unwrap();
        assert_eq!(out.target, "electrons");
        assert_eq!(out.electrons.len(), 1);
    }
}
