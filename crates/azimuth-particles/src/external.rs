//! Analytic fields added to particles after gathering.

use std::fmt;
use std::sync::Arc;

use crate::arrays::GatheredField;
use crate::species::Species;

/// Space-time profile `f(x, y, z, t)`.
pub type FieldProfile = Arc<dyn Fn(f64, f64, f64, f64) -> f64 + Send + Sync>;

/// A perturbation applied to gathered fields at time `t`.
pub trait ExternalField: Send {
    /// Modify the gathered fields of `species` at time `t`.
    fn apply(&self, species: &mut dyn Species, t: f64);
}

/// `F += amplitude * f(x, y, z, t)` on one gathered component.
///
/// Constructed via [`ExternalFieldExpr::builder`].
#[derive(Clone)]
pub struct ExternalFieldExpr {
    component: GatheredField,
    amplitude: f64,
    profile: FieldProfile,
    species: Option<Vec<String>>,
}

impl fmt::Debug for ExternalFieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalFieldExpr")
            .field("component", &self.component)
            .field("amplitude", &self.amplitude)
            .field("species", &self.species)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ExternalFieldExpr`].
///
/// Required fields: `component`, `profile`.
pub struct ExternalFieldExprBuilder {
    component: Option<GatheredField>,
    amplitude: f64,
    profile: Option<FieldProfile>,
    species: Option<Vec<String>>,
}

impl ExternalFieldExpr {
    /// Create a builder; the amplitude defaults to 1.
    pub fn builder() -> ExternalFieldExprBuilder {
        ExternalFieldExprBuilder {
            component: None,
            amplitude: 1.0,
            profile: None,
            species: None,
        }
    }

    /// Whether this field acts on `name`.
    pub fn applies_to(&self, name: &str) -> bool {
        self.species
            .as_ref()
            .is_none_or(|names| names.iter().any(|n| n == name))
    }
}

impl ExternalFieldExprBuilder {
    /// Component to perturb.
    pub fn component(mut self, component: GatheredField) -> Self {
        self.component = Some(component);
        self
    }

    /// Peak value, in SI field units.
    pub fn amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// Dimensionless profile.
    pub fn profile(mut self, profile: impl Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        self.profile = Some(Arc::new(profile));
        self
    }

    /// Restrict the field to the named species (default: all).
    pub fn species<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.species = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Build the field.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `component` or `profile` is missing or the
    /// amplitude is not finite.
    pub fn build(self) -> Result<ExternalFieldExpr, String> {
        let component = self
            .component
            .ok_or_else(|| "component is required".to_string())?;
        let profile = self
            .profile
            .ok_or_else(|| "profile is required".to_string())?;
        if !self.amplitude.is_finite() {
            return Err(format!("amplitude must be finite, got {}", self.amplitude));
        }
        Ok(ExternalFieldExpr {
            component,
            amplitude: self.amplitude,
            profile,
            species: self.species,
        })
    }
}

impl ExternalField for ExternalFieldExpr {
    fn apply(&self, species: &mut dyn Species, t: f64) {
        if !self.applies_to(species.name()) {
            return;
        }
        let p = species.arrays_mut();
        let values: Vec<f64> = (0..p.len())
            .map(|i| self.amplitude * (self.profile)(p.x[i], p.y[i], p.z[i], t))
            .collect();
        for (f, v) in p.gathered_mut(self.component).iter_mut().zip(values) {
            *f += v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::{Particle, ParticleArrays};
    use crate::species::MacroParticles;
    use azimuth_core::ParticleShape;

    fn species(name: &str) -> MacroParticles {
        let mut a = ParticleArrays::new();
        for z in [0.0, 1.0, 2.0] {
            a.push(Particle {
                position: [0.0, 0.0, z],
                momentum: [0.0; 3],
                w: 1.0,
            });
        }
        MacroParticles::new(name, 1.0, 1.0, 1.0, a, ParticleShape::Linear)
    }

    #[test]
    fn builder_requires_component_and_profile() {
        assert!(ExternalFieldExpr::builder().build().is_err());
        assert!(ExternalFieldExpr::builder()
            .component(GatheredField::Ez)
            .build()
            .is_err());
        assert!(ExternalFieldExpr::builder()
            .component(GatheredField::Ez)
            .profile(|_, _, _, _| 1.0)
            .amplitude(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn adds_scaled_profile() {
        let field = ExternalFieldExpr::builder()
            .component(GatheredField::Ez)
            .amplitude(2.0)
            .profile(|_, _, z, t| z + t)
            .build()
            .unwrap();
        let mut s = species("electrons");
        field.apply(&mut s, 0.5);
        field.apply(&mut s, 0.5);
        assert_eq!(s.arrays().ez, vec![2.0, 6.0, 10.0]);
        assert!(s.arrays().bz.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn species_filter_skips_others() {
        let field = ExternalFieldExpr::builder()
            .component(GatheredField::Bx)
            .profile(|_, _, _, _| 1.0)
            .species(["ions"])
            .build()
            .unwrap();
        let mut e = species("electrons");
        let mut i = species("ions");
        field.apply(&mut e, 0.0);
        field.apply(&mut i, 0.0);
        assert!(e.arrays().bx.iter().all(|&v| v == 0.0));
        assert!(i.arrays().bx.iter().all(|&v| v == 1.0));
    }
}
