//! Material references.
//!
//! The geometry only carries opaque [`MaterialHandle`]s. Densities and
//! compositions live in an external [`MaterialDatabase`]; this crate never
//! computes physics from them.

use std::collections::HashMap;

use tracing::debug;

use crate::error::MaterialError;
use crate::math::is_positive_length;

/// Opaque reference to a material owned by a [`MaterialDatabase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

impl MaterialHandle {
    /// Creates a handle from a database-specific index.
    #[must_use]
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// A chemical element given by symbol, atomic number and molar mass (g/mol).
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub symbol: String,
    pub z: f64,
    pub molar_mass: f64,
}

impl Element {
    #[must_use]
    pub fn new(name: &str, symbol: &str, z: f64, molar_mass: f64) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            z,
            molar_mass,
        }
    }
}

/// Request for a material, by catalogue name or by composition.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSpec {
    /// A predefined material known to the database, e.g. `G4_Al`.
    Named(String),
    /// A mixture of elements by mass fraction at a given density (g/cm³).
    Compound {
        name: String,
        density: f64,
        components: Vec<(Element, f64)>,
    },
    /// A single-element low-density gas, used for vacuum.
    Gas {
        name: String,
        z: f64,
        molar_mass: f64,
        density: f64,
        temperature: f64,
        pressure: f64,
    },
}

impl MaterialSpec {
    /// Name the material is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) | Self::Compound { name, .. } | Self::Gas { name, .. } => name.as_str(),
        }
    }
}

/// Lookup service resolving material requests into handles.
pub trait MaterialDatabase {
    /// Returns the handle for `spec`, defining it first if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the definition is invalid.
    fn find_or_build(&mut self, spec: &MaterialSpec) -> Result<MaterialHandle, MaterialError>;
}

/// In-memory [`MaterialDatabase`] with a fixed set of predefined names.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    predefined: Vec<String>,
    by_name: HashMap<String, MaterialHandle>,
    specs: Vec<MaterialSpec>,
}

/// Tolerance on the sum of compound mass fractions.
const FRACTION_TOLERANCE: f64 = 1e-6;

impl MaterialRegistry {
    /// Creates a registry that knows the given predefined material names.
    #[must_use]
    pub fn with_predefined<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            predefined: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns the definition behind a handle.
    #[must_use]
    pub fn spec(&self, handle: MaterialHandle) -> Option<&MaterialSpec> {
        self.specs.get(handle.0 as usize)
    }

    /// Number of materials defined so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    fn check(&self, spec: &MaterialSpec) -> Result<(), MaterialError> {
        let invalid = |reason: String| MaterialError::InvalidDefinition {
            name: spec.name().into(),
            reason,
        };
        match spec {
            MaterialSpec::Named(name) => {
                if self.predefined.iter().any(|n| n == name) {
                    Ok(())
                } else {
                    Err(MaterialError::Unknown(name.clone()))
                }
            }
            MaterialSpec::Compound {
                density,
                components,
                ..
            } => {
                if !is_positive_length(*density) {
                    return Err(invalid(format!("density {density} must be positive")));
                }
                if components.is_empty() {
                    return Err(invalid("no components".into()));
                }
                if components.iter().any(|(_, f)| !(*f > 0.0 && *f <= 1.0)) {
                    return Err(invalid("mass fractions must lie in (0, 1]".into()));
                }
                let total: f64 = components.iter().map(|(_, f)| f).sum();
                if (total - 1.0).abs() > FRACTION_TOLERANCE {
                    return Err(invalid(format!("mass fractions sum to {total}")));
                }
                Ok(())
            }
            MaterialSpec::Gas {
                density,
                molar_mass,
                ..
            } => {
                if is_positive_length(*density) && is_positive_length(*molar_mass) {
                    Ok(())
                } else {
                    Err(invalid("gas density and molar mass must be positive".into()))
                }
            }
        }
    }
}

impl MaterialDatabase for MaterialRegistry {
    fn find_or_build(&mut self, spec: &MaterialSpec) -> Result<MaterialHandle, MaterialError> {
        if let Some(handle) = self.by_name.get(spec.name()) {
            return Ok(*handle);
        }
        self.check(spec)?;
        let raw = u32::try_from(self.specs.len()).map_err(|_| MaterialError::InvalidDefinition {
            name: spec.name().into(),
            reason: "registry is full".into(),
        })?;
        let handle = MaterialHandle(raw);
        debug!(material = spec.name(), handle = raw, "defined material");
        self.by_name.insert(spec.name().to_owned(), handle);
        self.specs.push(spec.clone());
        Ok(handle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn doped_silicon(boron: f64) -> MaterialSpec {
        MaterialSpec::Compound {
            name: "DopedSilicon".into(),
            density: 5.8,
            components: vec![
                (Element::new("Silicon", "Si", 14.0, 28.0855), 1.0 - boron),
                (Element::new("Boron", "B", 5.0, 10.811), boron),
            ],
        }
    }

    #[test]
    fn same_name_resolves_to_same_handle() {
        let mut db = MaterialRegistry::with_predefined(["G4_Al"]);
        let a = db.find_or_build(&MaterialSpec::Named("G4_Al".into())).unwrap();
        let b = db.find_or_build(&MaterialSpec::Named("G4_Al".into())).unwrap();
        assert_eq!(a, b);
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn unknown_predefined_name_fails() {
        let mut db = MaterialRegistry::default();
        let err = db.find_or_build(&MaterialSpec::Named("G4_Unobtainium".into())).unwrap_err();
        assert!(matches!(err, MaterialError::Unknown(_)));
    }

    #[test]
    fn compound_fractions_must_sum_to_one() {
        let mut db = MaterialRegistry::default();
        assert!(db.find_or_build(&doped_silicon(0.001)).is_ok());

        let mut bad = MaterialRegistry::default();
        let spec = MaterialSpec::Compound {
            name: "Half".into(),
            density: 1.0,
            components: vec![(Element::new("Silicon", "Si", 14.0, 28.0855), 0.5)],
        };
        assert!(matches!(
            bad.find_or_build(&spec),
            Err(MaterialError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn handle_maps_back_to_its_definition() {
        let mut db = MaterialRegistry::default();
        let h = db.find_or_build(&doped_silicon(0.001)).unwrap();
        assert_eq!(db.spec(h).unwrap().name(), "DopedSilicon");
    }
}
