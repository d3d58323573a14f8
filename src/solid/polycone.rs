use crate::error::GeometryError;
use crate::math::is_positive_length;

/// One `(z, r)` corner of a polycone profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZSection {
    pub z: f64,
    pub r: f64,
}

impl ZSection {
    #[must_use]
    pub fn new(z: f64, r: f64) -> Self {
        Self { z, r }
    }
}

/// A full-turn solid of revolution about the local z axis.
///
/// The outer radius is linear between consecutive sections, so a
/// `[wide, narrow, wide]` profile produces a double cone (knife edge).
#[derive(Debug, Clone, PartialEq)]
pub struct Polycone {
    sections: Vec<ZSection>,
}

impl Polycone {
    /// Creates a polycone from sections ordered by increasing z.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if there are fewer than two
    /// sections, z is not strictly increasing, or any value is not finite or
    /// any radius is not positive.
    pub fn new(sections: Vec<ZSection>) -> Result<Self, GeometryError> {
        let polycone = Self { sections };
        polycone.validate()?;
        Ok(polycone)
    }

    pub(crate) fn validate(&self) -> Result<(), GeometryError> {
        if self.sections.len() < 2 {
            return Err(GeometryError::MalformedSolid(format!(
                "polycone needs at least 2 sections, got {}",
                self.sections.len()
            )));
        }
        for s in &self.sections {
            if !s.z.is_finite() || !is_positive_length(s.r) {
                return Err(GeometryError::MalformedSolid(format!(
                    "polycone section (z = {}, r = {}) is invalid",
                    s.z, s.r
                )));
            }
        }
        for pair in self.sections.windows(2) {
            if pair[1].z <= pair[0].z {
                return Err(GeometryError::MalformedSolid(format!(
                    "polycone sections not strictly ordered in z: {} then {}",
                    pair[0].z, pair[1].z
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn sections(&self) -> &[ZSection] {
        &self.sections
    }

    /// Lowest and highest z of the profile.
    #[must_use]
    pub fn z_range(&self) -> (f64, f64) {
        let first = self.sections.first().map_or(0.0, |s| s.z);
        let last = self.sections.last().map_or(0.0, |s| s.z);
        (first, last)
    }

    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.sections.iter().map(|s| s.r).fold(0.0, f64::max)
    }

    /// Radius of the narrowest cross-section.
    #[must_use]
    pub fn min_radius(&self) -> f64 {
        self.sections.iter().map(|s| s.r).fold(f64::INFINITY, f64::min)
    }

    /// Outer radius at height `z`, or `None` outside the z range.
    #[must_use]
    pub fn radius_at(&self, z: f64) -> Option<f64> {
        self.sections.windows(2).find_map(|pair| {
            let (a, b) = (pair[0], pair[1]);
            if z < a.z || z > b.z {
                return None;
            }
            let t = (z - a.z) / (b.z - a.z);
            Some(a.r + t * (b.r - a.r))
        })
    }
}
