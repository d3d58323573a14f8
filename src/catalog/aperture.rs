use std::fmt;
use std::str::FromStr;

use crate::error::GeometryError;
use crate::math::rotation_x;
use crate::solid::{Solid, ZSection};
use crate::units::DEG;

/// Ratio of the knife-edge profile's face radius to its throat radius.
const KNIFE_EDGE_FLARE: f64 = 10.0;

/// Length of the carving solid along the window normal, in window half
/// thicknesses. Longer than the slab so the cut goes all the way through.
const CUTTER_HALF_LENGTH: f64 = 1.5;

/// How the pinhole is carved into the window slab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApertureStrategy {
    /// Slab minus a straight cylindrical bore.
    Subtractive,
    /// Slab intersected with a double cone narrowing to the pinhole radius
    /// at the window mid-plane.
    #[default]
    KnifeEdge,
}

impl ApertureStrategy {
    /// Carves the aperture into `slab`.
    ///
    /// The cutter is built along its local z axis and turned 90° about x so
    /// that it runs along the slab's y (thickness) axis.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if the cutter parameters are
    /// invalid or the result is empty.
    pub fn carve(
        self,
        slab: Solid,
        radius: f64,
        half_thickness: f64,
    ) -> Result<Solid, GeometryError> {
        let half_length = CUTTER_HALF_LENGTH * half_thickness;
        let turn = rotation_x(90.0 * DEG);
        match self {
            Self::Subtractive => {
                let bore = Solid::tube(0.0, radius, half_length)?;
                Solid::subtract(slab, bore, turn)
            }
            Self::KnifeEdge => {
                let flare = KNIFE_EDGE_FLARE * radius;
                let profile = Solid::polycone(vec![
                    ZSection::new(-half_length, flare),
                    ZSection::new(0.0, radius),
                    ZSection::new(half_length, flare),
                ])?;
                Solid::intersect(slab, profile, turn)
            }
        }
    }
}

impl FromStr for ApertureStrategy {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "subtractive" | "bore" => Ok(Self::Subtractive),
            "knife-edge" | "knife_edge" | "intersective" => Ok(Self::KnifeEdge),
            other => Err(GeometryError::MalformedSolid(format!(
                "unknown aperture strategy {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ApertureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtractive => f.write_str("subtractive"),
            Self::KnifeEdge => f.write_str("knife-edge"),
        }
    }
}
