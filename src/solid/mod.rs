//! Constructive solid geometry.
//!
//! A [`Solid`] is an owned tree: primitives at the leaves and boolean nodes
//! that own both operands. Construction goes through the checked
//! constructors; [`Solid::validate`] re-checks a tree built by hand.

mod classify;
mod polycone;

pub use classify::PointClassification;
pub use polycone::{Polycone, ZSection};

use crate::error::GeometryError;
use crate::math::{is_positive_length, Aabb, Isometry3, Point3, Vector3, TOLERANCE};

/// Boolean operation applied by a [`Solid::Boolean`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Region inside both operands.
    Intersect,
    /// Region inside the left operand and outside the right one.
    Subtract,
}

/// A shape description in its own local frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// Rectangular box centred on the origin.
    Cuboid { half_x: f64, half_y: f64, half_z: f64 },
    /// Cylindrical shell about the z axis. `inner_radius` may be zero.
    Tube {
        inner_radius: f64,
        outer_radius: f64,
        half_length: f64,
    },
    /// Solid of revolution about the z axis with a piecewise-linear profile.
    Polycone(Polycone),
    /// Boolean combination. `right_transform` places the right operand in
    /// the left operand's frame.
    Boolean {
        op: BooleanOp,
        left: Box<Solid>,
        right: Box<Solid>,
        right_transform: Isometry3,
    },
}

/// Samples per axis when sampling a region of a boolean result.
const EMPTINESS_SAMPLES: usize = 9;

impl Solid {
    /// Creates a box from half extents.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if any half extent is not
    /// finite and positive.
    pub fn cuboid(half_x: f64, half_y: f64, half_z: f64) -> Result<Self, GeometryError> {
        let solid = Self::Cuboid {
            half_x,
            half_y,
            half_z,
        };
        solid.validate()?;
        Ok(solid)
    }

    /// Creates a tube about the z axis.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if the outer radius or half
    /// length is not positive, or the inner radius is negative or not below
    /// the outer radius.
    pub fn tube(
        inner_radius: f64,
        outer_radius: f64,
        half_length: f64,
    ) -> Result<Self, GeometryError> {
        let solid = Self::Tube {
            inner_radius,
            outer_radius,
            half_length,
        };
        solid.validate()?;
        Ok(solid)
    }

    /// Creates a polycone from `(z, r)` sections.
    ///
    /// # Errors
    ///
    /// See [`Polycone::new`].
    pub fn polycone(sections: Vec<ZSection>) -> Result<Self, GeometryError> {
        Polycone::new(sections).map(Self::Polycone)
    }

    /// Intersection of `left` with `right` placed by `right_transform`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if either operand is invalid
    /// or the result is empty.
    pub fn intersect(
        left: Solid,
        right: Solid,
        right_transform: Isometry3,
    ) -> Result<Self, GeometryError> {
        Self::boolean(BooleanOp::Intersect, left, right, right_transform)
    }

    /// `left` minus `right` placed by `right_transform`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] if either operand is invalid
    /// or nothing of `left` remains.
    pub fn subtract(
        left: Solid,
        right: Solid,
        right_transform: Isometry3,
    ) -> Result<Self, GeometryError> {
        Self::boolean(BooleanOp::Subtract, left, right, right_transform)
    }

    fn boolean(
        op: BooleanOp,
        left: Solid,
        right: Solid,
        right_transform: Isometry3,
    ) -> Result<Self, GeometryError> {
        let solid = Self::Boolean {
            op,
            left: Box::new(left),
            right: Box::new(right),
            right_transform,
        };
        solid.validate()?;
        Ok(solid)
    }

    /// Checks every shape invariant in the tree.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MalformedSolid`] describing the first
    /// violation found.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Self::Cuboid {
                half_x,
                half_y,
                half_z,
            } => {
                if [half_x, half_y, half_z]
                    .iter()
                    .all(|v| is_positive_length(**v))
                {
                    Ok(())
                } else {
                    Err(GeometryError::MalformedSolid(format!(
                        "box half extents ({half_x}, {half_y}, {half_z}) must be positive"
                    )))
                }
            }
            Self::Tube {
                inner_radius,
                outer_radius,
                half_length,
            } => {
                let inner_ok = inner_radius.is_finite() && *inner_radius >= 0.0;
                if inner_ok
                    && is_positive_length(*outer_radius)
                    && is_positive_length(*half_length)
                    && inner_radius < outer_radius
                {
                    Ok(())
                } else {
                    Err(GeometryError::MalformedSolid(format!(
                        "tube (inner {inner_radius}, outer {outer_radius}, half length {half_length}) is invalid"
                    )))
                }
            }
            Self::Polycone(polycone) => polycone.validate(),
            Self::Boolean {
                op, left, right, ..
            } => {
                left.validate()?;
                right.validate()?;
                if self.is_empty() {
                    return Err(GeometryError::MalformedSolid(format!(
                        "{op:?} result is empty"
                    )));
                }
                Ok(())
            }
        }
    }

    /// Local-frame bounding box, or `None` if the solid is provably empty.
    ///
    /// Boolean results are bounded conservatively.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Aabb> {
        match self {
            Self::Cuboid {
                half_x,
                half_y,
                half_z,
            } => Some(Aabb::from_half_extents(Vector3::new(*half_x, *half_y, *half_z))),
            Self::Tube {
                outer_radius,
                half_length,
                ..
            } => Some(Aabb::from_half_extents(Vector3::new(
                *outer_radius,
                *outer_radius,
                *half_length,
            ))),
            Self::Polycone(p) => {
                let (z0, z1) = p.z_range();
                let r = p.max_radius();
                Some(Aabb::new(
                    Point3::new(-r, -r, z0),
                    Point3::new(r, r, z1),
                ))
            }
            Self::Boolean {
                op: BooleanOp::Intersect,
                left,
                right,
                right_transform,
            } => {
                let l = left.bounding_box()?;
                let r = right.bounding_box()?.transformed(right_transform);
                l.intersection(&r)
            }
            Self::Boolean {
                op: BooleanOp::Subtract,
                left,
                ..
            } => left.bounding_box(),
        }
    }

    /// Throat radius of the carving operand.
    ///
    /// For a boolean node this is the right operand's value; for a tube its
    /// outer radius; for a polycone its minimum section radius. Cuboids have
    /// none. The carved result itself is not measured.
    #[must_use]
    pub fn aperture_radius(&self) -> Option<f64> {
        match self {
            Self::Cuboid { .. } => None,
            Self::Tube { outer_radius, .. } => Some(*outer_radius),
            Self::Polycone(p) => Some(p.min_radius()),
            Self::Boolean { right, .. } => right.aperture_radius(),
        }
    }

    /// Returns `true` if no interior point of the solid can be found.
    ///
    /// The bounding box is sampled, and for a subtraction so is every slab of
    /// the left operand's box that lies outside the cutter's box, so a thin
    /// remainder where the cutter stops short is still found.
    fn is_empty(&self) -> bool {
        let Some(bounds) = self.bounding_box() else {
            return true;
        };
        let mut regions = vec![bounds];
        if let Self::Boolean {
            op: BooleanOp::Subtract,
            left,
            right,
            right_transform,
        } = self
        {
            if let (Some(l), Some(r)) = (left.bounding_box(), right.bounding_box()) {
                regions.extend(l.slabs_outside(&r.transformed(right_transform)));
            }
        }
        !regions.iter().any(|region| self.has_interior_sample(region))
    }

    /// Samples the centres of a regular grid of cells over `region`.
    fn has_interior_sample(&self, region: &Aabb) -> bool {
        if region.extents().iter().any(|e| *e <= TOLERANCE) {
            return false;
        }
        #[allow(clippy::cast_precision_loss)]
        let at = |i: usize, lo: f64, hi: f64| {
            lo + (hi - lo) * (i as f64 + 0.5) / EMPTINESS_SAMPLES as f64
        };
        (0..EMPTINESS_SAMPLES).any(|i| {
            (0..EMPTINESS_SAMPLES).any(|j| {
                (0..EMPTINESS_SAMPLES).any(|k| {
                    let p = Point3::new(
                        at(i, region.min.x, region.max.x),
                        at(j, region.min.y, region.max.y),
                        at(k, region.min.z, region.max.z),
                    );
                    self.classify_point(&p) == PointClassification::Inside
                })
            })
        })
    }
}
