use crate::math::{Point3, TOLERANCE};

use super::{BooleanOp, Solid};

/// Classification of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Classifies a signed clearance: positive means inside with that margin.
fn from_clearance(clearance: f64) -> PointClassification {
    if clearance > TOLERANCE {
        PointClassification::Inside
    } else if clearance < -TOLERANCE {
        PointClassification::Outside
    } else {
        PointClassification::OnBoundary
    }
}

impl Solid {
    /// Classifies a point given in the solid's local frame.
    #[must_use]
    pub fn classify_point(&self, point: &Point3) -> PointClassification {
        use PointClassification::{Inside, OnBoundary, Outside};

        match self {
            Self::Cuboid {
                half_x,
                half_y,
                half_z,
            } => {
                let clearance = (half_x - point.x.abs())
                    .min(half_y - point.y.abs())
                    .min(half_z - point.z.abs());
                from_clearance(clearance)
            }
            Self::Tube {
                inner_radius,
                outer_radius,
                half_length,
            } => {
                let rho = point.x.hypot(point.y);
                let mut clearance = (outer_radius - rho).min(half_length - point.z.abs());
                if *inner_radius > 0.0 {
                    clearance = clearance.min(rho - inner_radius);
                }
                from_clearance(clearance)
            }
            Self::Polycone(polycone) => {
                let (z0, z1) = polycone.z_range();
                let axial = (point.z - z0).min(z1 - point.z);
                let clamped = point.z.clamp(z0, z1);
                let radius = polycone.radius_at(clamped).unwrap_or(0.0);
                let radial = radius - point.x.hypot(point.y);
                from_clearance(axial.min(radial))
            }
            Self::Boolean {
                op,
                left,
                right,
                right_transform,
            } => {
                let l = left.classify_point(point);
                let r = right.classify_point(&right_transform.inverse_transform_point(point));
                match (op, l, r) {
                    (BooleanOp::Intersect, Inside, Inside) => Inside,
                    (BooleanOp::Intersect, Outside, _) | (BooleanOp::Intersect, _, Outside) => {
                        Outside
                    }
                    (BooleanOp::Subtract, Inside, Outside) => Inside,
                    (BooleanOp::Subtract, Outside, _) | (BooleanOp::Subtract, _, Inside) => {
                        Outside
                    }
                    _ => OnBoundary,
                }
            }
        }
    }

    /// Returns `true` if the point is inside or on the boundary.
    #[must_use]
    pub fn contains(&self, point: &Point3) -> bool {
        self.classify_point(point) != PointClassification::Outside
    }
}
