mod aabb;

pub use aabb::Aabb;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Rigid placement (rotation followed by translation).
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons, in millimetres.
pub const TOLERANCE: f64 = 1e-9;

/// Returns `true` if `value` is finite and strictly positive.
#[must_use]
pub fn is_positive_length(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Rotation of `angle` radians about the x axis, without translation.
#[must_use]
pub fn rotation_x(angle: f64) -> Isometry3 {
    Isometry3::rotation(Vector3::x() * angle)
}

/// Pure translation.
#[must_use]
pub fn translation(x: f64, y: f64, z: f64) -> Isometry3 {
    Isometry3::translation(x, y, z)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn quarter_turn_about_x_maps_z_onto_minus_y() {
        let iso = rotation_x(FRAC_PI_2);
        let p = iso * Point3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(p, Point3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn positive_length_rejects_nan_and_zero() {
        assert!(is_positive_length(1e-6));
        assert!(!is_positive_length(0.0));
        assert!(!is_positive_length(f64::NAN));
        assert!(!is_positive_length(f64::INFINITY));
    }
}
