//! Unit constants.
//!
//! Lengths are stored in millimetres and energies in MeV. Multiply a
//! quantity by its unit to get an internal value; divide an internal value
//! by a unit to express it in that unit.

pub const MM: f64 = 1.0;
pub const CM: f64 = 10.0 * MM;
pub const M: f64 = 1000.0 * MM;
pub const UM: f64 = 1e-3 * MM;

pub const MEV: f64 = 1.0;
pub const KEV: f64 = 1e-3 * MEV;

pub const DEG: f64 = std::f64::consts::PI / 180.0;

/// Density unit, g/cm³.
pub const G_PER_CM3: f64 = 1.0;

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn micron_to_centimetre() {
        assert_relative_eq!(100.0 * UM / CM, 0.01);
        assert_relative_eq!(90.0 * DEG, std::f64::consts::FRAC_PI_2);
    }
}
