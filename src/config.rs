//! Detector configuration.
//!
//! The configuration file holds exactly four whitespace-separated numbers:
//! pinhole radius (mm), window gap (mm), window thickness (µm) and foil
//! thickness (µm). The window gap is the distance between the detector and
//! window slab centres along the thickness axis.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::math::is_positive_length;
use crate::units::{MM, UM};

/// Field names in file order, with the unit each is written in.
const FIELDS: [(&str, f64); 4] = [
    ("pinhole_radius", MM),
    ("window_gap", MM),
    ("window_thickness", UM),
    ("foil_thickness", UM),
];

/// Immutable pinhole detector parameters, in internal length units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pinhole_radius: f64,
    window_gap: f64,
    window_thickness: f64,
    foil_thickness: f64,
}

impl Config {
    /// Creates a configuration from lengths in internal units.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositive`] if any length is not finite and
    /// positive.
    pub fn new(
        pinhole_radius: f64,
        window_gap: f64,
        window_thickness: f64,
        foil_thickness: f64,
    ) -> Result<Self, ConfigError> {
        let values = [pinhole_radius, window_gap, window_thickness, foil_thickness];
        for (&(field, _), value) in FIELDS.iter().zip(values) {
            if !is_positive_length(value) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(Self {
            pinhole_radius,
            window_gap,
            window_thickness,
            foil_thickness,
        })
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a parse
    /// error as described in [`Config::from_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        fs::read_to_string(path)?.parse()
    }

    /// Writes the configuration in file format, one value per line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_file_string())?;
        Ok(())
    }

    /// File representation, in file units.
    #[must_use]
    pub fn to_file_string(&self) -> String {
        self.values()
            .iter()
            .zip(FIELDS)
            .map(|(value, (_, unit))| format!("{}\n", value / unit))
            .collect()
    }

    fn values(&self) -> [f64; 4] {
        [
            self.pinhole_radius,
            self.window_gap,
            self.window_thickness,
            self.foil_thickness,
        ]
    }

    #[must_use]
    pub fn pinhole_radius(&self) -> f64 {
        self.pinhole_radius
    }

    /// Centre-to-centre distance between detector and window.
    #[must_use]
    pub fn window_gap(&self) -> f64 {
        self.window_gap
    }

    /// Half thickness of the window slab.
    #[must_use]
    pub fn window_thickness(&self) -> f64 {
        self.window_thickness
    }

    /// Half thickness of the foil slab.
    #[must_use]
    pub fn foil_thickness(&self) -> f64 {
        self.foil_thickness
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Parses the four-number file format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let mut values = [0.0; 4];
        for (slot, (field, unit)) in values.iter_mut().zip(FIELDS) {
            let token = tokens.next().ok_or(ConfigError::MissingField(field))?;
            let number: f64 = token.parse().map_err(|_| ConfigError::NotANumber {
                field,
                value: token.into(),
            })?;
            *slot = number * unit;
        }
        if let Some(extra) = tokens.next() {
            return Err(ConfigError::TrailingValue(extra.into()));
        }
        let [radius, gap, window, foil] = values;
        Self::new(radius, gap, window, foil)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pinhole radius: {} mm", self.pinhole_radius / MM)?;
        writeln!(f, "Gap between window and detector: {} mm", self.window_gap / MM)?;
        writeln!(f, "Window thickness: {} um", self.window_thickness / UM)?;
        write!(f, "Shielding foil thickness: {} um", self.foil_thickness / UM)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn parses_file_units() {
        let cfg: Config = "0.5\n5.0\n100\n10\n".parse().unwrap();
        assert_relative_eq!(cfg.pinhole_radius(), 0.5 * MM);
        assert_relative_eq!(cfg.window_gap(), 5.0 * MM);
        assert_relative_eq!(cfg.window_thickness(), 100.0 * UM);
        assert_relative_eq!(cfg.foil_thickness(), 10.0 * UM);
    }

    #[test]
    fn any_whitespace_separates_fields() {
        assert!("0.5 5.0\t100   10".parse::<Config>().is_ok());
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let err = "0.5 5.0 100".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("foil_thickness")));
    }

    #[test]
    fn non_numeric_field_fails() {
        let err = "0.5 five 100 10".parse::<Config>().unwrap_err();
        assert!(matches!(err, ConfigError::NotANumber { field: "window_gap", .. }));
    }

    #[test]
    fn trailing_value_fails() {
        assert!(matches!(
            "0.5 5.0 100 10 7".parse::<Config>(),
            Err(ConfigError::TrailingValue(_))
        ));
    }

    #[test]
    fn non_positive_field_fails() {
        assert!(matches!(
            "0.5 5.0 0 10".parse::<Config>(),
            Err(ConfigError::NonPositive { field: "window_thickness", .. })
        ));
        assert!("-0.5 5.0 100 10".parse::<Config>().is_err());
        assert!("NaN 5.0 100 10".parse::<Config>().is_err());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pinhole_config.txt");
        let cfg = Config::new(0.25 * MM, 4.0 * MM, 50.0 * UM, 5.0 * UM).unwrap();
        cfg.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_relative_eq!(loaded.pinhole_radius(), cfg.pinhole_radius());
        assert_relative_eq!(loaded.window_thickness(), cfg.window_thickness(), epsilon = 1e-15);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/pinhole_config.txt").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn summary_lists_every_field() {
        let cfg: Config = "0.5 5 100 10".parse().unwrap();
        let text = cfg.to_string();
        assert!(text.contains("Pinhole radius: 0.5 mm"));
        assert!(text.contains("Shielding foil thickness: 10 um"));
    }
}
