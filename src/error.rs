use thiserror::Error;

/// Top-level error type for the pinhole detector crate.
#[derive(Debug, Error)]
pub enum PinholeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Recording(#[from] RecordingError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Errors raised while reading or validating the detector configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration field: {0}")]
    MissingField(&'static str),

    #[error("configuration field {field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("configuration field {field} = {value} must be finite and positive")]
    NonPositive { field: &'static str, value: f64 },

    #[error("unexpected trailing configuration value: {0:?}")]
    TrailingValue(String),

    #[error("cannot access configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to solid construction and volume placement.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("volume {volume} overlaps {other}")]
    Overlap { volume: String, other: String },

    #[error("malformed solid: {0}")]
    MalformedSolid(String),

    #[error("volume not found: {0}")]
    VolumeNotFound(String),
}

/// Errors returned by a material database.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("unknown material: {0}")]
    Unknown(String),

    #[error("invalid material definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

/// Errors related to the hit sink lifecycle.
#[derive(Debug, Error)]
pub enum RecordingError {
    #[error("hit sink is already open at {0}")]
    AlreadyOpen(String),

    #[error("hit sink is not open")]
    NotOpen,

    #[error("hit sink I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while post-processing recorded hits.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no hits to analyse")]
    NoHits,

    #[error("non-positive gap {0}")]
    InvalidGap(f64),

    #[error("cannot read hit file: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for results using [`PinholeError`].
pub type Result<T> = std::result::Result<T, PinholeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_message_names_both_volumes() {
        let err: PinholeError = GeometryError::Overlap {
            volume: "window".into(),
            other: "detector".into(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("window"));
        assert!(msg.contains("detector"));
    }

    #[test]
    fn config_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PinholeError = ConfigError::from(io).into();
        assert!(matches!(err, PinholeError::Config(ConfigError::Io(_))));
    }
}
