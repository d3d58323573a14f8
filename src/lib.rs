pub mod analysis;
pub mod catalog;
pub mod config;
pub mod error;
pub mod material;
pub mod math;
pub mod recorder;
pub mod scoring;
pub mod solid;
pub mod units;
pub mod volume;

pub use catalog::{ApertureStrategy, CatalogOptions, DetectorGeometry, GeometryCatalog};
pub use config::Config;
pub use error::{PinholeError, Result};
pub use recorder::{HitRecorder, RecorderStats, RunContext};
pub use scoring::{classify, EntryScorer, HitRecord, StepEvent};
