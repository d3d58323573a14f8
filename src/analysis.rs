//! Post-run analysis of recorded hits.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::AnalysisError;
use crate::math::is_positive_length;
use crate::scoring::HitRecord;
use crate::units::{CM, DEG, MEV};

/// Hits read back from a sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitTable {
    pub hits: Vec<HitRecord>,
    /// Non-blank lines that did not parse as `x,z,energy`.
    pub skipped: usize,
}

/// Reads a hit file written by the recorder.
///
/// Blank lines are ignored. Malformed lines (wrong field count or a
/// non-numeric field) are skipped and counted.
///
/// # Errors
///
/// Returns [`AnalysisError::Io`] if the file cannot be read.
pub fn read_hits<P: AsRef<Path>>(path: P) -> Result<HitTable, AnalysisError> {
    let text = fs::read_to_string(path)?;
    Ok(parse_hits(&text))
}

/// Parses hit lines; see [`read_hits`].
#[must_use]
pub fn parse_hits(text: &str) -> HitTable {
    let mut table = HitTable::default();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(hit) = parse_line(line) {
            table.hits.push(hit);
        } else {
            debug!(line = index + 1, "skipping malformed hit line");
            table.skipped += 1;
        }
    }
    table
}

fn parse_line(line: &str) -> Option<HitRecord> {
    let mut fields = line.split(',').map(|f| f.trim().parse::<f64>());
    let x = fields.next()?.ok()?;
    let z = fields.next()?.ok()?;
    let energy = fields.next()?.ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(HitRecord {
        x: x * CM,
        z: z * CM,
        kinetic_energy: energy * MEV,
    })
}

/// Incidence angles `(theta, phi)` in degrees of a hit seen through a
/// pinhole `gap` in front of the detector plane.
///
/// `theta` is measured in the y–z plane and `phi` in the x–y plane.
#[must_use]
pub fn incidence_angles(hit: &HitRecord, gap: f64) -> (f64, f64) {
    (hit.z.atan2(gap) / DEG, hit.x.atan2(gap) / DEG)
}

/// Mean, population standard deviation and median of a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
}

impl SampleStats {
    /// Returns `None` for an empty sample.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            0.5 * (sorted[mid - 1] + sorted[mid])
        } else {
            sorted[mid]
        };

        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            median,
        })
    }
}

/// Angular distribution of a set of hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSummary {
    pub count: usize,
    pub theta: SampleStats,
    pub phi: SampleStats,
}

impl AngleSummary {
    /// Summarises the incidence angles of `hits` for a pinhole at `gap`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoHits`] for an empty slice and
    /// [`AnalysisError::InvalidGap`] for a non-positive gap.
    pub fn from_hits(hits: &[HitRecord], gap: f64) -> Result<Self, AnalysisError> {
        if !is_positive_length(gap) {
            return Err(AnalysisError::InvalidGap(gap));
        }
        let (theta, phi): (Vec<f64>, Vec<f64>) =
            hits.iter().map(|h| incidence_angles(h, gap)).unzip();
        let theta = SampleStats::from_values(&theta).ok_or(AnalysisError::NoHits)?;
        let phi = SampleStats::from_values(&phi).ok_or(AnalysisError::NoHits)?;
        Ok(Self {
            count: hits.len(),
            theta,
            phi,
        })
    }
}
