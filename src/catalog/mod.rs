//! Geometry catalog: builds the pinhole detector volume tree.
//!
//! The topology is fixed:
//!
//! ```text
//! World
//! └── Envelope
//!     ├── detector   doped-silicon slab at the origin
//!     ├── window     aluminium slab with a carved pinhole, at y = -gap
//!     └── foil       aluminium shield on the detector side of the window
//! ```
//!
//! All slabs are thin along y. Offsets along y are measured between slab
//! centres, so the foil face touches the window's detector-side face.

mod aperture;

pub use aperture::ApertureStrategy;

use tracing::info;

use crate::config::Config;
use crate::error::{GeometryError, Result};
use crate::material::{Element, MaterialDatabase, MaterialHandle, MaterialSpec};
use crate::math::{translation, Isometry3};
use crate::solid::Solid;
use crate::units::{CM, G_PER_CM3, MM};
use crate::volume::{VolumeId, VolumeTree};

pub const WORLD: &str = "World";
pub const ENVELOPE: &str = "Envelope";
pub const DETECTOR: &str = "detector";
pub const WINDOW: &str = "window";
pub const FOIL: &str = "foil";

/// Number of volumes in a built detector.
pub const VOLUME_COUNT: usize = 5;

/// Full envelope edge lengths.
const ENVELOPE_SIZE_XY: f64 = 20.0 * CM;
const ENVELOPE_SIZE_Z: f64 = 30.0 * CM;

/// World edge lengths relative to the envelope.
pub const WORLD_SCALE: f64 = 1.2;

const DETECTOR_HALF_X: f64 = 6.3 * CM;
const DETECTOR_HALF_THICKNESS: f64 = 1.0 * MM;
const DETECTOR_HALF_Z: f64 = 6.3 * CM;

const WINDOW_HALF_X: f64 = 6.3 * CM;
const WINDOW_HALF_Z: f64 = 6.3 * CM;

const FOIL_HALF_X: f64 = 1.0 * CM;
const FOIL_HALF_Z: f64 = 1.0 * CM;

/// Options controlling how the catalog builds the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    pub aperture: ApertureStrategy,
    /// Reject volumes that protrude from their parent or overlap a sibling.
    pub check_overlaps: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            aperture: ApertureStrategy::default(),
            check_overlaps: true,
        }
    }
}

/// Builds validated detector geometries.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometryCatalog {
    options: CatalogOptions,
}

/// A built detector: the volume tree plus the ids of its named volumes.
///
/// Read-only; share it across threads by reference or `Arc`.
#[derive(Debug)]
pub struct DetectorGeometry {
    tree: VolumeTree,
    world: VolumeId,
    envelope: VolumeId,
    detector: VolumeId,
    window: VolumeId,
    foil: VolumeId,
    aperture: ApertureStrategy,
}

impl GeometryCatalog {
    #[must_use]
    pub fn new(options: CatalogOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> CatalogOptions {
        self.options
    }

    /// Builds the detector for `config`, resolving materials in `materials`.
    ///
    /// # Errors
    ///
    /// * [`GeometryError::DegenerateGeometry`] if the window gap does not
    ///   exceed the window plus foil half thicknesses.
    /// * [`GeometryError::MalformedSolid`] if the pinhole does not fit in the
    ///   window or a solid violates its invariants.
    /// * [`GeometryError::Overlap`] if overlap checking is on and a volume
    ///   intersects a sibling or leaves its parent.
    /// * A material error if the database rejects a material.
    pub fn build(
        &self,
        config: &Config,
        materials: &mut dyn MaterialDatabase,
    ) -> Result<DetectorGeometry> {
        let gap = config.window_gap();
        let window_t = config.window_thickness();
        let foil_t = config.foil_thickness();
        let radius = config.pinhole_radius();

        if gap <= window_t + foil_t {
            return Err(GeometryError::DegenerateGeometry(format!(
                "window gap {gap} mm must exceed window thickness {window_t} mm plus foil thickness {foil_t} mm"
            ))
            .into());
        }
        let window_half_planar = WINDOW_HALF_X.min(WINDOW_HALF_Z);
        if radius >= window_half_planar {
            return Err(GeometryError::MalformedSolid(format!(
                "pinhole radius {radius} mm does not fit in a window of half width {window_half_planar} mm"
            ))
            .into());
        }

        let vacuum = materials.find_or_build(&vacuum())?;
        let silicon = materials.find_or_build(&doped_silicon())?;
        let aluminium = materials.find_or_build(&MaterialSpec::Named("G4_Al".into()))?;

        let check = self.options.check_overlaps;
        let mut tree = VolumeTree::new();

        let world = tree.set_root(
            WORLD,
            Solid::cuboid(
                0.5 * WORLD_SCALE * ENVELOPE_SIZE_XY,
                0.5 * WORLD_SCALE * ENVELOPE_SIZE_XY,
                0.5 * WORLD_SCALE * ENVELOPE_SIZE_Z,
            )?,
            vacuum,
        )?;
        let envelope = tree.place(
            world,
            ENVELOPE,
            Solid::cuboid(
                0.5 * ENVELOPE_SIZE_XY,
                0.5 * ENVELOPE_SIZE_XY,
                0.5 * ENVELOPE_SIZE_Z,
            )?,
            vacuum,
            Isometry3::identity(),
            check,
        )?;

        let detector = tree.place(
            envelope,
            DETECTOR,
            Solid::cuboid(DETECTOR_HALF_X, DETECTOR_HALF_THICKNESS, DETECTOR_HALF_Z)?,
            silicon,
            Isometry3::identity(),
            check,
        )?;

        let slab = Solid::cuboid(WINDOW_HALF_X, window_t, WINDOW_HALF_Z)?;
        let window_solid = self.options.aperture.carve(slab, radius, window_t)?;
        let window = tree.place(
            envelope,
            WINDOW,
            window_solid,
            aluminium,
            translation(0.0, -gap, 0.0),
            check,
        )?;

        let foil = tree.place(
            envelope,
            FOIL,
            Solid::cuboid(FOIL_HALF_X, foil_t, FOIL_HALF_Z)?,
            aluminium,
            translation(0.0, -(gap - window_t - foil_t), 0.0),
            check,
        )?;

        info!(
            aperture = %self.options.aperture,
            pinhole_radius_mm = radius / MM,
            window_gap_mm = gap / MM,
            volumes = tree.len(),
            "built pinhole detector geometry"
        );

        Ok(DetectorGeometry {
            tree,
            world,
            envelope,
            detector,
            window,
            foil,
            aperture: self.options.aperture,
        })
    }
}

impl DetectorGeometry {
    /// The volume tree, for the transport engine to navigate.
    #[must_use]
    pub fn tree(&self) -> &VolumeTree {
        &self.tree
    }

    #[must_use]
    pub fn world(&self) -> VolumeId {
        self.world
    }

    #[must_use]
    pub fn envelope(&self) -> VolumeId {
        self.envelope
    }

    /// The sensitive volume whose entries are scored.
    #[must_use]
    pub fn detector(&self) -> VolumeId {
        self.detector
    }

    #[must_use]
    pub fn window(&self) -> VolumeId {
        self.window
    }

    #[must_use]
    pub fn foil(&self) -> VolumeId {
        self.foil
    }

    #[must_use]
    pub fn aperture(&self) -> ApertureStrategy {
        self.aperture
    }

    /// Throat radius of the cutter that carved the pinhole.
    ///
    /// Read from the cutting solid's profile; the carved window's
    /// cross-section is not measured.
    #[must_use]
    pub fn aperture_radius(&self) -> Option<f64> {
        self.tree
            .volume(self.window)
            .ok()
            .and_then(|v| v.solid.aperture_radius())
    }

    /// Material of a named volume.
    #[must_use]
    pub fn material(&self, id: VolumeId) -> Option<MaterialHandle> {
        self.tree.volume(id).ok().map(|v| v.material)
    }
}

/// Near-perfect vacuum filling the world and envelope.
fn vacuum() -> MaterialSpec {
    MaterialSpec::Gas {
        name: "Vacuum".into(),
        z: 1.0,
        molar_mass: 1.01,
        density: 1.0e-25 * G_PER_CM3,
        temperature: 2.73,
        pressure: 3.0e-18,
    }
}

/// Boron-doped silicon for the sensitive volume.
fn doped_silicon() -> MaterialSpec {
    MaterialSpec::Compound {
        name: "DopedSilicon".into(),
        density: 5.8 * G_PER_CM3,
        components: vec![
            (Element::new("Silicon", "Si", 14.0, 28.0855), 0.999),
            (Element::new("Boron", "B", 5.0, 10.811), 0.001),
        ],
    }
}
