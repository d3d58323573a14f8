mod data;

pub use data::{VolumeData, VolumeId};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::GeometryError;
use crate::material::MaterialHandle;
use crate::math::{Aabb, Isometry3, Point3};
use crate::solid::Solid;

/// Arena holding the placed-volume hierarchy.
///
/// Volumes reference their parent and children via [`VolumeId`]s
/// (generational indices), so the tree has no self-referential ownership.
/// Once built, the tree is only read; it is `Send + Sync` and can be shared
/// across worker threads without locking.
#[derive(Debug, Default)]
pub struct VolumeTree {
    volumes: SlotMap<VolumeId, VolumeData>,
    root: Option<VolumeId>,
}

impl VolumeTree {
    /// Creates a new, empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the root (world) volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree already has a root or the solid is
    /// malformed.
    pub fn set_root(
        &mut self,
        name: &str,
        solid: Solid,
        material: MaterialHandle,
    ) -> Result<VolumeId, GeometryError> {
        if let Some(root) = self.root {
            return Err(GeometryError::DegenerateGeometry(format!(
                "tree already has root {}",
                self.volumes[root].name
            )));
        }
        solid.validate()?;
        let id = self.volumes.insert(VolumeData {
            name: name.into(),
            solid,
            material,
            placement: Isometry3::identity(),
            parent: None,
            children: Vec::new(),
        });
        self.root = Some(id);
        debug!(volume = name, "placed root volume");
        Ok(id)
    }

    /// Places a new volume inside `parent`.
    ///
    /// With `check_overlaps` set, the new volume's bounding box (in the
    /// parent frame) must lie inside the parent and must not overlap any
    /// existing sibling. Touching faces are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::VolumeNotFound`] for an unknown parent,
    /// [`GeometryError::DegenerateGeometry`] for a duplicate name,
    /// [`GeometryError::MalformedSolid`] for an invalid solid and
    /// [`GeometryError::Overlap`] when the overlap check fails.
    pub fn place(
        &mut self,
        parent: VolumeId,
        name: &str,
        solid: Solid,
        material: MaterialHandle,
        placement: Isometry3,
        check_overlaps: bool,
    ) -> Result<VolumeId, GeometryError> {
        let parent_data = self.volume(parent)?;
        if self.find(name).is_some() {
            return Err(GeometryError::DegenerateGeometry(format!(
                "duplicate volume name {name}"
            )));
        }
        solid.validate()?;

        if check_overlaps {
            let bounds = local_bounds(&solid, name)?.transformed(&placement);
            let parent_bounds = local_bounds(&parent_data.solid, &parent_data.name)?;
            if !parent_bounds.contains_box(&bounds) {
                return Err(GeometryError::Overlap {
                    volume: name.into(),
                    other: parent_data.name.clone(),
                });
            }
            for &sibling in &parent_data.children {
                let sib = &self.volumes[sibling];
                let sib_bounds = local_bounds(&sib.solid, &sib.name)?.transformed(&sib.placement);
                if bounds.overlaps(&sib_bounds) {
                    return Err(GeometryError::Overlap {
                        volume: name.into(),
                        other: sib.name.clone(),
                    });
                }
            }
        }

        let id = self.volumes.insert(VolumeData {
            name: name.into(),
            solid,
            material,
            placement,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.volumes[parent].children.push(id);
        debug!(
            volume = name,
            parent = %self.volumes[parent].name,
            x = placement.translation.vector.x,
            y = placement.translation.vector.y,
            z = placement.translation.vector.z,
            "placed volume"
        );
        Ok(id)
    }

    /// Returns the volume data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the tree.
    pub fn volume(&self, id: VolumeId) -> Result<&VolumeData, GeometryError> {
        self.volumes
            .get(id)
            .ok_or_else(|| GeometryError::VolumeNotFound(format!("{id:?}")))
    }

    /// The world volume, if one has been set.
    #[must_use]
    pub fn root(&self) -> Option<VolumeId> {
        self.root
    }

    /// Looks up a volume by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<VolumeId> {
        self.volumes
            .iter()
            .find_map(|(id, v)| (v.name == name).then_some(id))
    }

    /// Looks up a volume by name, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::VolumeNotFound`] if no volume has that name.
    pub fn require(&self, name: &str) -> Result<VolumeId, GeometryError> {
        self.find(name)
            .ok_or_else(|| GeometryError::VolumeNotFound(name.into()))
    }

    /// Name of a volume, or `None` for an unknown id.
    #[must_use]
    pub fn name(&self, id: VolumeId) -> Option<&str> {
        self.volumes.get(id).map(|v| v.name.as_str())
    }

    /// Number of volumes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Number of volumes without a parent.
    #[must_use]
    pub fn root_count(&self) -> usize {
        self.volumes.values().filter(|v| v.parent.is_none()).count()
    }

    /// Iterates over all volumes in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, &VolumeData)> {
        self.volumes.iter()
    }

    /// Transform from the volume's local frame to the world frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume or one of its ancestors is missing.
    pub fn global_transform(&self, id: VolumeId) -> Result<Isometry3, GeometryError> {
        let mut transform = Isometry3::identity();
        let mut current = Some(id);
        while let Some(vid) = current {
            let v = self.volume(vid)?;
            transform = v.placement * transform;
            current = v.parent;
        }
        Ok(transform)
    }

    /// World-frame bounding box of a volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the volume is missing or its solid is empty.
    pub fn global_bounding_box(&self, id: VolumeId) -> Result<Aabb, GeometryError> {
        let v = self.volume(id)?;
        let local = local_bounds(&v.solid, &v.name)?;
        Ok(local.transformed(&self.global_transform(id)?))
    }

    /// Deepest volume containing a world-frame point.
    ///
    /// Returns `None` if the point lies outside the world volume.
    #[must_use]
    pub fn locate(&self, point: &Point3) -> Option<VolumeId> {
        let root = self.root?;
        let root_data = self.volumes.get(root)?;
        if !root_data.solid.contains(point) {
            return None;
        }
        let mut current = root;
        let mut local = *point;
        'descend: loop {
            for &child in &self.volumes[current].children {
                let c = &self.volumes[child];
                let in_child = c.placement.inverse_transform_point(&local);
                if c.solid.contains(&in_child) {
                    current = child;
                    local = in_child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

fn local_bounds(solid: &Solid, name: &str) -> Result<Aabb, GeometryError> {
    solid
        .bounding_box()
        .ok_or_else(|| GeometryError::MalformedSolid(format!("volume {name} has an empty solid")))
}
