use crate::material::MaterialHandle;
use crate::math::Isometry3;
use crate::solid::Solid;

slotmap::new_key_type! {
    /// Unique identifier for a volume in the volume tree.
    pub struct VolumeId;
}

/// Data associated with a placed volume.
///
/// The placement is relative to the parent volume's frame. The root has
/// no parent and its placement is the identity.
#[derive(Debug, Clone)]
pub struct VolumeData {
    /// Unique name used by the transport engine to identify the volume.
    pub name: String,
    /// Shape in the volume's local frame.
    pub solid: Solid,
    pub material: MaterialHandle,
    /// Local-to-parent transform.
    pub placement: Isometry3,
    pub parent: Option<VolumeId>,
    /// Daughter volumes, in placement order.
    pub children: Vec<VolumeId>,
}
