//! Boundary-crossing detection.
//!
//! The transport engine reports each step with the volume the track is in
//! and the volume it will be in after the step. [`classify`] turns a step
//! that enters the target volume into a [`HitRecord`]; it is pure and may be
//! called from any thread in any order.

use crate::math::Point3;
use crate::recorder::HitRecorder;
use crate::volume::VolumeId;

/// One transport step, borrowed from the engine for the duration of a call.
///
/// `V` identifies volumes; the engine may use [`VolumeId`]s or names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent<V = VolumeId> {
    pub track_id: u64,
    /// Volume the step starts in, or `None` if outside all named volumes.
    pub current_volume: Option<V>,
    /// Volume after the step, or `None` if the track leaves the world.
    pub next_volume: Option<V>,
    /// Post-step point, on the boundary when the step ends at a surface.
    pub position: Point3,
    /// Kinetic energy at the post-step point.
    pub kinetic_energy: f64,
}

/// Position and energy of a track entering the target volume.
///
/// Only the two coordinates spanning the detector plane are kept. Values are
/// in internal units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub x: f64,
    pub z: f64,
    pub kinetic_energy: f64,
}

/// Returns a hit if the step enters `target` from anywhere else.
///
/// Entry means the next volume is the target and the current one is not.
/// An absent current volume counts as "not the target". Steps inside the
/// target and steps leaving it yield nothing.
#[must_use]
pub fn classify<V: PartialEq>(event: &StepEvent<V>, target: &V) -> Option<HitRecord> {
    let entering = event.next_volume.as_ref() == Some(target)
        && event.current_volume.as_ref() != Some(target);
    entering.then(|| HitRecord {
        x: event.position.x,
        z: event.position.z,
        kinetic_energy: event.kinetic_energy,
    })
}

/// Records every entry into one target volume.
///
/// This is what the transport engine calls once per step.
#[derive(Debug)]
pub struct EntryScorer<'a, V = VolumeId> {
    target: V,
    recorder: &'a HitRecorder,
}

impl<'a, V: PartialEq> EntryScorer<'a, V> {
    #[must_use]
    pub fn new(target: V, recorder: &'a HitRecorder) -> Self {
        Self { target, recorder }
    }

    #[must_use]
    pub fn target(&self) -> &V {
        &self.target
    }

    /// Classifies the step and records a hit on entry.
    ///
    /// Returns `true` if the step was an entry. Recording failures are
    /// absorbed by the recorder and never reach the caller.
    pub fn process(&self, event: &StepEvent<V>) -> bool {
        match classify(event, &self.target) {
            Some(hit) => {
                self.recorder.record(&hit);
                true
            }
            None => false,
        }
    }
}
