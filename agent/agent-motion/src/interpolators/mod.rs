//! Interpolators driving an agent from one keyframe to the next.
//!
//! All interpolators share one time base ([`InterpolatorTime`]) and read the
//! same interpolation parameter each round:
//!
//! - [`AnimationInterpolator`] - bone frames
//! - [`LookAtInterpolator`] - head/eye corrections towards a look-at target
//! - [`AimAtInterpolator`] - bone corrections towards an aim-at target
//! - [`MatterInterpolator`] - collider and mass of the motion object
//!
//! [`ComposedInterpolator`] owns one of each and runs them in that order.
//!
//! Bone frames are kept in the skeleton's reference space: every frame is
//! relative to the skeleton origin rather than to its parent bone.

mod aim_at;
mod animation;
mod composed;
mod look_at;
mod matter;
mod time;

pub use aim_at::AimAtInterpolator;
pub use animation::{AnimationInterpolator, commit_reference_frames, reference_frames_of_keyframe};
pub use composed::ComposedInterpolator;
pub use look_at::{LOOK_AT_DISTANCE, LookAtInterpolator, target_from_direction};
pub use matter::MatterInterpolator;
pub use time::{InterpolatorTime, MIN_INTERPOLATION_TIME};

use agent_types::Frame;
use nalgebra::UnitQuaternion;

/// Rotate `bone` and all its descendants about the bone's origin.
///
/// `frames` are reference-space frames; parents precede children.
pub(crate) fn rotate_subtree(
    frames: &mut [Frame],
    parents: &[Option<usize>],
    bone: usize,
    rotation: &UnitQuaternion<f64>,
) {
    let pivot = frames[bone].origin;
    let mut in_subtree = vec![false; frames.len()];
    in_subtree[bone] = true;
    for j in bone..frames.len() {
        if j != bone {
            in_subtree[j] = parents[j].is_some_and(|p| in_subtree[p]);
        }
        if in_subtree[j] {
            let f = &mut frames[j];
            f.origin = pivot + rotation * (f.origin - pivot);
            f.orientation = rotation * f.orientation;
        }
    }
}
