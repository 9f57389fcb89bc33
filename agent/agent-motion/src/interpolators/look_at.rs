//! Look-at corrections of the head/eye bone chain.

use super::rotate_subtree;
use crate::templates::LookAtBones;
use agent_types::{Direction, Frame, LookAtConfig};
use nalgebra::{UnitQuaternion, Vector3};

/// Distance of a look-at target at full desire magnitude (metres).
pub const LOOK_AT_DISTANCE: f64 = 10.0;

/// Agent-local target point of a desired direction.
///
/// Longitude `±1` maps to `±π` around the up axis (counter-clockwise from
/// forward), altitude `±1` to `±π/2`. A non-positive magnitude means "no
/// target".
#[must_use]
pub fn target_from_direction(direction: &Direction) -> Option<Vector3<f64>> {
    if direction.magnitude <= 0.0 || direction.magnitude.is_nan() {
        return None;
    }
    let longitude = direction.longitude * std::f64::consts::PI;
    let altitude = direction.altitude * std::f64::consts::FRAC_PI_2;
    let unit = Vector3::new(
        -longitude.sin() * altitude.cos(),
        longitude.cos() * altitude.cos(),
        altitude.sin(),
    );
    Some(unit * (direction.magnitude * LOOK_AT_DISTANCE))
}

fn blend(a: &UnitQuaternion<f64>, b: &UnitQuaternion<f64>, t: f64) -> UnitQuaternion<f64> {
    a.try_slerp(b, t, 1.0e-9)
        .unwrap_or(if t < 0.5 { *a } else { *b })
}

/// Per-bone rotations turning the eye towards a target.
///
/// Corrections live in the skeleton's reference space and are applied on top
/// of the animated pose. Once the eye is on target the corrections freeze
/// until the target drifts further than the release tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct LookAtInterpolator {
    src: Vec<UnitQuaternion<f64>>,
    current: Vec<UnitQuaternion<f64>>,
    dst: Vec<UnitQuaternion<f64>>,
    target_pose_reached: bool,
}

impl LookAtInterpolator {
    /// Neutral corrections for the given chain.
    #[must_use]
    pub fn new(look_at: &LookAtBones) -> Self {
        let identity = vec![UnitQuaternion::identity(); look_at.bones.len()];
        Self {
            src: identity.clone(),
            current: identity.clone(),
            dst: identity,
            target_pose_reached: false,
        }
    }

    /// Start blending from the current corrections.
    pub fn set_target(&mut self) {
        self.src.clone_from(&self.current);
    }

    /// Whether the eye is latched on the target.
    #[must_use]
    pub fn target_pose_reached(&self) -> bool {
        self.target_pose_reached
    }

    /// Current per-bone corrections, in chain order.
    #[must_use]
    pub fn corrections(&self) -> &[UnitQuaternion<f64>] {
        &self.current
    }

    fn total_correction(&self) -> UnitQuaternion<f64> {
        self.current
            .iter()
            .fold(UnitQuaternion::identity(), |acc, r| r * acc)
    }

    /// Recompute the corrections for this round.
    ///
    /// `frames` is the animated pose before any correction. Without a target
    /// the corrections relax towards identity.
    pub fn next_round(
        &mut self,
        interpolation_param: f64,
        look_at: &LookAtBones,
        frames: &[Frame],
        target: Option<&Vector3<f64>>,
        config: &LookAtConfig,
    ) {
        if look_at.is_empty() {
            return;
        }
        let Some(target) = target else {
            self.target_pose_reached = false;
            self.dst.fill(UnitQuaternion::identity());
            self.blend_towards_dst(interpolation_param);
            return;
        };

        let eye = &frames[look_at.eye_bone];
        let wanted = target - eye.origin;
        let axis = eye.orientation * look_at.eye_forward;

        if self.target_pose_reached {
            if (self.total_correction() * axis).angle(&wanted) <= config.release_tolerance {
                return;
            }
            self.target_pose_reached = false;
        }

        let per_bone = UnitQuaternion::rotation_between(&axis, &wanted)
            .and_then(|total| total.axis_angle())
            .map_or_else(UnitQuaternion::identity, |(rot_axis, angle)| {
                let share = (angle / self.dst.len() as f64).min(config.max_bone_angle);
                UnitQuaternion::from_axis_angle(&rot_axis, share)
            });
        self.dst.fill(per_bone);
        self.blend_towards_dst(interpolation_param);

        if (self.total_correction() * axis).angle(&wanted) < config.reached_tolerance {
            self.target_pose_reached = true;
        }
    }

    fn blend_towards_dst(&mut self, t: f64) {
        for ((current, src), dst) in self.current.iter_mut().zip(&self.src).zip(&self.dst) {
            *current = blend(src, dst, t);
        }
    }

    /// Apply the corrections to a reference-space pose.
    pub fn apply(&self, frames: &mut [Frame], look_at: &LookAtBones, parents: &[Option<usize>]) {
        for (bone, rotation) in look_at.bones.iter().zip(&self.current) {
            rotate_subtree(frames, parents, *bone, rotation);
        }
    }
}
