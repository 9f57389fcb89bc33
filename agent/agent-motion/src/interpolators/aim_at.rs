//! Aim-at corrections.
//!
//! The aiming bone set switches from source to destination at the middle of
//! the interpolation; the two sets are never blended.

use super::rotate_subtree;
use crate::templates::{AimAtBone, MotionTemplateCursor, SkeletalMotionTemplates};
use agent_types::Frame;
use nalgebra::{UnitQuaternion, Vector3};

/// Rotations turning the aiming bones towards a target.
#[derive(Debug, Clone, PartialEq)]
pub struct AimAtInterpolator {
    src_bones: Vec<AimAtBone>,
    current_bones: Vec<AimAtBone>,
    dst_bones: Vec<AimAtBone>,
    corrections: Vec<UnitQuaternion<f64>>,
}

impl AimAtInterpolator {
    /// Interpolator using the aiming bones of the addressed keyframe.
    #[must_use]
    pub fn new(templates: &SkeletalMotionTemplates, cursor: &MotionTemplateCursor) -> Self {
        let bones = templates.aim_at(cursor).to_vec();
        Self {
            src_bones: bones.clone(),
            current_bones: bones.clone(),
            corrections: vec![UnitQuaternion::identity(); bones.len()],
            dst_bones: bones,
        }
    }

    /// Switch towards the aiming bones of the addressed keyframe.
    pub fn set_target(&mut self, templates: &SkeletalMotionTemplates, cursor: &MotionTemplateCursor) {
        self.src_bones.clone_from(&self.current_bones);
        self.dst_bones = templates.aim_at(cursor).to_vec();
    }

    /// Aiming bones in effect.
    #[must_use]
    pub fn current_bones(&self) -> &[AimAtBone] {
        &self.current_bones
    }

    /// Corrections of the bones in effect, same order.
    #[must_use]
    pub fn corrections(&self) -> &[UnitQuaternion<f64>] {
        &self.corrections
    }

    /// Pick the bone set and recompute the corrections.
    ///
    /// `frames` is the reference-space pose after the look-at corrections.
    pub fn next_round(&mut self, interpolation_param: f64, frames: &[Frame], target: Option<&Vector3<f64>>) {
        let bones = if interpolation_param < 0.5 {
            &self.src_bones
        } else {
            &self.dst_bones
        };
        self.current_bones.clone_from(bones);
        self.corrections = self
            .current_bones
            .iter()
            .map(|aim| {
                target
                    .and_then(|target| {
                        let frame = &frames[aim.bone];
                        UnitQuaternion::rotation_between(
                            &(frame.orientation * aim.forward),
                            &(target - frame.origin),
                        )
                    })
                    .unwrap_or_else(UnitQuaternion::identity)
            })
            .collect();
    }

    /// Apply the corrections to a reference-space pose.
    pub fn apply(&self, frames: &mut [Frame], parents: &[Option<usize>]) {
        for (aim, rotation) in self.current_bones.iter().zip(&self.corrections) {
            rotate_subtree(frames, parents, aim.bone, rotation);
        }
    }
}
