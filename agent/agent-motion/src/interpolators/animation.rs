//! Bone-frame interpolation.

use crate::scene::Scene;
use crate::templates::{MotionTemplateCursor, SkeletalMotionTemplates};
use agent_types::{Frame, NodeId};
use nalgebra::Vector3;

/// Reference-space bone frames of the addressed keyframe.
///
/// Each bone's local frame is its rest frame composed with the keyframe's
/// bone frame; local frames are then chained along the parents.
///
/// # Panics
///
/// Panics if the cursor is invalid.
#[must_use]
pub fn reference_frames_of_keyframe(
    templates: &SkeletalMotionTemplates,
    cursor: &MotionTemplateCursor,
) -> Vec<Frame> {
    let keyframe = templates.keyframe(cursor);
    let parents = templates.hierarchy().parents();
    let pose = templates.pose_frames();
    let mut frames: Vec<Frame> = Vec::with_capacity(parents.len());
    for (i, parent) in parents.iter().enumerate() {
        let local = pose[i].compose(&keyframe.frames[i]);
        let frame = match parent {
            Some(p) => frames[*p].compose(&local),
            None => local,
        };
        frames.push(frame);
    }
    frames
}

/// Write reference-space bone frames to the bone nodes.
///
/// Frames are converted back to parent-local space. Root bones hang under
/// the motion object node and are shifted by `origin_offset`; only their
/// writes propagate.
///
/// # Panics
///
/// Panics if the counts of frames, nodes and parents disagree.
pub fn commit_reference_frames<S: Scene + ?Sized>(
    frames: &[Frame],
    scene: &mut S,
    bone_nodes: &[NodeId],
    parents: &[Option<usize>],
    origin_offset: &Vector3<f64>,
) {
    assert!(
        frames.len() == bone_nodes.len() && frames.len() == parents.len(),
        "bone count mismatch: {} frames, {} nodes, {} parents",
        frames.len(),
        bone_nodes.len(),
        parents.len()
    );
    for (i, parent) in parents.iter().enumerate() {
        let local = match parent {
            Some(p) => frames[*p].inverse().compose(&frames[i]),
            None => Frame::new(frames[i].origin + origin_offset, frames[i].orientation),
        };
        scene.set_frame_of_node(bone_nodes[i], parent.is_none(), &local);
    }
}

/// Interpolates bone frames between two keyframes.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationInterpolator {
    src_frames: Vec<Frame>,
    current_frames: Vec<Frame>,
    dst_frames: Vec<Frame>,
}

impl AnimationInterpolator {
    /// Interpolator resting at the addressed keyframe.
    #[must_use]
    pub fn new(templates: &SkeletalMotionTemplates, cursor: &MotionTemplateCursor) -> Self {
        let frames = reference_frames_of_keyframe(templates, cursor);
        Self {
            src_frames: frames.clone(),
            current_frames: frames.clone(),
            dst_frames: frames,
        }
    }

    /// Start blending from the current pose to the addressed keyframe.
    pub fn set_target(&mut self, templates: &SkeletalMotionTemplates, cursor: &MotionTemplateCursor) {
        self.src_frames.clone_from(&self.current_frames);
        self.dst_frames = reference_frames_of_keyframe(templates, cursor);
    }

    /// Blend source and destination at `interpolation_param`.
    pub fn next_round(&mut self, interpolation_param: f64) {
        for ((current, src), dst) in self
            .current_frames
            .iter_mut()
            .zip(&self.src_frames)
            .zip(&self.dst_frames)
        {
            *current = src.interpolate(dst, interpolation_param);
        }
    }

    /// Pose at the start of the blend.
    #[must_use]
    pub fn src_frames(&self) -> &[Frame] {
        &self.src_frames
    }

    /// Current pose.
    #[must_use]
    pub fn current_frames(&self) -> &[Frame] {
        &self.current_frames
    }

    /// Pose at the end of the blend.
    #[must_use]
    pub fn dst_frames(&self) -> &[Frame] {
        &self.dst_frames
    }

    /// Write the current pose to the bone nodes.
    pub fn commit<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        bone_nodes: &[NodeId],
        parents: &[Option<usize>],
        origin_offset: &Vector3<f64>,
    ) {
        commit_reference_frames(&self.current_frames, scene, bone_nodes, parents, origin_offset);
    }
}
