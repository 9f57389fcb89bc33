//! Skeletal motion templates: the immutable keyframe library of an agent.
//!
//! A template set maps motion names to keyframe sequences. Every keyframe
//! carries the bone pose, the motion-object reference frame used to chain
//! motions into paths, the aim-at bone set, the motion object's matter, and
//! the guarded actions that must hold while the agent heads for it.
//!
//! Templates are validated once when built. Everything downstream assumes a
//! consistent template set and treats a violation as a broken precondition.

use crate::guarded_actions::DisjunctionOfGuardedActions;
use agent_types::{AgentError, Frame, Matter, Result};
use hashbrown::HashMap;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Address of one keyframe: `(motion_name, keyframe_index)`.
///
/// Ordered by motion name, then keyframe index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionTemplateCursor {
    /// Motion name.
    pub motion_name: String,
    /// Keyframe index within the motion.
    pub keyframe_index: usize,
}

impl MotionTemplateCursor {
    /// Cursor to the given keyframe.
    #[must_use]
    pub fn new(motion_name: impl Into<String>, keyframe_index: usize) -> Self {
        Self {
            motion_name: motion_name.into(),
            keyframe_index,
        }
    }

    /// Whether both cursors address the same motion.
    #[must_use]
    pub fn same_motion(&self, other: &Self) -> bool {
        self.motion_name == other.motion_name
    }
}

impl std::fmt::Display for MotionTemplateCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.motion_name, self.keyframe_index)
    }
}

/// One keyframe of a motion.
///
/// Bone frames are expressed relative to the bone's rest frame
/// ([`SkeletalMotionTemplates::pose_frames`]); an identity frame leaves the
/// bone in its rest pose.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keyframe {
    /// Time of the keyframe from the start of the motion (seconds).
    pub time_point: f64,
    /// Per-bone frames relative to the rest pose.
    pub frames: Vec<Frame>,
}

impl Keyframe {
    /// Keyframe from its time point and bone frames.
    #[must_use]
    pub fn new(time_point: f64, frames: Vec<Frame>) -> Self {
        Self { time_point, frames }
    }

    /// Keyframe leaving every bone in its rest pose.
    #[must_use]
    pub fn rest(time_point: f64, bone_count: usize) -> Self {
        Self {
            time_point,
            frames: vec![Frame::identity(); bone_count],
        }
    }
}

/// A bone taking part in aiming, with the local axis that must point at the target.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AimAtBone {
    /// Bone index.
    pub bone: usize,
    /// Bone-local axis to align with the target.
    pub forward: Vector3<f64>,
}

/// The look-at bone chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LookAtBones {
    /// Bones sharing the look-at rotation, from the root side to the eye.
    pub bones: Vec<usize>,
    /// Bone whose axis must point at the target.
    pub eye_bone: usize,
    /// Eye-local axis to align with the target.
    pub eye_forward: Vector3<f64>,
}

impl LookAtBones {
    /// An empty chain (look-at disabled).
    #[must_use]
    pub fn none() -> Self {
        Self {
            bones: Vec::new(),
            eye_bone: 0,
            eye_forward: Vector3::y(),
        }
    }

    /// Whether look-at is disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}

/// One motion: keyframes plus per-keyframe data.
///
/// All per-keyframe vectors have the same length.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionTemplate {
    /// Keyframes in time order.
    pub keyframes: Vec<Keyframe>,
    /// Motion-object frame at each keyframe, in the motion's animation space.
    pub reference_frames: Vec<Frame>,
    /// Aiming bones at each keyframe.
    pub aim_at: Vec<Vec<AimAtBone>>,
    /// Motion-object matter at each keyframe.
    pub matter: Vec<Matter>,
    /// Guarded actions for heading towards each keyframe.
    pub guarded_actions: Vec<DisjunctionOfGuardedActions>,
}

impl MotionTemplate {
    /// Empty motion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyframe with its reference frame, matter and guarded actions.
    #[must_use]
    pub fn keyframe(
        mut self,
        keyframe: Keyframe,
        reference_frame: Frame,
        matter: Matter,
        guarded_actions: DisjunctionOfGuardedActions,
    ) -> Self {
        self.keyframes.push(keyframe);
        self.reference_frames.push(reference_frame);
        self.aim_at.push(Vec::new());
        self.matter.push(matter);
        self.guarded_actions.push(guarded_actions);
        self
    }

    /// Set the aiming bones of the most recently added keyframe.
    #[must_use]
    pub fn with_aim_at(mut self, bones: Vec<AimAtBone>) -> Self {
        if let Some(last) = self.aim_at.last_mut() {
            *last = bones;
        }
        self
    }

    /// Number of keyframes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the motion has no keyframes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    fn validate(&self, name: &str, bone_count: usize) -> Result<()> {
        let n = self.keyframes.len();
        if n == 0 {
            return Err(AgentError::invalid_template(format!(
                "motion {name} has no keyframes"
            )));
        }
        let lengths = [
            self.reference_frames.len(),
            self.aim_at.len(),
            self.matter.len(),
            self.guarded_actions.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            return Err(AgentError::invalid_template(format!(
                "motion {name} has per-keyframe arrays of unequal length"
            )));
        }
        let mut previous_time = f64::NEG_INFINITY;
        for (k, keyframe) in self.keyframes.iter().enumerate() {
            if keyframe.frames.len() != bone_count {
                return Err(AgentError::BoneCountMismatch {
                    context: format!("keyframe {k} of motion {name}"),
                    expected: bone_count,
                    actual: keyframe.frames.len(),
                });
            }
            if !keyframe.time_point.is_finite() || keyframe.time_point < previous_time {
                return Err(AgentError::invalid_template(format!(
                    "keyframe {k} of motion {name} breaks time order"
                )));
            }
            previous_time = keyframe.time_point;
            if !keyframe.frames.iter().all(Frame::is_finite) || !self.reference_frames[k].is_finite() {
                return Err(AgentError::invalid_template(format!(
                    "keyframe {k} of motion {name} has non-finite frames"
                )));
            }
            for aim in &self.aim_at[k] {
                if aim.bone >= bone_count || aim.forward.norm() < 1e-9 {
                    return Err(AgentError::invalid_template(format!(
                        "keyframe {k} of motion {name} has an invalid aim-at bone"
                    )));
                }
            }
            self.matter[k].validate()?;
            self.guarded_actions[k]
                .validate()
                .map_err(|e| AgentError::invalid_template(format!("motion {name}[{k}]: {e}")))?;
        }
        Ok(())
    }
}

/// Parent relation of the skeleton's bones.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkeletonHierarchy {
    /// Parent of every bone; `None` for root bones. Parents precede children.
    pub parents: Vec<Option<usize>>,
    /// Bone names, empty or one per bone.
    pub names: Vec<String>,
}

impl SkeletonHierarchy {
    /// Hierarchy from the parent array.
    #[must_use]
    pub fn new(parents: Vec<Option<usize>>) -> Self {
        Self {
            parents,
            names: Vec::new(),
        }
    }

    /// Attach bone names.
    #[must_use]
    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    /// Parent array.
    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    /// Number of bones.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Index of the bone with the given name.
    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn validate(&self) -> Result<()> {
        if self.parents.is_empty() {
            return Err(AgentError::invalid_template("skeleton has no bones"));
        }
        for (i, parent) in self.parents.iter().enumerate() {
            if let Some(p) = parent {
                if *p >= i {
                    return Err(AgentError::invalid_template(format!(
                        "bone {i} does not follow its parent {p}"
                    )));
                }
            }
        }
        if !self.names.is_empty() && self.names.len() != self.parents.len() {
            return Err(AgentError::BoneCountMismatch {
                context: "bone names".into(),
                expected: self.parents.len(),
                actual: self.names.len(),
            });
        }
        Ok(())
    }
}

/// Which motions may follow which, and how long the blends take.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transitions {
    initial_motion_name: String,
    successors: HashMap<String, Vec<MotionTemplateCursor>>,
    transition_times: HashMap<(String, String), f64>,
}

impl Transitions {
    /// Motion the agent starts in.
    #[must_use]
    pub fn initial_motion_name(&self) -> &str {
        &self.initial_motion_name
    }

    /// Cursors reachable after the last keyframe of `motion_name`.
    #[must_use]
    pub fn successors(&self, motion_name: &str) -> &[MotionTemplateCursor] {
        self.successors
            .get(motion_name)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Authored blend time from one motion into another.
    #[must_use]
    pub fn transition_time(&self, from: &str, to: &str) -> Option<f64> {
        self.transition_times
            .get(&(from.to_owned(), to.to_owned()))
            .copied()
    }
}

/// The complete, validated keyframe library of one agent kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SkeletalMotionTemplates {
    motions: HashMap<String, MotionTemplate>,
    hierarchy: SkeletonHierarchy,
    pose_frames: Vec<Frame>,
    look_at: LookAtBones,
    transitions: Transitions,
    loaded: bool,
}

impl SkeletalMotionTemplates {
    /// Start building a template set for the given skeleton.
    #[must_use]
    pub fn builder(
        hierarchy: SkeletonHierarchy,
        pose_frames: Vec<Frame>,
    ) -> SkeletalMotionTemplatesBuilder {
        SkeletalMotionTemplatesBuilder::new(hierarchy, pose_frames)
    }

    /// Whether the set passed validation.
    #[must_use]
    pub fn loaded_successfully(&self) -> bool {
        self.loaded
    }

    /// All motions by name.
    #[must_use]
    pub fn motions_map(&self) -> &HashMap<String, MotionTemplate> {
        &self.motions
    }

    /// Motion by name.
    #[must_use]
    pub fn motion(&self, name: &str) -> Option<&MotionTemplate> {
        self.motions.get(name)
    }

    /// Skeleton hierarchy.
    #[must_use]
    pub fn hierarchy(&self) -> &SkeletonHierarchy {
        &self.hierarchy
    }

    /// Rest pose, one frame per bone, relative to the parent bone.
    #[must_use]
    pub fn pose_frames(&self) -> &[Frame] {
        &self.pose_frames
    }

    /// Look-at bone chain.
    #[must_use]
    pub fn look_at(&self) -> &LookAtBones {
        &self.look_at
    }

    /// Motion transitions.
    #[must_use]
    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// Number of bones.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.hierarchy.bone_count()
    }

    /// Cursor to keyframe 0 of the initial motion.
    #[must_use]
    pub fn initial_cursor(&self) -> MotionTemplateCursor {
        MotionTemplateCursor::new(self.transitions.initial_motion_name(), 0)
    }

    /// Motion addressed by the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not address a keyframe of this set.
    #[must_use]
    pub fn motion_at(&self, cursor: &MotionTemplateCursor) -> &MotionTemplate {
        let motion = self
            .motions
            .get(&cursor.motion_name)
            .unwrap_or_else(|| panic!("cursor {cursor} names an unknown motion"));
        assert!(
            cursor.keyframe_index < motion.len(),
            "cursor {cursor} is out of range"
        );
        motion
    }

    /// Keyframe addressed by the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn keyframe(&self, cursor: &MotionTemplateCursor) -> &Keyframe {
        &self.motion_at(cursor).keyframes[cursor.keyframe_index]
    }

    /// Reference frame of the addressed keyframe.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn reference_frame(&self, cursor: &MotionTemplateCursor) -> &Frame {
        &self.motion_at(cursor).reference_frames[cursor.keyframe_index]
    }

    /// Matter of the addressed keyframe.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn matter(&self, cursor: &MotionTemplateCursor) -> &Matter {
        &self.motion_at(cursor).matter[cursor.keyframe_index]
    }

    /// Aim-at bones of the addressed keyframe.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn aim_at(&self, cursor: &MotionTemplateCursor) -> &[AimAtBone] {
        &self.motion_at(cursor).aim_at[cursor.keyframe_index]
    }

    /// Guarded actions of the addressed keyframe.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn guarded_actions(&self, cursor: &MotionTemplateCursor) -> &DisjunctionOfGuardedActions {
        &self.motion_at(cursor).guarded_actions[cursor.keyframe_index]
    }

    /// Cursors that may follow `cursor`: the next keyframe of the same
    /// motion, or the motion's successors after its last keyframe.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    #[must_use]
    pub fn next_cursors(&self, cursor: &MotionTemplateCursor) -> Vec<MotionTemplateCursor> {
        let motion = self.motion_at(cursor);
        if cursor.keyframe_index + 1 < motion.len() {
            vec![MotionTemplateCursor::new(
                cursor.motion_name.clone(),
                cursor.keyframe_index + 1,
            )]
        } else {
            self.transitions.successors(&cursor.motion_name).to_vec()
        }
    }

    /// Time needed to go from one keyframe to the next.
    ///
    /// Forward progress inside a motion takes the difference of the time
    /// points; anything else is a transition blend, using the authored time
    /// or `default_transition_time`.
    ///
    /// # Panics
    ///
    /// Panics if either cursor is invalid.
    #[must_use]
    pub fn transition_duration(
        &self,
        from: &MotionTemplateCursor,
        to: &MotionTemplateCursor,
        default_transition_time: f64,
    ) -> f64 {
        if from.same_motion(to) && to.keyframe_index > from.keyframe_index {
            self.keyframe(to).time_point - self.keyframe(from).time_point
        } else {
            self.transitions
                .transition_time(&from.motion_name, &to.motion_name)
                .unwrap_or(default_transition_time)
        }
    }

    /// Validate the whole set.
    pub fn validate(&self) -> Result<()> {
        self.hierarchy.validate()?;
        let bone_count = self.bone_count();
        if self.pose_frames.len() != bone_count {
            return Err(AgentError::BoneCountMismatch {
                context: "pose frames".into(),
                expected: bone_count,
                actual: self.pose_frames.len(),
            });
        }
        if !self.look_at.is_empty() {
            let la = &self.look_at;
            if la.bones.iter().any(|&b| b >= bone_count)
                || la.eye_bone >= bone_count
                || la.eye_forward.norm() < 1e-9
            {
                return Err(AgentError::invalid_template("invalid look-at bones"));
            }
        }
        if self.motions.is_empty() {
            return Err(AgentError::invalid_template("no motions"));
        }
        for (name, motion) in &self.motions {
            motion.validate(name, bone_count)?;
        }
        if !self
            .motions
            .contains_key(self.transitions.initial_motion_name())
        {
            return Err(AgentError::unknown_motion(
                self.transitions.initial_motion_name(),
            ));
        }
        for (from, targets) in &self.transitions.successors {
            if !self.motions.contains_key(from) {
                return Err(AgentError::unknown_motion(from.clone()));
            }
            for target in targets {
                self.check_cursor(target)?;
            }
        }
        for ((from, to), time) in &self.transitions.transition_times {
            if !self.motions.contains_key(from) {
                return Err(AgentError::unknown_motion(from.clone()));
            }
            if !self.motions.contains_key(to) {
                return Err(AgentError::unknown_motion(to.clone()));
            }
            if !time.is_finite() || *time < 0.0 {
                return Err(AgentError::InvalidTimestep(*time));
            }
        }
        Ok(())
    }

    fn check_cursor(&self, cursor: &MotionTemplateCursor) -> Result<()> {
        let motion = self
            .motions
            .get(&cursor.motion_name)
            .ok_or_else(|| AgentError::unknown_motion(cursor.motion_name.clone()))?;
        if cursor.keyframe_index >= motion.len() {
            return Err(AgentError::KeyframeOutOfRange {
                motion: cursor.motion_name.clone(),
                index: cursor.keyframe_index,
                count: motion.len(),
            });
        }
        Ok(())
    }
}

/// Builder for [`SkeletalMotionTemplates`].
#[derive(Debug, Clone)]
pub struct SkeletalMotionTemplatesBuilder {
    hierarchy: SkeletonHierarchy,
    pose_frames: Vec<Frame>,
    look_at: LookAtBones,
    motions: HashMap<String, MotionTemplate>,
    transitions: Transitions,
}

impl SkeletalMotionTemplatesBuilder {
    /// Builder for the given skeleton.
    #[must_use]
    pub fn new(hierarchy: SkeletonHierarchy, pose_frames: Vec<Frame>) -> Self {
        Self {
            hierarchy,
            pose_frames,
            look_at: LookAtBones::none(),
            motions: HashMap::new(),
            transitions: Transitions::default(),
        }
    }

    /// Set the look-at chain.
    #[must_use]
    pub fn look_at(mut self, look_at: LookAtBones) -> Self {
        self.look_at = look_at;
        self
    }

    /// Add a motion. The first motion added becomes the initial one unless
    /// [`Self::initial_motion`] says otherwise.
    #[must_use]
    pub fn motion(mut self, name: impl Into<String>, motion: MotionTemplate) -> Self {
        let name = name.into();
        if self.transitions.initial_motion_name.is_empty() {
            self.transitions.initial_motion_name.clone_from(&name);
        }
        self.motions.insert(name, motion);
        self
    }

    /// Set the initial motion.
    #[must_use]
    pub fn initial_motion(mut self, name: impl Into<String>) -> Self {
        self.transitions.initial_motion_name = name.into();
        self
    }

    /// Allow `target` to follow the last keyframe of `from_motion`.
    #[must_use]
    pub fn successor(mut self, from_motion: impl Into<String>, target: MotionTemplateCursor) -> Self {
        self.transitions
            .successors
            .entry(from_motion.into())
            .or_default()
            .push(target);
        self
    }

    /// Make the motion loop back to its first keyframe.
    #[must_use]
    pub fn cyclic(self, motion: impl Into<String>) -> Self {
        let motion = motion.into();
        let target = MotionTemplateCursor::new(motion.clone(), 0);
        self.successor(motion, target)
    }

    /// Blend time between two motions.
    #[must_use]
    pub fn transition_time(mut self, from: impl Into<String>, to: impl Into<String>, seconds: f64) -> Self {
        self.transitions
            .transition_times
            .insert((from.into(), to.into()), seconds);
        self
    }

    /// Validate and produce the template set.
    pub fn build(self) -> Result<SkeletalMotionTemplates> {
        let mut templates = SkeletalMotionTemplates {
            motions: self.motions,
            hierarchy: self.hierarchy,
            pose_frames: self.pose_frames,
            look_at: self.look_at,
            transitions: self.transitions,
            loaded: false,
        };
        templates.validate()?;
        templates.loaded = true;
        tracing::debug!(
            motions = templates.motions.len(),
            bones = templates.bone_count(),
            "Motion templates loaded"
        );
        Ok(templates)
    }
}
