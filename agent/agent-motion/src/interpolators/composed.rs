//! All interpolators of one agent on a shared time base.

use super::{
    AimAtInterpolator, AnimationInterpolator, InterpolatorTime, LookAtInterpolator,
    MatterInterpolator, commit_reference_frames,
};
use crate::rigid_body_motion::RigidBodyMotion;
use crate::scene::Scene;
use crate::templates::{MotionTemplateCursor, SkeletalMotionTemplates};
use agent_types::{Frame, LookAtConfig, NodeId};
use nalgebra::Vector3;

/// Owns the animation, look-at, aim-at and matter interpolators.
///
/// Each round the animation pose is computed first; look-at and aim-at
/// corrections are layered on top of it, then the matter is blended.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedInterpolator {
    time: InterpolatorTime,
    animation: AnimationInterpolator,
    look_at: LookAtInterpolator,
    aim_at: AimAtInterpolator,
    matter: MatterInterpolator,
    posed_frames: Vec<Frame>,
}

impl ComposedInterpolator {
    /// Interpolators resting at the addressed keyframe.
    #[must_use]
    pub fn new(
        templates: &SkeletalMotionTemplates,
        cursor: &MotionTemplateCursor,
        use_inverted_collider_center_offset_interpolation: bool,
    ) -> Self {
        let animation = AnimationInterpolator::new(templates, cursor);
        let posed_frames = animation.current_frames().to_vec();
        Self {
            time: InterpolatorTime::new(0.0),
            animation,
            look_at: LookAtInterpolator::new(templates.look_at()),
            aim_at: AimAtInterpolator::new(templates, cursor),
            matter: MatterInterpolator::new(
                *templates.matter(cursor),
                use_inverted_collider_center_offset_interpolation,
            ),
            posed_frames,
        }
    }

    /// Start interpolating towards the addressed keyframe over `interpolation_time`.
    pub fn set_target(
        &mut self,
        templates: &SkeletalMotionTemplates,
        cursor: &MotionTemplateCursor,
        interpolation_time: f64,
    ) {
        self.time.reset_time(interpolation_time);
        self.animation.set_target(templates, cursor);
        self.look_at.set_target();
        self.aim_at.set_target(templates, cursor);
        self.matter.set_target(*templates.matter(cursor));
    }

    /// Consume `dt` and return the leftover beyond the current target.
    pub fn add_time(&mut self, dt: f64) -> f64 {
        self.time.add_time(dt)
    }

    /// Whether the current target has been reached.
    #[must_use]
    pub fn done(&self) -> bool {
        self.time.done()
    }

    /// Shared interpolation parameter.
    #[must_use]
    pub fn interpolation_parameter(&self) -> f64 {
        self.time.interpolation_parameter()
    }

    /// Recompute every interpolator at the current parameter.
    ///
    /// Targets are agent-local points; `None` disables the correction.
    pub fn next_round(
        &mut self,
        templates: &SkeletalMotionTemplates,
        look_at_target: Option<&Vector3<f64>>,
        aim_at_target: Option<&Vector3<f64>>,
        look_at_config: &LookAtConfig,
    ) {
        let param = self.time.interpolation_parameter();
        let parents = templates.hierarchy().parents();

        self.animation.next_round(param);
        self.posed_frames.clear();
        self.posed_frames.extend_from_slice(self.animation.current_frames());

        self.look_at.next_round(
            param,
            templates.look_at(),
            &self.posed_frames,
            look_at_target,
            look_at_config,
        );
        self.look_at
            .apply(&mut self.posed_frames, templates.look_at(), parents);

        self.aim_at.next_round(param, &self.posed_frames, aim_at_target);
        self.aim_at.apply(&mut self.posed_frames, parents);

        self.matter.next_round(param);
    }

    /// Write the posed bones to the scene.
    pub fn commit<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        bone_nodes: &[NodeId],
        parents: &[Option<usize>],
        origin_offset: &Vector3<f64>,
    ) {
        commit_reference_frames(&self.posed_frames, scene, bone_nodes, parents, origin_offset);
    }

    /// Write changed matter to the scene and the motion object.
    pub fn commit_matter<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        node: NodeId,
        motion: &mut RigidBodyMotion,
    ) -> bool {
        self.matter.commit(scene, node, motion)
    }

    /// Time base.
    #[must_use]
    pub fn time(&self) -> &InterpolatorTime {
        &self.time
    }

    /// Animation interpolator.
    #[must_use]
    pub fn animation(&self) -> &AnimationInterpolator {
        &self.animation
    }

    /// Look-at interpolator.
    #[must_use]
    pub fn look_at(&self) -> &LookAtInterpolator {
        &self.look_at
    }

    /// Aim-at interpolator.
    #[must_use]
    pub fn aim_at(&self) -> &AimAtInterpolator {
        &self.aim_at
    }

    /// Matter interpolator.
    #[must_use]
    pub fn matter(&self) -> &MatterInterpolator {
        &self.matter
    }

    /// Animated pose with all corrections applied, reference space.
    #[must_use]
    pub fn posed_frames(&self) -> &[Frame] {
        &self.posed_frames
    }
}
