//! The per-agent action controller.
//!
//! One call to [`ActionController::next_round`] advances an agent by one
//! simulation tick:
//!
//! 1. the round hook refreshes the desire on the blackboard
//! 2. guarded actions of the target keyframe set the motion-object accelerations
//! 3. the interpolators advance, crossing keyframes as time allows
//! 4. the motion object is integrated and committed
//! 5. the posed bones are committed
//!
//! Steps 2 and 3 read the same pre-integration motion state.

use crate::guarded_actions::{
    ActionInputs, GuardedActions, MotionAction, MotionActionDataMap, desired_angular_velocity,
    desired_linear_velocity, execute_satisfied_motion_guarded_actions,
    importance_of_ideal_velocities, satisfied_motion_guarded_actions,
    stationary_rank_of_guarded_actions,
};
use crate::ideal_velocity::IdealVelocityBuilder;
use crate::interpolators::{ComposedInterpolator, MIN_INTERPOLATION_TIME, target_from_direction};
use crate::rigid_body_motion::{AnimSpaceDirections, RigidBodyMotion};
use crate::scene::Scene;
use crate::templates::{MotionTemplateCursor, SkeletalMotionTemplates};
use agent_types::{ContactEvent, ControllerConfig, MotionDesireProps, NodeId, Result, VelocityPair};
use nalgebra::Vector3;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Desire magnitudes below this count as "stand still".
const MOVE_DESIRE_EPSILON: f64 = 1.0e-3;

/// Mismatches closer than this are ties.
const MISMATCH_TIE_TOLERANCE: f64 = 1.0e-9;

/// Per-agent context shared between the controller and its hook.
#[derive(Debug, Clone)]
pub struct AgentBlackboard {
    /// Desire of the current round.
    pub desire: MotionDesireProps,
    /// Keyframe library of the agent.
    pub templates: Arc<SkeletalMotionTemplates>,
    /// Scene node of the motion object.
    pub motion_object_node: NodeId,
    /// Scene node of every bone, in skeleton order.
    pub bone_nodes: Vec<NodeId>,
    /// Forward and up axes of the templates' animation space.
    pub directions: AnimSpaceDirections,
    /// Explicit look-at target in agent-local space; overrides the desire.
    pub look_at_target: Option<Vector3<f64>>,
    /// Explicit aim-at target in agent-local space; overrides the desire.
    pub aim_at_target: Option<Vector3<f64>>,
}

impl AgentBlackboard {
    /// Blackboard with a neutral desire and default directions.
    #[must_use]
    pub fn new(
        templates: Arc<SkeletalMotionTemplates>,
        motion_object_node: NodeId,
        bone_nodes: Vec<NodeId>,
    ) -> Self {
        Self {
            desire: MotionDesireProps::default(),
            templates,
            motion_object_node,
            bone_nodes,
            directions: AnimSpaceDirections::default(),
            look_at_target: None,
            aim_at_target: None,
        }
    }
}

/// Agent-specific first step of every round.
pub trait RoundHook {
    /// Update the blackboard (typically its desire) before the controller acts.
    fn next_round_internal(
        &mut self,
        dt: f64,
        blackboard: &mut AgentBlackboard,
        config: &ControllerConfig,
    );
}

/// Hook that leaves the blackboard alone; the desire is set from outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThrough;

impl RoundHook for PassThrough {
    fn next_round_internal(&mut self, _: f64, _: &mut AgentBlackboard, _: &ControllerConfig) {}
}

/// Drives one agent's motion object and skeleton from its desire.
#[derive(Debug, Clone)]
pub struct ActionController<H = PassThrough> {
    hook: H,
    config: ControllerConfig,
    blackboard: AgentBlackboard,
    motion: RigidBodyMotion,
    current_cursor: MotionTemplateCursor,
    target_cursor: MotionTemplateCursor,
    interpolator: ComposedInterpolator,
    ideal_velocity_builder: IdealVelocityBuilder,
    ideal_velocities: VelocityPair,
    motion_action_data: MotionActionDataMap,
    last_satisfied_actions: Vec<GuardedActions>,
    round: u64,
}

impl<H: RoundHook> ActionController<H> {
    /// Create the controller and its motion object.
    ///
    /// The motion object starts at the scene frame of its node, at rest, in
    /// keyframe 0 of the initial motion. Its collider and mass are taken
    /// from that keyframe and committed to the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid.
    ///
    /// # Panics
    ///
    /// Panics if the templates failed to load or the number of bone nodes
    /// differs from the skeleton's bone count.
    pub fn new<S: Scene + ?Sized>(
        blackboard: AgentBlackboard,
        config: ControllerConfig,
        hook: H,
        scene: &mut S,
    ) -> Result<Self> {
        config.validate()?;
        let templates = Arc::clone(&blackboard.templates);
        assert!(
            templates.loaded_successfully(),
            "motion templates are not loaded"
        );
        assert_eq!(
            blackboard.bone_nodes.len(),
            templates.bone_count(),
            "bone nodes do not match the skeleton"
        );

        let node = blackboard.motion_object_node;
        let cursor = templates.initial_cursor();
        let mut motion = RigidBodyMotion::new(scene.frame_of_node(node), &blackboard.directions);
        let mut interpolator = ComposedInterpolator::new(
            &templates,
            &cursor,
            config.use_inverted_collider_center_offset_interpolation,
        );
        interpolator.commit_matter(scene, node, &mut motion);
        motion.commit(scene, node);
        let origin_offset = -interpolator.matter().current().center_offset;
        interpolator.commit(
            scene,
            &blackboard.bone_nodes,
            templates.hierarchy().parents(),
            &origin_offset,
        );

        info!(
            motion = %cursor,
            bones = templates.bone_count(),
            node = %node,
            "Action controller created"
        );

        Ok(Self {
            hook,
            config,
            blackboard,
            motion,
            current_cursor: cursor.clone(),
            target_cursor: cursor.clone(),
            interpolator,
            ideal_velocity_builder: IdealVelocityBuilder::new(cursor),
            ideal_velocities: VelocityPair::zero(),
            motion_action_data: MotionActionDataMap::new(),
            last_satisfied_actions: Vec::new(),
            round: 0,
        })
    }

    /// Advance the agent by `dt` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `dt` is negative or not finite.
    pub fn next_round<S: Scene + ?Sized>(&mut self, dt: f64, scene: &mut S) {
        assert!(dt.is_finite() && dt >= 0.0, "invalid timestep {dt}");
        self.round += 1;
        let templates = Arc::clone(&self.blackboard.templates);
        let node = self.blackboard.motion_object_node;

        // 1. desire
        self.hook
            .next_round_internal(dt, &mut self.blackboard, &self.config);
        let desire = self.blackboard.desire.clipped();

        // 2. guarded actions
        self.motion.update_frame_with_forward_and_up_directions(
            scene,
            node,
            &self.blackboard.directions,
        );
        self.motion.update_linear_velocity(scene, node);
        self.motion.update_angular_velocity(scene, node);
        let contacts = scene.collision_contacts(node);
        self.run_guarded_actions(dt, &templates, &contacts, &desire);

        // 3. interpolators
        self.advance_interpolators(dt, &templates, &contacts, &desire);
        self.interpolator
            .commit_matter(scene, node, &mut self.motion);

        // 4. motion object
        self.motion.integrate(dt);
        self.motion.commit(scene, node);

        // 5. bones
        let origin_offset = -self.interpolator.matter().current().center_offset;
        self.interpolator.commit(
            scene,
            &self.blackboard.bone_nodes,
            templates.hierarchy().parents(),
            &origin_offset,
        );

        trace!(
            round = self.round,
            cursor = %self.target_cursor,
            param = self.interpolator.interpolation_parameter(),
            "Round finished"
        );
    }

    fn run_guarded_actions(
        &mut self,
        dt: f64,
        templates: &SkeletalMotionTemplates,
        contacts: &[ContactEvent],
        desire: &MotionDesireProps,
    ) {
        let gravity = self.config.gravity;
        let inputs = ActionInputs {
            dt,
            ideal_linear_velocity: self.ideal_velocities.linear,
            ideal_angular_velocity: self.ideal_velocities.angular,
            gravity,
            desire: *desire,
        };
        let guarded = templates.guarded_actions(&self.target_cursor);
        let mut satisfied = Vec::new();
        if satisfied_motion_guarded_actions(
            guarded,
            contacts,
            &self.motion,
            desire,
            &gravity,
            Some(&mut satisfied),
        ) {
            execute_satisfied_motion_guarded_actions(
                &satisfied,
                &inputs,
                &mut self.motion,
                &mut self.motion_action_data,
            );
            self.last_satisfied_actions = satisfied.into_iter().cloned().collect();
        } else {
            warn!(
                cursor = %self.target_cursor,
                "No guarded action satisfied, falling back to free fall"
            );
            let fall = GuardedActions::new(Vec::new(), vec![MotionAction::FreeFall]);
            execute_satisfied_motion_guarded_actions(
                &[&fall],
                &inputs,
                &mut self.motion,
                &mut self.motion_action_data,
            );
            self.last_satisfied_actions.clear();
        }
    }

    fn advance_interpolators(
        &mut self,
        dt: f64,
        templates: &SkeletalMotionTemplates,
        contacts: &[ContactEvent],
        desire: &MotionDesireProps,
    ) {
        let mut leftover = self.interpolator.add_time(dt);
        let mut crossings = 0;
        while self.interpolator.done() && crossings < self.config.max_keyframe_crossings_per_round {
            let reached = self.target_cursor.clone();
            let candidates = templates.next_cursors(&reached);
            if candidates.is_empty() {
                self.current_cursor = reached;
                break;
            }
            let next = self.choose_next_target(templates, &reached, &candidates, contacts, desire);
            let time = templates.transition_duration(
                &reached,
                &next,
                self.config.default_transition_time,
            );
            debug!(from = %reached, to = %next, time, "Keyframe crossed");

            if crossings == 0 {
                self.ideal_velocity_builder.reset(reached.clone());
            }
            self.ideal_velocity_builder.extend(next.clone(), time);

            self.interpolator.set_target(templates, &next, time);
            self.current_cursor = reached;
            self.target_cursor = next;
            leftover = self.interpolator.add_time(leftover);
            crossings += 1;
        }
        if crossings == self.config.max_keyframe_crossings_per_round && self.interpolator.done() {
            debug!(crossings, "Keyframe crossing limit reached");
        }
        if crossings > 0 {
            if self.ideal_velocity_builder.total_time(templates) > MIN_INTERPOLATION_TIME {
                self.ideal_velocities = self
                    .ideal_velocity_builder
                    .close_with_velocities(templates, &self.motion.frame);
            } else {
                debug!(
                    cursor = %self.target_cursor,
                    crossings,
                    "Crossed keyframe path takes no time, ideal velocities reset to zero"
                );
                self.ideal_velocities = VelocityPair::zero();
            }
        }

        let center_offset = self.interpolator.matter().current().center_offset;
        let to_skeleton_space = |t: Vector3<f64>| t + center_offset;
        let look_at_target = self
            .blackboard
            .look_at_target
            .or_else(|| target_from_direction(&desire.look_at))
            .map(to_skeleton_space);
        let aim_at_target = self
            .blackboard
            .aim_at_target
            .or_else(|| target_from_direction(&desire.aim_at))
            .map(to_skeleton_space);
        self.interpolator.next_round(
            templates,
            look_at_target.as_ref(),
            aim_at_target.as_ref(),
            &self.config.look_at,
        );
    }

    /// Pick the successor whose ideal velocity best matches the desire.
    ///
    /// A candidate's ideal velocity covers the hop into it and its next
    /// keyframe, scaled by how much its actions rely on the ideal velocity.
    /// Only candidates with satisfied guards qualify. Ties prefer more
    /// stationary actions when the agent wants to stand still and less
    /// stationary ones otherwise, then declaration order. Without any
    /// qualifying candidate the first one is used.
    fn choose_next_target(
        &self,
        templates: &SkeletalMotionTemplates,
        reached: &MotionTemplateCursor,
        candidates: &[MotionTemplateCursor],
        contacts: &[ContactEvent],
        desire: &MotionDesireProps,
    ) -> MotionTemplateCursor {
        let gravity = self.config.gravity;
        let desired_linear =
            desired_linear_velocity(&self.motion, desire, self.config.max_linear_speed);
        let desired_angular =
            desired_angular_velocity(&self.motion, desire, self.config.max_angular_speed);
        let wants_to_move = desire.move_magnitude() > MOVE_DESIRE_EPSILON;

        let mut best: Option<(f64, i64, usize)> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            let guarded = templates.guarded_actions(candidate);
            if !satisfied_motion_guarded_actions(guarded, contacts, &self.motion, desire, &gravity, None)
            {
                continue;
            }
            let time = templates.transition_duration(
                reached,
                candidate,
                self.config.default_transition_time,
            );
            let mut builder = IdealVelocityBuilder::new(reached.clone());
            builder.extend(candidate.clone(), time);
            let motion_len = templates.motion_at(candidate).len();
            if candidate.keyframe_index + 1 < motion_len {
                let follow = MotionTemplateCursor::new(
                    candidate.motion_name.clone(),
                    candidate.keyframe_index + 1,
                );
                let follow_time = templates.transition_duration(
                    candidate,
                    &follow,
                    self.config.default_transition_time,
                );
                builder.extend(follow, follow_time);
            }
            let ideal = if builder.total_time(templates) > MIN_INTERPOLATION_TIME {
                builder.close_with_velocities(templates, &self.motion.frame)
            } else {
                VelocityPair::zero()
            };
            let importance = importance_of_ideal_velocities(guarded);
            let mismatch = (ideal.linear * importance.linear - desired_linear).norm()
                + (ideal.angular * importance.angular - desired_angular).norm();
            let rank = i64::from(stationary_rank_of_guarded_actions(guarded));
            let rank_key = if wants_to_move { rank } else { -rank };

            let better = match best {
                None => true,
                Some((best_mismatch, best_rank, _)) => {
                    mismatch < best_mismatch - MISMATCH_TIE_TOLERANCE
                        || ((mismatch - best_mismatch).abs() <= MISMATCH_TIE_TOLERANCE
                            && rank_key < best_rank)
                }
            };
            if better {
                best = Some((mismatch, rank_key, i));
            }
        }

        match best {
            Some((_, _, i)) => candidates[i].clone(),
            None => {
                debug!(from = %reached, "No successor qualifies, taking the first");
                candidates[0].clone()
            }
        }
    }

    /// Remove the motion object's collider from the scene.
    pub fn erase<S: Scene + ?Sized>(self, scene: &mut S) {
        scene.erase_collider(self.blackboard.motion_object_node);
        info!(node = %self.blackboard.motion_object_node, "Action controller erased");
    }

    /// Motion object state.
    #[must_use]
    pub fn motion_object_motion(&self) -> &RigidBodyMotion {
        &self.motion
    }

    /// Last keyframe reached.
    #[must_use]
    pub fn current_cursor(&self) -> &MotionTemplateCursor {
        &self.current_cursor
    }

    /// Keyframe the agent is heading for.
    #[must_use]
    pub fn target_cursor(&self) -> &MotionTemplateCursor {
        &self.target_cursor
    }

    /// Interpolators.
    #[must_use]
    pub fn interpolator(&self) -> &ComposedInterpolator {
        &self.interpolator
    }

    /// Ideal velocities of the planned keyframe path.
    #[must_use]
    pub fn ideal_velocities(&self) -> &VelocityPair {
        &self.ideal_velocities
    }

    /// Persistent action data.
    #[must_use]
    pub fn motion_action_data(&self) -> &MotionActionDataMap {
        &self.motion_action_data
    }

    /// Guarded actions executed in the last round.
    #[must_use]
    pub fn last_satisfied_actions(&self) -> &[GuardedActions] {
        &self.last_satisfied_actions
    }

    /// Blackboard.
    #[must_use]
    pub fn blackboard(&self) -> &AgentBlackboard {
        &self.blackboard
    }

    /// Mutable blackboard, e.g. to set the desire before a round.
    pub fn blackboard_mut(&mut self) -> &mut AgentBlackboard {
        &mut self.blackboard
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Round hook.
    #[must_use]
    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Mutable round hook.
    pub fn hook_mut(&mut self) -> &mut H {
        &mut self.hook
    }

    /// Number of rounds run.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guarded_actions::{DisjunctionOfGuardedActions, MotionGuard};
    use crate::scene::SceneGraph;
    use crate::templates::{Keyframe, MotionTemplate, SkeletonHierarchy};
    use agent_types::{Collider, Frame, MassDistribution, Matter};
    use approx::assert_relative_eq;

    fn matter() -> Matter {
        Matter::new(Collider::capsule(0.5, 0.3), MassDistribution::capsule(70.0, 0.5, 0.3))
            .with_center_offset(Vector3::new(0.0, 0.0, 0.8))
    }

    fn stay() -> DisjunctionOfGuardedActions {
        GuardedActions::always(vec![MotionAction::DontMove, MotionAction::DontRotate]).into()
    }

    fn walk() -> DisjunctionOfGuardedActions {
        GuardedActions::new(
            vec![MotionGuard::Always],
            vec![MotionAction::MoveWithIdealLinearVelocity {
                max_linear_accel: 50.0,
            }],
        )
        .into()
    }

    fn motion(step: f64, guarded: fn() -> DisjunctionOfGuardedActions) -> MotionTemplate {
        let mut m = MotionTemplate::new();
        for k in 0..2 {
            m = m.keyframe(
                Keyframe::rest(0.5 * k as f64, 1),
                Frame::from_origin(Vector3::new(0.0, step * k as f64, 0.0)),
                matter(),
                guarded(),
            );
        }
        m
    }

    /// Idle and walk both loop and can switch into each other.
    fn templates() -> Arc<SkeletalMotionTemplates> {
        let t = SkeletalMotionTemplates::builder(SkeletonHierarchy::new(vec![None]), vec![Frame::identity()])
            .motion("idle", motion(0.0, stay))
            .motion("walk", motion(0.5, walk))
            .initial_motion("idle")
            .cyclic("idle")
            .successor("idle", MotionTemplateCursor::new("walk", 0))
            .cyclic("walk")
            .successor("walk", MotionTemplateCursor::new("idle", 0))
            .build()
            .unwrap();
        Arc::new(t)
    }

    fn setup() -> (SceneGraph, ActionController) {
        let mut scene = SceneGraph::new();
        let object = scene.insert_node(None, Frame::identity());
        let bone = scene.insert_node(Some(object), Frame::identity());
        let bb = AgentBlackboard::new(templates(), object, vec![bone]);
        let c = ActionController::new(bb, ControllerConfig::default(), PassThrough, &mut scene).unwrap();
        (scene, c)
    }

    #[test]
    fn test_construction_commits_matter() {
        let (scene, c) = setup();
        let node = c.blackboard().motion_object_node;
        assert_eq!(scene.collider_revision(node), 1);
        assert_relative_eq!(scene.rigid_body(node).inverted_mass, 1.0 / 70.0);
        assert_eq!(c.current_cursor(), &MotionTemplateCursor::new("idle", 0));
        let bone = c.blackboard().bone_nodes[0];
        assert_relative_eq!(scene.frame_of_node(bone).origin, Vector3::new(0.0, 0.0, -0.8));
    }

    #[test]
    fn test_first_round_starts_blending() {
        let (mut scene, mut c) = setup();
        c.next_round(1.0 / 60.0, &mut scene);
        assert_eq!(c.target_cursor(), &MotionTemplateCursor::new("idle", 1));
        assert!(c.interpolator().interpolation_parameter() > 0.0);
        assert_eq!(c.round(), 1);
    }

    #[test]
    fn test_walk_is_chosen_when_moving_is_desired() {
        let (mut scene, mut c) = setup();
        c.blackboard_mut().desire = MotionDesireProps::moving(1.0, 0.0, 0.0, 0.0);
        // Reach idle[1]; the next crossing has to choose between idle and walk.
        for _ in 0..40 {
            c.next_round(1.0 / 60.0, &mut scene);
        }
        assert_eq!(c.target_cursor().motion_name, "walk");
    }

    #[test]
    fn test_idle_is_kept_when_standing_still() {
        let (mut scene, mut c) = setup();
        for _ in 0..120 {
            c.next_round(1.0 / 60.0, &mut scene);
        }
        assert_eq!(c.target_cursor().motion_name, "idle");
        assert_relative_eq!(
            c.motion_object_motion().frame.origin,
            Vector3::zeros(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_crossings_are_bounded() {
        let (mut scene, mut c) = setup();
        c.next_round(100.0, &mut scene);
        assert!(c.interpolator().done());
    }

    #[test]
    fn test_zero_time_path_resets_ideal_velocities() {
        let rest = MotionTemplate::new().keyframe(Keyframe::rest(0.0, 1), Frame::identity(), matter(), stay());
        let t = SkeletalMotionTemplates::builder(SkeletonHierarchy::new(vec![None]), vec![Frame::identity()])
            .motion("walk", motion(0.5, walk))
            .motion("rest", rest)
            .successor("walk", MotionTemplateCursor::new("rest", 0))
            .cyclic("rest")
            .build()
            .unwrap();
        let mut scene = SceneGraph::new();
        let object = scene.insert_node(None, Frame::identity());
        let bone = scene.insert_node(Some(object), Frame::identity());
        let bb = AgentBlackboard::new(Arc::new(t), object, vec![bone]);
        let config = ControllerConfig::default().transition_time(0.0);
        let mut c = ActionController::new(bb, config, PassThrough, &mut scene).unwrap();

        c.next_round(1.0 / 60.0, &mut scene);
        assert_relative_eq!(c.ideal_velocities().linear, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        // Past walk[1] every hop is instant.
        for _ in 0..40 {
            c.next_round(1.0 / 60.0, &mut scene);
        }
        assert_eq!(c.target_cursor(), &MotionTemplateCursor::new("rest", 0));
        assert_eq!(c.ideal_velocities(), &VelocityPair::zero());
    }

    #[test]
    fn test_free_fall_when_nothing_is_satisfied() {
        let grounded: fn() -> DisjunctionOfGuardedActions = || {
            GuardedActions::new(vec![MotionGuard::HasAnyContact], vec![MotionAction::DontMove]).into()
        };
        let t = SkeletalMotionTemplates::builder(SkeletonHierarchy::new(vec![None]), vec![Frame::identity()])
            .motion("stand", motion(0.0, grounded))
            .cyclic("stand")
            .build()
            .unwrap();
        let mut scene = SceneGraph::new();
        let object = scene.insert_node(None, Frame::identity());
        let bone = scene.insert_node(Some(object), Frame::identity());
        let bb = AgentBlackboard::new(Arc::new(t), object, vec![bone]);
        let mut c = ActionController::new(bb, ControllerConfig::default(), PassThrough, &mut scene).unwrap();

        c.next_round(0.1, &mut scene);
        assert!(c.last_satisfied_actions().is_empty());
        assert_relative_eq!(
            c.motion_object_motion().velocity.linear,
            Vector3::new(0.0, 0.0, -0.981),
            epsilon = 1e-12
        );

        scene.push_contact(object, agent_types::ContactEvent::with_floor(Vector3::zeros()));
        c.next_round(0.1, &mut scene);
        assert_eq!(c.last_satisfied_actions().len(), 1);
        assert_relative_eq!(c.motion_object_motion().velocity.linear, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut scene = SceneGraph::new();
        let object = scene.insert_node(None, Frame::identity());
        let bone = scene.insert_node(Some(object), Frame::identity());
        let bb = AgentBlackboard::new(templates(), object, vec![bone]);
        let config = ControllerConfig::default().transition_time(-1.0);
        let err = ActionController::new(bb, config, PassThrough, &mut scene).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    #[should_panic(expected = "bone nodes do not match")]
    fn test_bone_count_mismatch_panics() {
        let mut scene = SceneGraph::new();
        let object = scene.insert_node(None, Frame::identity());
        let bb = AgentBlackboard::new(templates(), object, Vec::new());
        let _ = ActionController::new(bb, ControllerConfig::default(), PassThrough, &mut scene);
    }

    #[test]
    fn test_erase_removes_collider() {
        let (mut scene, c) = setup();
        let node = c.blackboard().motion_object_node;
        c.erase(&mut scene);
        assert!(scene.collider(node).is_none());
    }
}
