//! Shared fixtures: a three-bone skeleton with walk, crouch and stand motions.

#![allow(dead_code)]

use agent_motion::{
    ActionController, AgentBlackboard, GuardedActions, Keyframe, LookAtBones, MotionAction,
    MotionTemplate, MotionTemplateCursor, RoundHook, SceneGraph, SkeletalMotionTemplates,
    SkeletonHierarchy,
};
use agent_types::{Collider, ControllerConfig, Frame, MassDistribution, Matter, NodeId};
use nalgebra::{UnitQuaternion, Vector3};
use std::sync::Arc;

pub const MAX_SPEED: f64 = 2.0;
pub const MAX_ACCEL: f64 = 5.0;
pub const DT: f64 = 1.0 / 60.0;

/// hips -> spine -> head
pub fn hierarchy() -> SkeletonHierarchy {
    SkeletonHierarchy::new(vec![None, Some(0), Some(1)]).with_names(vec![
        "hips".into(),
        "spine".into(),
        "head".into(),
    ])
}

pub fn pose_frames() -> Vec<Frame> {
    vec![
        Frame::from_origin(Vector3::new(0.0, 0.0, 1.0)),
        Frame::from_origin(Vector3::new(0.0, 0.0, 0.4)),
        Frame::from_origin(Vector3::new(0.0, 0.0, 0.3)),
    ]
}

pub fn standing_matter() -> Matter {
    Matter::new(Collider::capsule(0.6, 0.3), MassDistribution::capsule(70.0, 0.6, 0.3))
        .with_center_offset(Vector3::new(0.0, 0.0, 0.9))
}

pub fn crouching_matter() -> Matter {
    Matter::new(Collider::capsule(0.2, 0.4), MassDistribution::capsule(90.0, 0.2, 0.4))
        .with_center_offset(Vector3::new(0.0, 0.0, 0.6))
}

pub fn walk_actions() -> GuardedActions {
    GuardedActions::always(vec![
        MotionAction::AccelerateTowardsDesiredLinearVelocity {
            max_linear_speed: MAX_SPEED,
            max_linear_accel: MAX_ACCEL,
        },
        MotionAction::DontRotate,
    ])
}

pub fn stay_actions() -> GuardedActions {
    GuardedActions::always(vec![MotionAction::DontMove, MotionAction::DontRotate])
}

fn swing(angle: f64) -> Vec<Frame> {
    vec![
        Frame::identity(),
        Frame::new(
            Vector3::zeros(),
            UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angle),
        ),
        Frame::identity(),
    ]
}

pub fn walk() -> MotionTemplate {
    MotionTemplate::new()
        .keyframe(
            Keyframe::new(0.0, swing(-0.1)),
            Frame::identity(),
            standing_matter(),
            walk_actions().into(),
        )
        .keyframe(
            Keyframe::new(0.5, swing(0.1)),
            Frame::from_origin(Vector3::new(0.0, 0.5, 0.0)),
            standing_matter(),
            walk_actions().into(),
        )
}

pub fn still(matter: Matter) -> MotionTemplate {
    MotionTemplate::new()
        .keyframe(Keyframe::rest(0.0, 3), Frame::identity(), matter, stay_actions().into())
        .keyframe(Keyframe::rest(1.0, 3), Frame::identity(), matter, stay_actions().into())
}

pub fn templates() -> Arc<SkeletalMotionTemplates> {
    templates_starting_at("walk")
}

/// Walk loops, crouch hands over to standing after one second of blending.
pub fn templates_starting_at(initial: &str) -> Arc<SkeletalMotionTemplates> {
    let t = SkeletalMotionTemplates::builder(hierarchy(), pose_frames())
        .look_at(LookAtBones {
            bones: vec![1, 2],
            eye_bone: 2,
            eye_forward: Vector3::y(),
        })
        .motion("walk", walk())
        .motion("crouch", still(crouching_matter()))
        .motion("stand", still(standing_matter()))
        .initial_motion(initial)
        .cyclic("walk")
        .successor("crouch", MotionTemplateCursor::new("stand", 0))
        .cyclic("stand")
        .transition_time("crouch", "stand", 1.0)
        .build()
        .unwrap();
    Arc::new(t)
}

/// Scene with a motion object at the origin and one node per bone.
pub fn scene_with_agent() -> (SceneGraph, NodeId, Vec<NodeId>) {
    let mut scene = SceneGraph::new();
    let object = scene.insert_node(None, Frame::identity());
    let hips = scene.insert_node(Some(object), Frame::identity());
    let spine = scene.insert_node(Some(hips), Frame::identity());
    let head = scene.insert_node(Some(spine), Frame::identity());
    (scene, object, vec![hips, spine, head])
}

pub fn controller<H: RoundHook>(hook: H) -> (SceneGraph, ActionController<H>) {
    controller_starting_at("walk", hook)
}

pub fn controller_starting_at<H: RoundHook>(
    initial: &str,
    hook: H,
) -> (SceneGraph, ActionController<H>) {
    let (mut scene, object, bones) = scene_with_agent();
    let blackboard = AgentBlackboard::new(templates_starting_at(initial), object, bones);
    let config = ControllerConfig::default().max_speeds(MAX_SPEED, std::f64::consts::PI);
    let c = ActionController::new(blackboard, config, hook, &mut scene).unwrap();
    (scene, c)
}
