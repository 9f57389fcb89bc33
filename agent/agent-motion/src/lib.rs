//! Motion control core of simulated agents.
//!
//! This crate turns an agent's desire into motion: it steers the agent's
//! motion object (an invisible rigid body with a collider) with guarded
//! actions and poses its skeleton by interpolating authored keyframes. It
//! builds on [`agent_types`] for the shared data.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ActionController                          │
//! │  Orchestrates: hook → actions → interpolators → commit       │
//! └──────────┬──────────────────┬───────────────────┬───────────┘
//!            │                  │                   │
//!            ▼                  ▼                   ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────┐
//! │  Guarded actions │ │   Interpolators  │ │ RigidBodyMotion  │
//! │  guards, actions │ │ anim, look, aim, │ │  integrate and   │
//! │  ideal velocity  │ │ matter           │ │  commit          │
//! └──────────────────┘ └──────────────────┘ └────────┬─────────┘
//!                                                    │
//!                                                    ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Scene                               │
//! │  Nodes, rigid bodies, colliders, contacts                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs synchronously, one [`ActionController::next_round`] per
//! agent and tick. Template data is immutable and shared through an `Arc`;
//! all other state is owned by its agent.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use agent_motion::{
//!     ActionController, AgentBlackboard, GuardedActions, Keyframe, MotionAction,
//!     MotionTemplate, PassThrough, Scene, SceneGraph, SkeletalMotionTemplates,
//!     SkeletonHierarchy,
//! };
//! use agent_types::{Collider, ControllerConfig, Frame, MassDistribution, Matter, MotionDesireProps};
//! use nalgebra::Vector3;
//!
//! let matter = Matter::new(Collider::capsule(0.5, 0.3), MassDistribution::capsule(70.0, 0.5, 0.3));
//! let walk = GuardedActions::always(vec![MotionAction::AccelerateTowardsDesiredLinearVelocity {
//!     max_linear_speed: 1.5,
//!     max_linear_accel: 5.0,
//! }]);
//! let motion = MotionTemplate::new()
//!     .keyframe(Keyframe::rest(0.0, 1), Frame::identity(), matter, walk.clone().into())
//!     .keyframe(
//!         Keyframe::rest(0.5, 1),
//!         Frame::from_origin(Vector3::new(0.0, 0.75, 0.0)),
//!         matter,
//!         walk.into(),
//!     );
//! let templates = SkeletalMotionTemplates::builder(
//!     SkeletonHierarchy::new(vec![None]),
//!     vec![Frame::identity()],
//! )
//! .motion("walk", motion)
//! .cyclic("walk")
//! .build()
//! .unwrap();
//!
//! let mut scene = SceneGraph::new();
//! let object = scene.insert_node(None, Frame::identity());
//! let bone = scene.insert_node(Some(object), Frame::identity());
//! let blackboard = AgentBlackboard::new(Arc::new(templates), object, vec![bone]);
//! let mut controller =
//!     ActionController::new(blackboard, ControllerConfig::default(), PassThrough, &mut scene)
//!         .unwrap();
//!
//! controller.blackboard_mut().desire = MotionDesireProps::moving(1.0, 0.0, 0.0, 0.0);
//! for _ in 0..60 {
//!     controller.next_round(1.0 / 60.0, &mut scene);
//! }
//! assert!(scene.frame_of_node(object).origin.y > 0.0);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,
    clippy::module_name_repetitions,
)]

mod action_controller;
mod cortex;
pub mod guarded_actions;
mod ideal_velocity;
pub mod interpolators;
mod rigid_body_motion;
mod scene;
mod templates;

pub use action_controller::{ActionController, AgentBlackboard, PassThrough, RoundHook};
pub use cortex::{
    ActionControllerHuman, Cortex, CortexDriven, HumanDesireConverter, HumanInput, MockCortex,
    RandomCortex,
};
pub use guarded_actions::{
    ActionInputs, Comparison, DisjunctionOfGuardedActions, GuardedActions,
    IdealVelocityImportance, MotionAction, MotionActionDataMap, MotionActionPersistentData,
    MotionGuard, execute_satisfied_motion_guarded_actions, satisfied_motion_guarded_actions,
};
pub use ideal_velocity::IdealVelocityBuilder;
pub use interpolators::{ComposedInterpolator, InterpolatorTime};
pub use rigid_body_motion::{AnimSpaceDirections, RigidBodyMotion};
pub use scene::{RigidBodyRecord, Scene, SceneGraph, SceneNode};
pub use templates::{
    AimAtBone, Keyframe, LookAtBones, MotionTemplate, MotionTemplateCursor, SkeletalMotionTemplates,
    SkeletalMotionTemplatesBuilder, SkeletonHierarchy, Transitions,
};

// Re-export the shared data types for convenience
pub use agent_types::{
    AgentError, Collider, ContactEvent, ControllerConfig, Frame, Gravity, MassDistribution, Matter,
    MotionDesireProps, NodeId, VelocityPair,
};
