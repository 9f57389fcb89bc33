//! Guarded motion actions: evaluation and execution.
//!
//! A keyframe carries a disjunction of guarded actions. Each disjunct is a
//! conjunction of guards plus the actions to run when all guards hold.
//! Guards are re-evaluated every round against the live physical state and
//! desire; there is no stored "current action".
//!
//! When several disjuncts are satisfied their actions run in declaration
//! order and mutate the same motion object, so the last write wins.

use crate::rigid_body_motion::RigidBodyMotion;
use agent_types::{AgentError, ContactEvent, DesireField, Gravity, MotionDesireProps, Result};
use hashbrown::HashMap;
use nalgebra::Vector3;
use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Comparison operator of threshold guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Comparison {
    /// `value < threshold`
    Less,
    /// `value <= threshold`
    LessOrEqual,
    /// `value > threshold`
    Greater,
    /// `value >= threshold`
    GreaterOrEqual,
}

impl Comparison {
    /// Apply the comparison.
    #[must_use]
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Less => value < threshold,
            Self::LessOrEqual => value <= threshold,
            Self::Greater => value > threshold,
            Self::GreaterOrEqual => value >= threshold,
        }
    }
}

/// A leaf predicate over contacts, motion, desire and gravity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionGuard {
    /// Always satisfied.
    Always,
    /// The motion object touches something.
    HasAnyContact,
    /// The motion object touches nothing.
    NoContact,
    /// Some contact normal lies within `max_angle` of `unit_axis`.
    ContactNormalInCone {
        /// Cone axis in motion-object local space.
        unit_axis: Vector3<f64>,
        /// Half-angle of the cone (radians).
        max_angle: f64,
    },
    /// Linear speed of the motion object against a threshold.
    LinearSpeed {
        /// Operator.
        comparison: Comparison,
        /// Speed (m/s).
        threshold: f64,
    },
    /// Angular speed of the motion object against a threshold.
    AngularSpeed {
        /// Operator.
        comparison: Comparison,
        /// Speed (rad/s).
        threshold: f64,
    },
    /// One desire field against a threshold.
    Desire {
        /// Field to read.
        field: DesireField,
        /// Operator.
        comparison: Comparison,
        /// Threshold in `[-1, 1]`.
        threshold: f64,
    },
    /// The motion object's up is within `max_angle` of the gravity up.
    ///
    /// Always satisfied in zero gravity.
    GravityAlignment {
        /// Maximum tilt (radians).
        max_angle: f64,
    },
}

impl MotionGuard {
    /// Evaluate the guard.
    #[must_use]
    pub fn is_satisfied(
        &self,
        contacts: &[ContactEvent],
        motion: &RigidBodyMotion,
        desire: &MotionDesireProps,
        gravity: &Gravity,
    ) -> bool {
        match self {
            Self::Always => true,
            Self::HasAnyContact => !contacts.is_empty(),
            Self::NoContact => contacts.is_empty(),
            Self::ContactNormalInCone {
                unit_axis,
                max_angle,
            } => {
                let axis = motion.frame.transform_vector(unit_axis);
                contacts.iter().any(|c| c.normal.angle(&axis) <= *max_angle)
            }
            Self::LinearSpeed {
                comparison,
                threshold,
            } => comparison.holds(motion.velocity.linear.norm(), *threshold),
            Self::AngularSpeed {
                comparison,
                threshold,
            } => comparison.holds(motion.velocity.angular.norm(), *threshold),
            Self::Desire {
                field,
                comparison,
                threshold,
            } => comparison.holds(field.value(desire), *threshold),
            Self::GravityAlignment { max_angle } => gravity
                .up()
                .is_none_or(|up| motion.up.angle(&up) <= *max_angle),
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = match self {
            Self::Always | Self::HasAnyContact | Self::NoContact => true,
            Self::ContactNormalInCone {
                unit_axis,
                max_angle,
            } => unit_axis.norm() > 1e-9 && valid_angle(*max_angle),
            Self::LinearSpeed { threshold, .. } | Self::AngularSpeed { threshold, .. } => {
                threshold.is_finite()
            }
            Self::Desire { threshold, .. } => threshold.is_finite(),
            Self::GravityAlignment { max_angle } => valid_angle(*max_angle),
        };
        if ok {
            Ok(())
        } else {
            Err(AgentError::invalid_template(format!("invalid guard {self:?}")))
        }
    }
}

fn valid_angle(angle: f64) -> bool {
    (0.0..=std::f64::consts::PI).contains(&angle)
}

/// An effect on the motion object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionAction {
    /// Cancel the linear velocity within one round.
    DontMove,
    /// Cancel the angular velocity within one round.
    DontRotate,
    /// Steer the linear velocity to the ideal one.
    MoveWithIdealLinearVelocity {
        /// Acceleration limit (m/s²).
        max_linear_accel: f64,
    },
    /// Steer the angular velocity to the ideal one.
    RotateWithIdealAngularVelocity {
        /// Acceleration limit (rad/s²).
        max_angular_accel: f64,
    },
    /// Steer the linear velocity to the desired one.
    AccelerateTowardsDesiredLinearVelocity {
        /// Speed at full desire (m/s).
        max_linear_speed: f64,
        /// Acceleration limit (m/s²).
        max_linear_accel: f64,
    },
    /// Turn around the motion object's up vector as desired.
    TurnAroundUpVector {
        /// Angular speed at full desire (rad/s).
        max_angular_speed: f64,
        /// Acceleration limit (rad/s²).
        max_angular_accel: f64,
    },
    /// Let gravity act alone.
    FreeFall,
    /// Steer to the ideal linear velocity once the action has run for `delay` seconds.
    ChaseIdealLinearVelocityAfterDelay {
        /// Waiting time (seconds).
        delay: f64,
        /// Acceleration limit (m/s²).
        max_linear_accel: f64,
    },
}

/// Inputs shared by every action executed in one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionInputs {
    /// Round duration (seconds).
    pub dt: f64,
    /// Linear velocity realising the planned keyframe path.
    pub ideal_linear_velocity: Vector3<f64>,
    /// Angular velocity realising the planned keyframe path.
    pub ideal_angular_velocity: Vector3<f64>,
    /// Gravity.
    pub gravity: Gravity,
    /// Desire of this round.
    pub desire: MotionDesireProps,
}

/// Scratch state an action keeps between rounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MotionActionPersistentData {
    /// Time the action has been running.
    Timer {
        /// Accumulated seconds.
        elapsed: f64,
    },
    /// A vector remembered by the action.
    Vector(Vector3<f64>),
}

/// Persistent action data keyed by action unique name.
pub type MotionActionDataMap = HashMap<String, MotionActionPersistentData>;

/// Acceleration that brings `current` to `target` in one round, magnitude-limited.
///
/// Returns zero for a non-positive `dt`.
#[must_use]
pub fn steer(target: &Vector3<f64>, current: &Vector3<f64>, dt: f64, max_accel: f64) -> Vector3<f64> {
    if dt <= 0.0 {
        return Vector3::zeros();
    }
    let a = (target - current) / dt;
    let norm = a.norm();
    if norm > max_accel {
        a * (max_accel / norm)
    } else {
        a
    }
}

/// World-space linear velocity the desire asks for.
///
/// `left` is `up × forward` of the motion object.
#[must_use]
pub fn desired_linear_velocity(
    motion: &RigidBodyMotion,
    desire: &MotionDesireProps,
    max_linear_speed: f64,
) -> Vector3<f64> {
    let left = motion.up.cross(&motion.forward);
    (motion.forward * desire.move_.forward + left * desire.move_.left + motion.up * desire.move_.up)
        * max_linear_speed
}

/// World-space angular velocity the desire asks for.
#[must_use]
pub fn desired_angular_velocity(
    motion: &RigidBodyMotion,
    desire: &MotionDesireProps,
    max_angular_speed: f64,
) -> Vector3<f64> {
    motion.up * (desire.move_.turn_ccw * max_angular_speed)
}

const DONT_MOVE: &str = "dont_move";
const DONT_ROTATE: &str = "dont_rotate";
const MOVE_WITH_IDEAL_LINEAR_VELOCITY: &str = "move_with_ideal_linear_velocity";
const ROTATE_WITH_IDEAL_ANGULAR_VELOCITY: &str = "rotate_with_ideal_angular_velocity";
const ACCELERATE_TOWARDS_DESIRED_LINEAR_VELOCITY: &str = "accelerate_towards_desired_linear_velocity";
const TURN_AROUND_UP_VECTOR: &str = "turn_around_up_vector";
const FREE_FALL: &str = "free_fall";
const CHASE_IDEAL_LINEAR_VELOCITY_AFTER_DELAY: &str = "chase_ideal_linear_velocity_after_delay";

/// Unique names of every action kind.
#[must_use]
pub fn all_action_unique_names() -> &'static [&'static str] {
    &[
        DONT_MOVE,
        DONT_ROTATE,
        MOVE_WITH_IDEAL_LINEAR_VELOCITY,
        ROTATE_WITH_IDEAL_ANGULAR_VELOCITY,
        ACCELERATE_TOWARDS_DESIRED_LINEAR_VELOCITY,
        TURN_AROUND_UP_VECTOR,
        FREE_FALL,
        CHASE_IDEAL_LINEAR_VELOCITY_AFTER_DELAY,
    ]
}

impl MotionAction {
    /// Stable name identifying the action kind.
    #[must_use]
    pub fn unique_name(&self) -> &'static str {
        match self {
            Self::DontMove => DONT_MOVE,
            Self::DontRotate => DONT_ROTATE,
            Self::MoveWithIdealLinearVelocity { .. } => MOVE_WITH_IDEAL_LINEAR_VELOCITY,
            Self::RotateWithIdealAngularVelocity { .. } => ROTATE_WITH_IDEAL_ANGULAR_VELOCITY,
            Self::AccelerateTowardsDesiredLinearVelocity { .. } => {
                ACCELERATE_TOWARDS_DESIRED_LINEAR_VELOCITY
            }
            Self::TurnAroundUpVector { .. } => TURN_AROUND_UP_VECTOR,
            Self::FreeFall => FREE_FALL,
            Self::ChaseIdealLinearVelocityAfterDelay { .. } => {
                CHASE_IDEAL_LINEAR_VELOCITY_AFTER_DELAY
            }
        }
    }

    /// How much this action relies on the ideal velocities.
    #[must_use]
    pub fn importance(&self) -> IdealVelocityImportance {
        match self {
            Self::MoveWithIdealLinearVelocity { .. }
            | Self::ChaseIdealLinearVelocityAfterDelay { .. } => IdealVelocityImportance::new(1.0, 0.0),
            Self::RotateWithIdealAngularVelocity { .. } => IdealVelocityImportance::new(0.0, 1.0),
            _ => IdealVelocityImportance::default(),
        }
    }

    /// Apply the action to the motion object.
    ///
    /// `previous` holds the scratch records of the last round, `output` the
    /// records of this round.
    pub fn execute(
        &self,
        inputs: &ActionInputs,
        previous: &MotionActionDataMap,
        motion: &mut RigidBodyMotion,
        output: &mut MotionActionDataMap,
    ) {
        let dt = inputs.dt;
        match self {
            Self::DontMove => {
                let a = steer(&Vector3::zeros(), &motion.velocity.linear, dt, f64::INFINITY);
                motion.set_linear_acceleration(a);
            }
            Self::DontRotate => {
                let a = steer(&Vector3::zeros(), &motion.velocity.angular, dt, f64::INFINITY);
                motion.set_angular_acceleration(a);
            }
            Self::MoveWithIdealLinearVelocity { max_linear_accel } => {
                let a = steer(
                    &inputs.ideal_linear_velocity,
                    &motion.velocity.linear,
                    dt,
                    *max_linear_accel,
                );
                motion.set_linear_acceleration(a);
            }
            Self::RotateWithIdealAngularVelocity { max_angular_accel } => {
                let a = steer(
                    &inputs.ideal_angular_velocity,
                    &motion.velocity.angular,
                    dt,
                    *max_angular_accel,
                );
                motion.set_angular_acceleration(a);
            }
            Self::AccelerateTowardsDesiredLinearVelocity {
                max_linear_speed,
                max_linear_accel,
            } => {
                let target = desired_linear_velocity(motion, &inputs.desire, *max_linear_speed);
                let a = steer(&target, &motion.velocity.linear, dt, *max_linear_accel);
                motion.set_linear_acceleration(a);
                output.insert(
                    self.unique_name().to_owned(),
                    MotionActionPersistentData::Vector(target),
                );
            }
            Self::TurnAroundUpVector {
                max_angular_speed,
                max_angular_accel,
            } => {
                let target = desired_angular_velocity(motion, &inputs.desire, *max_angular_speed);
                let a = steer(&target, &motion.velocity.angular, dt, *max_angular_accel);
                motion.set_angular_acceleration(a);
            }
            Self::FreeFall => {
                motion.set_linear_acceleration(inputs.gravity.acceleration);
                motion.set_angular_acceleration(Vector3::zeros());
            }
            Self::ChaseIdealLinearVelocityAfterDelay {
                delay,
                max_linear_accel,
            } => {
                let elapsed = match previous.get(self.unique_name()) {
                    Some(MotionActionPersistentData::Timer { elapsed }) => *elapsed,
                    _ => 0.0,
                } + dt;
                if elapsed >= *delay {
                    let a = steer(
                        &inputs.ideal_linear_velocity,
                        &motion.velocity.linear,
                        dt,
                        *max_linear_accel,
                    );
                    motion.set_linear_acceleration(a);
                }
                output.insert(
                    self.unique_name().to_owned(),
                    MotionActionPersistentData::Timer { elapsed },
                );
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let positive = |x: f64| x > 0.0 && !x.is_nan();
        let ok = match self {
            Self::DontMove | Self::DontRotate | Self::FreeFall => true,
            Self::MoveWithIdealLinearVelocity { max_linear_accel } => positive(*max_linear_accel),
            Self::RotateWithIdealAngularVelocity { max_angular_accel } => {
                positive(*max_angular_accel)
            }
            Self::AccelerateTowardsDesiredLinearVelocity {
                max_linear_speed,
                max_linear_accel,
            } => max_linear_speed.is_finite() && *max_linear_speed >= 0.0 && positive(*max_linear_accel),
            Self::TurnAroundUpVector {
                max_angular_speed,
                max_angular_accel,
            } => {
                max_angular_speed.is_finite() && *max_angular_speed >= 0.0 && positive(*max_angular_accel)
            }
            Self::ChaseIdealLinearVelocityAfterDelay {
                delay,
                max_linear_accel,
            } => delay.is_finite() && *delay >= 0.0 && positive(*max_linear_accel),
        };
        if ok {
            Ok(())
        } else {
            Err(AgentError::invalid_template(format!("invalid action {self:?}")))
        }
    }
}

/// A conjunction of guards with the actions it enables.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GuardedActions {
    /// Guards, all of which must hold.
    pub guards: Vec<MotionGuard>,
    /// Actions to run.
    pub actions: Vec<MotionAction>,
}

impl GuardedActions {
    /// Guarded actions from guards and actions.
    #[must_use]
    pub fn new(guards: Vec<MotionGuard>, actions: Vec<MotionAction>) -> Self {
        Self { guards, actions }
    }

    /// Actions guarded by [`MotionGuard::Always`].
    #[must_use]
    pub fn always(actions: Vec<MotionAction>) -> Self {
        Self::new(vec![MotionGuard::Always], actions)
    }

    /// Whether every guard holds.
    #[must_use]
    pub fn is_satisfied(
        &self,
        contacts: &[ContactEvent],
        motion: &RigidBodyMotion,
        desire: &MotionDesireProps,
        gravity: &Gravity,
    ) -> bool {
        self.guards
            .iter()
            .all(|g| g.is_satisfied(contacts, motion, desire, gravity))
    }

    /// Summed importance of the actions.
    #[must_use]
    pub fn importance(&self) -> IdealVelocityImportance {
        self.actions
            .iter()
            .fold(IdealVelocityImportance::default(), |acc, a| {
                let i = a.importance();
                IdealVelocityImportance::new(acc.linear + i.linear, acc.angular + i.angular)
            })
    }
}

/// Disjunction of guarded actions attached to one keyframe.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisjunctionOfGuardedActions {
    /// Disjuncts in declaration order.
    pub disjuncts: Vec<GuardedActions>,
}

impl DisjunctionOfGuardedActions {
    /// Disjunction of the given conjunctions.
    #[must_use]
    pub fn new(disjuncts: Vec<GuardedActions>) -> Self {
        Self { disjuncts }
    }

    /// Number of disjuncts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.disjuncts.len()
    }

    /// Whether there are no disjuncts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disjuncts.is_empty()
    }

    /// Validate guard and action parameters.
    pub fn validate(&self) -> Result<()> {
        if self.disjuncts.is_empty() {
            return Err(AgentError::invalid_template("empty disjunction of guarded actions"));
        }
        for disjunct in &self.disjuncts {
            for guard in &disjunct.guards {
                guard.validate()?;
            }
            for action in &disjunct.actions {
                action.validate()?;
            }
        }
        Ok(())
    }
}

impl From<GuardedActions> for DisjunctionOfGuardedActions {
    fn from(guarded: GuardedActions) -> Self {
        Self::new(vec![guarded])
    }
}

/// Evaluate a disjunction of guarded actions.
///
/// Without `output` this returns on the first satisfied disjunct. With
/// `output` every disjunct is evaluated and the satisfied ones are appended
/// in declaration order. Both forms agree on the returned flag.
pub fn satisfied_motion_guarded_actions<'a>(
    guarded_actions: &'a DisjunctionOfGuardedActions,
    contacts: &[ContactEvent],
    motion: &RigidBodyMotion,
    desire: &MotionDesireProps,
    gravity: &Gravity,
    output: Option<&mut Vec<&'a GuardedActions>>,
) -> bool {
    match output {
        None => guarded_actions
            .disjuncts
            .iter()
            .any(|d| d.is_satisfied(contacts, motion, desire, gravity)),
        Some(output) => {
            let before = output.len();
            output.extend(
                guarded_actions
                    .disjuncts
                    .iter()
                    .filter(|d| d.is_satisfied(contacts, motion, desire, gravity)),
            );
            output.len() > before
        }
    }
}

/// Run the actions of the satisfied disjuncts in order.
///
/// Accelerations start from zero, so an action that writes nothing leaves
/// the motion object unaccelerated. Scratch records of actions that did not
/// run this round are dropped from `data`.
pub fn execute_satisfied_motion_guarded_actions(
    satisfied: &[&GuardedActions],
    inputs: &ActionInputs,
    motion: &mut RigidBodyMotion,
    data: &mut MotionActionDataMap,
) {
    let previous = std::mem::take(data);
    motion.set_linear_acceleration(Vector3::zeros());
    motion.set_angular_acceleration(Vector3::zeros());
    for guarded in satisfied {
        for action in &guarded.actions {
            action.execute(inputs, &previous, motion, data);
        }
    }
}

/// Weights of the ideal linear and angular velocity for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IdealVelocityImportance {
    /// Weight of the linear velocity.
    pub linear: f64,
    /// Weight of the angular velocity.
    pub angular: f64,
}

impl IdealVelocityImportance {
    /// Importance pair.
    #[must_use]
    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    /// Rescale so that `linear + angular <= 1`.
    pub fn normalise_sum_of_importances_to_range_01(&mut self) {
        let sum = self.linear + self.angular;
        if sum > 1.0 {
            self.linear /= sum;
            self.angular /= sum;
        }
    }
}

/// Append one normalised importance per disjunct.
pub fn compute_importance_of_ideal_velocities_to_guarded_actions(
    guarded_actions: &DisjunctionOfGuardedActions,
    output: &mut Vec<IdealVelocityImportance>,
) {
    output.extend(guarded_actions.disjuncts.iter().map(|d| {
        let mut importance = d.importance();
        importance.normalise_sum_of_importances_to_range_01();
        importance
    }));
}

/// Highest normalised importance over the disjuncts.
#[must_use]
pub fn importance_of_ideal_velocities(
    guarded_actions: &DisjunctionOfGuardedActions,
) -> IdealVelocityImportance {
    let mut all = Vec::with_capacity(guarded_actions.len());
    compute_importance_of_ideal_velocities_to_guarded_actions(guarded_actions, &mut all);
    all.into_iter()
        .fold(IdealVelocityImportance::default(), |acc, i| {
            IdealVelocityImportance::new(acc.linear.max(i.linear), acc.angular.max(i.angular))
        })
}

fn stationary_ranks() -> &'static HashMap<&'static str, u32> {
    static RANKS: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    RANKS.get_or_init(|| {
        all_action_unique_names()
            .iter()
            .map(|&name| {
                let rank = match name {
                    DONT_MOVE => 4,
                    DONT_ROTATE => 2,
                    CHASE_IDEAL_LINEAR_VELOCITY_AFTER_DELAY => 1,
                    _ => 0,
                };
                (name, rank)
            })
            .collect()
    })
}

/// How strongly the named action keeps the agent in place.
///
/// # Panics
///
/// Panics if `name` is not an action unique name.
#[must_use]
pub fn stationary_rank_of_name(name: &str) -> u32 {
    stationary_ranks()
        .get(name)
        .copied()
        .unwrap_or_else(|| panic!("unknown motion action {name}"))
}

/// Stationary rank of an action.
#[must_use]
pub fn stationary_rank_of_action(action: &MotionAction) -> u32 {
    stationary_rank_of_name(action.unique_name())
}

/// Largest summed action rank over the disjuncts.
#[must_use]
pub fn stationary_rank_of_guarded_actions(guarded_actions: &DisjunctionOfGuardedActions) -> u32 {
    guarded_actions
        .disjuncts
        .iter()
        .map(|d| d.actions.iter().map(stationary_rank_of_action).sum::<u32>())
        .max()
        .unwrap_or(0)
}
