//! Physical state of an agent's motion object and its integrator.
//!
//! The motion object is the invisible collider that carries an agent
//! through the world. Guarded actions write its accelerations, the
//! integrator advances it, and `commit*` pushes the result to the scene.
//!
//! # Integration
//!
//! ```text
//! v(t+dt) = v(t) + dt * a(t)
//! x(t+dt) = x(t) + dt * v(t+dt)
//! q(t+dt) = normalise(q(t) + dt * 0.5 * (ω(t+dt) * q(t)))
//! ```
//!
//! where `ω` is the angular velocity as a pure quaternion.

use crate::scene::Scene;
use agent_types::{Frame, MassDistribution, NodeId, VelocityPair};
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which local axes of a template's animation space are "forward" and "up".
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnimSpaceDirections {
    /// Local forward axis.
    pub forward: Vector3<f64>,
    /// Local up axis.
    pub up: Vector3<f64>,
}

impl Default for AnimSpaceDirections {
    fn default() -> Self {
        Self {
            forward: Vector3::y(),
            up: Vector3::z(),
        }
    }
}

/// Frame, velocities, accelerations and cached inverse mass of a motion object.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyMotion {
    /// World-space frame.
    pub frame: Frame,
    /// Intended facing, unit, world space.
    pub forward: Vector3<f64>,
    /// Intended up direction, unit, world space.
    pub up: Vector3<f64>,
    /// Linear and angular velocity.
    pub velocity: VelocityPair,
    /// Linear and angular acceleration.
    pub acceleration: VelocityPair,
    /// Cached inverse mass, zero for immovable objects.
    pub inverted_mass: f64,
    /// Cached inverse inertia tensor.
    pub inverted_inertia_tensor: Matrix3<f64>,
}

impl Default for RigidBodyMotion {
    fn default() -> Self {
        Self::new(Frame::identity(), &AnimSpaceDirections::default())
    }
}

impl RigidBodyMotion {
    /// Motion object at rest with infinite mass.
    #[must_use]
    pub fn new(frame: Frame, directions: &AnimSpaceDirections) -> Self {
        Self {
            frame,
            forward: frame.transform_vector(&directions.forward),
            up: frame.transform_vector(&directions.up),
            velocity: VelocityPair::zero(),
            acceleration: VelocityPair::zero(),
            inverted_mass: 0.0,
            inverted_inertia_tensor: Matrix3::zeros(),
        }
    }

    /// Copy the cached inverses from a mass distribution.
    #[must_use]
    pub fn with_mass_distribution(mut self, mass_distribution: &MassDistribution) -> Self {
        self.set_inverted_mass(mass_distribution);
        self.set_inverted_inertia_tensor(mass_distribution);
        self
    }

    /// Overwrite the linear acceleration.
    pub fn set_linear_acceleration(&mut self, acceleration: Vector3<f64>) {
        self.acceleration.linear = acceleration;
    }

    /// Overwrite the angular acceleration.
    pub fn set_angular_acceleration(&mut self, acceleration: Vector3<f64>) {
        self.acceleration.angular = acceleration;
    }

    /// Copy the inverse mass of the distribution.
    pub fn set_inverted_mass(&mut self, mass_distribution: &MassDistribution) {
        self.inverted_mass = mass_distribution.inverted_mass;
    }

    /// Copy the inverse inertia tensor of the distribution.
    pub fn set_inverted_inertia_tensor(&mut self, mass_distribution: &MassDistribution) {
        self.inverted_inertia_tensor = mass_distribution.inverted_inertia_tensor;
    }

    /// Pull the frame from the scene and re-derive `forward` and `up` from it.
    pub fn update_frame_with_forward_and_up_directions<S: Scene + ?Sized>(
        &mut self,
        scene: &S,
        node: NodeId,
        directions: &AnimSpaceDirections,
    ) {
        self.frame = scene.frame_of_node(node);
        self.forward = self.frame.transform_vector(&directions.forward);
        self.up = self.frame.transform_vector(&directions.up);
    }

    /// Pull the linear velocity from the scene's rigid body.
    pub fn update_linear_velocity<S: Scene + ?Sized>(&mut self, scene: &S, node: NodeId) {
        self.velocity.linear = scene.linear_velocity(node);
    }

    /// Pull the angular velocity from the scene's rigid body.
    pub fn update_angular_velocity<S: Scene + ?Sized>(&mut self, scene: &S, node: NodeId) {
        self.velocity.angular = scene.angular_velocity(node);
    }

    /// Advance velocity, origin and orientation by `dt`.
    ///
    /// `forward` and `up` are carried along by the orientation change of
    /// this step.
    pub fn integrate(&mut self, dt: f64) {
        self.velocity.linear += dt * self.acceleration.linear;
        self.velocity.angular += dt * self.acceleration.angular;

        self.frame.origin += dt * self.velocity.linear;

        let old_orientation = self.frame.orientation;
        let q = old_orientation.into_inner();
        let omega = Quaternion::from_imag(self.velocity.angular);
        self.frame.orientation = UnitQuaternion::new_normalize(q + (omega * q) * (0.5 * dt));

        let delta = self.frame.orientation * old_orientation.inverse();
        self.forward = delta * self.forward;
        self.up = delta * self.up;
    }

    /// Push the frame to the scene node.
    pub fn commit_frame<S: Scene + ?Sized>(&self, scene: &mut S, node: NodeId) {
        scene.set_frame_of_node(node, true, &self.frame);
    }

    /// Push the velocities to the scene's rigid body.
    pub fn commit_velocities<S: Scene + ?Sized>(&self, scene: &mut S, node: NodeId) {
        scene.set_linear_velocity(node, &self.velocity.linear);
        scene.set_angular_velocity(node, &self.velocity.angular);
    }

    /// Push the accelerations to the scene's rigid body.
    pub fn commit_accelerations<S: Scene + ?Sized>(&self, scene: &mut S, node: NodeId) {
        scene.set_linear_acceleration(node, &self.acceleration.linear);
        scene.set_angular_acceleration(node, &self.acceleration.angular);
    }

    /// Push the cached inverse mass and inertia to the scene's rigid body.
    pub fn commit_mass<S: Scene + ?Sized>(&self, scene: &mut S, node: NodeId) {
        scene.set_inverted_mass(node, self.inverted_mass);
        scene.set_inverted_inertia_tensor(node, &self.inverted_inertia_tensor);
    }

    /// Push everything to the scene.
    pub fn commit<S: Scene + ?Sized>(&self, scene: &mut S, node: NodeId) {
        self.commit_frame(scene, node);
        self.commit_velocities(scene, node);
        self.commit_accelerations(scene, node);
        self.commit_mass(scene, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use approx::assert_relative_eq;

    fn moving_body() -> RigidBodyMotion {
        let mut rb = RigidBodyMotion::default();
        rb.velocity = VelocityPair::new(Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.5));
        rb.set_linear_acceleration(Vector3::new(0.0, 2.0, 0.0));
        rb.set_angular_acceleration(Vector3::new(0.0, 0.0, 0.1));
        rb
    }

    #[test]
    fn test_integrate_matches_formulas() {
        let dt = 0.1;
        let mut rb = moving_body();
        rb.integrate(dt);

        let v = Vector3::new(1.0, 0.2, 0.0);
        assert_relative_eq!(rb.velocity.linear, v, epsilon = 1e-12);
        assert_relative_eq!(rb.frame.origin, v * dt, epsilon = 1e-12);

        let w = Quaternion::from_imag(Vector3::new(0.0, 0.0, 0.51));
        let q = Quaternion::identity();
        let expected = UnitQuaternion::new_normalize(q + (w * q) * (0.5 * dt));
        assert_relative_eq!(rb.frame.orientation, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_integrate_is_deterministic() {
        let mut a = moving_body();
        let mut b = moving_body();
        for _ in 0..100 {
            a.integrate(1.0 / 60.0);
            b.integrate(1.0 / 60.0);
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_accelerations_overwrite() {
        let mut rb = RigidBodyMotion::default();
        rb.set_linear_acceleration(Vector3::new(1.0, 0.0, 0.0));
        rb.set_linear_acceleration(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(rb.acceleration.linear, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_forward_follows_rotation() {
        let mut rb = RigidBodyMotion::default();
        rb.velocity.angular = Vector3::new(0.0, 0.0, 1.0);
        for _ in 0..60 {
            rb.integrate(1.0 / 60.0);
        }
        // Turning counter-clockwise around Z swings +Y towards -X.
        assert!(rb.forward.x < -0.5);
        assert_relative_eq!(rb.forward.norm(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(rb.up, Vector3::z(), epsilon = 1e-9);
    }

    #[test]
    fn test_mass_distribution_copy() {
        let md = MassDistribution::sphere(4.0, 0.5);
        let rb = RigidBodyMotion::default().with_mass_distribution(&md);
        assert_relative_eq!(rb.inverted_mass, 0.25, epsilon = 1e-12);
        assert_eq!(rb.inverted_inertia_tensor, md.inverted_inertia_tensor);
    }

    #[test]
    fn test_commit_and_update_round_trip() {
        let mut scene = SceneGraph::new();
        let node = scene.insert_node(None, Frame::identity());
        let mut rb = moving_body().with_mass_distribution(&MassDistribution::sphere(2.0, 1.0));
        rb.integrate(0.5);
        rb.commit(&mut scene, node);

        assert_eq!(scene.frame_of_node(node), rb.frame);
        assert_eq!(scene.rigid_body(node).linear_acceleration, rb.acceleration.linear);
        assert_relative_eq!(scene.rigid_body(node).inverted_mass, 0.5, epsilon = 1e-12);

        // An external solver changes the velocity; pulling it back picks that up.
        scene.set_linear_velocity(node, &Vector3::new(0.0, 0.0, 3.0));
        rb.update_linear_velocity(&scene, node);
        rb.update_angular_velocity(&scene, node);
        assert_eq!(rb.velocity.linear, Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(rb.velocity.angular, scene.angular_velocity(node));
    }

    #[test]
    fn test_update_frame_with_directions() {
        let mut scene = SceneGraph::new();
        let frame = Frame::new(
            Vector3::new(0.0, 0.0, 1.0),
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2),
        );
        let node = scene.insert_node(None, frame);
        let mut rb = RigidBodyMotion::default();
        rb.update_frame_with_forward_and_up_directions(&scene, node, &AnimSpaceDirections::default());
        assert_eq!(rb.frame, frame);
        assert_relative_eq!(rb.forward, -Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(rb.up, Vector3::z(), epsilon = 1e-12);
    }
}
