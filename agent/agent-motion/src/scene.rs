//! The scene-graph collaborator.
//!
//! The motion core never owns scene nodes. It reads and writes them through
//! the narrow [`Scene`] trait: node frames, the rigid body backing a motion
//! object, its collider, and the collision contacts registered for it.
//!
//! [`SceneGraph`] is a self-contained in-memory implementation. Hosts with a
//! real physics backend implement [`Scene`] on top of their own world.

use agent_types::{Collider, ContactEvent, Frame, NodeId};
use hashbrown::HashMap;
use nalgebra::{Matrix3, Vector3};

/// Narrow interface to the scene graph and its physics backing.
///
/// Every method taking a [`NodeId`] assumes the node exists; passing an
/// unknown id is a broken precondition and implementations may panic.
pub trait Scene {
    /// Frame of the node relative to its parent.
    fn frame_of_node(&self, node: NodeId) -> Frame;

    /// Replace the frame of the node relative to its parent.
    ///
    /// `propagate` asks the scene to push the change to dependent state
    /// (world-space caches, physics bodies) immediately.
    fn set_frame_of_node(&mut self, node: NodeId, propagate: bool, frame: &Frame);

    /// Linear velocity of the rigid body attached to the node.
    fn linear_velocity(&self, node: NodeId) -> Vector3<f64>;

    /// Angular velocity of the rigid body attached to the node.
    fn angular_velocity(&self, node: NodeId) -> Vector3<f64>;

    /// Overwrite the linear velocity of the rigid body.
    fn set_linear_velocity(&mut self, node: NodeId, velocity: &Vector3<f64>);

    /// Overwrite the angular velocity of the rigid body.
    fn set_angular_velocity(&mut self, node: NodeId, velocity: &Vector3<f64>);

    /// Overwrite the linear acceleration of the rigid body.
    fn set_linear_acceleration(&mut self, node: NodeId, acceleration: &Vector3<f64>);

    /// Overwrite the angular acceleration of the rigid body.
    fn set_angular_acceleration(&mut self, node: NodeId, acceleration: &Vector3<f64>);

    /// Set the inverse mass of the rigid body.
    fn set_inverted_mass(&mut self, node: NodeId, inverted_mass: f64);

    /// Set the inverse inertia tensor of the rigid body.
    fn set_inverted_inertia_tensor(&mut self, node: NodeId, inverted_inertia: &Matrix3<f64>);

    /// Attach a collider to the node, replacing any previous one.
    fn insert_collider(&mut self, node: NodeId, collider: &Collider);

    /// Remove the collider of the node, if any.
    fn erase_collider(&mut self, node: NodeId);

    /// Contacts registered for the node's collider since the last physics step.
    fn collision_contacts(&self, node: NodeId) -> Vec<ContactEvent>;
}

/// Rigid body block of a scene node.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyRecord {
    /// Linear velocity (m/s).
    pub linear_velocity: Vector3<f64>,
    /// Angular velocity (rad/s).
    pub angular_velocity: Vector3<f64>,
    /// Linear acceleration (m/s²).
    pub linear_acceleration: Vector3<f64>,
    /// Angular acceleration (rad/s²).
    pub angular_acceleration: Vector3<f64>,
    /// Inverse mass.
    pub inverted_mass: f64,
    /// Inverse inertia tensor.
    pub inverted_inertia_tensor: Matrix3<f64>,
}

impl Default for RigidBodyRecord {
    fn default() -> Self {
        Self {
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            linear_acceleration: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
            inverted_mass: 0.0,
            inverted_inertia_tensor: Matrix3::zeros(),
        }
    }
}

/// One node of the in-memory scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Parent node, `None` for nodes in world space.
    pub parent: Option<NodeId>,
    /// Frame relative to the parent.
    pub frame: Frame,
    /// Rigid body backing the node.
    pub rigid_body: RigidBodyRecord,
    /// Attached collider.
    pub collider: Option<Collider>,
    /// Number of collider insertions so far.
    pub collider_revision: u64,
    /// Contacts waiting to be read.
    pub contacts: Vec<ContactEvent>,
}

impl SceneNode {
    fn new(parent: Option<NodeId>, frame: Frame) -> Self {
        Self {
            parent,
            frame,
            rigid_body: RigidBodyRecord::default(),
            collider: None,
            collider_revision: 0,
            contacts: Vec::new(),
        }
    }
}

/// In-memory scene graph.
///
/// World frames are composed on demand from the parent chain, so the
/// `propagate` flag of [`Scene::set_frame_of_node`] needs no extra work here;
/// the number of propagating writes is still counted for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    next_id: u64,
    propagated_writes: u64,
}

impl SceneGraph {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a node and return its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist.
    pub fn insert_node(&mut self, parent: Option<NodeId>, frame: Frame) -> NodeId {
        if let Some(p) = parent {
            assert!(self.nodes.contains_key(&p), "unknown parent scene node {p}");
        }
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::new(parent, frame));
        id
    }

    /// Remove a node. Children keep a dangling parent id and must be removed too.
    pub fn erase_node(&mut self, node: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&node)
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&node)
    }

    /// Frame of the node in world space.
    ///
    /// # Panics
    ///
    /// Panics if the node or one of its ancestors does not exist.
    #[must_use]
    pub fn world_frame_of_node(&self, node: NodeId) -> Frame {
        let n = self.get(node);
        match n.parent {
            Some(p) => self.world_frame_of_node(p).compose(&n.frame),
            None => n.frame,
        }
    }

    /// Register a contact for the node's collider.
    pub fn push_contact(&mut self, node: NodeId, contact: ContactEvent) {
        self.get_mut(node).contacts.push(contact);
    }

    /// Drop all contacts of the node.
    pub fn clear_contacts(&mut self, node: NodeId) {
        self.get_mut(node).contacts.clear();
    }

    /// Collider currently attached to the node.
    #[must_use]
    pub fn collider(&self, node: NodeId) -> Option<&Collider> {
        self.get(node).collider.as_ref()
    }

    /// How many times a collider was inserted on the node.
    #[must_use]
    pub fn collider_revision(&self, node: NodeId) -> u64 {
        self.get(node).collider_revision
    }

    /// Rigid body block of the node.
    #[must_use]
    pub fn rigid_body(&self, node: NodeId) -> &RigidBodyRecord {
        &self.get(node).rigid_body
    }

    /// Number of frame writes that requested propagation.
    #[must_use]
    pub fn propagated_writes(&self) -> u64 {
        self.propagated_writes
    }

    fn get(&self, node: NodeId) -> &SceneNode {
        self.nodes
            .get(&node)
            .unwrap_or_else(|| panic!("unknown scene node {node}"))
    }

    fn get_mut(&mut self, node: NodeId) -> &mut SceneNode {
        self.nodes
            .get_mut(&node)
            .unwrap_or_else(|| panic!("unknown scene node {node}"))
    }
}

impl Scene for SceneGraph {
    fn frame_of_node(&self, node: NodeId) -> Frame {
        self.get(node).frame
    }

    fn set_frame_of_node(&mut self, node: NodeId, propagate: bool, frame: &Frame) {
        self.get_mut(node).frame = *frame;
        if propagate {
            self.propagated_writes += 1;
        }
    }

    fn linear_velocity(&self, node: NodeId) -> Vector3<f64> {
        self.get(node).rigid_body.linear_velocity
    }

    fn angular_velocity(&self, node: NodeId) -> Vector3<f64> {
        self.get(node).rigid_body.angular_velocity
    }

    fn set_linear_velocity(&mut self, node: NodeId, velocity: &Vector3<f64>) {
        self.get_mut(node).rigid_body.linear_velocity = *velocity;
    }

    fn set_angular_velocity(&mut self, node: NodeId, velocity: &Vector3<f64>) {
        self.get_mut(node).rigid_body.angular_velocity = *velocity;
    }

    fn set_linear_acceleration(&mut self, node: NodeId, acceleration: &Vector3<f64>) {
        self.get_mut(node).rigid_body.linear_acceleration = *acceleration;
    }

    fn set_angular_acceleration(&mut self, node: NodeId, acceleration: &Vector3<f64>) {
        self.get_mut(node).rigid_body.angular_acceleration = *acceleration;
    }

    fn set_inverted_mass(&mut self, node: NodeId, inverted_mass: f64) {
        self.get_mut(node).rigid_body.inverted_mass = inverted_mass;
    }

    fn set_inverted_inertia_tensor(&mut self, node: NodeId, inverted_inertia: &Matrix3<f64>) {
        self.get_mut(node).rigid_body.inverted_inertia_tensor = *inverted_inertia;
    }

    fn insert_collider(&mut self, node: NodeId, collider: &Collider) {
        let n = self.get_mut(node);
        n.collider = Some(*collider);
        n.collider_revision += 1;
    }

    fn erase_collider(&mut self, node: NodeId) {
        self.get_mut(node).collider = None;
    }

    fn collision_contacts(&self, node: NodeId) -> Vec<ContactEvent> {
        self.get(node).contacts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_world_frame_composes_parents() {
        let mut scene = SceneGraph::new();
        let root = scene.insert_node(None, Frame::from_origin(Vector3::new(1.0, 0.0, 0.0)));
        let child = scene.insert_node(Some(root), Frame::from_origin(Vector3::new(0.0, 2.0, 0.0)));
        let world = scene.world_frame_of_node(child);
        assert_relative_eq!(world.origin, Vector3::new(1.0, 2.0, 0.0), epsilon = 1e-12);
        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn test_collider_revision_counts_insertions() {
        let mut scene = SceneGraph::new();
        let n = scene.insert_node(None, Frame::identity());
        assert_eq!(scene.collider_revision(n), 0);
        scene.insert_collider(n, &Collider::sphere(1.0));
        scene.insert_collider(n, &Collider::sphere(2.0));
        assert_eq!(scene.collider_revision(n), 2);
        assert_eq!(scene.collider(n), Some(&Collider::sphere(2.0)));
        scene.erase_collider(n);
        assert!(scene.collider(n).is_none());
    }

    #[test]
    fn test_contacts_round_trip() {
        let mut scene = SceneGraph::new();
        let n = scene.insert_node(None, Frame::identity());
        assert!(scene.collision_contacts(n).is_empty());
        scene.push_contact(n, ContactEvent::with_floor(Vector3::zeros()));
        assert_eq!(scene.collision_contacts(n).len(), 1);
        scene.clear_contacts(n);
        assert!(scene.collision_contacts(n).is_empty());
    }

    #[test]
    fn test_propagation_is_counted() {
        let mut scene = SceneGraph::new();
        let n = scene.insert_node(None, Frame::identity());
        scene.set_frame_of_node(n, false, &Frame::identity());
        scene.set_frame_of_node(n, true, &Frame::identity());
        assert_eq!(scene.propagated_writes(), 1);
    }

    #[test]
    #[should_panic(expected = "unknown scene node")]
    fn test_unknown_node_panics() {
        let scene = SceneGraph::new();
        let _ = scene.frame_of_node(NodeId::new(42));
    }
}
