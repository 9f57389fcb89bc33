//! Collider and mass interpolation of the motion object.
//!
//! In inverted centre-offset mode the bottom of the collider is blended
//! instead of its centre, so the contact point with the ground stays put
//! while the collider changes height.

use crate::rigid_body_motion::RigidBodyMotion;
use crate::scene::Scene;
use agent_types::{Matter, NodeId};

/// Blends the matter of the motion object between two keyframes.
#[derive(Debug, Clone, PartialEq)]
pub struct MatterInterpolator {
    src: Matter,
    current: Matter,
    dst: Matter,
    committed: Option<Matter>,
    use_inverted_collider_center_offset_interpolation: bool,
}

impl MatterInterpolator {
    /// Interpolator resting at `matter`; nothing is committed yet.
    #[must_use]
    pub fn new(matter: Matter, use_inverted_collider_center_offset_interpolation: bool) -> Self {
        Self {
            src: matter,
            current: matter,
            dst: matter,
            committed: None,
            use_inverted_collider_center_offset_interpolation,
        }
    }

    /// Start blending from the current matter to `matter`.
    pub fn set_target(&mut self, matter: Matter) {
        self.src = self.current;
        self.dst = matter;
    }

    /// Blend source and destination at `interpolation_param`.
    ///
    /// The destination is taken verbatim once the parameter reaches 1.
    pub fn next_round(&mut self, interpolation_param: f64) {
        if self.src == self.dst || interpolation_param >= 1.0 {
            self.current = self.dst;
            return;
        }
        let mut blended = self.src.interpolate(&self.dst, interpolation_param);
        if self.use_inverted_collider_center_offset_interpolation {
            let t = interpolation_param.clamp(0.0, 1.0);
            let src_bottom = self.src.center_offset.z - self.src.collider.half_height();
            let dst_bottom = self.dst.center_offset.z - self.dst.collider.half_height();
            let bottom = src_bottom + (dst_bottom - src_bottom) * t;
            blended.center_offset.z = bottom + blended.collider.half_height();
        }
        self.current = blended;
    }

    /// Matter at the start of the blend.
    #[must_use]
    pub fn src(&self) -> &Matter {
        &self.src
    }

    /// Current matter.
    #[must_use]
    pub fn current(&self) -> &Matter {
        &self.current
    }

    /// Matter at the end of the blend.
    #[must_use]
    pub fn dst(&self) -> &Matter {
        &self.dst
    }

    /// Whether the current matter differs from the last committed one.
    #[must_use]
    pub fn is_matter_changed(&self) -> bool {
        self.committed != Some(self.current)
    }

    /// Push changed matter to the scene and the motion object.
    ///
    /// Re-inserts the collider, copies the inverse mass and inertia into
    /// `motion`, and moves the motion object by the change of the collider
    /// centre offset so the skeleton stays in place. Returns whether anything
    /// was written.
    pub fn commit<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        node: NodeId,
        motion: &mut RigidBodyMotion,
    ) -> bool {
        if !self.is_matter_changed() {
            return false;
        }
        scene.insert_collider(node, &self.current.collider);
        motion.set_inverted_mass(&self.current.mass_distribution);
        motion.set_inverted_inertia_tensor(&self.current.mass_distribution);
        if let Some(previous) = &self.committed {
            let shift = self.current.center_offset - previous.center_offset;
            motion.frame.origin += motion.frame.transform_vector(&shift);
        }
        self.committed = Some(self.current);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneGraph;
    use agent_types::{Collider, Frame, MassDistribution};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn crouch() -> Matter {
        Matter::new(Collider::capsule(0.2, 0.4), MassDistribution::capsule(80.0, 0.2, 0.4))
            .with_center_offset(Vector3::new(0.0, 0.0, 0.6))
    }

    fn stand() -> Matter {
        Matter::new(Collider::capsule(0.6, 0.3), MassDistribution::capsule(70.0, 0.6, 0.3))
            .with_center_offset(Vector3::new(0.0, 0.0, 0.9))
    }

    #[test]
    fn test_inverted_mode_keeps_bottom() {
        let mut m = MatterInterpolator::new(crouch(), true);
        m.set_target(stand());
        for p in [0.0, 0.3, 0.7, 1.0] {
            m.next_round(p);
            let bottom = m.current().center_offset.z - m.current().collider.half_height();
            assert_relative_eq!(bottom, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_plain_mode_blends_centre() {
        let mut m = MatterInterpolator::new(crouch(), false);
        m.set_target(stand());
        m.next_round(0.5);
        assert_relative_eq!(m.current().center_offset.z, 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_finished_blend_lands_on_destination() {
        let mut m = MatterInterpolator::new(crouch(), true);
        m.set_target(stand());
        m.next_round(0.5);
        m.next_round(1.0);
        assert_eq!(m.current(), &stand());

        m.set_target(stand());
        assert_eq!(m.src(), m.dst());
    }

    #[test]
    fn test_commit_only_on_change() {
        let mut scene = SceneGraph::new();
        let node = scene.insert_node(None, Frame::identity());
        let mut motion = RigidBodyMotion::default();
        let mut m = MatterInterpolator::new(crouch(), true);

        assert!(m.is_matter_changed());
        assert!(m.commit(&mut scene, node, &mut motion));
        assert!(!m.is_matter_changed());
        assert!(!m.commit(&mut scene, node, &mut motion));
        assert_eq!(scene.collider_revision(node), 1);
        assert_relative_eq!(motion.inverted_mass, 1.0 / 80.0);

        m.set_target(stand());
        m.next_round(0.5);
        assert!(m.is_matter_changed());
        assert!(m.commit(&mut scene, node, &mut motion));
        assert_eq!(scene.collider_revision(node), 2);
        assert!(motion.inverted_mass > 1.0 / 80.0 && motion.inverted_mass < 1.0 / 70.0);
        assert_relative_eq!(
            motion.frame.origin.z,
            m.current().center_offset.z - 0.6,
            epsilon = 1e-12
        );
    }
}
