//! Ideal velocity of a walked keyframe path.
//!
//! The path is stored as pairs of cursors. Each pair `(a, b)` is one forward
//! run through a single motion; the gap between `b` and the next `a` is a hop
//! (a transition into another motion, or a loop back to an earlier keyframe)
//! that moves nothing but costs its transition time.

use crate::templates::{MotionTemplateCursor, SkeletalMotionTemplates};
use agent_types::{Frame, VelocityPair};

const MIN_PATH_TIME: f64 = 1.0e-4;

/// Accumulates the keyframe path walked since the last reset.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealVelocityBuilder {
    path: Vec<MotionTemplateCursor>,
    time: f64,
}

impl IdealVelocityBuilder {
    /// Builder whose path starts at `start`.
    #[must_use]
    pub fn new(start: MotionTemplateCursor) -> Self {
        Self {
            path: vec![start],
            time: 0.0,
        }
    }

    /// Restart the path at `start`.
    pub fn reset(&mut self, start: MotionTemplateCursor) {
        self.path.clear();
        self.path.push(start);
        self.time = 0.0;
    }

    /// The path so far.
    #[must_use]
    pub fn path(&self) -> &[MotionTemplateCursor] {
        &self.path
    }

    /// Accumulated hop time (seconds).
    #[must_use]
    pub fn hop_time(&self) -> f64 {
        self.time
    }

    /// Append `cursor` to the path.
    ///
    /// Progress to a later keyframe of the last cursor's motion merges into
    /// the current run. Anything else, a loop back onto the same keyframe
    /// included, opens a new run and adds `transition_time`.
    pub fn extend(&mut self, cursor: MotionTemplateCursor, transition_time: f64) {
        let Some(last) = self.path.last().cloned() else {
            self.path.push(cursor);
            return;
        };
        let forward = cursor.same_motion(&last) && cursor.keyframe_index > last.keyframe_index;
        if self.path.len() % 2 == 1 {
            if !forward {
                self.path.push(last);
                self.time += transition_time;
            }
            self.path.push(cursor);
        } else if forward {
            if let Some(end) = self.path.last_mut() {
                *end = cursor;
            }
        } else {
            self.path.push(cursor);
            self.time += transition_time;
        }
    }

    /// Make the path length even by closing the open run on its last cursor.
    pub fn close(&mut self) {
        if self.path.len() % 2 == 1 {
            if let Some(last) = self.path.last().cloned() {
                self.path.push(last);
            }
        }
    }

    /// Hop time plus the keyframe time spanned by every run.
    ///
    /// # Panics
    ///
    /// Panics if a cursor does not address a keyframe of `templates`.
    #[must_use]
    pub fn total_time(&self, templates: &SkeletalMotionTemplates) -> f64 {
        self.path
            .chunks(2)
            .filter(|run| run.len() == 2)
            .map(|run| templates.keyframe(&run[1]).time_point - templates.keyframe(&run[0]).time_point)
            .sum::<f64>()
            + self.time
    }

    /// Motion-object displacement of the whole path, in the start frame.
    ///
    /// # Panics
    ///
    /// Panics if a cursor does not address a keyframe of `templates`.
    #[must_use]
    pub fn displacement(&self, templates: &SkeletalMotionTemplates) -> Frame {
        self.path
            .chunks(2)
            .filter(|run| run.len() == 2)
            .fold(Frame::identity(), |net, run| {
                let from = templates.reference_frame(&run[0]);
                let to = templates.reference_frame(&run[1]);
                net.compose(&from.inverse().compose(to))
            })
    }

    /// Close the path and turn it into world-space velocities.
    ///
    /// `frame` is the motion-object frame the path starts from.
    ///
    /// # Panics
    ///
    /// Panics if the path takes no time; a path that was never extended
    /// always does.
    #[must_use]
    pub fn close_with_velocities(
        &mut self,
        templates: &SkeletalMotionTemplates,
        frame: &Frame,
    ) -> VelocityPair {
        self.close();
        let time = self.total_time(templates);
        assert!(
            time > MIN_PATH_TIME,
            "ideal velocity path takes no time ({time} s)"
        );
        let net = self.displacement(templates);
        VelocityPair::new(
            frame.transform_vector(&net.origin) / time,
            frame.transform_vector(&net.orientation.scaled_axis()) / time,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guarded_actions::{DisjunctionOfGuardedActions, GuardedActions, MotionAction};
    use crate::templates::{Keyframe, MotionTemplate, SkeletonHierarchy};
    use agent_types::{Collider, MassDistribution, Matter};
    use approx::assert_relative_eq;
    use nalgebra::{UnitQuaternion, Vector3};

    fn cursor(name: &str, k: usize) -> MotionTemplateCursor {
        MotionTemplateCursor::new(name, k)
    }

    /// "walk" moves 0.5 m forward per keyframe, "turn" rotates 90° in 1 s,
    /// "idle" is a single keyframe looping onto itself.
    fn templates() -> SkeletalMotionTemplates {
        let matter = Matter::new(Collider::sphere(0.3), MassDistribution::sphere(50.0, 0.3));
        let ga = || -> DisjunctionOfGuardedActions {
            GuardedActions::always(vec![MotionAction::DontMove]).into()
        };
        let mut walk = MotionTemplate::new();
        for k in 0..3 {
            walk = walk.keyframe(
                Keyframe::rest(0.5 * k as f64, 1),
                Frame::from_origin(Vector3::new(0.0, 0.5 * k as f64, 0.0)),
                matter,
                ga(),
            );
        }
        let turn = MotionTemplate::new()
            .keyframe(Keyframe::rest(0.0, 1), Frame::identity(), matter, ga())
            .keyframe(
                Keyframe::rest(1.0, 1),
                Frame::new(
                    Vector3::zeros(),
                    UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
                ),
                matter,
                ga(),
            );
        SkeletalMotionTemplates::builder(SkeletonHierarchy::new(vec![None]), vec![Frame::identity()])
            .motion("walk", walk)
            .motion("turn", turn)
            .motion(
                "idle",
                MotionTemplate::new().keyframe(Keyframe::rest(0.0, 1), Frame::identity(), matter, ga()),
            )
            .cyclic("walk")
            .cyclic("idle")
            .successor("walk", cursor("turn", 0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_forward_progress_merges() {
        let mut b = IdealVelocityBuilder::new(cursor("walk", 0));
        b.extend(cursor("walk", 1), 0.5);
        b.extend(cursor("walk", 2), 0.5);
        assert_eq!(b.path(), &[cursor("walk", 0), cursor("walk", 2)]);
        assert_eq!(b.hop_time(), 0.0);
    }

    #[test]
    fn test_hop_opens_new_run() {
        let mut b = IdealVelocityBuilder::new(cursor("walk", 1));
        b.extend(cursor("walk", 2), 0.5);
        b.extend(cursor("walk", 0), 0.2);
        b.extend(cursor("walk", 1), 0.5);
        assert_eq!(
            b.path(),
            &[cursor("walk", 1), cursor("walk", 2), cursor("walk", 0), cursor("walk", 1)]
        );
        assert_relative_eq!(b.hop_time(), 0.2);

        let mut b = IdealVelocityBuilder::new(cursor("walk", 2));
        b.extend(cursor("turn", 0), 0.3);
        assert_eq!(
            b.path(),
            &[cursor("walk", 2), cursor("walk", 2), cursor("turn", 0)]
        );
        b.close();
        assert_eq!(b.path().len(), 4);
    }

    #[test]
    fn test_linear_velocity_of_walk() {
        let t = templates();
        let mut b = IdealVelocityBuilder::new(cursor("walk", 0));
        b.extend(cursor("walk", 2), 1.0);
        let v = b.close_with_velocities(&t, &Frame::identity());
        assert_relative_eq!(v.linear, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(v.angular, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_is_expressed_in_world_space() {
        let t = templates();
        let mut b = IdealVelocityBuilder::new(cursor("walk", 0));
        b.extend(cursor("walk", 1), 0.5);
        let facing_left = Frame::new(
            Vector3::new(5.0, 5.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        );
        let v = b.close_with_velocities(&t, &facing_left);
        assert_relative_eq!(v.linear, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_hop_time_dilutes_velocity() {
        let t = templates();
        let mut b = IdealVelocityBuilder::new(cursor("walk", 1));
        b.extend(cursor("walk", 2), 0.5);
        b.extend(cursor("turn", 0), 0.5);
        b.extend(cursor("turn", 1), 1.0);
        assert_relative_eq!(b.total_time(&t), 0.5 + 0.5 + 1.0);
        let v = b.close_with_velocities(&t, &Frame::identity());
        assert_relative_eq!(v.linear, Vector3::new(0.0, 0.25, 0.0), epsilon = 1e-12);
        assert_relative_eq!(
            v.angular,
            Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2 / 2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_single_keyframe_loop_is_a_hop() {
        let t = templates();
        let idle = cursor("idle", 0);
        let next = t.next_cursors(&idle)[0].clone();
        assert_eq!(next, idle);
        let duration = t.transition_duration(&idle, &next, 0.25);
        assert_relative_eq!(duration, 0.25);

        let mut b = IdealVelocityBuilder::new(idle.clone());
        b.extend(next, duration);
        assert_eq!(b.path(), &[idle.clone(), idle.clone(), idle]);
        assert_relative_eq!(b.hop_time(), 0.25);
        assert_relative_eq!(b.total_time(&t), 0.25);
        let v = b.close_with_velocities(&t, &Frame::identity());
        assert_relative_eq!(v.linear, Vector3::zeros(), epsilon = 1e-12);
        assert_relative_eq!(v.angular, Vector3::zeros(), epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "takes no time")]
    fn test_lone_cursor_panics() {
        let t = templates();
        let mut b = IdealVelocityBuilder::new(cursor("walk", 0));
        let _ = b.close_with_velocities(&t, &Frame::identity());
    }
}
