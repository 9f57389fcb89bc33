//! Property-based tests for the timing, desire and guard primitives.
//!
//! These check laws that must hold for arbitrary inputs rather than
//! hand-picked cases.

use agent_motion::{
    Comparison, ContactEvent, DisjunctionOfGuardedActions, GuardedActions, InterpolatorTime,
    MotionAction, MotionDesireProps, MotionGuard, RigidBodyMotion,
    satisfied_motion_guarded_actions,
};
use agent_types::{DESIRE_VECTOR_SIZE, DesireField, Gravity};
use nalgebra::Vector3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_comparison() -> impl Strategy<Value = Comparison> {
    prop_oneof![
        Just(Comparison::Less),
        Just(Comparison::LessOrEqual),
        Just(Comparison::Greater),
        Just(Comparison::GreaterOrEqual),
    ]
}

fn arb_guard() -> impl Strategy<Value = MotionGuard> {
    prop_oneof![
        Just(MotionGuard::Always),
        Just(MotionGuard::HasAnyContact),
        Just(MotionGuard::NoContact),
        (0.0..std::f64::consts::PI).prop_map(|max_angle| MotionGuard::ContactNormalInCone {
            unit_axis: Vector3::z(),
            max_angle,
        }),
        (arb_comparison(), 0.0..3.0).prop_map(|(comparison, threshold)| {
            MotionGuard::LinearSpeed {
                comparison,
                threshold,
            }
        }),
        (0..DESIRE_VECTOR_SIZE, arb_comparison(), -1.0..1.0).prop_map(
            |(i, comparison, threshold)| MotionGuard::Desire {
                field: DesireField::ALL[i],
                comparison,
                threshold,
            }
        ),
        (0.0..std::f64::consts::PI).prop_map(|max_angle| MotionGuard::GravityAlignment { max_angle }),
    ]
}

fn arb_disjunction() -> impl Strategy<Value = DisjunctionOfGuardedActions> {
    prop::collection::vec(prop::collection::vec(arb_guard(), 0..4), 1..5).prop_map(|disjuncts| {
        DisjunctionOfGuardedActions::new(
            disjuncts
                .into_iter()
                .map(|guards| GuardedActions::new(guards, vec![MotionAction::DontMove]))
                .collect(),
        )
    })
}

fn arb_desire_vector(bound: f64) -> impl Strategy<Value = [f64; DESIRE_VECTOR_SIZE]> {
    prop::array::uniform15(-bound..bound)
}

fn arb_raw_component() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -10.0..10.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

// =============================================================================
// Interpolator time
// =============================================================================

proptest! {
    #[test]
    fn interpolation_parameter_is_monotone_and_bounded(
        total in 0.0..5.0,
        steps in prop::collection::vec(0.0..0.5, 1..40),
    ) {
        let mut time = InterpolatorTime::new(total);
        let mut last = time.interpolation_parameter();
        prop_assert!((0.0..=1.0).contains(&last));
        for dt in steps {
            let leftover = time.add_time(dt);
            let p = time.interpolation_parameter();
            prop_assert!((0.0..=1.0).contains(&p));
            prop_assert!(p >= last);
            prop_assert!(leftover >= 0.0);
            if leftover > 0.0 {
                prop_assert!(time.done());
            }
            last = p;
        }
        if time.consumed_time() >= time.total_time() {
            prop_assert!((time.interpolation_parameter() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn added_time_is_conserved(total in 0.0..5.0, dt in 0.0..10.0) {
        let mut time = InterpolatorTime::new(total);
        let leftover = time.add_time(dt);
        prop_assert!((time.consumed_time() + leftover - dt).abs() < 1e-9);
    }

    #[test]
    fn degenerate_interpolation_is_done_immediately(total in 0.0..1.0e-4) {
        let time = InterpolatorTime::new(total);
        prop_assert!(time.done());
        prop_assert!((time.interpolation_parameter() - 1.0).abs() < f64::EPSILON);
    }
}

// =============================================================================
// Desire
// =============================================================================

proptest! {
    #[test]
    fn from_vector_clips_every_slot(v in prop::array::uniform15(arb_raw_component())) {
        let desire = MotionDesireProps::from_vector(&v);
        for (x, raw) in desire.as_vector().into_iter().zip(v) {
            prop_assert!((-1.0..=1.0).contains(&x));
            if raw.is_nan() {
                prop_assert_eq!(x, 0.0);
            } else {
                prop_assert_eq!(x, raw.clamp(-1.0, 1.0));
            }
        }
        prop_assert_eq!(desire.clipped(), desire);
    }

    #[test]
    fn in_range_desire_survives_the_vector_form(v in arb_desire_vector(1.0)) {
        let desire = MotionDesireProps::from_vector(&v);
        prop_assert_eq!(desire.as_vector(), v);
        prop_assert_eq!(desire.clipped(), desire);
    }
}

// =============================================================================
// Guards
// =============================================================================

proptest! {
    #[test]
    fn short_circuit_and_collecting_evaluation_agree(
        disjunction in arb_disjunction(),
        touching in any::<bool>(),
        speed in 0.0..3.0,
        v in arb_desire_vector(1.0),
    ) {
        let contacts = if touching {
            vec![ContactEvent::with_floor(Vector3::zeros())]
        } else {
            Vec::new()
        };
        let mut motion = RigidBodyMotion::default();
        motion.velocity.linear = Vector3::new(0.0, speed, 0.0);
        let desire = MotionDesireProps::from_vector(&v);
        let gravity = Gravity::earth();

        let fast = satisfied_motion_guarded_actions(
            &disjunction, &contacts, &motion, &desire, &gravity, None,
        );
        let mut satisfied = Vec::new();
        let full = satisfied_motion_guarded_actions(
            &disjunction, &contacts, &motion, &desire, &gravity, Some(&mut satisfied),
        );
        prop_assert_eq!(fast, full);
        prop_assert_eq!(full, !satisfied.is_empty());
        for guarded in satisfied {
            prop_assert!(guarded.is_satisfied(&contacts, &motion, &desire, &gravity));
        }
    }
}
