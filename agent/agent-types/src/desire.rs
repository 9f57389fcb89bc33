//! Normalised description of what an agent wants to do.
//!
//! Every field lies in `[-1, 1]`. The flat vector layout is shared with the
//! neural encoders, so the order of [`DesireField`] must never change.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of scalars in the flat desire vector.
pub const DESIRE_VECTOR_SIZE: usize = 15;

/// Desired motion of the agent's body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Move {
    /// Forward (+) or backward (−).
    pub forward: f64,
    /// Left (+) or right (−).
    pub left: f64,
    /// Up (+) or down (−).
    pub up: f64,
    /// Counter-clockwise (+) or clockwise (−) turn around the up axis.
    pub turn_ccw: f64,
}

/// A closed interval of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval {
    /// Start.
    pub head: f64,
    /// End.
    pub tail: f64,
}

/// Sign of a gesture with its intensity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GuestureSign {
    /// Start.
    pub head: f64,
    /// End.
    pub tail: f64,
    /// How strongly the sign is shown.
    pub intensity: f64,
}

/// A gesture: which body part shows which sign.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Guesture {
    /// Body part performing the gesture.
    pub subject: Interval,
    /// The sign shown.
    pub sign: GuestureSign,
}

/// A direction in agent-local spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Direction {
    /// Angle around the up axis, normalised.
    pub longitude: f64,
    /// Angle above the horizontal plane, normalised.
    pub altitude: f64,
    /// Distance or strength, normalised.
    pub magnitude: f64,
}

/// The complete desire of one agent for one round.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionDesireProps {
    /// Body motion.
    #[cfg_attr(feature = "serde", serde(rename = "move"))]
    pub move_: Move,
    /// Gesture.
    pub guesture: Guesture,
    /// Where to look.
    pub look_at: Direction,
    /// Where to aim.
    pub aim_at: Direction,
}

/// One slot of the flat desire vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[allow(missing_docs)]
pub enum DesireField {
    MoveForward,
    MoveLeft,
    MoveUp,
    MoveTurnCcw,
    GuestureSubjectHead,
    GuestureSubjectTail,
    GuestureSignHead,
    GuestureSignTail,
    GuestureSignIntensity,
    LookAtLongitude,
    LookAtAltitude,
    LookAtMagnitude,
    AimAtLongitude,
    AimAtAltitude,
    AimAtMagnitude,
}

impl DesireField {
    /// All fields in vector order.
    pub const ALL: [Self; DESIRE_VECTOR_SIZE] = [
        Self::MoveForward,
        Self::MoveLeft,
        Self::MoveUp,
        Self::MoveTurnCcw,
        Self::GuestureSubjectHead,
        Self::GuestureSubjectTail,
        Self::GuestureSignHead,
        Self::GuestureSignTail,
        Self::GuestureSignIntensity,
        Self::LookAtLongitude,
        Self::LookAtAltitude,
        Self::LookAtMagnitude,
        Self::AimAtLongitude,
        Self::AimAtAltitude,
        Self::AimAtMagnitude,
    ];

    /// Position of the field in the flat vector.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Read the field from a desire.
    #[must_use]
    pub fn value(self, props: &MotionDesireProps) -> f64 {
        props.as_vector()[self.index()]
    }
}

impl MotionDesireProps {
    /// Desire with only the body motion set.
    #[must_use]
    pub fn moving(forward: f64, left: f64, up: f64, turn_ccw: f64) -> Self {
        Self {
            move_: Move {
                forward,
                left,
                up,
                turn_ccw,
            },
            ..Self::default()
        }
    }

    /// Flatten into the fixed vector layout.
    #[must_use]
    pub fn as_vector(&self) -> [f64; DESIRE_VECTOR_SIZE] {
        [
            self.move_.forward,
            self.move_.left,
            self.move_.up,
            self.move_.turn_ccw,
            self.guesture.subject.head,
            self.guesture.subject.tail,
            self.guesture.sign.head,
            self.guesture.sign.tail,
            self.guesture.sign.intensity,
            self.look_at.longitude,
            self.look_at.altitude,
            self.look_at.magnitude,
            self.aim_at.longitude,
            self.aim_at.altitude,
            self.aim_at.magnitude,
        ]
    }

    /// Rebuild from the fixed vector layout, clipping every field to `[-1, 1]`.
    ///
    /// `NaN` components become `0`.
    #[must_use]
    pub fn from_vector(v: &[f64; DESIRE_VECTOR_SIZE]) -> Self {
        let c = |x: f64| if x.is_nan() { 0.0 } else { x.clamp(-1.0, 1.0) };
        Self {
            move_: Move {
                forward: c(v[0]),
                left: c(v[1]),
                up: c(v[2]),
                turn_ccw: c(v[3]),
            },
            guesture: Guesture {
                subject: Interval {
                    head: c(v[4]),
                    tail: c(v[5]),
                },
                sign: GuestureSign {
                    head: c(v[6]),
                    tail: c(v[7]),
                    intensity: c(v[8]),
                },
            },
            look_at: Direction {
                longitude: c(v[9]),
                altitude: c(v[10]),
                magnitude: c(v[11]),
            },
            aim_at: Direction {
                longitude: c(v[12]),
                altitude: c(v[13]),
                magnitude: c(v[14]),
            },
        }
    }

    /// Copy with every field clipped to `[-1, 1]`.
    #[must_use]
    pub fn clipped(&self) -> Self {
        Self::from_vector(&self.as_vector())
    }

    /// Magnitude of the desired body motion (translation and turn).
    #[must_use]
    pub fn move_magnitude(&self) -> f64 {
        let m = &self.move_;
        (m.forward * m.forward + m.left * m.left + m.up * m.up + m.turn_ccw * m.turn_ccw).sqrt()
    }
}
