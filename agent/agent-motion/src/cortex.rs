//! Desire sources.
//!
//! A cortex produces the agent's desire once per round. The controller
//! reaches it through a [`RoundHook`]: [`CortexDriven`] wraps any cortex,
//! and [`HumanDesireConverter`] turns raw input intensities into desire.

use crate::action_controller::{ActionController, AgentBlackboard, RoundHook};
use agent_types::{ControllerConfig, DESIRE_VECTOR_SIZE, Direction, MotionDesireProps};
use rand::prelude::*;

/// Produces a desire every round.
pub trait Cortex {
    /// Desire for the round of length `dt`.
    fn next_desire(&mut self, dt: f64) -> MotionDesireProps;
}

/// Cortex returning a fixed desire.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MockCortex {
    /// Desire returned every round.
    pub desire: MotionDesireProps,
}

impl MockCortex {
    /// Cortex returning `desire`.
    #[must_use]
    pub fn new(desire: MotionDesireProps) -> Self {
        Self { desire }
    }
}

impl Cortex for MockCortex {
    fn next_desire(&mut self, _: f64) -> MotionDesireProps {
        self.desire
    }
}

/// Cortex drawing a uniformly random desire and holding it for a while.
#[derive(Debug, Clone)]
pub struct RandomCortex {
    rng: StdRng,
    hold_time: f64,
    held: f64,
    desire: Option<MotionDesireProps>,
}

impl RandomCortex {
    /// Seeded cortex re-rolling every `hold_time` seconds.
    #[must_use]
    pub fn new(seed: u64, hold_time: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            hold_time,
            held: 0.0,
            desire: None,
        }
    }

    fn roll(&mut self) -> MotionDesireProps {
        let mut v = [0.0; DESIRE_VECTOR_SIZE];
        for x in &mut v {
            *x = self.rng.gen_range(-1.0..=1.0);
        }
        MotionDesireProps::from_vector(&v)
    }
}

impl Cortex for RandomCortex {
    fn next_desire(&mut self, dt: f64) -> MotionDesireProps {
        self.held += dt;
        match self.desire {
            Some(desire) if self.held < self.hold_time => desire,
            _ => {
                let desire = self.roll();
                self.desire = Some(desire);
                self.held = 0.0;
                desire
            }
        }
    }
}

/// Round hook asking a cortex for the desire.
#[derive(Debug, Clone, Default)]
pub struct CortexDriven<C> {
    /// The wrapped cortex.
    pub cortex: C,
}

impl<C: Cortex> CortexDriven<C> {
    /// Hook around `cortex`.
    #[must_use]
    pub fn new(cortex: C) -> Self {
        Self { cortex }
    }
}

impl<C: Cortex> RoundHook for CortexDriven<C> {
    fn next_round_internal(&mut self, dt: f64, blackboard: &mut AgentBlackboard, _: &ControllerConfig) {
        blackboard.desire = self.cortex.next_desire(dt);
    }
}

/// Raw input intensities in `[0, 1]`, e.g. from keys or a gamepad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanInput {
    /// Move forward.
    pub forward: f64,
    /// Move backward.
    pub backward: f64,
    /// Strafe left.
    pub left: f64,
    /// Strafe right.
    pub right: f64,
    /// Turn counter-clockwise.
    pub turn_left: f64,
    /// Turn clockwise.
    pub turn_right: f64,
    /// Raise the gaze.
    pub look_up: f64,
    /// Lower the gaze.
    pub look_down: f64,
    /// Fraction of the full speed, `1` runs, smaller values walk.
    pub speed_scale: f64,
}

impl Default for HumanInput {
    fn default() -> Self {
        Self {
            forward: 0.0,
            backward: 0.0,
            left: 0.0,
            right: 0.0,
            turn_left: 0.0,
            turn_right: 0.0,
            look_up: 0.0,
            look_down: 0.0,
            speed_scale: 1.0,
        }
    }
}

/// Converts [`HumanInput`] into canonical desire.
///
/// Gaze altitude is integrated over time from the look up/down intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumanDesireConverter {
    /// Input of the current round.
    pub input: HumanInput,
    /// Altitude change per second at full look intensity (normalised units).
    pub look_rate: f64,
    altitude: f64,
}

impl Default for HumanDesireConverter {
    fn default() -> Self {
        Self {
            input: HumanInput::default(),
            look_rate: 1.0,
            altitude: 0.0,
        }
    }
}

impl HumanDesireConverter {
    /// Converter with neutral input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gaze altitude in `[-1, 1]`.
    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Desire for a round of length `dt`.
    pub fn convert(&mut self, dt: f64) -> MotionDesireProps {
        let i = &self.input;
        let speed = i.speed_scale.clamp(0.0, 1.0);
        self.altitude =
            (self.altitude + (i.look_up - i.look_down) * self.look_rate * dt).clamp(-1.0, 1.0);
        let mut desire = MotionDesireProps::moving(
            (i.forward - i.backward) * speed,
            (i.left - i.right) * speed,
            0.0,
            i.turn_left - i.turn_right,
        );
        desire.look_at = Direction {
            longitude: 0.0,
            altitude: self.altitude,
            magnitude: 1.0,
        };
        desire.clipped()
    }
}

impl RoundHook for HumanDesireConverter {
    fn next_round_internal(&mut self, dt: f64, blackboard: &mut AgentBlackboard, _: &ControllerConfig) {
        blackboard.desire = self.convert(dt);
    }
}

/// Action controller driven by human input.
pub type ActionControllerHuman = ActionController<HumanDesireConverter>;
