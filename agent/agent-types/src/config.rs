//! Configuration of an agent's action controller.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gravity acting on motion objects.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::earth()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Z direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, 0.0, -9.81),
        }
    }

    /// No gravity.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Unit "up" direction (opposite to gravity), `None` in zero gravity.
    #[must_use]
    pub fn up(&self) -> Option<Vector3<f64>> {
        (-self.acceleration).try_normalize(1e-12)
    }
}

/// Look-at behaviour of the head/eye bone chain.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LookAtConfig {
    /// Maximum correction angle of a single bone (radians).
    pub max_bone_angle: f64,
    /// Remaining angle below which the target counts as reached (radians).
    pub reached_tolerance: f64,
    /// Angle by which the target must drift away before tracking resumes (radians).
    pub release_tolerance: f64,
}

impl Default for LookAtConfig {
    fn default() -> Self {
        Self {
            max_bone_angle: std::f64::consts::FRAC_PI_4,
            reached_tolerance: 0.01,
            release_tolerance: 0.1,
        }
    }
}

/// Main configuration of an action controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControllerConfig {
    /// Gravity.
    pub gravity: Gravity,
    /// Blend time when the target cursor hops to another motion (seconds).
    pub default_transition_time: f64,
    /// Upper bound on target cursors consumed within one round.
    pub max_keyframe_crossings_per_round: usize,
    /// Keep the collider bottom in place while its height changes.
    pub use_inverted_collider_center_offset_interpolation: bool,
    /// Look-at settings.
    pub look_at: LookAtConfig,
    /// Linear speed reached at full desire (m/s).
    pub max_linear_speed: f64,
    /// Angular speed reached at full turn desire (rad/s).
    pub max_angular_speed: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gravity: Gravity::earth(),
            default_transition_time: 0.25,
            max_keyframe_crossings_per_round: 8,
            use_inverted_collider_center_offset_interpolation: true,
            look_at: LookAtConfig::default(),
            max_linear_speed: 2.0,
            max_angular_speed: std::f64::consts::PI,
        }
    }
}

impl ControllerConfig {
    /// Configuration without gravity.
    #[must_use]
    pub fn zero_gravity() -> Self {
        Self {
            gravity: Gravity::zero(),
            ..Default::default()
        }
    }

    /// Set the gravity.
    #[must_use]
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the blend time used between motions.
    #[must_use]
    pub fn transition_time(mut self, seconds: f64) -> Self {
        self.default_transition_time = seconds;
        self
    }

    /// Set the speeds reached at full desire.
    #[must_use]
    pub fn max_speeds(mut self, linear: f64, angular: f64) -> Self {
        self.max_linear_speed = linear;
        self.max_angular_speed = angular;
        self
    }

    /// Disable the bottom-preserving collider offset interpolation.
    #[must_use]
    pub fn without_inverted_center_offset(mut self) -> Self {
        self.use_inverted_collider_center_offset_interpolation = false;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.gravity.acceleration.iter().all(|x| x.is_finite()) {
            return Err(crate::AgentError::invalid_config("gravity must be finite"));
        }
        if !self.default_transition_time.is_finite() || self.default_transition_time < 0.0 {
            return Err(crate::AgentError::InvalidTimestep(
                self.default_transition_time,
            ));
        }
        if self.max_keyframe_crossings_per_round == 0 {
            return Err(crate::AgentError::invalid_config(
                "max_keyframe_crossings_per_round must be at least 1",
            ));
        }
        let non_negative = |x: f64| x.is_finite() && x >= 0.0;
        if !non_negative(self.max_linear_speed) || !non_negative(self.max_angular_speed) {
            return Err(crate::AgentError::invalid_config(
                "maximal speeds must be finite and non-negative",
            ));
        }
        let la = &self.look_at;
        if !la.max_bone_angle.is_finite()
            || la.max_bone_angle <= 0.0
            || !non_negative(la.reached_tolerance)
            || !la.release_tolerance.is_finite()
        {
            return Err(crate::AgentError::invalid_config(
                "look-at angles must be finite and positive",
            ));
        }
        if la.release_tolerance < la.reached_tolerance {
            return Err(crate::AgentError::invalid_config(
                "look-at release tolerance must not be below the reached tolerance",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ControllerConfig::default().validate().is_ok());
        assert!(ControllerConfig::zero_gravity().validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        let cfg = ControllerConfig::default().transition_time(-1.0);
        assert!(cfg.validate().is_err());

        let mut cfg = ControllerConfig::default();
        cfg.max_keyframe_crossings_per_round = 0;
        assert!(cfg.validate().unwrap_err().is_config_error());

        let mut cfg = ControllerConfig::default();
        cfg.look_at.release_tolerance = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_non_finite_values() {
        for bad in [f64::NAN, f64::INFINITY] {
            let cfg = ControllerConfig::default().max_speeds(bad, 1.0);
            assert!(cfg.validate().unwrap_err().is_config_error());
            let cfg = ControllerConfig::default().max_speeds(1.0, bad);
            assert!(cfg.validate().unwrap_err().is_config_error());

            let mut cfg = ControllerConfig::default();
            cfg.look_at.max_bone_angle = bad;
            assert!(cfg.validate().unwrap_err().is_config_error());

            let mut cfg = ControllerConfig::default();
            cfg.look_at.reached_tolerance = bad;
            assert!(cfg.validate().unwrap_err().is_config_error());

            let mut cfg = ControllerConfig::default();
            cfg.look_at.release_tolerance = bad;
            assert!(cfg.validate().unwrap_err().is_config_error());

            let cfg = ControllerConfig::default().transition_time(bad);
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn test_gravity_up() {
        assert_eq!(Gravity::earth().up(), Some(Vector3::z()));
        assert_eq!(Gravity::zero().up(), None);
    }
}
