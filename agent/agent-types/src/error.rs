//! Error types for data loading and configuration.
//!
//! Only the loading boundary reports errors. Inconsistencies discovered
//! during a simulation round are broken preconditions and panic instead.

use thiserror::Error;

/// Errors reported while validating configuration or template data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    /// Invalid timestep.
    #[error("invalid timestep: {0} (must be positive and finite)")]
    InvalidTimestep(f64),

    /// Invalid configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// Invalid mass distribution.
    #[error("invalid mass distribution: {reason}")]
    InvalidMassDistribution {
        /// Description of what's wrong.
        reason: String,
    },

    /// Skeletal motion template data is inconsistent.
    #[error("invalid motion templates: {reason}")]
    InvalidTemplate {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A motion referenced by name does not exist.
    #[error("unknown motion: {name}")]
    UnknownMotion {
        /// Name of the missing motion.
        name: String,
    },

    /// A keyframe index is out of range for its motion.
    #[error("keyframe {index} out of range for motion {motion} ({count} keyframes)")]
    KeyframeOutOfRange {
        /// Motion name.
        motion: String,
        /// Offending index.
        index: usize,
        /// Number of keyframes in the motion.
        count: usize,
    },

    /// Bone count disagreement between two data sources.
    #[error("bone count mismatch in {context}: expected {expected}, got {actual}")]
    BoneCountMismatch {
        /// Where the mismatch was found.
        context: String,
        /// Expected bone count.
        expected: usize,
        /// Actual bone count.
        actual: usize,
    },
}

impl AgentError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create an invalid mass distribution error.
    #[must_use]
    pub fn invalid_mass(reason: impl Into<String>) -> Self {
        Self::InvalidMassDistribution {
            reason: reason.into(),
        }
    }

    /// Create an invalid template error.
    #[must_use]
    pub fn invalid_template(reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            reason: reason.into(),
        }
    }

    /// Create an unknown motion error.
    #[must_use]
    pub fn unknown_motion(name: impl Into<String>) -> Self {
        Self::UnknownMotion { name: name.into() }
    }

    /// Check if this is a configuration error.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. } | Self::InvalidTimestep(_))
    }

    /// Check if this error comes from template data.
    #[must_use]
    pub fn is_template_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTemplate { .. }
                | Self::UnknownMotion { .. }
                | Self::KeyframeOutOfRange { .. }
                | Self::BoneCountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::KeyframeOutOfRange {
            motion: "walk".into(),
            index: 7,
            count: 3,
        };
        let text = err.to_string();
        assert!(text.contains("walk"));
        assert!(text.contains('7'));

        let err = AgentError::unknown_motion("jump");
        assert!(err.to_string().contains("jump"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(AgentError::invalid_config("x").is_config_error());
        assert!(AgentError::InvalidTimestep(0.0).is_config_error());
        assert!(!AgentError::invalid_config("x").is_template_error());
        assert!(AgentError::invalid_template("x").is_template_error());
        assert!(
            AgentError::BoneCountMismatch {
                context: "pose".into(),
                expected: 3,
                actual: 2
            }
            .is_template_error()
        );
    }
}
