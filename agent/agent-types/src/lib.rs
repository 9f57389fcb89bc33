//! Data types for agent motion control.
//!
//! This crate holds the plain data exchanged between an agent's action
//! controller and its collaborators:
//!
//! - [`Frame`] and [`VelocityPair`] - coordinate systems and velocity/acceleration pairs
//! - [`MassDistribution`], [`Collider`], [`Matter`] - physical make-up of a motion object
//! - [`ContactEvent`] - collision contacts reported by the scene
//! - [`MotionDesireProps`] - normalised intent produced by a cortex
//! - [`ControllerConfig`] - controller settings
//!
//! # Coordinate System
//!
//! - X: right
//! - Y: forward
//! - Z: up
//! - Right-handed
//!
//! # Example
//!
//! ```
//! use agent_types::{MotionDesireProps, DESIRE_VECTOR_SIZE};
//!
//! let mut v = [0.0; DESIRE_VECTOR_SIZE];
//! v[0] = 2.5;
//! let desire = MotionDesireProps::from_vector(&v);
//! assert_eq!(desire.move_.forward, 1.0);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,
    clippy::module_name_repetitions,
)]

mod config;
mod contact;
mod desire;
mod error;
mod frame;
mod matter;

pub use config::{ControllerConfig, Gravity, LookAtConfig};
pub use contact::ContactEvent;
pub use desire::{
    DESIRE_VECTOR_SIZE, DesireField, Direction, Guesture, GuestureSign, Interval, Move,
    MotionDesireProps,
};
pub use error::AgentError;
pub use frame::{Frame, NodeId, VelocityPair};
pub use matter::{Collider, MassDistribution, Matter};

pub use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// Result type for loading and configuration.
pub type Result<T> = std::result::Result<T, AgentError>;
