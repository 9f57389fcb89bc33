//! Coordinate frames and paired linear/angular vectors.
//!
//! A [`Frame`] is an origin plus an orientation, the same shape as a scene
//! node transform. A [`VelocityPair`] holds a linear and an angular vector and
//! is used both for velocities and for accelerations.

use nalgebra::{UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a node in the external scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Origin and orientation of a coordinate system.
///
/// A frame maps local coordinates into the coordinates of its parent space:
/// `parent = origin + orientation * local`.
///
/// # Example
///
/// ```
/// use agent_types::Frame;
/// use nalgebra::Vector3;
///
/// let frame = Frame::from_origin(Vector3::new(1.0, 2.0, 3.0));
/// let p = frame.transform_point(&Vector3::new(1.0, 0.0, 0.0));
/// assert_eq!(p, Vector3::new(2.0, 2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Frame {
    /// Origin in parent coordinates.
    pub origin: Vector3<f64>,
    /// Orientation relative to the parent space.
    pub orientation: UnitQuaternion<f64>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame {
    /// The identity frame.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            origin: Vector3::zeros(),
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Frame with the given origin and identity orientation.
    #[must_use]
    pub fn from_origin(origin: Vector3<f64>) -> Self {
        Self {
            origin,
            orientation: UnitQuaternion::identity(),
        }
    }

    /// Frame from origin and orientation.
    #[must_use]
    pub const fn new(origin: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            origin,
            orientation,
        }
    }

    /// Map a local point into parent coordinates.
    #[must_use]
    pub fn transform_point(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.origin + self.orientation * local
    }

    /// Map a local direction into parent coordinates (rotation only).
    #[must_use]
    pub fn transform_vector(&self, local: &Vector3<f64>) -> Vector3<f64> {
        self.orientation * local
    }

    /// Map a parent-space point into local coordinates.
    #[must_use]
    pub fn inverse_transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * (point - self.origin)
    }

    /// Map a parent-space direction into local coordinates.
    #[must_use]
    pub fn inverse_transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.orientation.inverse() * vector
    }

    /// Local X axis in parent coordinates.
    #[must_use]
    pub fn basis_x(&self) -> Vector3<f64> {
        self.orientation * Vector3::x()
    }

    /// Local Y axis in parent coordinates.
    #[must_use]
    pub fn basis_y(&self) -> Vector3<f64> {
        self.orientation * Vector3::y()
    }

    /// Local Z axis in parent coordinates.
    #[must_use]
    pub fn basis_z(&self) -> Vector3<f64> {
        self.orientation * Vector3::z()
    }

    /// The frame mapping parent coordinates back into this frame's local space.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let inv = self.orientation.inverse();
        Self {
            origin: -(inv * self.origin),
            orientation: inv,
        }
    }

    /// Composition `self ∘ other`: `other` is expressed in `self`'s local space.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            origin: self.transform_point(&other.origin),
            orientation: self.orientation * other.orientation,
        }
    }

    /// Blend two frames: linear for the origin, spherical for the orientation.
    ///
    /// `t` is clamped to `[0, 1]`. Antipodal orientations fall back to the
    /// nearer endpoint instead of producing an undefined rotation.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let orientation = self
            .orientation
            .try_slerp(&other.orientation, t, 1.0e-9)
            .unwrap_or(if t < 0.5 {
                self.orientation
            } else {
                other.orientation
            });
        Self {
            origin: self.origin.lerp(&other.origin, t),
            orientation,
        }
    }

    /// Check for `NaN` or `Inf` components.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.origin.iter().all(|x| x.is_finite())
            && self.orientation.coords.iter().all(|x| x.is_finite())
    }
}

/// A linear and an angular vector travelling together.
///
/// Used for velocities (m/s, rad/s) and accelerations (m/s², rad/s²).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VelocityPair {
    /// Linear component, world space.
    pub linear: Vector3<f64>,
    /// Angular component, world space.
    pub angular: Vector3<f64>,
}

impl Default for VelocityPair {
    fn default() -> Self {
        Self::zero()
    }
}

impl VelocityPair {
    /// Pair from both components.
    #[must_use]
    pub const fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    /// Both components zero.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    /// Scale both components.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            linear: self.linear * factor,
            angular: self.angular * factor,
        }
    }

    /// Check for `NaN` or `Inf` components.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.linear.iter().all(|x| x.is_finite()) && self.angular.iter().all(|x| x.is_finite())
    }
}
