//! Colliders, mass distributions and their pairing ("matter").
//!
//! The motion object of an agent carries one collider and one mass
//! distribution. Both are authored per keyframe and blended while the agent
//! moves between keyframes, so every type here knows how to interpolate.

use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mass, inertia tensor and their cached inverses.
///
/// A zero (or non-finite) mass encodes an immovable object: the cached
/// inverse mass and inverse inertia tensor are both zero.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassDistribution {
    /// Total mass in kg.
    pub mass: f64,
    /// Inertia tensor about the centre of mass, local coordinates (kg·m²).
    pub inertia_tensor: Matrix3<f64>,
    /// Cached `1 / mass`, zero for immovable objects.
    pub inverted_mass: f64,
    /// Cached inverse of `inertia_tensor`, zero for immovable objects.
    pub inverted_inertia_tensor: Matrix3<f64>,
}

impl Default for MassDistribution {
    fn default() -> Self {
        Self::infinite()
    }
}

impl MassDistribution {
    /// Mass distribution with the inverses computed from `mass` and `inertia_tensor`.
    #[must_use]
    pub fn new(mass: f64, inertia_tensor: Matrix3<f64>) -> Self {
        let movable = mass > 0.0 && mass.is_finite();
        let inverted_mass = if movable { 1.0 / mass } else { 0.0 };
        let inverted_inertia_tensor = if movable {
            inertia_tensor.try_inverse().unwrap_or_else(Matrix3::zeros)
        } else {
            Matrix3::zeros()
        };
        Self {
            mass,
            inertia_tensor,
            inverted_mass,
            inverted_inertia_tensor,
        }
    }

    /// An immovable object.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            mass: 0.0,
            inertia_tensor: Matrix3::zeros(),
            inverted_mass: 0.0,
            inverted_inertia_tensor: Matrix3::zeros(),
        }
    }

    /// Uniform solid sphere: I = (2/5) m r².
    #[must_use]
    pub fn sphere(mass: f64, radius: f64) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self::new(mass, Matrix3::from_diagonal(&Vector3::new(i, i, i)))
    }

    /// Uniform solid box with the given half extents.
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let x2 = 4.0 * half_extents.x * half_extents.x;
        let y2 = 4.0 * half_extents.y * half_extents.y;
        let z2 = 4.0 * half_extents.z * half_extents.z;
        Self::new(
            mass,
            Matrix3::from_diagonal(&Vector3::new(
                mass * (y2 + z2) / 12.0,
                mass * (x2 + z2) / 12.0,
                mass * (x2 + y2) / 12.0,
            )),
        )
    }

    /// Capsule aligned with local Z, approximated as a cylinder of the full
    /// length (`2 * (half_length + radius)`).
    #[must_use]
    pub fn capsule(mass: f64, half_length: f64, radius: f64) -> Self {
        let r2 = radius * radius;
        let h = 2.0 * (half_length + radius);
        let ixx = mass * (3.0 * r2 + h * h) / 12.0;
        let izz = 0.5 * mass * r2;
        Self::new(mass, Matrix3::from_diagonal(&Vector3::new(ixx, ixx, izz)))
    }

    /// Whether the object is immovable.
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.inverted_mass == 0.0
    }

    /// Blend mass and inertia, then recompute the inverses.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.mass + (other.mass - self.mass) * t,
            self.inertia_tensor * (1.0 - t) + other.inertia_tensor * t,
        )
    }

    /// Validate that the values are physically meaningful.
    pub fn validate(&self) -> crate::Result<()> {
        if self.mass < 0.0 || self.mass.is_nan() {
            return Err(crate::AgentError::invalid_mass("mass cannot be negative"));
        }
        if !self.inertia_tensor.iter().all(|x| x.is_finite()) {
            return Err(crate::AgentError::invalid_mass(
                "inertia tensor must be finite",
            ));
        }
        let eigenvalues = self.inertia_tensor.symmetric_eigenvalues();
        if eigenvalues.iter().any(|&e| e < -1e-10) {
            return Err(crate::AgentError::invalid_mass(
                "inertia tensor must be positive semi-definite",
            ));
        }
        Ok(())
    }
}

/// Collision shape of a motion object, centred on its local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Collider {
    /// Capsule along local Z.
    Capsule {
        /// Half-length of the cylindrical part.
        half_length: f64,
        /// Radius of the caps and the cylinder.
        radius: f64,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f64,
    },
    /// Box.
    Box {
        /// Half extents along local X, Y, Z.
        half_extents: Vector3<f64>,
    },
}

impl Collider {
    /// Capsule along local Z.
    #[must_use]
    pub fn capsule(half_length: f64, radius: f64) -> Self {
        Self::Capsule {
            half_length,
            radius,
        }
    }

    /// Sphere.
    #[must_use]
    pub fn sphere(radius: f64) -> Self {
        Self::Sphere { radius }
    }

    /// Box.
    #[must_use]
    pub fn box_shape(half_extents: Vector3<f64>) -> Self {
        Self::Box { half_extents }
    }

    /// Distance from the centre to the lowest point along local Z.
    #[must_use]
    pub fn half_height(&self) -> f64 {
        match self {
            Self::Capsule {
                half_length,
                radius,
            } => half_length + radius,
            Self::Sphere { radius } => *radius,
            Self::Box { half_extents } => half_extents.z,
        }
    }

    /// Whether all dimensions are positive and finite.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let ok = |x: f64| x.is_finite() && x > 0.0;
        match self {
            Self::Capsule {
                half_length,
                radius,
            } => half_length.is_finite() && *half_length >= 0.0 && ok(*radius),
            Self::Sphere { radius } => ok(*radius),
            Self::Box { half_extents } => half_extents.iter().all(|&x| ok(x)),
        }
    }

    /// Blend two colliders.
    ///
    /// Colliders of the same kind blend their dimensions; differing kinds
    /// switch over at `t >= 0.5`.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: f64, b: f64| a + (b - a) * t;
        match (self, other) {
            (
                Self::Capsule {
                    half_length: l0,
                    radius: r0,
                },
                Self::Capsule {
                    half_length: l1,
                    radius: r1,
                },
            ) => Self::Capsule {
                half_length: mix(*l0, *l1),
                radius: mix(*r0, *r1),
            },
            (Self::Sphere { radius: r0 }, Self::Sphere { radius: r1 }) => Self::Sphere {
                radius: mix(*r0, *r1),
            },
            (Self::Box { half_extents: e0 }, Self::Box { half_extents: e1 }) => Self::Box {
                half_extents: e0.lerp(e1, t),
            },
            _ => {
                if t < 0.5 {
                    *self
                } else {
                    *other
                }
            }
        }
    }
}

/// A collider paired with a mass distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matter {
    /// Collision shape.
    pub collider: Collider,
    /// Mass and inertia.
    pub mass_distribution: MassDistribution,
    /// Collider centre relative to the skeleton origin, skeleton space.
    pub center_offset: Vector3<f64>,
}

impl Matter {
    /// Matter with the collider centred on the skeleton origin.
    #[must_use]
    pub fn new(collider: Collider, mass_distribution: MassDistribution) -> Self {
        Self {
            collider,
            mass_distribution,
            center_offset: Vector3::zeros(),
        }
    }

    /// Set the collider centre offset.
    #[must_use]
    pub fn with_center_offset(mut self, center_offset: Vector3<f64>) -> Self {
        self.center_offset = center_offset;
        self
    }

    /// Blend collider, mass distribution and centre offset.
    #[must_use]
    pub fn interpolate(&self, other: &Self, t: f64) -> Self {
        Self {
            collider: self.collider.interpolate(&other.collider, t),
            mass_distribution: self
                .mass_distribution
                .interpolate(&other.mass_distribution, t),
            center_offset: self.center_offset.lerp(&other.center_offset, t.clamp(0.0, 1.0)),
        }
    }

    /// Validate collider dimensions and the mass distribution.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.collider.is_valid() {
            return Err(crate::AgentError::invalid_template(format!(
                "collider has invalid dimensions: {:?}",
                self.collider
            )));
        }
        self.mass_distribution.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inverses() {
        let md = MassDistribution::sphere(2.0, 1.0);
        assert_relative_eq!(md.inverted_mass, 0.5, epsilon = 1e-12);
        assert_relative_eq!(md.inverted_inertia_tensor[(0, 0)], 1.0 / 0.8, epsilon = 1e-12);
        assert!(!md.is_infinite());
    }

    #[test]
    fn test_infinite_mass() {
        let md = MassDistribution::new(0.0, Matrix3::identity());
        assert!(md.is_infinite());
        assert_eq!(md.inverted_inertia_tensor, Matrix3::zeros());
        assert!(MassDistribution::infinite().is_infinite());
    }

    #[test]
    fn test_mass_interpolation_is_a_blend() {
        let a = MassDistribution::capsule(60.0, 0.3, 0.3);
        let b = MassDistribution::capsule(80.0, 0.6, 0.3);
        let mid = a.interpolate(&b, 0.5);
        assert_relative_eq!(mid.mass, 70.0, epsilon = 1e-12);
        assert!(mid.inverted_mass < a.inverted_mass);
        assert!(mid.inverted_mass > b.inverted_mass);
    }

    #[test]
    fn test_validate() {
        assert!(MassDistribution::box_shape(1.0, Vector3::new(0.5, 0.5, 0.5)).validate().is_ok());
        let negative = MassDistribution::new(-1.0, Matrix3::identity());
        assert!(negative.validate().is_err());
        let bad = Matter::new(Collider::sphere(-1.0), MassDistribution::sphere(1.0, 1.0));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_collider_interpolation() {
        let crouch = Collider::capsule(0.2, 0.3);
        let stand = Collider::capsule(0.6, 0.3);
        match crouch.interpolate(&stand, 0.5) {
            Collider::Capsule { half_length, .. } => {
                assert_relative_eq!(half_length, 0.4, epsilon = 1e-12);
            }
            other => panic!("unexpected collider {other:?}"),
        }
        assert_relative_eq!(stand.half_height(), 0.9, epsilon = 1e-12);

        let sphere = Collider::sphere(1.0);
        assert_eq!(crouch.interpolate(&sphere, 0.49), crouch);
        assert_eq!(crouch.interpolate(&sphere, 0.5), sphere);
    }
}
