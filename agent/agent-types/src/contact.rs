//! Collision contacts reported by the scene for a motion object.

use crate::NodeId;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One contact between a motion object and some other object.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactEvent {
    /// Column of the sensor cell that registered the contact.
    pub cell_x: i32,
    /// Row of the sensor cell that registered the contact.
    pub cell_y: i32,
    /// Contact point, world coordinates.
    pub point: Vector3<f64>,
    /// Penetration depth (positive means overlapping).
    pub penetration: f64,
    /// Unit contact normal, world coordinates, pointing towards the motion object.
    pub normal: Vector3<f64>,
    /// The other object, `None` for static environment.
    pub other: Option<NodeId>,
}

impl ContactEvent {
    /// Contact with the static environment at cell `(0, 0)`.
    #[must_use]
    pub fn new(point: Vector3<f64>, normal: Vector3<f64>, penetration: f64) -> Self {
        Self {
            cell_x: 0,
            cell_y: 0,
            point,
            penetration,
            normal: normal.try_normalize(1e-12).unwrap_or_else(Vector3::z),
            other: None,
        }
    }

    /// Contact with a flat floor (normal +Z) at the given point.
    #[must_use]
    pub fn with_floor(point: Vector3<f64>) -> Self {
        Self::new(point, Vector3::z(), 0.0)
    }

    /// Set the sensor cell.
    #[must_use]
    pub fn at_cell(mut self, cell_x: i32, cell_y: i32) -> Self {
        self.cell_x = cell_x;
        self.cell_y = cell_y;
        self
    }

    /// Set the other object.
    #[must_use]
    pub fn against(mut self, other: NodeId) -> Self {
        self.other = Some(other);
        self
    }
}
