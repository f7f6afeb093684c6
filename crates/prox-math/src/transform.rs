//! Rigid placement: rotation + translation.

use crate::{Mat3, Vec3};

/// A rigid body placement in world space.
///
/// Maps local coordinates to world coordinates: `x_world = rot * x_local + pos`.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// Rotation from local to world frame.
    pub rot: Mat3,
    /// Position of the local origin in the world frame.
    pub pos: Vec3,
}

impl Transform {
    /// Create from rotation and translation.
    pub fn new(rot: Mat3, pos: Vec3) -> Self {
        Self { rot, pos }
    }

    /// Identity placement.
    pub fn identity() -> Self {
        Self {
            rot: Mat3::identity(),
            pos: Vec3::zeros(),
        }
    }

    /// Pure translation.
    pub fn from_translation(pos: Vec3) -> Self {
        Self {
            rot: Mat3::identity(),
            pos,
        }
    }

    /// Pure rotation.
    pub fn from_rotation(rot: Mat3) -> Self {
        Self {
            rot,
            pos: Vec3::zeros(),
        }
    }

    /// Map a point from the local frame to the world frame.
    #[inline]
    pub fn point_to_world(&self, p: &Vec3) -> Vec3 {
        self.rot * p + self.pos
    }

    /// Map a point from the world frame to the local frame.
    #[inline]
    pub fn point_to_local(&self, p: &Vec3) -> Vec3 {
        self.rot.transpose() * (p - self.pos)
    }

    /// Map a direction from the local frame to the world frame.
    #[inline]
    pub fn dir_to_world(&self, d: &Vec3) -> Vec3 {
        self.rot * d
    }

    /// Map a direction from the world frame to the local frame.
    #[inline]
    pub fn dir_to_local(&self, d: &Vec3) -> Vec3 {
        self.rot.transpose() * d
    }

    /// Inverse placement.
    pub fn inverse(&self) -> Transform {
        let rot_t = self.rot.transpose();
        Transform {
            rot: rot_t,
            pos: -(rot_t * self.pos),
        }
    }
}
