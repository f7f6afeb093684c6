//! Rigid body as seen by the collision pipeline.

use prox_collision::{Aabb, Geometry};
use prox_math::{Quat, Transform, Vec3};

/// A solid body: placement plus collision geometry.
///
/// Dynamics (velocities, mass, integration) live outside the pipeline;
/// only position, orientation and shape matter here.
#[derive(Debug, Clone)]
pub struct Body {
    /// World position of the body frame origin.
    pub position: Vec3,
    /// World orientation of the body frame.
    pub orientation: Quat,
    /// Collision geometry in the body frame.
    pub geometry: Geometry,
}

impl Body {
    /// Create a body at a placement.
    pub fn new(position: Vec3, orientation: Quat, geometry: Geometry) -> Self {
        Self {
            position,
            orientation,
            geometry,
        }
    }

    /// Create an unrotated body.
    pub fn at(position: Vec3, geometry: Geometry) -> Self {
        Self::new(position, Quat::identity(), geometry)
    }

    /// Current placement transform.
    pub fn transform(&self) -> Transform {
        Transform::new(self.orientation.to_matrix(), self.position)
    }

    /// World AABB grown by the collision envelope.
    pub fn collision_aabb(&self, envelope: f64) -> Aabb {
        Aabb::from_geometry(&self.geometry, &self.position, &self.orientation.to_matrix())
            .inflate(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_collision_aabb_includes_envelope() {
        let body = Body::at(
            Vec3::new(1.0, 2.0, 3.0),
            Geometry::Sphere { radius: 0.5 },
        );
        let bb = body.collision_aabb(0.1);
        assert_relative_eq!(bb.min, Vec3::new(0.4, 1.4, 2.4), epsilon = 1e-12);
        assert_relative_eq!(bb.max, Vec3::new(1.6, 2.6, 3.6), epsilon = 1e-12);
    }
}
