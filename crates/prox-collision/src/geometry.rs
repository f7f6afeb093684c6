//! Convex shapes, support mappings, and axis-aligned bounding boxes.

use prox_math::{Mat3, Transform, Vec3};

/// A convex shape described implicitly by its support mapping.
///
/// The support mapping returns, for a direction, the farthest point of the
/// shape along that direction in the shape's local frame. GJK only ever sees
/// shapes through this trait.
pub trait SupportMap {
    /// Farthest point of the shape along `dir`, in the shape's local frame.
    /// Must be deterministic for a fixed direction.
    fn local_support(&self, dir: &Vec3) -> Vec3;
}

/// Sample a support mapping in world space: the farthest point of the placed
/// shape along the world direction `dir`.
pub fn world_support(shape: &dyn SupportMap, placement: &Transform, dir: &Vec3) -> Vec3 {
    let local = shape.local_support(&placement.dir_to_local(dir));
    placement.point_to_world(&local)
}

/// Collision geometry types.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Sphere with given radius.
    Sphere { radius: f64 },
    /// Capsule along local Z: segment of `length` with hemispherical caps.
    Capsule { radius: f64, length: f64 },
    /// Box with half-extents along the local axes.
    Box { half_extents: Vec3 },
    /// Cylinder along local Z.
    Cylinder { radius: f64, height: f64 },
    /// Convex hull of a point cloud (hull property assumed, not checked).
    ConvexHull { vertices: Vec<Vec3> },
}

impl SupportMap for Geometry {
    fn local_support(&self, dir: &Vec3) -> Vec3 {
        match self {
            Geometry::Sphere { radius } => unit_or_x(dir) * *radius,
            Geometry::Capsule { radius, length } => {
                let cap = if dir.z >= 0.0 { length * 0.5 } else { -length * 0.5 };
                unit_or_x(dir) * *radius + Vec3::new(0.0, 0.0, cap)
            }
            Geometry::Box { half_extents } => Vec3::new(
                half_extents.x.copysign(dir.x),
                half_extents.y.copysign(dir.y),
                half_extents.z.copysign(dir.z),
            ),
            Geometry::Cylinder { radius, height } => {
                let radial = Vec3::new(dir.x, dir.y, 0.0);
                let rim = if radial.norm_squared() > 1e-20 {
                    radial.normalize() * *radius
                } else {
                    Vec3::new(*radius, 0.0, 0.0)
                };
                let cap = if dir.z >= 0.0 { height * 0.5 } else { -height * 0.5 };
                rim + Vec3::new(0.0, 0.0, cap)
            }
            Geometry::ConvexHull { vertices } => {
                let mut best = Vec3::zeros();
                let mut best_dot = f64::NEG_INFINITY;
                for v in vertices {
                    let d = dir.dot(v);
                    if d > best_dot {
                        best = *v;
                        best_dot = d;
                    }
                }
                best
            }
        }
    }
}

/// Normalized direction, falling back to +X for a degenerate input.
fn unit_or_x(dir: &Vec3) -> Vec3 {
    if dir.norm_squared() > 1e-20 {
        dir.normalize()
    } else {
        Vec3::x()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min/max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the AABB of a geometry at the given position and rotation by
    /// sampling its support mapping along the six world axes.
    pub fn from_geometry(geom: &Geometry, pos: &Vec3, rot: &Mat3) -> Self {
        let placement = Transform::new(*rot, *pos);
        let mut min = Vec3::zeros();
        let mut max = Vec3::zeros();
        for k in 0..3 {
            let mut axis = Vec3::zeros();
            axis[k] = 1.0;
            max[k] = world_support(geom, &placement, &axis)[k];
            min[k] = world_support(geom, &placement, &-axis)[k];
        }
        Self { min, max }
    }

    /// Grow the box by `margin` on all sides.
    pub fn inflate(&self, margin: f64) -> Self {
        let m = Vec3::new(margin, margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Check if two AABBs overlap (touching counts).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }
}
