//! prox — rigid-body collision detection pipeline.
//!
//! This is the umbrella crate that re-exports the broad phase, the
//! narrow-phase engines and the body container from the sub-crates.

pub use prox_collision::{
    self, box_box, closest_points, world_support, Aabb, BodyHandle, BoxBoxContact,
    CollisionError, Geometry, GjkOutput, GjkStatus, GjkTolerance, OrientedBox, PairKey,
    Simplex, SupportMap, SweepPrune,
};
pub use prox_math::{self, Mat3, Quat, Transform, Vec3};
pub use prox_world::{self, Body, Contact, World, DEFAULT_ENVELOPE};
