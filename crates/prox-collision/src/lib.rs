//! Collision detection core for the prox physics toolkit.
//!
//! Implements the sweep-and-prune broad phase, GJK closest points on
//! general convex shapes, and the separating-axis test with contact
//! manifold synthesis for oriented boxes. Bodies and the constraint solver
//! live outside this crate; everything here is pure computation over
//! placements, support mappings and AABBs.

pub mod box_box;
pub mod broad_phase;
pub mod error;
pub mod geometry;
pub mod gjk;
pub mod simplex;

pub use box_box::{box_box, BoxBoxContact, OrientedBox};
pub use broad_phase::{BodyHandle, PairKey, SweepPrune};
pub use error::{CollisionError, Result};
pub use geometry::{world_support, Aabb, Geometry, SupportMap};
pub use gjk::{closest_points, GjkOutput, GjkStatus, GjkTolerance};
pub use simplex::Simplex;
