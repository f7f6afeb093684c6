//! Arena of bodies plus the full broad-to-narrow collision pipeline.

use prox_collision::{
    box_box, closest_points, BodyHandle, CollisionError, Geometry, GjkStatus, GjkTolerance,
    OrientedBox, Result, SweepPrune,
};
use prox_math::Vec3;
use std::collections::HashMap;

use crate::body::Body;

/// Default collision envelope: bodies closer than this are in contact.
pub const DEFAULT_ENVELOPE: f64 = 0.01;

/// A contact point handed to the downstream constraint solver.
///
/// Transient: recomputed every step, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// First body of the pair.
    pub body_a: BodyHandle,
    /// Second body of the pair.
    pub body_b: BodyHandle,
    /// Contact position, world frame.
    pub position: Vec3,
    /// Contact normal, world frame, pointing from the first body toward
    /// the second.
    pub normal: Vec3,
    /// Signed penetration: positive = overlapping, negative = separated by
    /// that distance along the normal.
    pub penetration: f64,
}

/// World container: body arena with stable handles, collision envelope,
/// and the persistent sweep-and-prune state.
pub struct World {
    bodies: Vec<Option<Body>>,
    free: Vec<usize>,
    envelope: f64,
    /// GJK tolerances used by the narrow phase for non-box pairs.
    pub gjk_tolerance: GjkTolerance,
    broad: SweepPrune,
}

impl World {
    /// World with the default collision envelope.
    pub fn new() -> Self {
        Self::with_envelope(DEFAULT_ENVELOPE)
    }

    /// World with an explicit collision envelope.
    pub fn with_envelope(envelope: f64) -> Self {
        Self {
            bodies: Vec::new(),
            free: Vec::new(),
            envelope,
            gjk_tolerance: GjkTolerance::default(),
            broad: SweepPrune::new(),
        }
    }

    pub fn envelope(&self) -> f64 {
        self.envelope
    }

    /// Number of live bodies.
    pub fn len(&self) -> usize {
        self.bodies.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a body, reusing a freed slot when available.
    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        let aabb = body.collision_aabb(self.envelope);
        let handle = match self.free.pop() {
            Some(slot) => {
                self.bodies[slot] = Some(body);
                slot
            }
            None => {
                self.bodies.push(Some(body));
                self.bodies.len() - 1
            }
        };
        self.broad.add(handle, &aabb);
        handle
    }

    /// Deregister a body. Any broad-phase report involving it is retracted.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<Body> {
        let body = self
            .bodies
            .get_mut(handle)
            .and_then(Option::take)
            .ok_or(CollisionError::UnknownBody(handle))?;
        self.broad.remove(handle)?;
        self.free.push(handle);
        Ok(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle).and_then(Option::as_ref)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle).and_then(Option::as_mut)
    }

    /// Run the broad phase: recompute every body's AABB and fill `out`
    /// with the candidate pairs whose AABBs overlap on all three axes.
    pub fn candidate_pairs(&mut self, out: &mut Vec<(BodyHandle, BodyHandle)>) {
        let mut aabbs: HashMap<BodyHandle, prox_collision::Aabb> = HashMap::new();
        for (handle, slot) in self.bodies.iter().enumerate() {
            if let Some(body) = slot {
                aabbs.insert(handle, body.collision_aabb(self.envelope));
            }
        }
        self.broad.run(|h| aabbs[&h], out);
    }

    /// Full pipeline step: broad phase, then the appropriate narrow-phase
    /// engine per surviving pair. Box pairs go through the separating-axis
    /// engine and may contribute up to eight contacts; every other pair
    /// goes through GJK and contributes at most one.
    pub fn collide(&mut self) -> Vec<Contact> {
        let mut pairs = Vec::new();
        self.candidate_pairs(&mut pairs);

        let mut contacts = Vec::new();
        for (ha, hb) in pairs {
            let (Some(a), Some(b)) = (self.body(ha), self.body(hb)) else {
                continue;
            };
            match (&a.geometry, &b.geometry) {
                (Geometry::Box { half_extents: ea }, Geometry::Box { half_extents: eb }) => {
                    let boxed_a =
                        OrientedBox::new(a.position, a.orientation.to_matrix(), *ea);
                    let boxed_b =
                        OrientedBox::new(b.position, b.orientation.to_matrix(), *eb);
                    let manifold = box_box(&boxed_a, &boxed_b, self.envelope);
                    for (point, depth) in manifold.points.iter().zip(&manifold.depths) {
                        contacts.push(Contact {
                            body_a: ha,
                            body_b: hb,
                            position: *point,
                            normal: manifold.normal,
                            penetration: *depth,
                        });
                    }
                }
                _ => {
                    let Ok(query) = closest_points(
                        &a.transform(),
                        &a.geometry,
                        &b.transform(),
                        &b.geometry,
                        &self.gjk_tolerance,
                    ) else {
                        continue;
                    };
                    // Breakdown outcomes yield no usable result this step;
                    // the pair is skipped rather than failed. A stagnated
                    // query still carries a valid upper bound on the
                    // distance, which is enough for envelope acceptance.
                    if matches!(
                        query.status,
                        GjkStatus::NonDescendDirection | GjkStatus::ExceededMaxIterations
                    ) {
                        continue;
                    }
                    if query.distance > self.envelope {
                        continue;
                    }
                    let gap = query.point_b - query.point_a;
                    let normal = if gap.norm_squared() > 1e-20 {
                        gap.normalize()
                    } else {
                        let centers = b.position - a.position;
                        if centers.norm_squared() > 1e-20 {
                            centers.normalize()
                        } else {
                            Vec3::x()
                        }
                    };
                    contacts.push(Contact {
                        body_a: ha,
                        body_b: hb,
                        position: (query.point_a + query.point_b) * 0.5,
                        normal,
                        penetration: -query.distance,
                    });
                }
            }
        }
        contacts
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
