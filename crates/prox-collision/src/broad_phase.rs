//! Incremental sweep-and-prune broad phase.
//!
//! Three per-axis endpoint lists stay sorted across steps; each run
//! refreshes the endpoint values and re-sorts with insertion sort, which is
//! near-linear under temporal coherence. Every swap feeds a per-pair
//! axis-overlap counter, and a pair is reported exactly while all three
//! axes overlap.

use std::collections::HashMap;

use crate::error::{CollisionError, Result};
use crate::geometry::Aabb;

/// Stable integer handle of a registered body.
pub type BodyHandle = usize;

/// Order-independent key of a body pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PairKey {
    a: BodyHandle,
    b: BodyHandle,
}

impl PairKey {
    /// Build a key with the smaller handle first.
    pub fn new(x: BodyHandle, y: BodyHandle) -> Self {
        if x < y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// The two handles, smaller first.
    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.a, self.b)
    }

    fn involves(&self, h: BodyHandle) -> bool {
        self.a == h || self.b == h
    }
}

/// Persistent per-pair overlap record, created lazily at the first swap
/// event between two bodies' endpoints.
#[derive(Debug, Clone, Copy)]
struct PairRecord {
    /// Number of axes on which the intervals currently overlap (0-3).
    axis_overlap: u8,
    /// In the reported set iff all three axes overlap.
    reported: bool,
}

/// One interval endpoint on one axis.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    value: f64,
    owner: BodyHandle,
    is_begin: bool,
}

/// On equal values "begin" sorts before "end", so touching intervals count
/// as overlapping.
fn endpoint_less(a: &Endpoint, b: &Endpoint) -> bool {
    a.value < b.value || (a.value == b.value && a.is_begin && !b.is_begin)
}

/// Sweep-and-prune broad phase over registered AABBs.
#[derive(Debug, Default)]
pub struct SweepPrune {
    axes: [Vec<Endpoint>; 3],
    pairs: HashMap<PairKey, PairRecord>,
}

impl SweepPrune {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered bodies.
    pub fn len(&self) -> usize {
        self.axes[0].len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.axes[0].is_empty()
    }

    /// True when `body` is registered.
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.axes[0].iter().any(|ep| ep.owner == body)
    }

    /// Register a body with its current AABB. The six endpoints are
    /// appended and migrate into place on the next [`run`](Self::run).
    pub fn add(&mut self, body: BodyHandle, aabb: &Aabb) {
        debug_assert!(!self.contains(body), "body {body} registered twice");
        for k in 0..3 {
            self.axes[k].push(Endpoint {
                value: aabb.min[k],
                owner: body,
                is_begin: true,
            });
            self.axes[k].push(Endpoint {
                value: aabb.max[k],
                owner: body,
                is_begin: false,
            });
        }
    }

    /// Deregister a body: its endpoints leave all three lists, and every
    /// pair referencing it is retracted from the reported set before its
    /// record is discarded. Other pairs' counters are unaffected.
    pub fn remove(&mut self, body: BodyHandle) -> Result<()> {
        if !self.contains(body) {
            return Err(CollisionError::UnknownBody(body));
        }
        for axis in &mut self.axes {
            axis.retain(|ep| ep.owner != body);
        }
        self.pairs.retain(|key, _| !key.involves(body));
        Ok(())
    }

    /// Run one broad-phase step: refresh endpoint values through `aabb_of`,
    /// re-sort every axis, and fill `out` with the currently reported
    /// pairs (sorted by handle pair, duplicates impossible).
    ///
    /// `aabb_of` is called with each registered handle; results for one
    /// handle must agree within the step.
    pub fn run<F>(&mut self, aabb_of: F, out: &mut Vec<(BodyHandle, BodyHandle)>)
    where
        F: Fn(BodyHandle) -> Aabb,
    {
        for k in 0..3 {
            // Split borrow: the axis list is sorted against the pair table.
            let mut axis = std::mem::take(&mut self.axes[k]);
            for ep in axis.iter_mut() {
                let bb = aabb_of(ep.owner);
                ep.value = if ep.is_begin { bb.min[k] } else { bb.max[k] };
            }
            sort_axis(&mut axis, &mut self.pairs);
            self.axes[k] = axis;
        }

        out.clear();
        out.extend(
            self.pairs
                .iter()
                .filter(|(_, rec)| rec.reported)
                .map(|(key, _)| key.bodies()),
        );
        out.sort_unstable();
    }
}

/// Insertion sort with the pair-maintenance hook on every swap.
fn sort_axis(list: &mut [Endpoint], pairs: &mut HashMap<PairKey, PairRecord>) {
    for i in 1..list.len() {
        let key = list[i];
        let mut j = i;
        while j > 0 && endpoint_less(&key, &list[j - 1]) {
            let other = list[j - 1];
            if key.owner != other.owner {
                if key.is_begin && !other.is_begin {
                    // A begin moves in front of an end: the intervals start
                    // overlapping on this axis.
                    let rec = pairs
                        .entry(PairKey::new(key.owner, other.owner))
                        .or_insert(PairRecord {
                            axis_overlap: 0,
                            reported: false,
                        });
                    rec.axis_overlap += 1;
                    if rec.axis_overlap == 3 {
                        rec.reported = true;
                    }
                } else if !key.is_begin && other.is_begin {
                    // An end moves behind a begin: the intervals stop
                    // overlapping on this axis.
                    if let Some(rec) = pairs.get_mut(&PairKey::new(key.owner, other.owner)) {
                        if rec.axis_overlap > 0 {
                            rec.axis_overlap -= 1;
                            if rec.axis_overlap == 2 {
                                rec.reported = false;
                            }
                        }
                    }
                }
            }
            list[j] = other;
            j -= 1;
        }
        list[j] = key;
    }
}
