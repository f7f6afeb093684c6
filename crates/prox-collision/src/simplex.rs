//! Fixed-capacity simplex for the GJK closest-points engine.
//!
//! Holds up to four affinely independent sample points of the Minkowski
//! difference A - B, together with the support points on each shape that
//! produced them and, after a reduction step, the barycentric weights of the
//! point of the simplex closest to the origin.

use crate::error::{CollisionError, Result};
use prox_math::{Mat3, Vec3};

/// Up-to-4-vertex simplex with an explicit occupancy bitmask.
///
/// Slots are reused: a reduction step may free any subset of slots, and the
/// next insertion fills the lowest free one. No allocation happens after
/// construction.
#[derive(Debug, Clone)]
pub struct Simplex {
    bitmask: u8,
    vertices: [Vec3; 4],
    support_a: [Vec3; 4],
    support_b: [Vec3; 4],
    weights: [f64; 4],
}

impl Simplex {
    /// Empty simplex.
    pub fn new() -> Self {
        Self {
            bitmask: 0,
            vertices: [Vec3::zeros(); 4],
            support_a: [Vec3::zeros(); 4],
            support_b: [Vec3::zeros(); 4],
            weights: [0.0; 4],
        }
    }

    /// Number of occupied slots.
    pub fn dimension(&self) -> usize {
        self.bitmask.count_ones() as usize
    }

    /// True when all four slots are occupied (origin enclosed).
    pub fn is_full(&self) -> bool {
        self.dimension() == 4
    }

    /// True iff `p` equals one of the occupied vertices by value.
    ///
    /// Support mappings are deterministic for a fixed direction, so
    /// re-sampling an already-present vertex means no progress is possible.
    pub fn contains_point(&self, p: &Vec3) -> bool {
        self.occupied().any(|i| self.vertices[i] == *p)
    }

    /// Insert a Minkowski-difference sample and its originating support
    /// points into the first free slot.
    ///
    /// Fails with [`CollisionError::SimplexFull`] when all four slots are
    /// occupied; correct callers never grow a full simplex.
    pub fn add_point(&mut self, p: Vec3, on_a: Vec3, on_b: Vec3) -> Result<()> {
        for slot in 0..4 {
            if self.bitmask & (1 << slot) == 0 {
                self.vertices[slot] = p;
                self.support_a[slot] = on_a;
                self.support_b[slot] = on_b;
                self.weights[slot] = 0.0;
                self.bitmask |= 1 << slot;
                return Ok(());
            }
        }
        Err(CollisionError::SimplexFull)
    }

    /// The first `count` occupied slot indices in ascending order.
    ///
    /// Fails with [`CollisionError::SimplexTooSmall`] if fewer than `count`
    /// slots are occupied.
    pub fn used_indices(&self, count: usize) -> Result<Vec<usize>> {
        let have = self.dimension();
        if have < count {
            return Err(CollisionError::SimplexTooSmall { have, want: count });
        }
        Ok(self.occupied().take(count).collect())
    }

    /// Witness points on each shape, recovered from the barycentric weights
    /// of the last reduction.
    pub fn witness_points(&self) -> (Vec3, Vec3) {
        let mut on_a = Vec3::zeros();
        let mut on_b = Vec3::zeros();
        for i in self.occupied() {
            on_a += self.support_a[i] * self.weights[i];
            on_b += self.support_b[i] * self.weights[i];
        }
        (on_a, on_b)
    }

    /// Reduce to the lowest-dimensional sub-simplex whose convex hull
    /// contains the point of the current simplex closest to the origin.
    ///
    /// Returns that closest point; the retained slots carry its barycentric
    /// weights. When the origin lies inside a tetrahedron all four slots are
    /// kept and the zero vector is returned.
    pub fn reduce(&mut self) -> Vec3 {
        let idx: Vec<usize> = self.occupied().collect();
        let closest = match idx.len() {
            0 => return Vec3::zeros(),
            1 => Closest {
                point: self.vertices[idx[0]],
                kept: vec![(0, 1.0)],
            },
            2 => closest_on_segment(self.vertices[idx[0]], self.vertices[idx[1]]),
            3 => closest_on_triangle(
                self.vertices[idx[0]],
                self.vertices[idx[1]],
                self.vertices[idx[2]],
            ),
            _ => closest_on_tetrahedron(
                self.vertices[idx[0]],
                self.vertices[idx[1]],
                self.vertices[idx[2]],
                self.vertices[idx[3]],
            ),
        };

        self.bitmask = 0;
        self.weights = [0.0; 4];
        for &(local, w) in &closest.kept {
            let slot = idx[local];
            self.bitmask |= 1 << slot;
            self.weights[slot] = w;
        }
        closest.point
    }

    fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        (0..4).filter(move |i| self.bitmask & (1 << i) != 0)
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new()
    }
}

/// Closest point of a sub-simplex to the origin: the point itself and the
/// retained input indices with their barycentric weights.
struct Closest {
    point: Vec3,
    kept: Vec<(usize, f64)>,
}

/// Closest point to the origin on segment [a, b].
fn closest_on_segment(a: Vec3, b: Vec3) -> Closest {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < 1e-30 {
        // Degenerate segment, keep the first vertex.
        return Closest {
            point: a,
            kept: vec![(0, 1.0)],
        };
    }
    let t = -a.dot(&ab) / len2;
    if t <= 0.0 {
        Closest {
            point: a,
            kept: vec![(0, 1.0)],
        }
    } else if t >= 1.0 {
        Closest {
            point: b,
            kept: vec![(1, 1.0)],
        }
    } else {
        Closest {
            point: a + ab * t,
            kept: vec![(0, 1.0 - t), (1, t)],
        }
    }
}

/// Closest point to the origin on triangle [a, b, c], by Voronoi regions.
fn closest_on_triangle(a: Vec3, b: Vec3, c: Vec3) -> Closest {
    let ab = b - a;
    let ac = c - a;
    let ap = -a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        // Vertex region A.
        return Closest {
            point: a,
            kept: vec![(0, 1.0)],
        };
    }

    let bp = -b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        // Vertex region B.
        return Closest {
            point: b,
            kept: vec![(1, 1.0)],
        };
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        // Edge region AB.
        let t = d1 / (d1 - d3);
        return Closest {
            point: a + ab * t,
            kept: vec![(0, 1.0 - t), (1, t)],
        };
    }

    let cp = -c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        // Vertex region C.
        return Closest {
            point: c,
            kept: vec![(2, 1.0)],
        };
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        // Edge region AC.
        let t = d2 / (d2 - d6);
        return Closest {
            point: a + ac * t,
            kept: vec![(0, 1.0 - t), (2, t)],
        };
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && d4 - d3 >= 0.0 && d5 - d6 >= 0.0 {
        // Edge region BC.
        let t = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return Closest {
            point: b + (c - b) * t,
            kept: vec![(1, 1.0 - t), (2, t)],
        };
    }

    // Face interior.
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    Closest {
        point: a + ab * v + ac * w,
        kept: vec![(0, 1.0 - v - w), (1, v), (2, w)],
    }
}

/// Closest point to the origin on (or in) tetrahedron [a, b, c, d].
fn closest_on_tetrahedron(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Closest {
    // Faces listed with their opposite vertex and local index mapping.
    let faces: [([Vec3; 3], Vec3, [usize; 3]); 4] = [
        ([a, b, c], d, [0, 1, 2]),
        ([a, b, d], c, [0, 1, 3]),
        ([a, c, d], b, [0, 2, 3]),
        ([b, c, d], a, [1, 2, 3]),
    ];

    let mut best: Option<Closest> = None;
    let mut inside = true;
    for (tri, opposite, map) in faces {
        if !origin_outside_face(&tri, &opposite) {
            continue;
        }
        inside = false;
        let sub = closest_on_triangle(tri[0], tri[1], tri[2]);
        let better = match &best {
            Some(prev) => sub.point.norm_squared() < prev.point.norm_squared(),
            None => true,
        };
        if better {
            best = Some(Closest {
                point: sub.point,
                kept: sub.kept.iter().map(|&(i, w)| (map[i], w)).collect(),
            });
        }
    }

    if inside {
        // Origin enclosed: keep all four vertices with the barycentric
        // coordinates of the origin.
        let weights = tetrahedron_barycentric(a, b, c, d);
        return Closest {
            point: Vec3::zeros(),
            kept: (0..4).map(|i| (i, weights[i])).collect(),
        };
    }

    best.expect("origin outside at least one face")
}

/// True when the origin lies strictly on the far side of the face plane
/// from the opposite tetrahedron vertex.
fn origin_outside_face(tri: &[Vec3; 3], opposite: &Vec3) -> bool {
    let n = (tri[1] - tri[0]).cross(&(tri[2] - tri[0]));
    let signed_origin = n.dot(&-tri[0]);
    let signed_opposite = n.dot(&(opposite - tri[0]));
    signed_origin * signed_opposite < 0.0
}

/// Barycentric coordinates of the origin inside tetrahedron [a, b, c, d].
fn tetrahedron_barycentric(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> [f64; 4] {
    let m = Mat3::from_columns(&[b - a, c - a, d - a]);
    match m.lu().solve(&(-a)) {
        Some(x) => [1.0 - x.x - x.y - x.z, x.x, x.y, x.z],
        // Degenerate tetrahedron enclosing the origin: spread evenly.
        None => [0.25; 4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_dimension_tracks_insertions() {
        let mut s = Simplex::new();
        assert_eq!(s.dimension(), 0);
        for (i, p) in [
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ]
        .into_iter()
        .enumerate()
        {
            s.add_point(p, p, Vec3::zeros()).unwrap();
            assert_eq!(s.dimension(), i + 1);
        }
        assert!(s.is_full());
    }

    #[test]
    fn test_fifth_insertion_fails() {
        let mut s = Simplex::new();
        for i in 0..4 {
            s.add_point(Vec3::new(i as f64, 0.0, 0.0), Vec3::zeros(), Vec3::zeros())
                .unwrap();
        }
        let err = s
            .add_point(Vec3::new(9.0, 0.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap_err();
        assert_eq!(err, CollisionError::SimplexFull);
    }

    #[test]
    fn test_contains_point_by_value() {
        let mut s = Simplex::new();
        let p = Vec3::new(0.5, -0.5, 2.0);
        s.add_point(p, p, Vec3::zeros()).unwrap();
        assert!(s.contains_point(&p));
        assert!(!s.contains_point(&Vec3::new(0.5, -0.5, 2.0 + 1e-15)));
    }

    #[test]
    fn test_used_indices_underpopulated() {
        let mut s = Simplex::new();
        s.add_point(Vec3::x(), Vec3::zeros(), Vec3::zeros()).unwrap();
        assert_eq!(s.used_indices(1).unwrap(), vec![0]);
        let err = s.used_indices(3).unwrap_err();
        assert_eq!(err, CollisionError::SimplexTooSmall { have: 1, want: 3 });
    }

    #[test]
    fn test_slot_reuse_after_reduction() {
        let mut s = Simplex::new();
        // Closest feature is the vertex nearest the origin; the far vertex's
        // slot is freed and reused by the next insertion.
        s.add_point(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        s.add_point(Vec3::new(5.0, 0.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        let v = s.reduce();
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(s.dimension(), 1);
        s.add_point(Vec3::new(0.0, 2.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        assert_eq!(s.used_indices(2).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_reduce_segment_interior() {
        let mut s = Simplex::new();
        s.add_point(Vec3::new(1.0, 1.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        s.add_point(Vec3::new(1.0, -1.0, 0.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        let v = s.reduce();
        assert_relative_eq!(v, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(s.dimension(), 2);
    }

    #[test]
    fn test_reduce_triangle_interior() {
        let mut s = Simplex::new();
        // Triangle in the z = 2 plane surrounding the z axis.
        s.add_point(Vec3::new(-1.0, -1.0, 2.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        s.add_point(Vec3::new(2.0, 0.0, 2.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        s.add_point(Vec3::new(-1.0, 1.0, 2.0), Vec3::zeros(), Vec3::zeros())
            .unwrap();
        let v = s.reduce();
        assert_relative_eq!(v, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
        assert_eq!(s.dimension(), 3);
    }

    #[test]
    fn test_reduce_tetrahedron_containing_origin() {
        let mut s = Simplex::new();
        for p in [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
        ] {
            s.add_point(p, p, Vec3::zeros()).unwrap();
        }
        let v = s.reduce();
        assert_relative_eq!(v, Vec3::zeros(), epsilon = 1e-12);
        assert!(s.is_full());
        // Weights reconstruct the origin.
        let (on_a, _) = s.witness_points();
        assert_relative_eq!(on_a, Vec3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_reduce_tetrahedron_outside() {
        let mut s = Simplex::new();
        // All vertices have z >= 1; the closest feature is the z = 1 face.
        for p in [
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, 3.0),
        ] {
            s.add_point(p, p, Vec3::zeros()).unwrap();
        }
        let v = s.reduce();
        assert_relative_eq!(v, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert!(s.dimension() <= 3);
    }
}
