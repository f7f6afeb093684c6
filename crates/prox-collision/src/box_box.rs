//! Separating-axis test and contact manifold for oriented boxes.
//!
//! Fifteen candidate axes are tested in fixed order: the six face normals
//! first, then the nine edge-edge cross products. The deepest axis decides
//! the contact configuration: a face axis yields a clipped multi-point
//! manifold, an edge axis yields a single point between the two edges.
//! Downstream tie-breaking depends on this order; do not reorder the tests.

use prox_math::{closest_points_on_lines, Mat3, Vec3};

/// Bias added to |R| entries, guards axis-aligned degeneracies.
const ROT_EPS: f64 = 1.0e-5;
/// Edge cross-product axes shorter than this are skipped.
const AXIS_EPS: f64 = 1.0e-9;
/// Edge axes must beat the best face axis by this factor.
const FUDGE_FACTOR: f64 = 1.05;

/// An oriented box in world space.
#[derive(Debug, Clone, Copy)]
pub struct OrientedBox {
    /// Center position.
    pub center: Vec3,
    /// Rotation from the box frame to the world frame.
    pub rot: Mat3,
    /// Half-extents along the box's local axes.
    pub half_extents: Vec3,
}

impl OrientedBox {
    pub fn new(center: Vec3, rot: Mat3, half_extents: Vec3) -> Self {
        Self {
            center,
            rot,
            half_extents,
        }
    }

    /// World direction of local axis `k`.
    fn axis(&self, k: usize) -> Vec3 {
        Vec3::new(self.rot[(0, k)], self.rot[(1, k)], self.rot[(2, k)])
    }
}

/// Result of a box-box query.
#[derive(Debug, Clone)]
pub struct BoxBoxContact {
    /// Contact positions, world frame (empty when disjoint). At most 8.
    pub points: Vec<Vec3>,
    /// Penetration depth per point: positive = overlapping, negative =
    /// separated by that distance along the normal (within the envelope).
    pub depths: Vec<f64>,
    /// Contact normal, world frame, pointing from the first box toward the
    /// second.
    pub normal: Vec3,
    /// Signed separation along the winning axis: positive when the boxes
    /// are disjoint, non-positive when they touch.
    pub separation: f64,
    /// Winning axis: 1-6 face axes (1-3 on the first box), 7-15 edge axes.
    pub code: usize,
}

impl BoxBoxContact {
    fn disjoint(normal: Vec3, separation: f64, code: usize) -> Self {
        Self {
            points: Vec::new(),
            depths: Vec::new(),
            normal,
            separation,
            code,
        }
    }

    /// Number of contact points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when no contact points were produced.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Test two oriented boxes for contact.
///
/// Returns immediately with zero points when a separating axis is found;
/// the separating axis and distance stay visible in the result. Otherwise
/// the winning axis synthesizes the manifold. The collision envelope is
/// applied only when accepting clipped face-contact points, not to the
/// axis tests themselves.
pub fn box_box(a: &OrientedBox, b: &OrientedBox, envelope: f64) -> BoxBoxContact {
    let ha = a.half_extents;
    let hb = b.half_extents;

    // Everything below works in A's frame.
    let p_world = b.center - a.center;
    let p = a.rot.transpose() * p_world;
    let r = a.rot.transpose() * b.rot;
    let q = r.map(|e| e.abs() + ROT_EPS);

    // Deepest non-separating axis seen so far (separations are <= 0).
    let mut best_sep = f64::NEG_INFINITY;
    let mut best_code = 0usize;
    // Winning axis in A's frame, oriented from A toward B.
    let mut best_axis = Vec3::zeros();

    // Face axes of A (codes 1-3).
    for i in 0..3 {
        let expr = p[i];
        let rb = hb.x * q[(i, 0)] + hb.y * q[(i, 1)] + hb.z * q[(i, 2)];
        let s = expr.abs() - (ha[i] + rb);
        let mut axis = Vec3::zeros();
        axis[i] = if expr < 0.0 { -1.0 } else { 1.0 };
        if s > 0.0 {
            return BoxBoxContact::disjoint(a.rot * axis, s, i + 1);
        }
        if s > best_sep {
            best_sep = s;
            best_code = i + 1;
            best_axis = axis;
        }
    }

    // Face axes of B (codes 4-6).
    for j in 0..3 {
        let col = Vec3::new(r[(0, j)], r[(1, j)], r[(2, j)]);
        let expr = p.dot(&col);
        let ra = ha.x * q[(0, j)] + ha.y * q[(1, j)] + ha.z * q[(2, j)];
        let s = expr.abs() - (ra + hb[j]);
        let axis = if expr < 0.0 { -col } else { col };
        if s > 0.0 {
            return BoxBoxContact::disjoint(a.rot * axis, s, j + 4);
        }
        if s > best_sep {
            best_sep = s;
            best_code = j + 4;
            best_axis = axis;
        }
    }

    // Edge-edge cross axes (codes 7-15): axis = A_i x B_j in A's frame.
    for i in 0..3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let col = Vec3::new(r[(0, j)], r[(1, j)], r[(2, j)]);
            let mut axis = Vec3::zeros();
            axis[i1] = -col[i2];
            axis[i2] = col[i1];

            let expr = p.dot(&axis);
            let ra = ha[i1] * q[(i2, j)] + ha[i2] * q[(i1, j)];
            let rb = hb[j1] * q[(i, j2)] + hb[j2] * q[(i, j1)];
            let mut s = expr.abs() - (ra + rb);
            let code = 7 + i * 3 + j;

            let len = axis.norm();
            if len <= AXIS_EPS {
                // Near-parallel edges: this axis contributes nothing.
                continue;
            }
            if s > 0.0 {
                let unit = axis / len;
                let oriented = if expr < 0.0 { -unit } else { unit };
                return BoxBoxContact::disjoint(a.rot * oriented, s / len, code);
            }
            s /= len;
            if s * FUDGE_FACTOR > best_sep {
                best_sep = s;
                best_code = code;
                let unit = axis / len;
                best_axis = if expr < 0.0 { -unit } else { unit };
            }
        }
    }

    let normal = a.rot * best_axis;
    if best_code >= 7 {
        edge_contact(a, b, &normal, best_sep, best_code)
    } else {
        face_contact(a, b, &normal, best_sep, best_code, envelope)
    }
}

/// Single contact point between the two edges selected by an edge-edge axis.
fn edge_contact(
    a: &OrientedBox,
    b: &OrientedBox,
    normal: &Vec3,
    separation: f64,
    code: usize,
) -> BoxBoxContact {
    let i = (code - 7) / 3;
    let j = (code - 7) % 3;

    // Edge on A: supported along the normal, directed along axis i.
    let mut pa = a.center;
    for k in 0..3 {
        if k == i {
            continue;
        }
        let ak = a.axis(k);
        let sign = if normal.dot(&ak) > 0.0 { 1.0 } else { -1.0 };
        pa += ak * (sign * a.half_extents[k]);
    }
    // Edge on B: supported against the normal, directed along axis j.
    let mut pb = b.center;
    for k in 0..3 {
        if k == j {
            continue;
        }
        let bk = b.axis(k);
        let sign = if normal.dot(&bk) > 0.0 { -1.0 } else { 1.0 };
        pb += bk * (sign * b.half_extents[k]);
    }

    let ua = a.axis(i);
    let ub = b.axis(j);
    let (s, t) = closest_points_on_lines(&pa, &ua, &pb, &ub);
    let qa = pa + ua * s;
    let qb = pb + ub * t;

    BoxBoxContact {
        points: vec![(qa + qb) * 0.5],
        depths: vec![-separation],
        normal: *normal,
        separation,
        code,
    }
}

/// Clipped multi-point manifold for a face-axis contact.
fn face_contact(
    a: &OrientedBox,
    b: &OrientedBox,
    normal: &Vec3,
    separation: f64,
    code: usize,
    envelope: f64,
) -> BoxBoxContact {
    // The box owning the winning face is the reference, the other the
    // incident box; n_ri points from reference toward incident.
    let (reference, incident, n_ri) = if code <= 3 {
        (a, b, *normal)
    } else {
        (b, a, -normal)
    };
    let ref_axis = (code - 1) % 3;

    // Incident face: the one most anti-parallel to n_ri.
    let n_inc = incident.rot.transpose() * n_ri;
    let mut inc_axis = 0;
    for k in 1..3 {
        if n_inc[k].abs() > n_inc[inc_axis].abs() {
            inc_axis = k;
        }
    }
    let inc_sign = if n_inc[inc_axis] < 0.0 { 1.0 } else { -1.0 };
    let inc_center = incident.center
        + incident.axis(inc_axis) * (inc_sign * incident.half_extents[inc_axis]);

    // In-plane axes of the incident face.
    let (u_axis, v_axis) = ((inc_axis + 1) % 3, (inc_axis + 2) % 3);
    let u = incident.axis(u_axis);
    let v = incident.axis(v_axis);
    let hu = incident.half_extents[u_axis];
    let hv = incident.half_extents[v_axis];

    // 2-D frame of the reference face.
    let (r1_axis, r2_axis) = ((ref_axis + 1) % 3, (ref_axis + 2) % 3);
    let r1 = reference.axis(r1_axis);
    let r2 = reference.axis(r2_axis);
    let rh1 = reference.half_extents[r1_axis];
    let rh2 = reference.half_extents[r2_axis];

    // Incident face footprint in the reference face's 2-D frame.
    let d = inc_center - reference.center;
    let c1 = d.dot(&r1);
    let c2 = d.dot(&r2);
    let m11 = r1.dot(&u);
    let m12 = r1.dot(&v);
    let m21 = r2.dot(&u);
    let m22 = r2.dot(&v);
    let quad = [
        (c1 + m11 * hu + m12 * hv, c2 + m21 * hu + m22 * hv),
        (c1 - m11 * hu + m12 * hv, c2 - m21 * hu + m22 * hv),
        (c1 - m11 * hu - m12 * hv, c2 - m21 * hu - m22 * hv),
        (c1 + m11 * hu - m12 * hv, c2 + m21 * hu - m22 * hv),
    ];

    let clipped = clip_quad_to_rect(&quad, rh1, rh2);

    let det = m11 * m22 - m12 * m21;
    if det.abs() < 1e-12 {
        // Incident face edge-on to the reference face; the face codes
        // cannot select this configuration with a sane winning axis.
        return BoxBoxContact::disjoint(*normal, separation, code);
    }
    let inv = 1.0 / det;

    let mut points = Vec::new();
    let mut depths = Vec::new();
    for &(x, y) in &clipped {
        let k1 = inv * (m22 * (x - c1) - m12 * (y - c2));
        let k2 = inv * (-m21 * (x - c1) + m11 * (y - c2));
        let point = inc_center + u * k1 + v * k2;
        let depth =
            reference.half_extents[ref_axis] - n_ri.dot(&(point - reference.center));
        if depth >= -envelope {
            points.push(point);
            depths.push(depth);
            if points.len() == 8 {
                break;
            }
        }
    }

    BoxBoxContact {
        points,
        depths,
        normal: *normal,
        separation,
        code,
    }
}

/// Sutherland-Hodgman clip of a quad against the axis-aligned rectangle
/// [-h1, h1] x [-h2, h2]. A quad against a rectangle yields at most 8
/// vertices.
fn clip_quad_to_rect(quad: &[(f64, f64); 4], h1: f64, h2: f64) -> Vec<(f64, f64)> {
    let mut poly: Vec<(f64, f64)> = quad.to_vec();
    // (component selector, sign, bound): keeps sign * coord <= bound.
    let planes = [(0, 1.0, h1), (0, -1.0, h1), (1, 1.0, h2), (1, -1.0, h2)];
    for (comp, sign, bound) in planes {
        if poly.is_empty() {
            break;
        }
        let coord = |p: &(f64, f64)| if comp == 0 { p.0 } else { p.1 };
        let mut clipped = Vec::with_capacity(poly.len() + 1);
        for k in 0..poly.len() {
            let cur = poly[k];
            let next = poly[(k + 1) % poly.len()];
            let cur_in = sign * coord(&cur) <= bound;
            let next_in = sign * coord(&next) <= bound;
            if cur_in {
                clipped.push(cur);
            }
            if cur_in != next_in {
                let t = (bound - sign * coord(&cur))
                    / (sign * coord(&next) - sign * coord(&cur));
                clipped.push((
                    cur.0 + (next.0 - cur.0) * t,
                    cur.1 + (next.1 - cur.1) * t,
                ));
            }
        }
        poly = clipped;
    }
    poly
}
