//! Math primitives for the prox collision pipeline.
//!
//! Everything is `f64`. Vector and matrix types are thin aliases onto
//! nalgebra; rigid placements are a rotation matrix plus a translation.

pub mod quaternion;
pub mod transform;

pub use quaternion::Quat;
pub use transform::Transform;

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;

/// Parameters `(s, t)` of the closest points between two lines
/// `p1 + s*d1` and `p2 + t*d2`.
///
/// The parameters are unclamped; for parallel lines `s = 0` is returned
/// with `t` chosen so the points face each other.
pub fn closest_points_on_lines(p1: &Vec3, d1: &Vec3, p2: &Vec3, d2: &Vec3) -> (f64, f64) {
    let r = p1 - p2;
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let b = d1.dot(d2);
    let c = d1.dot(&r);
    let f = d2.dot(&r);

    let denom = a * e - b * b;
    if denom.abs() < 1e-12 {
        // Parallel lines: any point on the first line works.
        let t = if e > 1e-12 { f / e } else { 0.0 };
        return (0.0, t);
    }

    let s = (b * f - c * e) / denom;
    let t = (b * s + f) / e;
    (s, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_closest_points_crossing_lines() {
        // Line along x at z=0 and line along y at z=1: closest at the origin column.
        let p1 = Vec3::new(-3.0, 0.0, 0.0);
        let d1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(0.0, 5.0, 1.0);
        let d2 = Vec3::new(0.0, -1.0, 0.0);

        let (s, t) = closest_points_on_lines(&p1, &d1, &p2, &d2);
        let q1 = p1 + d1 * s;
        let q2 = p2 + d2 * t;
        assert_relative_eq!(q1, Vec3::new(0.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(q2, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_closest_points_parallel_lines() {
        let p1 = Vec3::zeros();
        let d = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(4.0, 2.0, 0.0);

        let (s, t) = closest_points_on_lines(&p1, &d, &p2, &d);
        assert_relative_eq!(s, 0.0);
        // The facing point on the second line sits above p1.
        let q2 = p2 + d * t;
        assert_relative_eq!(q2, Vec3::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }
}
