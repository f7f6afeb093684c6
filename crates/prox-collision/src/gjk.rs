//! GJK (Gilbert-Johnson-Keerthi) closest points between convex shapes.
//!
//! Iteratively drives a pair of support mappings to build and reduce a
//! [`Simplex`] until the minimum-distance point of the Minkowski difference
//! is certified, or the shapes are certified intersecting.

use crate::error::{CollisionError, Result};
use crate::geometry::{world_support, SupportMap};
use crate::simplex::Simplex;
use prox_math::{Transform, Vec3};

/// Numerical tolerances and iteration budget for a GJK query.
#[derive(Debug, Clone, Copy)]
pub struct GjkTolerance {
    /// Stop when the distance falls at or below this value.
    pub absolute: f64,
    /// Relative decrease threshold, also used by the lower-bound test.
    pub relative: f64,
    /// Stop when the squared distance changes by no more than this.
    pub stagnation: f64,
    /// Hard cap on iterations.
    pub max_iterations: usize,
}

impl Default for GjkTolerance {
    fn default() -> Self {
        Self {
            absolute: 1e-6,
            relative: 1e-9,
            stagnation: 1e-14,
            max_iterations: 128,
        }
    }
}

impl GjkTolerance {
    /// Reject malformed tolerances before any iteration runs.
    pub fn validate(&self) -> Result<()> {
        if !(self.absolute >= 0.0) {
            return Err(CollisionError::InvalidTolerance(format!(
                "absolute must be non-negative, got {}",
                self.absolute
            )));
        }
        if !(self.relative >= 0.0) {
            return Err(CollisionError::InvalidTolerance(format!(
                "relative must be non-negative, got {}",
                self.relative
            )));
        }
        if !(self.stagnation >= 0.0) {
            return Err(CollisionError::InvalidTolerance(format!(
                "stagnation must be non-negative, got {}",
                self.stagnation
            )));
        }
        if self.max_iterations == 0 {
            return Err(CollisionError::InvalidIterationBudget);
        }
        Ok(())
    }
}

/// Terminal state of a GJK query. All states are final; continuing requires
/// a fresh query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GjkStatus {
    /// Re-sampled an existing simplex vertex: no closer point exists.
    SimplexExpansionFailed,
    /// The distance lower bound met the current estimate (van den Bergen).
    LowerErrorBoundConvergence,
    /// The simplex reached four vertices: the origin is enclosed.
    Intersection,
    /// The squared distance increased: numerical breakdown.
    NonDescendDirection,
    /// Distance at or below the absolute tolerance.
    AbsoluteConvergence,
    /// Squared-distance decrease fell below the relative tolerance.
    RelativeConvergence,
    /// Squared-distance change fell below the stagnation tolerance.
    Stagnation,
    /// Iteration budget exhausted without convergence.
    ExceededMaxIterations,
}

impl GjkStatus {
    /// True for states that certify the returned distance (intersection or
    /// one of the convergence criteria).
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            GjkStatus::SimplexExpansionFailed
                | GjkStatus::LowerErrorBoundConvergence
                | GjkStatus::Intersection
                | GjkStatus::AbsoluteConvergence
                | GjkStatus::RelativeConvergence
        )
    }
}

/// Result of a GJK query.
#[derive(Debug, Clone, Copy)]
pub struct GjkOutput {
    /// Closest point on the first shape, world frame.
    pub point_a: Vec3,
    /// Closest point on the second shape, world frame.
    pub point_b: Vec3,
    /// Separation distance (0 on intersection).
    pub distance: f64,
    /// Iterations consumed.
    pub iterations: usize,
    /// Terminal state.
    pub status: GjkStatus,
}

/// Compute the closest points between two placed convex shapes.
///
/// The probe vector is seeded from the difference of the two translations
/// (x axis when coincident), then each iteration samples both support
/// mappings along the probe, inserts the Minkowski-difference sample into
/// the simplex and reduces it to the sub-simplex closest to the origin.
pub fn closest_points(
    placement_a: &Transform,
    shape_a: &dyn SupportMap,
    placement_b: &Transform,
    shape_b: &dyn SupportMap,
    tolerance: &GjkTolerance,
) -> Result<GjkOutput> {
    tolerance.validate()?;

    let mut simplex = Simplex::new();
    let mut v = placement_a.pos - placement_b.pos;
    if v.norm_squared() < 1e-24 {
        v = Vec3::x();
    }
    let mut mu: f64 = 0.0;
    let mut prev_dist2 = f64::INFINITY;
    let mut iterations = 0;

    let status = loop {
        if iterations == tolerance.max_iterations {
            break GjkStatus::ExceededMaxIterations;
        }
        iterations += 1;

        // New Minkowski-difference sample along -v.
        let on_a = world_support(shape_a, placement_a, &-v);
        let on_b = world_support(shape_b, placement_b, &v);
        let w = on_a - on_b;

        let v_norm = v.norm();
        if v_norm > 0.0 {
            // Lower error bound on the distance along v (van den Bergen).
            mu = mu.max(v.dot(&w) / v_norm);
            if v_norm - mu <= v_norm * tolerance.relative {
                break GjkStatus::LowerErrorBoundConvergence;
            }
        }

        if simplex.contains_point(&w) {
            break GjkStatus::SimplexExpansionFailed;
        }

        simplex.add_point(w, on_a, on_b)?;
        v = simplex.reduce();

        if simplex.is_full() {
            break GjkStatus::Intersection;
        }

        let dist2 = v.norm_squared();
        if dist2 > prev_dist2 {
            break GjkStatus::NonDescendDirection;
        }
        if dist2 <= tolerance.absolute * tolerance.absolute {
            break GjkStatus::AbsoluteConvergence;
        }
        if prev_dist2.is_finite() {
            let drop = prev_dist2 - dist2;
            if drop <= tolerance.relative * prev_dist2 {
                break GjkStatus::RelativeConvergence;
            }
            if drop.abs() <= tolerance.stagnation {
                break GjkStatus::Stagnation;
            }
        }
        prev_dist2 = dist2;
    };

    let (point_a, point_b) = simplex.witness_points();
    let distance = match status {
        GjkStatus::Intersection => 0.0,
        _ => v.norm(),
    };

    Ok(GjkOutput {
        point_a,
        point_b,
        distance,
        iterations,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use approx::assert_relative_eq;
    use prox_math::Quat;

    fn sphere(radius: f64) -> Geometry {
        Geometry::Sphere { radius }
    }

    fn at(x: f64, y: f64, z: f64) -> Transform {
        Transform::from_translation(Vec3::new(x, y, z))
    }

    #[test]
    fn test_spheres_separated() {
        let s = sphere(1.0);
        let out = closest_points(&at(0.0, 0.0, 0.0), &s, &at(10.0, 0.0, 0.0), &s,
            &GjkTolerance::default())
        .unwrap();
        assert!(out.status.is_converged(), "status {:?}", out.status);
        assert_relative_eq!(out.distance, 8.0, epsilon = 1e-9);
        assert_relative_eq!(out.point_a, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(out.point_b, Vec3::new(9.0, 0.0, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_spheres_touching() {
        let s = sphere(1.0);
        let out = closest_points(&at(0.0, 0.0, 0.0), &s, &at(2.0, 0.0, 0.0), &s,
            &GjkTolerance::default())
        .unwrap();
        assert!(out.distance.abs() < 1e-9);
    }

    #[test]
    fn test_spheres_overlapping() {
        let s = sphere(1.0);
        let out = closest_points(&at(0.0, 0.0, 0.0), &s, &at(1.0, 0.0, 0.0), &s,
            &GjkTolerance::default())
        .unwrap();
        assert!(
            matches!(
                out.status,
                GjkStatus::Intersection | GjkStatus::AbsoluteConvergence
            ),
            "status {:?}",
            out.status
        );
        assert!(out.distance.abs() < 1e-9);
    }

    #[test]
    fn test_boxes_axis_aligned_gap() {
        let b = Geometry::Box {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        };
        let out = closest_points(&at(-1.0, 0.0, 0.0), &b, &at(1.0, 0.0, 0.0), &b,
            &GjkTolerance::default())
        .unwrap();
        assert!(out.status.is_converged());
        assert_relative_eq!(out.distance, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sphere_box_distance() {
        let s = sphere(0.5);
        let b = Geometry::Box {
            half_extents: Vec3::new(1.0, 1.0, 1.0),
        };
        let out = closest_points(&at(0.0, 4.0, 0.0), &s, &at(0.0, 0.0, 0.0), &b,
            &GjkTolerance::default())
        .unwrap();
        assert!(out.status.is_converged());
        assert_relative_eq!(out.distance, 2.5, epsilon = 1e-7);
    }

    #[test]
    fn test_rotated_box_distance() {
        // A unit box rotated 45 degrees about z presents a corner along x.
        let b = Geometry::Box {
            half_extents: Vec3::new(0.5, 0.5, 0.5),
        };
        let rot = Quat::from_axis_angle(&Vec3::z(), std::f64::consts::FRAC_PI_4).to_matrix();
        let ta = Transform::new(rot, Vec3::zeros());
        let tb = at(2.0, 0.0, 0.0);
        let out = closest_points(&ta, &b, &tb, &b, &GjkTolerance::default()).unwrap();
        assert!(out.status.is_converged());
        assert_relative_eq!(out.distance, 1.5 - 0.5_f64.sqrt(), epsilon = 1e-7);
    }

    #[test]
    fn test_deterministic_repeat() {
        let s = sphere(0.75);
        let b = Geometry::Capsule {
            radius: 0.25,
            length: 2.0,
        };
        let ta = at(0.3, 1.7, -0.2);
        let tb = at(-1.0, -1.0, 0.5);
        let tol = GjkTolerance::default();
        let first = closest_points(&ta, &s, &tb, &b, &tol).unwrap();
        let second = closest_points(&ta, &s, &tb, &b, &tol).unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.iterations, second.iterations);
        assert_eq!(first.distance, second.distance);
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let s = sphere(1.0);
        let tol = GjkTolerance {
            absolute: -1.0,
            ..GjkTolerance::default()
        };
        let err = closest_points(&at(0.0, 0.0, 0.0), &s, &at(3.0, 0.0, 0.0), &s, &tol)
            .unwrap_err();
        assert!(matches!(err, CollisionError::InvalidTolerance(_)));
    }

    #[test]
    fn test_zero_iteration_budget_rejected() {
        let s = sphere(1.0);
        let tol = GjkTolerance {
            max_iterations: 0,
            ..GjkTolerance::default()
        };
        let err = closest_points(&at(0.0, 0.0, 0.0), &s, &at(3.0, 0.0, 0.0), &s, &tol)
            .unwrap_err();
        assert_eq!(err, CollisionError::InvalidIterationBudget);
    }
}
