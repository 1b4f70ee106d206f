// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing against a point with a tolerance radius.
//!
//! The nearest points of a shape are the stationary points of the squared
//! distance, plus the end points of open curves. All candidates whose
//! distance ties with the minimum are reported, as long as the minimum is
//! within the tolerance.

use alloc::vec::Vec;
use core::f64::consts::PI;

use arrayvec::ArrayVec;

use super::conic::ellipse_tangent;
use super::{coordinate_polys, Geometry, IntersectionPoint, IntersectionStatus, Intersections};
use crate::common::{solve_quartic, EPSILON};
use crate::{Ellipse, ParamCurve, PathSeg, Point, Poly, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Two points, within `tolerance` of each other.
pub(super) fn point_point(p: Point, q: Point, tolerance: f64) -> Intersections {
    if p.distance(q) <= tolerance {
        Intersections::from_points(alloc::vec![IntersectionPoint::new(
            p,
            f64::NAN,
            f64::NAN,
            Vec2::ZERO,
            Vec2::ZERO,
        )])
    } else {
        Intersections::empty(IntersectionStatus::NoIntersection)
    }
}

/// The nearest points of a shape to `p`, if within `tolerance`.
///
/// Polygons and rectangles are decomposed before reaching here.
pub(super) fn shape_point(shape: &Geometry, p: Point, tolerance: f64) -> Intersections {
    // Candidates as (parameter, point on shape, tangent).
    let candidates: Vec<(f64, Point, Vec2)> = match *shape {
        Geometry::Point { point, .. } => alloc::vec![(f64::NAN, point, Vec2::ZERO)],
        Geometry::Line(l) => {
            let (t, _) = l.nearest(p);
            alloc::vec![(t, l.eval(t), l.p1 - l.p0)]
        }
        Geometry::Ray(r) => {
            let (t, _) = r.nearest(p);
            alloc::vec![(t, r.eval(t), r.direction)]
        }
        Geometry::Quad(q) => curve_candidates(&PathSeg::Quad(q), p),
        Geometry::Cubic(c) => curve_candidates(&PathSeg::Cubic(c), p),
        Geometry::Circle(c) => ellipse_candidates(&c.to_ellipse(), p),
        Geometry::Ellipse(e) => ellipse_candidates(&e, p),
        Geometry::Polygon(_) | Geometry::Rect(_) => Vec::new(),
    };
    let min = candidates
        .iter()
        .map(|(_, q, _)| q.distance_squared(p))
        .fold(f64::INFINITY, f64::min);
    if !(min.sqrt() <= tolerance) {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    let tie = min + EPSILON * min;
    let mut points: Vec<IntersectionPoint> = Vec::new();
    for (t, q, tangent) in candidates {
        if q.distance_squared(p) > tie {
            continue;
        }
        let duplicate = points.iter().any(|prev| prev.point.is_near(q));
        if !duplicate {
            points.push(IntersectionPoint::new(q, t, f64::NAN, tangent, Vec2::ZERO));
        }
    }
    Intersections::from_points(points)
}

/// End points and stationary points of the squared distance along a curve.
///
/// The derivative of `|B(t) - p|²` is `2 (B(t) - p) · B'(t)`, a polynomial
/// of degree `2n - 1`.
fn curve_candidates(seg: &PathSeg, p: Point) -> Vec<(f64, Point, Vec2)> {
    let (x, y) = coordinate_polys(seg);
    let dx = &x - &Poly::constant(p.x);
    let dy = &y - &Poly::constant(p.y);
    let stationary = &dx * &x.deriv() + &(&dy * &y.deriv());
    let mut ts = stationary.roots_between(0.0, 1.0);
    ts.extend([0.0, 1.0]);
    ts.into_iter()
        .map(|t| (t, seg.eval(t), seg.tangent(t)))
        .collect()
}

/// Stationary points of the squared distance around an ellipse.
///
/// In the ellipse's own frame, with `q` the point, the condition is
/// `(ry² - rx²) sin θ cos θ + rx qx sin θ - ry qy cos θ = 0`. The half-angle
/// substitution makes it a quartic in `u = tan(θ/2)`, and `θ = π` is
/// checked on its own.
fn ellipse_candidates(e: &Ellipse, p: Point) -> Vec<(f64, Point, Vec2)> {
    let (rx, ry) = (e.radii.x, e.radii.y);
    // Into the ellipse's frame: centered, unrotated, unscaled.
    let (s, c) = e.rotation.sin_cos();
    let v = p - e.center;
    let qx = c * v.x + s * v.y;
    let qy = -s * v.x + c * v.y;
    let k = ry * ry - rx * rx;
    let c0 = -ry * qy;
    let c1 = 2.0 * k + 2.0 * rx * qx;
    let c3 = -2.0 * k + 2.0 * rx * qx;
    let c4 = ry * qy;
    let mut thetas: ArrayVec<f64, 6> = solve_quartic(c0, c1, 0.0, c3, c4)
        .iter()
        .map(|u| 2.0 * u.atan())
        .collect();
    thetas.push(PI);
    if rx == ry {
        // A circle: every θ is stationary from the center, and otherwise
        // the nearest point is along the ray to `p`.
        thetas.push(qy.atan2(qx));
    }
    thetas
        .into_iter()
        .map(|theta| {
            let q = e.point_at(theta);
            (f64::NAN, q, ellipse_tangent(e, q))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::intersect::{intersect, Geometry, IntersectionStatus};
    use crate::{Circle, CubicBez, Ellipse, Line, Point, QuadBez};

    fn disk(x: f64, y: f64, tolerance: f64) -> Geometry {
        Geometry::Point {
            point: Point::new(x, y),
            tolerance,
        }
    }

    #[test]
    fn line_hit_and_miss() {
        let l = Geometry::Line(Line::new((0.0, 0.0), (10.0, 0.0)));
        let hit = intersect(&l, &disk(3.0, 0.5, 1.0));
        assert_eq!(hit.points().len(), 1);
        assert_eq!(hit.points()[0].t1, 0.3);
        assert_eq!(hit.points()[0].point, Point::new(3.0, 0.0));
        assert_eq!(
            intersect(&l, &disk(3.0, 2.0, 1.0)).status(),
            IntersectionStatus::NoIntersection
        );
        // The point first: parameters swap.
        let swapped = intersect(&disk(3.0, 0.5, 1.0), &l);
        assert_eq!(swapped.points()[0].t2, 0.3);
    }

    #[test]
    fn quad_apex() {
        let q = Geometry::Quad(QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0)));
        let hit = intersect(&q, &disk(1.0, 1.2, 0.5));
        assert_eq!(hit.points().len(), 1);
        assert!((hit.points()[0].t1 - 0.5).abs() < 1e-9);
        assert!(hit.points()[0].point.distance(Point::new(1.0, 1.0)) < 1e-9);
    }

    #[test]
    fn equidistant_ties_are_all_reported() {
        // A symmetric arch has two nearest points from below its apex.
        let c = Geometry::Cubic(CubicBez::new((0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0)));
        let hit = intersect(&c, &disk(2.0, -1.0, 10.0));
        assert_eq!(hit.points().len(), 2);
        assert!(hit.points()[0].t1 < hit.points()[1].t1);
    }

    #[test]
    fn circle_and_ellipse() {
        let c = Geometry::Circle(Circle::new((0.0, 0.0), 5.0));
        let hit = intersect(&c, &disk(3.6, 4.8, 1.5));
        assert_eq!(hit.points().len(), 1);
        assert!(hit.points()[0].point.distance(Point::new(3.0, 4.0)) < 1e-9);
        let e = Geometry::Ellipse(Ellipse::new((0.0, 0.0), (4.0, 2.0), 0.0));
        let hit = intersect(&e, &disk(0.0, 2.3, 0.5));
        assert_eq!(hit.points().len(), 1);
        assert!(hit.points()[0].point.distance(Point::new(0.0, 2.0)) < 1e-9);
        assert_eq!(
            intersect(&e, &disk(0.0, 0.0, 0.5)).status(),
            IntersectionStatus::NoIntersection
        );
    }

    #[test]
    fn points() {
        assert!(intersect(&disk(0.0, 0.0, 1.0), &disk(0.5, 0.5, 0.0)).is_intersection());
        assert!(!intersect(&disk(0.0, 0.0, 0.1), &disk(0.5, 0.5, 0.1)).is_intersection());
    }
}
