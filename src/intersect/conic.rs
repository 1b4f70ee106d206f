// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections with circles and ellipses.
//!
//! Everything is solved in the frame that maps the ellipse onto the unit
//! circle, where the implicit equation is simply `|p|² = 1`. Parameters on
//! the closed shapes are reported as `NaN`.

use alloc::vec::Vec;
use core::f64::consts::PI;

use super::line::Linear;
use super::{power_basis, IntersectionPoint, IntersectionStatus, Intersections};
use crate::common::{solve_quadratic, solve_quartic, EPSILON};
use crate::{Circle, Ellipse, ParamCurve, PathSeg, Point, Poly, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// The counterclockwise tangent of an ellipse at a point on it.
pub(super) fn ellipse_tangent(e: &Ellipse, p: Point) -> Vec2 {
    let q = (e.inverse_affine() * p).to_vec2();
    e.affine().transform_vec2(q.turn_90())
}

/// A line or ray against an ellipse.
///
/// With no crossing in range, a line that exactly touches the ellipse
/// within its extent is `Tangent`, and otherwise the segment is `Inside` when it lies between
/// the two crossings of its infinite line, `Outside` if not.
pub(super) fn linear_ellipse(a: &Linear, e: &Ellipse) -> Intersections {
    if e.is_degenerate() {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    let to_unit = e.inverse_affine();
    let o = (to_unit * a.origin).to_vec2();
    let d = to_unit.transform_vec2(a.direction);
    let qa = d.hypot2();
    let qb = 2.0 * o.dot(d);
    let qc = o.hypot2() - 1.0;
    let disc = qb * qb - 4.0 * qa * qc;
    let scale = (qb * qb).max((4.0 * qa * qc).abs());
    if disc < 0.0 && disc.abs() > EPSILON * scale {
        return Intersections::empty(IntersectionStatus::Outside);
    }
    if disc.abs() <= EPSILON * scale {
        // The infinite line touches; the segment may stop short of it.
        let touch = -qb / (2.0 * qa);
        let status = if a.in_range(touch) {
            IntersectionStatus::Tangent
        } else {
            IntersectionStatus::Outside
        };
        return Intersections::empty(status);
    }
    let roots = solve_quadratic(qc, qb, qa);
    let mut points = Vec::new();
    for &t in &roots {
        if a.in_range(t) {
            let p = a.eval(t);
            points.push(IntersectionPoint::new(
                p,
                t,
                f64::NAN,
                a.direction,
                ellipse_tangent(e, p),
            ));
        }
    }
    if !points.is_empty() {
        return Intersections::from_points(points);
    }
    let before = roots.iter().all(|&t| t < 0.0);
    let after = roots.iter().all(|&t| t > a.max_t);
    if before || after {
        Intersections::empty(IntersectionStatus::Outside)
    } else {
        Intersections::empty(IntersectionStatus::Inside)
    }
}

/// A quadratic or cubic against an ellipse.
///
/// Substituting the curve into `|p|² - 1 = 0` gives a polynomial of twice
/// the curve's degree. Without roots in range the curve does not cross the
/// ellipse, and its start point decides between `Inside` and `Outside`.
pub(super) fn curve_ellipse(seg: &PathSeg, e: &Ellipse) -> Intersections {
    if e.is_degenerate() {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    let to_unit = e.inverse_affine();
    let unit_seg = to_unit * *seg;
    let coeffs = power_basis(&unit_seg);
    let x = Poly::from_ascending(coeffs.iter().map(|v| v.x));
    let y = Poly::from_ascending(coeffs.iter().map(|v| v.y));
    let poly = &x * &x + &(&y * &y) - &Poly::constant(1.0);
    let mut points = Vec::new();
    for t in poly.roots_between(0.0, 1.0) {
        let p = seg.eval(t);
        points.push(IntersectionPoint::new(
            p,
            t,
            f64::NAN,
            seg.tangent(t),
            ellipse_tangent(e, p),
        ));
    }
    let otherwise = if e.contains(seg.start()) {
        IntersectionStatus::Inside
    } else {
        IntersectionStatus::Outside
    };
    Intersections::from_points_or(points, otherwise)
}

/// Two circles, from the distance between their centers.
///
/// A circle strictly within the other is `Inside` (of either), and equal
/// circles are `Coincident`.
pub(super) fn circle_circle(a: &Circle, b: &Circle) -> Intersections {
    let (r1, r2) = (a.radius.abs(), b.radius.abs());
    let delta = b.center - a.center;
    let dist = delta.hypot();
    let scale = r1.max(r2).max(dist);
    if dist <= EPSILON * scale && (r1 - r2).abs() <= EPSILON * scale {
        return Intersections::empty(IntersectionStatus::Coincident);
    }
    if dist > r1 + r2 {
        return Intersections::empty(IntersectionStatus::Outside);
    }
    if dist < (r1 - r2).abs() {
        return Intersections::empty(IntersectionStatus::Inside);
    }
    // Distance from `a`'s center to the chord through both intersections.
    let along = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h = (r1 * r1 - along * along).max(0.0).sqrt();
    let unit = delta / dist;
    let base = a.center + along * unit;
    let offset = h * unit.turn_90();
    let point = |p: Point| {
        IntersectionPoint::new(
            p,
            f64::NAN,
            f64::NAN,
            (p - a.center).turn_90(),
            (p - b.center).turn_90(),
        )
    };
    let mut points = alloc::vec![point(base - offset)];
    if h > EPSILON * scale {
        points.push(point(base + offset));
    }
    Intersections::from_points(points)
}

/// Two ellipses.
///
/// The first ellipse is parameterized by angle and mapped into the unit
/// frame of the second, where `|p(θ)|² = 1` is a trigonometric quadratic.
/// The half-angle substitution `u = tan(θ/2)` turns it into a quartic in
/// `u`; the angle `θ = π` has no finite `u` and is checked separately.
pub(super) fn ellipse_ellipse(a: &Ellipse, b: &Ellipse) -> Intersections {
    if a.is_degenerate() || b.is_degenerate() {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    // p(θ) = ca cos θ + sa sin θ + o in the unit frame of `b`.
    let frame = b.inverse_affine() * a.affine();
    let ca = frame.transform_vec2(Vec2::new(1.0, 0.0));
    let sa = frame.transform_vec2(Vec2::new(0.0, 1.0));
    let o = (frame * Point::ZERO).to_vec2();
    let aa = ca.hypot2();
    let bb = sa.hypot2();
    let ab = ca.dot(sa);
    let ao = ca.dot(o);
    let bo = sa.dot(o);
    let f = o.hypot2() - 1.0;
    // Coefficients of u⁰ through u⁴ after multiplying by (1 + u²)².
    let c0 = aa + 2.0 * ao + f;
    let c1 = 4.0 * ab + 4.0 * bo;
    let c2 = -2.0 * aa + 4.0 * bb + 2.0 * f;
    let c3 = -4.0 * ab + 4.0 * bo;
    let c4 = aa - 2.0 * ao + f;
    let scale = aa.max(bb).max(o.hypot2()).max(1.0);
    if [c0, c1, c2, c3, c4].iter().all(|c| c.abs() <= EPSILON * scale) {
        return Intersections::empty(IntersectionStatus::Coincident);
    }

    let mut angles: Vec<f64> = solve_quartic(c0, c1, c2, c3, c4)
        .iter()
        .map(|u| 2.0 * u.atan())
        .map(|theta| if theta <= -PI + 1e-9 { theta + 2.0 * PI } else { theta })
        .collect();
    // θ = π, where u is infinite. Its residual is the u⁴ coefficient.
    if c4.abs() <= EPSILON * scale {
        angles.push(PI);
    }
    angles.sort_by(f64::total_cmp);
    angles.dedup_by(|x, y| (*x - *y).abs() < 1e-9);

    let points: Vec<_> = angles
        .into_iter()
        .map(|theta| {
            let p = a.point_at(theta);
            IntersectionPoint::new(
                p,
                f64::NAN,
                f64::NAN,
                ellipse_tangent(a, p),
                ellipse_tangent(b, p),
            )
        })
        .collect();
    if !points.is_empty() {
        return Intersections::from_points(points);
    }
    if b.contains(a.point_at(0.0)) || a.contains(b.point_at(0.0)) {
        Intersections::empty(IntersectionStatus::Inside)
    } else {
        Intersections::empty(IntersectionStatus::Outside)
    }
}

#[cfg(test)]
mod tests {
    use crate::intersect::{intersect, Geometry, IntersectionStatus, Ray};
    use crate::{Circle, CubicBez, Ellipse, Line, Point, QuadBez};

    fn circle(x: f64, y: f64, r: f64) -> Geometry {
        Geometry::Circle(Circle::new((x, y), r))
    }

    #[test]
    fn circle_classification() {
        let far = intersect(&circle(0.0, 0.0, 3.0), &circle(10.0, 0.0, 3.0));
        assert_eq!(far.status(), IntersectionStatus::Outside);
        let nested = intersect(&circle(0.0, 0.0, 3.0), &circle(1.0, 0.0, 1.0));
        assert_eq!(nested.status(), IntersectionStatus::Inside);
        let crossing = intersect(&circle(0.0, 0.0, 3.0), &circle(5.0, 0.0, 4.0));
        assert_eq!(crossing.status(), IntersectionStatus::Intersection);
        assert_eq!(crossing.points().len(), 2);
        for p in crossing.points() {
            assert!((p.point.to_vec2().hypot() - 3.0).abs() < 1e-12);
            assert!((p.point.distance(Point::new(5.0, 0.0)) - 4.0).abs() < 1e-12);
            assert!(p.t1.is_nan());
        }
        let same = intersect(&circle(1.0, 1.0, 2.0), &circle(1.0, 1.0, 2.0));
        assert_eq!(same.status(), IntersectionStatus::Coincident);
    }

    #[test]
    fn touching_circles() {
        let result = intersect(&circle(0.0, 0.0, 2.0), &circle(5.0, 0.0, 3.0));
        assert_eq!(result.points().len(), 1);
        assert!(result.points()[0].point.distance(Point::new(2.0, 0.0)) < 1e-12);
    }

    #[test]
    fn line_and_circle() {
        let c = circle(0.0, 0.0, 5.0);
        let through = Geometry::Line(Line::new((-10.0, 3.0), (10.0, 3.0)));
        let result = intersect(&through, &c);
        assert_eq!(result.points().len(), 2);
        assert!(result.points()[0].point.distance(Point::new(-4.0, 3.0)) < 1e-12);
        let tangent = Geometry::Line(Line::new((-10.0, 5.0), (10.0, 5.0)));
        assert_eq!(intersect(&tangent, &c).status(), IntersectionStatus::Tangent);
        let inside = Geometry::Line(Line::new((-1.0, 0.0), (1.0, 0.0)));
        assert_eq!(intersect(&inside, &c).status(), IntersectionStatus::Inside);
        let short = Geometry::Line(Line::new((6.0, 0.0), (8.0, 0.0)));
        assert_eq!(intersect(&short, &c).status(), IntersectionStatus::Outside);
        // On a tangent line, but far from the touching point.
        let beside = Geometry::Line(Line::new((100.0, 5.0), (110.0, 5.0)));
        assert_eq!(intersect(&beside, &c).status(), IntersectionStatus::Outside);
        let ray_away = Geometry::Ray(Ray::new((1.0, 5.0), (1.0, 0.0)));
        assert_eq!(intersect(&ray_away, &c).status(), IntersectionStatus::Outside);
        let ray_toward = Geometry::Ray(Ray::new((1.0, 5.0), (-1.0, 0.0)));
        assert_eq!(intersect(&ray_toward, &c).status(), IntersectionStatus::Tangent);
        let missing = Geometry::Line(Line::new((-10.0, 6.0), (10.0, 6.0)));
        assert_eq!(intersect(&missing, &c).status(), IntersectionStatus::Outside);
        let ray = Geometry::Ray(Ray::new((0.0, 0.0), (1.0, 0.0)));
        assert_eq!(intersect(&ray, &c).points().len(), 1);
    }

    #[test]
    fn curves_and_ellipse() {
        let e = Geometry::Ellipse(Ellipse::new((0.0, 0.0), (4.0, 2.0), 0.0));
        let q = Geometry::Quad(QuadBez::new((-6.0, 0.0), (0.0, 2.0), (6.0, 0.0)));
        let result = intersect(&q, &e);
        assert_eq!(result.points().len(), 2);
        for p in result.points() {
            let v = p.point.to_vec2();
            assert!(((v.x / 4.0).powi(2) + (v.y / 2.0).powi(2) - 1.0).abs() < 1e-9);
        }
        let small = Geometry::Cubic(CubicBez::new((-1.0, 0.0), (0.0, 1.0), (1.0, -1.0), (1.5, 0.0)));
        assert_eq!(intersect(&small, &e).status(), IntersectionStatus::Inside);
        let away = Geometry::Cubic(CubicBez::new((10.0, 0.0), (11.0, 1.0), (12.0, -1.0), (13.0, 0.0)));
        assert_eq!(intersect(&away, &e).status(), IntersectionStatus::Outside);
        // Swapped order reports the curve parameter as t2.
        let swapped = intersect(&e, &q);
        assert!(swapped.points()[0].t1.is_nan());
        assert!(swapped.points()[0].t2 >= 0.0);
    }

    #[test]
    fn ellipse_pairs() {
        let a = Geometry::Ellipse(Ellipse::new((0.0, 0.0), (4.0, 1.0), 0.0));
        let b = Geometry::Ellipse(Ellipse::new((0.0, 0.0), (1.0, 4.0), 0.0));
        let result = intersect(&a, &b);
        assert_eq!(result.points().len(), 4);
        for p in result.points() {
            let v = p.point.to_vec2();
            assert!(((v.x / 4.0).powi(2) + v.y.powi(2) - 1.0).abs() < 1e-9);
            assert!((v.x.powi(2) + (v.y / 4.0).powi(2) - 1.0).abs() < 1e-9);
        }
        // Meeting at θ = π of the first ellipse.
        let c = Geometry::Ellipse(Ellipse::new((-5.0, 0.0), (1.0, 1.0), 0.0));
        let touching = intersect(&a, &circle(-5.0, 0.0, 1.0));
        assert_eq!(touching.points().len(), 1);
        assert!(touching.points()[0].point.distance(Point::new(-4.0, 0.0)) < 1e-6);
        assert_eq!(intersect(&a, &c).points().len(), 1);
        let inner = Geometry::Ellipse(Ellipse::new((0.0, 0.0), (2.0, 0.5), 0.3));
        assert_eq!(intersect(&a, &inner).status(), IntersectionStatus::Inside);
        assert_eq!(intersect(&a, &a).status(), IntersectionStatus::Coincident);
    }
}
