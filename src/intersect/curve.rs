// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curve against curve, by resultant elimination.
//!
//! Writing the first curve as `A(s)` and the second as `B(t)`, the system
//! `A(s) - B(t) = 0` is two polynomials in `s` whose coefficients are
//! polynomials in `t`. Their Bézout resultant vanishes exactly at the `t`
//! where the two share a root `s`. Each real root `t` in range is then
//! mapped back to `s` by solving the x and y equations separately and
//! accepting only values on which both agree. That cross-check discards
//! the spurious roots the elimination can introduce.

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use super::{
    as_segment, coordinate_polys, line, power_basis, Geometry, IntersectionPoint,
    IntersectionStatus, Intersections, MATCH_TOLERANCE,
};
use crate::common::EPSILON;
use crate::{Affine, Line, ParamCurve, PathSeg, Point, Poly, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Two quadratics or cubics.
pub(super) fn curve_curve(a: &Geometry, b: &Geometry) -> Intersections {
    let (Some(seg_a), Some(seg_b)) = (as_segment(a), as_segment(b)) else {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    };
    // Parameters are invariant under similarity transforms, so solve in a
    // frame where the coordinates are of order one.
    let normalize = normalizing_transform(&seg_a, &seg_b);
    let na = normalize * seg_a;
    let nb = normalize * seg_b;

    let n = effective_degree(&na);
    if n < 2 {
        // The first curve is really a line (or a point).
        return degenerate_first(&seg_a, &seg_b, &na, &nb, n);
    }
    let resultant = bezout_resultant(&na, &nb, n);
    if resultant.is_zero(EPSILON * resultant.max_coeff().max(1.0)) {
        return coincident_or_disjoint(&na, &nb);
    }

    let (ax, ay) = coordinate_polys(&na);
    let mut points = Vec::new();
    for t in resultant.roots_between(0.0, 1.0) {
        let target = nb.eval(t);
        let Some(s) = matching_param(&ax, &ay, target.x, target.y) else {
            tracing::trace!(t, "rejected spurious resultant root");
            continue;
        };
        points.push(IntersectionPoint::new(
            seg_b.eval(t),
            s,
            t,
            seg_a.tangent(s),
            seg_b.tangent(t),
        ));
    }
    dedup_points(&mut points);
    Intersections::from_points(points)
}

/// A translation and uniform scale taking both curves near the unit box.
fn normalizing_transform(a: &PathSeg, b: &PathSeg) -> Affine {
    let mut min = a.start();
    let mut max = a.start();
    for p in a.points().into_iter().chain(b.points()) {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    let size = (max.x - min.x).max(max.y - min.y);
    let scale = if size > 0.0 && size.is_finite() { size.recip() } else { 1.0 };
    Affine::scale(scale) * Affine::translate(-min.to_vec2())
}

/// The highest power with a coefficient that is not negligible.
fn effective_degree(seg: &PathSeg) -> usize {
    let coeffs = power_basis(seg);
    let scale = coeffs.iter().fold(0.0f64, |m, v| m.max(v.x.abs()).max(v.y.abs()));
    (1..coeffs.len())
        .rev()
        .find(|&i| coeffs[i].x.abs().max(coeffs[i].y.abs()) > EPSILON * scale.max(1.0))
        .unwrap_or(0)
}

/// The determinant of the Bézout matrix of `f(s) = A_x(s) - B_x(t)` and
/// `g(s) = A_y(s) - B_y(t)`, as a polynomial in `t`.
///
/// Only the constant terms in `s` depend on `t`, so every entry is a
/// polynomial of the second curve's degree. The determinant of an `n × n`
/// matrix of them has degree at most `n` times that.
fn bezout_resultant(a: &PathSeg, b: &PathSeg, n: usize) -> Poly {
    let a_coeffs = power_basis(a);
    let (bx, by) = coordinate_polys(b);
    let coeff = |i: usize, y: bool| -> Poly {
        let v = a_coeffs.get(i).copied().unwrap_or(Vec2::ZERO);
        let c = if y { v.y } else { v.x };
        if i == 0 {
            Poly::constant(c) - if y { &by } else { &bx }
        } else {
            Poly::constant(c)
        }
    };
    let f: ArrayVec<Poly, 4> = (0..=n).map(|i| coeff(i, false)).collect();
    let g: ArrayVec<Poly, 4> = (0..=n).map(|i| coeff(i, true)).collect();

    let mut matrix: ArrayVec<ArrayVec<Poly, 3>, 3> = ArrayVec::new();
    for i in 0..n {
        let mut row = ArrayVec::new();
        for j in 0..n {
            let mut entry = Poly::default();
            for k in 0..=i.min(n - 1 - j) {
                entry = entry + &(&f[j + k + 1] * &g[i - k]) - &(&f[i - k] * &g[j + k + 1]);
            }
            row.push(entry);
        }
        matrix.push(row);
    }
    determinant(&matrix)
}

/// Determinant by cofactor expansion. The matrices here are at most 3 × 3.
fn determinant(m: &[ArrayVec<Poly, 3>]) -> Poly {
    match m.len() {
        0 => Poly::constant(1.0),
        1 => m[0][0].clone(),
        2 => &m[0][0] * &m[1][1] - &(&m[0][1] * &m[1][0]),
        _ => {
            let minor = |skip: usize| -> Poly {
                let rows: ArrayVec<ArrayVec<Poly, 3>, 3> = m[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|(j, _)| *j != skip)
                            .map(|(_, p)| p.clone())
                            .collect()
                    })
                    .collect();
                determinant(&rows)
            };
            let mut det = Poly::default();
            for j in 0..m.len() {
                let term = &m[0][j] * &minor(j);
                det = if j % 2 == 0 { det + &term } else { det - &term };
            }
            det
        }
    }
}

/// Solve `A_x(s) = x` and `A_y(s) = y` on `[0, 1]` and return a parameter
/// on which both agree.
///
/// When one coordinate of the curve is constant, it must match its target
/// and only the other equation constrains `s`.
fn matching_param(ax: &Poly, ay: &Poly, x: f64, y: f64) -> Option<f64> {
    let px = ax.clone() - &Poly::constant(x);
    let py = ay.clone() - &Poly::constant(y);
    let x_free = px.trim().degree() == 0;
    let y_free = py.trim().degree() == 0;
    let xs = px.roots_between(0.0, 1.0);
    let ys = py.roots_between(0.0, 1.0);
    match (x_free, y_free) {
        (true, true) => None,
        (true, false) => ys.first().copied().filter(|_| px.coeff(0).abs() < MATCH_TOLERANCE),
        (false, true) => xs.first().copied().filter(|_| py.coeff(0).abs() < MATCH_TOLERANCE),
        (false, false) => xs
            .iter()
            .find_map(|&sx| {
                ys.iter()
                    .find(|&&sy| (sx - sy).abs() < MATCH_TOLERANCE)
                    .map(|&sy| 0.5 * (sx + sy))
            })
            .or_else(|| {
                // A tangency in one coordinate can lose its double root to
                // round-off; accept a root of the other with small residual.
                xs.iter().chain(&ys).copied().find(|&s| {
                    (ax.eval(s) - x).abs() < MATCH_TOLERANCE
                        && (ay.eval(s) - y).abs() < MATCH_TOLERANCE
                })
            }),
    }
}

fn dedup_points(points: &mut Vec<IntersectionPoint>) {
    points.sort_by(|p, q| p.t1.total_cmp(&q.t1));
    points.dedup_by(|p, q| (p.t1 - q.t1).abs() < MATCH_TOLERANCE && (p.t2 - q.t2).abs() < MATCH_TOLERANCE);
}

/// The first curve has degree below two. Its power basis is then linear,
/// so it coincides with its chord parameter for parameter.
fn degenerate_first(
    a: &PathSeg,
    b: &PathSeg,
    na: &PathSeg,
    nb: &PathSeg,
    n: usize,
) -> Intersections {
    if n == 0 {
        let hit = super::point::shape_point(&Geometry::from(*nb), na.start(), MATCH_TOLERANCE);
        let points = hit
            .points()
            .iter()
            .map(|p| IntersectionPoint::new(b.eval(p.t1), f64::NAN, p.t1, Vec2::ZERO, b.tangent(p.t1)))
            .collect();
        return Intersections::from_points(points);
    }
    let chord = Line::new(na.start(), na.end());
    let result = line::linear_curve(&chord.into(), &Geometry::from(*nb));
    let points = result
        .points()
        .iter()
        .map(|p| IntersectionPoint::new(b.eval(p.t2), p.t1, p.t2, a.tangent(p.t1), b.tangent(p.t2)))
        .collect();
    Intersections::from_points_or(points, result.status())
}

/// The resultant vanished identically: the curves share a component, or
/// never meet at all.
fn coincident_or_disjoint(na: &PathSeg, nb: &PathSeg) -> Intersections {
    let (ax, ay) = coordinate_polys(na);
    let on_a = |p: Point| matching_param(&ax, &ay, p.x, p.y).is_some();
    if on_a(nb.start()) || on_a(nb.end()) || on_a(nb.eval(0.5)) {
        Intersections::empty(IntersectionStatus::Coincident)
    } else {
        Intersections::empty(IntersectionStatus::NoIntersection)
    }
}

#[cfg(test)]
mod tests {
    use crate::intersect::{intersect, Geometry, IntersectionStatus};
    use crate::{CubicBez, ParamCurve, Point, QuadBez};

    fn check_points(a: &Geometry, b: &Geometry, expected: usize) {
        let result = intersect(a, b);
        assert_eq!(result.points().len(), expected, "{result:?}");
        let (Some(sa), Some(sb)) = (super::as_segment(a), super::as_segment(b)) else {
            panic!("not curves");
        };
        for p in result.points() {
            assert!(sa.eval(p.t1).distance(p.point) < 1e-5, "{p:?}");
            assert!(sb.eval(p.t2).distance(p.point) < 1e-5, "{p:?}");
        }
        assert!(result.points().windows(2).all(|w| w[0].t1 <= w[1].t1));
    }

    #[test]
    fn quad_quad() {
        let a = Geometry::Quad(QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0)));
        let b = Geometry::Quad(QuadBez::new((0.0, 4.0), (5.0, -6.0), (10.0, 4.0)));
        check_points(&a, &b, 2);
    }

    #[test]
    fn cubic_cubic() {
        let a = Geometry::Cubic(CubicBez::new((0.0, 0.0), (3.0, 10.0), (7.0, -10.0), (10.0, 0.0)));
        let b = Geometry::Cubic(CubicBez::new((0.0, 1.0), (3.0, -9.0), (7.0, 11.0), (10.0, 1.0)));
        let result = intersect(&a, &b);
        assert!(!result.points().is_empty());
        check_points(&a, &b, result.points().len());
    }

    #[test]
    fn quad_cubic_cross() {
        let a = Geometry::Quad(QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0)));
        let b = Geometry::Cubic(CubicBez::new((5.0, -2.0), (5.0, 2.0), (5.0, 6.0), (5.0, 10.0)));
        // A straight vertical cubic crossing the quad's apex.
        let result = intersect(&a, &b);
        assert_eq!(result.points().len(), 1);
        assert!(result.points()[0].point.distance(Point::new(5.0, 5.0)) < 1e-6);
        assert!((result.points()[0].t1 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn disjoint_curves() {
        let a = Geometry::Quad(QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0)));
        let b = Geometry::Quad(QuadBez::new((0.0, 20.0), (5.0, 30.0), (10.0, 20.0)));
        assert_eq!(intersect(&a, &b).status(), IntersectionStatus::NoIntersection);
    }

    #[test]
    fn same_curve_is_coincident() {
        let q = QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0));
        let (left, _) = q.split(0.5);
        let a = Geometry::Quad(q);
        let b = Geometry::Quad(left);
        assert_eq!(intersect(&a, &b).status(), IntersectionStatus::Coincident);
    }
}
