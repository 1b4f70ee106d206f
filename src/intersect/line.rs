// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines and rays against lines, rays and curves.

use alloc::vec::Vec;

use super::{as_segment, power_basis, Geometry, IntersectionPoint, IntersectionStatus, Intersections};
use crate::common::EPSILON;
use crate::{Line, ParamCurve, Point, Poly, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A half-infinite line.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ray {
    /// Where the ray starts.
    pub origin: Point,
    /// The direction, not necessarily normalized. The ray's parameter
    /// counts multiples of it.
    pub direction: Vec2,
}

impl Ray {
    /// A new ray.
    pub fn new(origin: impl Into<Point>, direction: impl Into<Vec2>) -> Ray {
        Ray {
            origin: origin.into(),
            direction: direction.into(),
        }
    }

    /// The point at parameter `t`.
    pub fn eval(&self, t: f64) -> Point {
        self.origin + t * self.direction
    }

    /// Parameter of the point on the ray nearest to `p`, and the squared
    /// distance to it.
    pub fn nearest(&self, p: Point) -> (f64, f64) {
        let v = p - self.origin;
        let t = self.direction.dot(v) / self.direction.hypot2();
        let t = if t.is_nan() { 0.0 } else { t.max(0.0) };
        (t, (v - t * self.direction).hypot2())
    }
}

/// A line segment or a ray: `origin + t * direction` for `t` in
/// `0..=max_t`.
#[derive(Clone, Copy, Debug)]
pub(super) struct Linear {
    pub origin: Point,
    pub direction: Vec2,
    pub max_t: f64,
}

impl From<Line> for Linear {
    fn from(line: Line) -> Linear {
        Linear {
            origin: line.p0,
            direction: line.p1 - line.p0,
            max_t: 1.0,
        }
    }
}

impl From<Ray> for Linear {
    fn from(ray: Ray) -> Linear {
        Linear {
            origin: ray.origin,
            direction: ray.direction,
            max_t: f64::INFINITY,
        }
    }
}

impl Linear {
    pub fn eval(&self, t: f64) -> Point {
        self.origin + t * self.direction
    }

    pub fn in_range(&self, t: f64) -> bool {
        (0.0..=self.max_t).contains(&t)
    }

    /// Parameter of a point known to lie on the line.
    fn param_of(&self, p: Point) -> f64 {
        self.direction.dot(p - self.origin) / self.direction.hypot2()
    }

    /// Parameter of the nearest point in range, and the squared distance to
    /// it.
    pub fn nearest(&self, p: Point) -> (f64, f64) {
        let len2 = self.direction.hypot2();
        let t = if len2 == 0.0 {
            0.0
        } else {
            (self.direction.dot(p - self.origin) / len2).clamp(0.0, self.max_t)
        };
        (t, self.eval(t).distance_squared(p))
    }

    /// Whether a point known to lie on the infinite line lies within the
    /// segment's extent.
    ///
    /// Axis-aligned lines test only the varying coordinate so that round-off
    /// in the fixed one cannot reject a true hit.
    fn covers(&self, p: Point) -> bool {
        let d = self.direction;
        let end = if self.max_t.is_finite() {
            self.eval(self.max_t)
        } else {
            // A ray only bounds the side it starts from.
            return self.param_of(p) >= -EPSILON;
        };
        let within = |v: f64, a: f64, b: f64| {
            let slack = EPSILON * a.abs().max(b.abs()).max(1.0);
            v >= a.min(b) - slack && v <= a.max(b) + slack
        };
        if d.x == 0.0 {
            within(p.y, self.origin.y, end.y)
        } else if d.y == 0.0 {
            within(p.x, self.origin.x, end.x)
        } else {
            within(p.x, self.origin.x, end.x) && within(p.y, self.origin.y, end.y)
        }
    }
}

/// Two lines or rays, by Cramer's rule.
pub(super) fn linear_linear(a: &Linear, b: &Linear) -> Intersections {
    let da = a.direction;
    let db = b.direction;
    if da.hypot2() == 0.0 || db.hypot2() == 0.0 {
        return point_linear(a, b);
    }
    let offset = a.origin - b.origin;
    let ua_t = db.cross(offset);
    let ub_t = da.cross(offset);
    let u_b = da.cross(db);
    let scale = da.hypot() * db.hypot();
    if u_b.abs() > EPSILON * scale {
        let ua = ua_t / u_b;
        let ub = ub_t / u_b;
        if a.in_range(ua) && b.in_range(ub) {
            let point = a.eval(ua);
            return Intersections::from_points(alloc::vec![IntersectionPoint::new(
                point, ua, ub, da, db
            )]);
        }
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    let offset_scale = offset.hypot();
    if ua_t.abs() <= EPSILON * db.hypot() * offset_scale
        || ub_t.abs() <= EPSILON * da.hypot() * offset_scale
    {
        Intersections::empty(IntersectionStatus::Coincident)
    } else {
        Intersections::empty(IntersectionStatus::Parallel)
    }
}

/// Two lines where at least one has zero length, as a point against the
/// other.
fn point_linear(a: &Linear, b: &Linear) -> Intersections {
    let point_first = a.direction.hypot2() == 0.0;
    let (p, other) = if point_first { (a.origin, b) } else { (b.origin, a) };
    let (t, d2) = other.nearest(p);
    let tolerance = EPSILON * p.to_vec2().hypot().max(1.0);
    if d2 > tolerance * tolerance {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    }
    let (t1, t2) = if point_first { (0.0, t) } else { (t, 0.0) };
    Intersections::from_points(alloc::vec![IntersectionPoint::new(
        p,
        t1,
        t2,
        a.direction,
        b.direction
    )])
}

/// A line or ray against a quadratic or cubic.
///
/// The line's implicit form `n · p + c = 0` is substituted into the curve's
/// power basis, giving a polynomial in the curve parameter.
pub(super) fn linear_curve(a: &Linear, b: &Geometry) -> Intersections {
    let Some(seg) = as_segment(b) else {
        return Intersections::empty(IntersectionStatus::NoIntersection);
    };
    let n = a.direction.turn_90();
    let c = -n.dot(a.origin.to_vec2());
    let coeffs = power_basis(&seg);
    let poly = Poly::from_ascending(
        coeffs
            .iter()
            .enumerate()
            .map(|(i, v)| n.dot(*v) + if i == 0 { c } else { 0.0 }),
    );
    if poly.is_zero(0.0) {
        // The curve lies on the line.
        return Intersections::empty(IntersectionStatus::Coincident);
    }
    let mut points = Vec::new();
    for t in poly.roots_between(0.0, 1.0) {
        let p = seg.eval(t);
        if a.covers(p) {
            let s = a.param_of(p).clamp(0.0, a.max_t);
            points.push(IntersectionPoint::new(p, s, t, a.direction, seg.tangent(t)));
        }
    }
    Intersections::from_points(points)
}
