// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines.

use arrayvec::ArrayVec;

use crate::common::EPSILON;
use crate::{ParamCurve, ParamCurveExtrema, Point, Vec2, MAX_EXTREMA};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// Returns a copy of this `Line` with its orientation reversed.
    #[must_use]
    #[inline(always)]
    pub fn reversed(&self) -> Line {
        Line {
            p0: self.p1,
            p1: self.p0,
        }
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// The midpoint of the line.
    #[must_use]
    #[inline]
    pub fn midpoint(&self) -> Point {
        self.p0.midpoint(self.p1)
    }

    /// Computes the point where two lines, if extended to infinity, would cross.
    pub fn crossing_point(self, other: Line) -> Option<Point> {
        let ab = self.p1 - self.p0;
        let cd = other.p1 - other.p0;
        let pcd = ab.cross(cd);
        if pcd == 0.0 {
            return None;
        }
        let h = ab.cross(self.p0 - other.p0) / pcd;
        Some(other.p0 + cd * h)
    }

    /// The implicit form `n · p + c = 0` of the infinite line through the
    /// segment, with `n` the (unnormalized) left normal.
    pub fn implicit(&self) -> (Vec2, f64) {
        let n = (self.p1 - self.p0).turn_90();
        (n, -n.dot(self.p0.to_vec2()))
    }

    /// Parameter of the point on the segment nearest to `p`, and the
    /// squared distance to it.
    ///
    /// A zero-length segment reports parameter 0.
    pub fn nearest(&self, p: Point) -> (f64, f64) {
        let d = self.p1 - self.p0;
        let v = p - self.p0;
        let t = d.dot(v) / d.hypot2();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        (t, (v - t * d).hypot2())
    }

    /// Distance from `p` to the infinite line through the segment.
    ///
    /// For a zero-length segment this is the distance to its start point.
    pub fn distance_to_line(&self, p: Point) -> f64 {
        let d = self.p1 - self.p0;
        let len = d.hypot();
        if len == 0.0 {
            return p.distance(self.p0);
        }
        d.cross(p - self.p0).abs() / len
    }

    /// Merge two adjacent lines into one.
    ///
    /// The result is `None` unless `other` starts where `self` ends and the
    /// joint lies within `tolerance` of the merged line, at the parameter
    /// proportional to the first line's length.
    ///
    /// ```
    /// use vecpath::Line;
    /// let a = Line::new((0.0, 0.0), (1.0, 0.0));
    /// let b = Line::new((1.0, 0.0), (3.0, 0.0));
    /// assert_eq!(a.merge(&b, 0.0), Some(Line::new((0.0, 0.0), (3.0, 0.0))));
    /// ```
    pub fn merge(&self, other: &Line, tolerance: f64) -> Option<Line> {
        if !self.p1.is_near(other.p0) {
            return None;
        }
        let la = self.length();
        let total = la + other.length();
        let t = la / total;
        if !t.is_finite() {
            return None;
        }
        let merged = Line::new(self.p0, other.p1);
        let slack = tolerance.max(EPSILON * total);
        if merged.eval(t).distance(self.p1) <= slack {
            Some(merged)
        } else {
            None
        }
    }

    /// Is this line finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

impl ParamCurve for Line {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline]
    fn tangent(&self, _t: f64) -> Vec2 {
        self.p1 - self.p0
    }

    #[inline]
    fn split(&self, t: f64) -> (Line, Line) {
        let m = self.eval(t);
        (Line::new(self.p0, m), Line::new(m, self.p1))
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }
}

impl ParamCurveExtrema for Line {
    #[inline]
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        ArrayVec::new()
    }
}

#[cfg(test)]
mod tests {
    use crate::{Line, ParamCurve, Point};

    #[test]
    fn eval_endpoints_exact() {
        let l = Line::new((0.1, 0.7), (13.3, -2.9));
        assert_eq!(l.eval(0.0), l.p0);
        assert_eq!(l.eval(1.0), l.p1);
        assert_eq!(l.eval(2.0), Point::new(26.5, -6.5));
    }

    #[test]
    fn subsegment() {
        let l = Line::new((0.0, 0.0), (8.0, 4.0));
        let s = l.subsegment(0.25..0.75);
        assert!(s.p0.distance(Point::new(2.0, 1.0)) < 1e-12);
        assert!(s.p1.distance(Point::new(6.0, 3.0)) < 1e-12);
    }

    #[test]
    fn split_merge() {
        let l = Line::new((1.0, 2.0), (7.0, -5.0));
        for t in [0.1, 0.5, 0.93] {
            let (a, b) = l.split(t);
            let m = a.merge(&b, 0.0).unwrap();
            assert!(m.p0.distance(l.p0) < 1e-12);
            assert!(m.p1.distance(l.p1) < 1e-12);
        }
    }

    #[test]
    fn merge_rejects_bend() {
        let a = Line::new((0.0, 0.0), (1.0, 0.0));
        let b = Line::new((1.0, 0.0), (2.0, 1.0));
        assert!(a.merge(&b, 0.1).is_none());
        assert!(a.merge(&b, 1.0).is_some());
        // Not adjacent.
        let c = Line::new((5.0, 0.0), (6.0, 0.0));
        assert!(a.merge(&c, 10.0).is_none());
        // Both zero length: no split parameter.
        let z = Line::new((1.0, 1.0), (1.0, 1.0));
        assert!(z.merge(&z, 1.0).is_none());
    }

    #[test]
    fn crossing_point() {
        let l1 = Line::new((0.0, 0.0), (1.0, 1.0));
        let l2 = Line::new((0.0, 2.0), (1.0, 1.0));
        assert_eq!(l1.crossing_point(l2), Some(Point::new(1.0, 1.0)));
        let l3 = Line::new((0.0, 1.0), (1.0, 2.0));
        assert!(l1.crossing_point(l3).is_none());
    }

    #[test]
    fn nearest() {
        let l = Line::new((0.0, 0.0), (10.0, 0.0));
        let (t, d2) = l.nearest(Point::new(3.0, 4.0));
        assert_eq!(t, 0.3);
        assert_eq!(d2, 16.0);
        assert_eq!(l.nearest(Point::new(-3.0, 4.0)), (0.0, 25.0));
        assert_eq!(l.distance_to_line(Point::new(20.0, -2.0)), 2.0);
    }
}
