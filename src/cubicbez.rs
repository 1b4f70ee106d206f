// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use core::ops::Mul;

use arrayvec::ArrayVec;

use crate::common::{solve_quadratic, EPSILON};
use crate::{Affine, ParamCurve, ParamCurveExtrema, Point, QuadBez, Vec2, MAX_EXTREMA};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single cubic Bézier segment.
///
/// The control points may be collinear or coincident; a cubic can be
/// geometrically a line, or even a point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct CubicBez {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// Returns a copy of this curve with its orientation reversed.
    #[must_use]
    #[inline]
    pub fn reversed(&self) -> CubicBez {
        CubicBez::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// The derivative curve, a quadratic whose points are tangent vectors.
    #[inline]
    pub fn deriv(&self) -> QuadBez {
        QuadBez::new(
            (3.0 * (self.p1 - self.p0)).to_point(),
            (3.0 * (self.p2 - self.p1)).to_point(),
            (3.0 * (self.p3 - self.p2)).to_point(),
        )
    }

    /// Power basis coefficients `(a, b, c, d)` with
    /// `c(t) = a t³ + b t² + c t + d`.
    #[inline]
    pub fn parameters(&self) -> (Vec2, Vec2, Vec2, Vec2) {
        let p0 = self.p0.to_vec2();
        let p1 = self.p1.to_vec2();
        let p2 = self.p2.to_vec2();
        let p3 = self.p3.to_vec2();
        let d = p0;
        let c = 3.0 * (p1 - p0);
        let b = 3.0 * (p2 - 2.0 * p1 + p0);
        let a = p3 - 3.0 * p2 + 3.0 * p1 - p0;
        (a, b, c, d)
    }

    /// Parameters in `(0, 1)` where the curvature changes sign.
    ///
    /// The curve is translated and rotated so that its chord lies on the x
    /// axis; the inflections are then the roots of a quadratic in the
    /// products of the aligned control point coordinates. A straight curve
    /// has no inflections.
    ///
    /// ```
    /// use vecpath::CubicBez;
    /// let s = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, -1.0), (3.0, 0.0));
    /// assert_eq!(s.inflections().as_slice(), &[0.5]);
    /// ```
    pub fn inflections(&self) -> ArrayVec<f64, 2> {
        let mut result = ArrayVec::new();
        let mut axis = self.p3 - self.p0;
        if axis.hypot2() == 0.0 {
            axis = self.p2 - self.p0;
            if axis.hypot2() == 0.0 {
                axis = self.p1 - self.p0;
            }
        }
        let len = axis.hypot();
        if len == 0.0 {
            return result;
        }
        let (cos, sin) = (axis.x / len, axis.y / len);
        let align = |p: Point| {
            let v = p - self.p0;
            (v.x * cos + v.y * sin, v.y * cos - v.x * sin)
        };
        let (x1, y1) = align(self.p1);
        let (x2, y2) = align(self.p2);
        let (x3, _) = align(self.p3);
        let a = x2 * y1;
        let b = x3 * y1;
        let c = x1 * y2;
        let d = x3 * y2;
        let qa = 18.0 * (-3.0 * a + 2.0 * b + 3.0 * c - d);
        let qb = 18.0 * (3.0 * a - b - 3.0 * c);
        let qc = 18.0 * (c - a);
        let scale = qa.abs().max(qb.abs()).max(qc.abs());
        if scale <= EPSILON * len * len * len.max(1.0) {
            return result;
        }
        for t in solve_quadratic(qc, qb, qa) {
            if t > 0.0 && t < 1.0 {
                result.push(t);
            }
        }
        result
    }

    /// Merge two adjacent cubics that were produced by splitting a single
    /// cubic.
    ///
    /// The split parameter is recovered from where the joint lies between
    /// the two inner control points adjacent to it. The result is `None` if
    /// that parameter cannot be determined, or if the merged curve
    /// evaluated there is farther than `tolerance` from the joint.
    pub fn merge(&self, other: &CubicBez, tolerance: f64) -> Option<CubicBez> {
        if !self.p3.is_near(other.p0) {
            return None;
        }
        let joint = self.p3;
        let span = other.p1 - self.p2;
        let t = (joint - self.p2).dot(span) / span.hypot2();
        if !(t > 0.0 && t < 1.0) {
            return None;
        }
        let p1 = self.p0 + (self.p1 - self.p0) / t;
        let p2 = other.p3 + (other.p2 - other.p3) / (1.0 - t);
        if !(p1.is_finite() && p2.is_finite()) {
            return None;
        }
        let merged = CubicBez::new(self.p0, p1, p2, other.p3);
        let scale = (self.p0 - joint).hypot() + (other.p3 - joint).hypot();
        if merged.eval(t).distance(joint) <= tolerance.max(EPSILON * scale) {
            Some(merged)
        } else {
            None
        }
    }

    /// Is this cubic Bézier curve finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }
}

impl ParamCurve for CubicBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        ab.lerp(bc, t).lerp(bc.lerp(cd, t), t)
    }

    #[inline]
    fn tangent(&self, t: f64) -> Vec2 {
        self.deriv().eval(t).to_vec2()
    }

    fn split(&self, t: f64) -> (CubicBez, CubicBez) {
        let ab = self.p0.lerp(self.p1, t);
        let bc = self.p1.lerp(self.p2, t);
        let cd = self.p2.lerp(self.p3, t);
        let abc = ab.lerp(bc, t);
        let bcd = bc.lerp(cd, t);
        let m = abc.lerp(bcd, t);
        (
            CubicBez::new(self.p0, ab, abc, m),
            CubicBez::new(m, bcd, cd, self.p3),
        )
    }

    #[inline]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline]
    fn end(&self) -> Point {
        self.p3
    }
}

impl ParamCurveExtrema for CubicBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        fn one_coord(result: &mut ArrayVec<f64, MAX_EXTREMA>, d0: f64, d1: f64, d2: f64) {
            let a = d0 - 2.0 * d1 + d2;
            let b = 2.0 * (d1 - d0);
            let c = d0;
            let roots = solve_quadratic(c, b, a);
            for &t in &roots {
                if t > 0.0 && t < 1.0 {
                    result.push(t);
                }
            }
        }
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let d2 = self.p3 - self.p2;
        one_coord(&mut result, d0.x, d1.x, d2.x);
        one_coord(&mut result, d0.y, d1.y, d2.y);
        result.sort_by(f64::total_cmp);
        result
    }
}

impl Mul<CubicBez> for Affine {
    type Output = CubicBez;

    #[inline]
    fn mul(self, c: CubicBez) -> CubicBez {
        CubicBez {
            p0: self * c.p0,
            p1: self * c.p1,
            p2: self * c.p2,
            p3: self * c.p3,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::{Affine, CubicBez, ParamCurve, ParamCurveExtrema, Point};

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!((p1 - p0).hypot() < epsilon, "{p0:?} != {p1:?}");
    }

    #[test]
    fn cubicbez_tangent() {
        // y = x^2
        let c = CubicBez::new(
            (0.0, 0.0),
            (1.0 / 3.0, 0.0),
            (2.0 / 3.0, 1.0 / 3.0),
            (1.0, 1.0),
        );
        let n = 10;
        for i in 0..=n {
            let t = (i as f64) * (n as f64).recip();
            let delta = 1e-6;
            let d_approx = (c.eval(t + delta) - c.eval(t)) * delta.recip();
            assert!((c.tangent(t) - d_approx).hypot() < delta * 2.0);
        }
    }

    #[test]
    fn cubicbez_eval_endpoints_exact() {
        let c = CubicBez::new((0.1, 0.3), (7.7, -2.2), (3.3, 9.9), (-4.4, 0.6));
        assert_eq!(c.eval(0.0), c.p0);
        assert_eq!(c.eval(1.0), c.p3);
        let (a, b) = c.split(0.37);
        assert_eq!(a.p0, c.p0);
        assert_eq!(b.p3, c.p3);
        assert_eq!(a.p3, b.p0);
    }

    #[test]
    fn cubicbez_subsegment() {
        let c = CubicBez::new((3.1, 4.1), (5.9, 2.6), (5.3, 5.8), (9.7, 9.3));
        let t0 = 0.1;
        let t1 = 0.8;
        let cs = c.subsegment(t0..t1);
        let n = 10;
        for i in 0..=n {
            let t = (i as f64) * (n as f64).recip();
            let ts = t0 + t * (t1 - t0);
            assert_near(c.eval(ts), cs.eval(t), 1e-12);
        }
    }

    #[test]
    fn cubicbez_split_merge() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut pt = || Point::new(rng.random_range(-10.0..10.0), rng.random_range(-10.0..10.0));
            let c = CubicBez::new(pt(), pt(), pt(), pt());
            let t = rng.random_range(0.05..0.95);
            let (a, b) = c.split(t);
            let Some(m) = a.merge(&b, 0.0) else {
                continue;
            };
            assert_near(m.p0, c.p0, 1e-9);
            assert_near(m.p1, c.p1, 1e-6);
            assert_near(m.p2, c.p2, 1e-6);
            assert_near(m.p3, c.p3, 1e-9);
        }
        let c = CubicBez::new((0.0, 0.0), (1.0, 3.0), (4.0, 3.0), (5.0, 0.0));
        let (a, b) = c.split(0.4);
        let m = a.merge(&b, 1e-9).unwrap();
        assert_near(m.p1, c.p1, 1e-9);
        assert_near(m.p2, c.p2, 1e-9);
    }

    #[test]
    fn cubicbez_merge_rejects_unrelated() {
        let a = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 1.0), (3.0, 0.0));
        let b = CubicBez::new((3.0, 0.0), (4.0, 2.0), (5.0, -2.0), (6.0, 0.0));
        assert!(a.merge(&b, 0.01).is_none());
    }

    #[test]
    fn cubicbez_inflections() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, -1.0), (3.0, 0.0));
        let inflections = c.inflections();
        assert_eq!(inflections.len(), 1);
        assert!((inflections[0] - 0.5).abs() < 1e-12);
        // Rotation and translation do not move the inflection.
        let moved = Affine::rotate(0.7).then_translate((3.0, -2.0).into()) * c;
        let inflections = moved.inflections();
        assert_eq!(inflections.len(), 1);
        assert!((inflections[0] - 0.5).abs() < 1e-9);
        // A simple arch and a straight cubic have none.
        let arch = CubicBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 2.0), (3.0, 0.0));
        assert!(arch.inflections().is_empty());
        let straight = CubicBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0));
        assert!(straight.inflections().is_empty());
    }

    #[test]
    fn cubicbez_extrema() {
        // y = x^2
        let q = CubicBez::new((0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 1);
        assert!((extrema[0] - 0.5).abs() < 1e-6);

        let q = CubicBez::new((0.4, 0.5), (0.0, 1.0), (1.0, 0.0), (0.5, 0.4));
        let extrema = q.extrema();
        assert_eq!(extrema.len(), 4);
    }

    #[test]
    fn cubicbez_parameters() {
        let c = CubicBez::new((3.1, 4.1), (5.9, 2.6), (5.3, 5.8), (9.7, 9.3));
        let (a, b, cc, d) = c.parameters();
        for i in 0..=4 {
            let t = i as f64 / 4.0;
            let p = (((a * t + b) * t + cc) * t + d).to_point();
            assert_near(p, c.eval(t), 1e-12);
        }
    }
}
