// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadratic Bézier segments.

use core::ops::Mul;

use arrayvec::ArrayVec;

use crate::common::EPSILON;
use crate::{Affine, CubicBez, ParamCurve, ParamCurveExtrema, Point, Vec2, MAX_EXTREMA};

/// A single quadratic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub struct QuadBez {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
}

impl QuadBez {
    /// Create a new quadratic Bézier segment.
    #[inline]
    pub fn new<V: Into<Point>>(p0: V, p1: V, p2: V) -> QuadBez {
        QuadBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
        }
    }

    /// Raise the order by 1.
    ///
    /// Returns a cubic Bézier segment that exactly represents this quadratic.
    #[inline]
    pub fn raise(&self) -> CubicBez {
        CubicBez::new(
            self.p0,
            self.p0 + (2.0 / 3.0) * (self.p1 - self.p0),
            self.p2 + (2.0 / 3.0) * (self.p1 - self.p2),
            self.p2,
        )
    }

    /// Returns a copy of this curve with its orientation reversed.
    #[must_use]
    #[inline]
    pub fn reversed(&self) -> QuadBez {
        QuadBez::new(self.p2, self.p1, self.p0)
    }

    /// Power basis coefficients `(a, b, c)` with `q(t) = a t² + b t + c`.
    #[inline]
    pub fn parameters(&self) -> (Vec2, Vec2, Vec2) {
        let c = self.p0.to_vec2();
        let b = 2.0 * (self.p1 - self.p0);
        let a = self.p0.to_vec2() - 2.0 * self.p1.to_vec2() + self.p2.to_vec2();
        (a, b, c)
    }

    /// Merge two adjacent quadratics that were produced by splitting a
    /// single quadratic.
    ///
    /// The split parameter is recovered from where the joint lies between
    /// the two inner control points. The result is `None` if that parameter
    /// cannot be determined, or if the merged curve evaluated there is
    /// farther than `tolerance` from the joint.
    pub fn merge(&self, other: &QuadBez, tolerance: f64) -> Option<QuadBez> {
        if !self.p2.is_near(other.p0) {
            return None;
        }
        let joint = self.p2;
        let span = other.p1 - self.p1;
        let denom = span.hypot2();
        let t = (joint - self.p1).dot(span) / denom;
        if !(t > 0.0 && t < 1.0) {
            return None;
        }
        let ctrl = if t >= 0.5 {
            self.p0 + (self.p1 - self.p0) / t
        } else {
            other.p2 + (other.p1 - other.p2) / (1.0 - t)
        };
        if !ctrl.is_finite() {
            return None;
        }
        let merged = QuadBez::new(self.p0, ctrl, other.p2);
        let scale = (self.p0 - joint).hypot() + (other.p2 - joint).hypot();
        if merged.eval(t).distance(joint) <= tolerance.max(EPSILON * scale) {
            Some(merged)
        } else {
            None
        }
    }

    /// Is this quadratic Bézier curve finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite()
    }
}

impl ParamCurve for QuadBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        a.lerp(b, t)
    }

    #[inline]
    fn tangent(&self, t: f64) -> Vec2 {
        2.0 * (self.p1 - self.p0).lerp(self.p2 - self.p1, t)
    }

    fn split(&self, t: f64) -> (QuadBez, QuadBez) {
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        let m = a.lerp(b, t);
        (QuadBez::new(self.p0, a, m), QuadBez::new(m, b, self.p2))
    }

    #[inline]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline]
    fn end(&self) -> Point {
        self.p2
    }
}

impl ParamCurveExtrema for QuadBez {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        let mut result = ArrayVec::new();
        let d0 = self.p1 - self.p0;
        let d1 = self.p2 - self.p1;
        let dd = d1 - d0;
        if dd.x != 0.0 {
            let t = -d0.x / dd.x;
            if t > 0.0 && t < 1.0 {
                result.push(t);
            }
        }
        if dd.y != 0.0 {
            let t = -d0.y / dd.y;
            if t > 0.0 && t < 1.0 {
                result.push(t);
                if result.len() == 2 && result[0] > t {
                    result.swap(0, 1);
                }
            }
        }
        result
    }
}

impl Mul<QuadBez> for Affine {
    type Output = QuadBez;

    #[inline]
    fn mul(self, other: QuadBez) -> QuadBez {
        QuadBez {
            p0: self * other.p0,
            p1: self * other.p1,
            p2: self * other.p2,
        }
    }
}
