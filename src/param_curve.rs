// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for curves parametrized by a scalar.

use core::ops::Range;

use arrayvec::ArrayVec;

use crate::{Point, Rect, Vec2};

/// A curve parametrized by a scalar.
///
/// The curve runs from `start()` at `t = 0` to `end()` at `t = 1`.
/// Values of `t` outside that range extrapolate along the same formula.
pub trait ParamCurve: Sized {
    /// Evaluate the curve at parameter `t`.
    fn eval(&self, t: f64) -> Point;

    /// The derivative at parameter `t`, not normalized.
    fn tangent(&self, t: f64) -> Vec2;

    /// Split the curve at `t` into two curves of the same kind.
    ///
    /// The first ends and the second starts at `eval(t)`; together they
    /// trace exactly the original curve.
    fn split(&self, t: f64) -> (Self, Self);

    /// Get a subsegment of the curve for the given parameter range.
    ///
    /// This is computed by splitting at `range.end`, then splitting the
    /// first piece at the rescaled `range.start`.
    fn subsegment(&self, range: Range<f64>) -> Self {
        let (t0, t1) = (range.start, range.end);
        let (head, _) = self.split(t1);
        if t1 == 0.0 {
            return head;
        }
        head.split(t0 / t1).1
    }

    /// Subdivide into halves.
    fn subdivide(&self) -> (Self, Self) {
        self.split(0.5)
    }

    /// The start point.
    fn start(&self) -> Point {
        self.eval(0.0)
    }

    /// The end point.
    fn end(&self) -> Point {
        self.eval(1.0)
    }
}

/// The maximum number of extrema that can be reported in the
/// `ParamCurveExtrema` trait.
///
/// This is 4 for a cubic Bézier: two in each of x and y.
pub const MAX_EXTREMA: usize = 4;

/// A parametrized curve that reports its extrema.
pub trait ParamCurveExtrema: ParamCurve {
    /// Compute the extrema of the curve.
    ///
    /// Only extrema within the interior of the curve count. At most four
    /// extrema can be reported, which is sufficient for cubic Béziers.
    ///
    /// The extrema should be reported in increasing parameter order.
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA>;

    /// Return parameter ranges, each of which is monotonic within the range.
    fn extrema_ranges(&self) -> ArrayVec<Range<f64>, { MAX_EXTREMA + 1 }> {
        let mut result = ArrayVec::new();
        let mut t0 = 0.0;
        for t in self.extrema() {
            result.push(t0..t);
            t0 = t;
        }
        result.push(t0..1.0);
        result
    }

    /// The smallest rectangle that encloses the curve in the range (0..1).
    fn bounding_box(&self) -> Rect {
        let mut bbox = Rect::from_points(self.start(), self.end());
        for t in self.extrema() {
            bbox = bbox.union_pt(self.eval(t));
        }
        bbox
    }
}
