// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Circles, as intersection targets and as cut boundaries.

use core::ops::Add;

use crate::{Ellipse, PathSink, Point, Rect, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A circle.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Circle {
    /// The center.
    pub center: Point,
    /// The radius.
    pub radius: f64,
}

impl Circle {
    /// A new circle from center and radius.
    #[inline]
    pub fn new(center: impl Into<Point>, radius: f64) -> Circle {
        Circle {
            center: center.into(),
            radius,
        }
    }

    /// Is `p` strictly inside the circle?
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (p - self.center).hypot2() < self.radius * self.radius
    }

    /// The circle as an axis-aligned ellipse.
    #[inline]
    pub fn to_ellipse(&self) -> Ellipse {
        Ellipse::new(self.center, (self.radius, self.radius), 0.0)
    }

    /// The smallest rectangle enclosing the circle.
    pub fn bounding_box(&self) -> Rect {
        let r = self.radius.abs();
        Rect::new(
            self.center.x - r,
            self.center.y - r,
            self.center.x + r,
            self.center.y + r,
        )
    }

    /// Draw the outline as a closed path of cubic arcs.
    pub fn append_to(&self, sink: &mut impl PathSink) {
        self.to_ellipse().append_to(sink);
    }

    /// Is this circle finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }

    /// Is this circle NaN?
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.center.is_nan() || self.radius.is_nan()
    }
}

impl Add<Vec2> for Circle {
    type Output = Circle;

    #[inline]
    fn add(self, v: Vec2) -> Circle {
        Circle {
            center: self.center + v,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BezPath, Circle, Point, Vec2};

    #[test]
    fn contains_is_strict() {
        let c = Circle::new((1.0, 1.0), 2.0);
        assert!(c.contains(Point::new(2.0, 2.0)));
        assert!(!c.contains(Point::new(3.0, 1.0)));
        assert!(!(c + Vec2::new(10.0, 0.0)).contains(Point::new(2.0, 2.0)));
    }

    #[test]
    fn outline_bbox() {
        let c = Circle::new((0.0, 0.0), 3.0);
        let mut path = BezPath::new();
        c.append_to(&mut path);
        let bbox = path.bounding_box().unwrap();
        let expected = c.bounding_box();
        assert!((bbox.x0 - expected.x0).abs() < 1e-3);
        assert!((bbox.y1 - expected.y1).abs() < 1e-3);
    }
}
