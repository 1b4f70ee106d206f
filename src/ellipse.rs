// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rotated ellipses.

use core::f64::consts::{FRAC_PI_2, PI};
use core::ops::{Add, Sub};

use crate::{Affine, Circle, PathSink, Point, Rect, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// An ellipse.
///
/// The ellipse is the unit circle scaled by `radii` along the axes, rotated
/// by `rotation` radians, then translated to `center`.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipse {
    /// The center.
    pub center: Point,
    /// The radii before rotation. Negative values are treated as their
    /// absolute value.
    pub radii: Vec2,
    /// The rotation of the x axis, in radians.
    pub rotation: f64,
}

impl Ellipse {
    /// A new ellipse from center, radii, and rotation.
    #[inline]
    pub fn new(center: impl Into<Point>, radii: impl Into<Vec2>, rotation: f64) -> Ellipse {
        let radii = radii.into();
        Ellipse {
            center: center.into(),
            radii: Vec2::new(radii.x.abs(), radii.y.abs()),
            rotation,
        }
    }

    /// Returns the largest axis-aligned ellipse that fits in `rect`.
    pub fn from_rect(rect: Rect) -> Ellipse {
        Ellipse::new(rect.center(), (rect.width() / 2.0, rect.height() / 2.0), 0.0)
    }

    /// The affine map taking the unit circle onto this ellipse.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.center.to_vec2())
            * Affine::rotate(self.rotation)
            * Affine::scale_non_uniform(self.radii.x, self.radii.y)
    }

    /// The map taking this ellipse onto the unit circle.
    ///
    /// The result is not finite when a radius is zero.
    pub fn inverse_affine(&self) -> Affine {
        Affine::scale_non_uniform(self.radii.x.recip(), self.radii.y.recip())
            * Affine::rotate(-self.rotation)
            * Affine::translate(-self.center.to_vec2())
    }

    /// Is this ellipse a circle?
    pub fn as_circle(&self) -> Option<Circle> {
        (self.radii.x == self.radii.y).then(|| Circle::new(self.center, self.radii.x))
    }

    /// Is this ellipse degenerate, having a zero radius?
    pub fn is_degenerate(&self) -> bool {
        self.radii.x == 0.0 || self.radii.y == 0.0
    }

    /// Is `p` strictly inside the ellipse?
    pub fn contains(&self, p: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }
        (self.inverse_affine() * p).to_vec2().hypot2() < 1.0
    }

    /// The point at angle `theta` of the unrotated parameterization.
    pub fn point_at(&self, theta: f64) -> Point {
        let (s, c) = theta.sin_cos();
        self.affine() * Point::new(c, s)
    }

    /// The smallest axis-aligned rectangle enclosing the ellipse.
    pub fn bounding_box(&self) -> Rect {
        let (s, c) = self.rotation.sin_cos();
        let (rx, ry) = (self.radii.x, self.radii.y);
        let w = (rx * c).hypot(ry * s);
        let h = (rx * s).hypot(ry * c);
        Rect::new(
            self.center.x - w,
            self.center.y - h,
            self.center.x + w,
            self.center.y + h,
        )
    }

    /// Draw the outline as a closed path of four cubic arcs.
    pub fn append_to(&self, sink: &mut impl PathSink) {
        let affine = self.affine();
        // Quarter circle control distance.
        let k = 4.0 / 3.0 * (PI / 8.0).tan();
        sink.move_to(affine * Point::new(1.0, 0.0));
        for i in 0..4 {
            let th0 = i as f64 * FRAC_PI_2;
            let th1 = th0 + FRAC_PI_2;
            let p0 = Vec2::from_angle(th0);
            let p3 = Vec2::from_angle(th1);
            let c1 = p0 + k * p0.turn_90();
            let c2 = p3 - k * p3.turn_90();
            sink.curve_to(
                affine * c1.to_point(),
                affine * c2.to_point(),
                affine * p3.to_point(),
            );
        }
        sink.close_path();
    }

    /// Is this ellipse finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.radii.is_finite() && self.rotation.is_finite()
    }
}

impl Add<Vec2> for Ellipse {
    type Output = Ellipse;

    #[inline]
    fn add(self, v: Vec2) -> Ellipse {
        Ellipse {
            center: self.center + v,
            ..self
        }
    }
}

impl Sub<Vec2> for Ellipse {
    type Output = Ellipse;

    #[inline]
    fn sub(self, v: Vec2) -> Ellipse {
        Ellipse {
            center: self.center - v,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::FRAC_PI_2;

    use crate::{Ellipse, Point};

    fn assert_near(p0: Point, p1: Point) {
        assert!(p0.distance(p1) < 1e-9, "{p0:?} != {p1:?}");
    }

    #[test]
    fn unit_circle_maps() {
        let e = Ellipse::new((3.0, 1.0), (4.0, 2.0), 0.3);
        for i in 0..8 {
            let p = e.point_at(i as f64 * 0.7);
            let q = e.inverse_affine() * p;
            assert!((q.to_vec2().hypot() - 1.0).abs() < 1e-12);
            assert_near(e.affine() * q, p);
        }
    }

    #[test]
    fn contains() {
        let e = Ellipse::new((0.0, 0.0), (4.0, 1.0), FRAC_PI_2);
        assert!(e.contains(Point::new(0.0, 3.5)));
        assert!(!e.contains(Point::new(3.5, 0.0)));
        assert!(!Ellipse::new((0.0, 0.0), (0.0, 1.0), 0.0).contains(Point::ZERO));
    }

    #[test]
    fn bounding_box_rotated() {
        let e = Ellipse::new((0.0, 0.0), (4.0, 1.0), FRAC_PI_2);
        let bbox = e.bounding_box();
        assert!((bbox.x1 - 1.0).abs() < 1e-12);
        assert!((bbox.y1 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn as_circle() {
        assert!(Ellipse::new((0.0, 0.0), (2.0, 2.0), 1.0).as_circle().is_some());
        assert!(Ellipse::new((0.0, 0.0), (2.0, 3.0), 0.0).as_circle().is_none());
    }
}
