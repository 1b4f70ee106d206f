// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elliptical arcs in endpoint form, and their conversion to cubic Béziers.

use core::f64::consts::{FRAC_PI_2, PI};

use smallvec::SmallVec;

use crate::common::EPSILON;
use crate::{Affine, CubicBez, Line, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// An elliptical arc in the endpoint form used by the path mini-language.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SvgArc {
    /// The arc's start point.
    pub from: Point,
    /// The arc's end point.
    pub to: Point,
    /// The arc's radii, where the vector's x-component is the radius in the
    /// positive x direction after applying `x_rotation`.
    pub radii: Vec2,
    /// How much the arc is rotated, in degrees.
    pub x_rotation: f64,
    /// Does this arc sweep through more than π radians?
    pub large_arc: bool,
    /// Determines if the arc should begin moving at positive angles.
    pub sweep: bool,
}

/// The result of converting an [`SvgArc`] to path primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum ArcConversion {
    /// The arc is degenerate and is drawn as a straight line.
    Line(Line),
    /// One cubic per sub-arc of at most 90°.
    Cubics(SmallVec<[CubicBez; 4]>),
}

/// Center parameterization of an arc, with radii already corrected.
struct CenterArc {
    center: Point,
    radii: Vec2,
    /// `(sin, cos)` of the x axis rotation.
    rotation: (f64, f64),
    start_angle: f64,
    sweep_angle: f64,
}

impl SvgArc {
    /// Checks that the arc is degenerate and should be drawn as a line.
    ///
    /// That is the case when its endpoints coincide or either radius is
    /// (nearly) zero.
    pub fn is_straight_line(&self) -> bool {
        self.radii.x.abs() <= 1e-5 || self.radii.y.abs() <= 1e-5 || self.from.is_near(self.to)
    }

    /// Convert the arc to cubic Béziers.
    ///
    /// The arc is split into sub-arcs of at most 90°. Each is approximated
    /// on the unit circle with control arms of length `4/3 tan(Δθ/4)`, then
    /// scaled, rotated and translated into the ellipse. The first cubic
    /// starts exactly at `from` and the last ends exactly at `to`.
    ///
    /// ```
    /// use vecpath::{ArcConversion, Point, SvgArc, Vec2};
    /// let arc = SvgArc {
    ///     from: Point::new(1.0, 0.0),
    ///     to: Point::new(-1.0, 0.0),
    ///     radii: Vec2::new(1.0, 1.0),
    ///     x_rotation: 0.0,
    ///     large_arc: false,
    ///     sweep: true,
    /// };
    /// let ArcConversion::Cubics(cubics) = arc.to_cubics() else { panic!() };
    /// assert_eq!(cubics.len(), 2);
    /// assert_eq!(cubics[1].p3, Point::new(-1.0, 0.0));
    /// ```
    pub fn to_cubics(&self) -> ArcConversion {
        let line = Line::new(self.from, self.to);
        if self.is_straight_line() {
            tracing::debug!(?self, "degenerate arc drawn as a line");
            return ArcConversion::Line(line);
        }
        let Some(arc) = self.center_parameterization() else {
            tracing::debug!(?self, "arc without a center drawn as a line");
            return ArcConversion::Line(line);
        };
        let n = (arc.sweep_angle.abs() / FRAC_PI_2 - 1e-9).ceil().max(1.0) as usize;
        let step = arc.sweep_angle / n as f64;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let (sin_phi, cos_phi) = arc.rotation;
        let map = |v: Vec2| {
            let x = arc.radii.x * v.x;
            let y = arc.radii.y * v.y;
            Point::new(
                arc.center.x + cos_phi * x - sin_phi * y,
                arc.center.y + sin_phi * x + cos_phi * y,
            )
        };
        let mut cubics = SmallVec::new();
        let mut p0 = self.from;
        let mut u0 = Vec2::from_angle(arc.start_angle);
        for i in 0..n {
            let u1 = Vec2::from_angle(arc.start_angle + step * (i + 1) as f64);
            let p1 = map(u0 + k * u0.turn_90());
            let p2 = map(u1 - k * u1.turn_90());
            let p3 = if i + 1 == n { self.to } else { map(u1) };
            cubics.push(CubicBez::new(p0, p1, p2, p3));
            p0 = p3;
            u0 = u1;
        }
        ArcConversion::Cubics(cubics)
    }

    /// Endpoint to center conversion, scaling the radii up if they are too
    /// small to span the endpoints.
    fn center_parameterization(&self) -> Option<CenterArc> {
        let mut rx = self.radii.x.abs();
        let mut ry = self.radii.y.abs();
        let rot = Affine::rotate_degrees(self.x_rotation).as_coeffs();
        let (cos_phi, sin_phi) = (rot[0], rot[1]);

        let mid = (self.from - self.to) * 0.5;
        let x1 = cos_phi * mid.x + sin_phi * mid.y;
        let y1 = -sin_phi * mid.x + cos_phi * mid.y;

        let lambda = (x1 / rx).powi(2) + (y1 / ry).powi(2);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let d = (rx * y1).powi(2) + (ry * x1).powi(2);
        if d <= EPSILON * (rx * ry).powi(2) {
            return None;
        }
        let mut k = ((rx * ry).powi(2) / d - 1.0).abs().sqrt();
        if self.sweep == self.large_arc {
            k = -k;
        }
        let cx1 = k * rx * y1 / ry;
        let cy1 = -k * ry * x1 / rx;

        let center = Point::new(
            cos_phi * cx1 - sin_phi * cy1 + 0.5 * (self.from.x + self.to.x),
            sin_phi * cx1 + cos_phi * cy1 + 0.5 * (self.from.y + self.to.y),
        );

        let u = Vec2::new((x1 - cx1) / rx, (y1 - cy1) / ry);
        let v = Vec2::new((-x1 - cx1) / rx, (-y1 - cy1) / ry);
        if u.hypot2() == 0.0 || v.hypot2() == 0.0 {
            return None;
        }
        let start_angle = u.atan2();
        let mut sweep_angle = u.angle_to(v);
        if self.sweep && sweep_angle < 0.0 {
            sweep_angle += 2.0 * PI;
        } else if !self.sweep && sweep_angle > 0.0 {
            sweep_angle -= 2.0 * PI;
        }
        Some(CenterArc {
            center,
            radii: Vec2::new(rx, ry),
            rotation: (sin_phi, cos_phi),
            start_angle,
            sweep_angle,
        })
    }
}

/// Convert an elliptical arc in endpoint form to cubic Béziers.
///
/// Degenerate arcs (coincident endpoints, or a zero radius) become a
/// straight line from `last` to `end`.
pub fn arc_to_cubics(
    last: Point,
    rx: f64,
    ry: f64,
    x_rotation_degrees: f64,
    end: Point,
    large_arc: bool,
    sweep: bool,
) -> ArcConversion {
    SvgArc {
        from: last,
        to: end,
        radii: Vec2::new(rx, ry),
        x_rotation: x_rotation_degrees,
        large_arc,
        sweep,
    }
    .to_cubics()
}
