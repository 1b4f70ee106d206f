// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Classified intersections between pairs of shapes.
//!
//! The entry point is [`intersect`], which takes any two [`Geometry`] values
//! and returns an [`Intersections`]: a status plus the intersection points,
//! sorted by the parameter on the first shape. [`intersect_path`] walks the
//! segments of a path and tags each point with its segment index.
//!
//! ```
//! use vecpath::intersect::{intersect, Geometry, IntersectionStatus};
//! use vecpath::Line;
//!
//! let a = Geometry::Line(Line::new((0.0, 0.0), (10.0, 0.0)));
//! let b = Geometry::Line(Line::new((5.0, -5.0), (5.0, 5.0)));
//! let result = intersect(&a, &b);
//! assert_eq!(result.status(), IntersectionStatus::Intersection);
//! assert_eq!(result.points()[0].t1, 0.5);
//! ```

mod conic;
mod curve;
mod line;
mod point;
mod polygon;

use alloc::vec::Vec;
use core::cmp::Ordering;

use arrayvec::ArrayVec;

use crate::bezpath::segments;
use crate::{Circle, CubicBez, Ellipse, Line, PathEl, PathSeg, Point, Poly, QuadBez, Rect, Vec2};

pub use line::Ray;

/// Candidate curve parameters on the first curve must agree in x and y
/// within this tolerance.
pub const MATCH_TOLERANCE: f64 = 1e-4;

/// The outcome of an intersection query.
///
/// Only [`Intersection`](IntersectionStatus::Intersection) carries points;
/// every other status explains why there are none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IntersectionStatus {
    /// The shapes cross or touch at one or more points.
    Intersection,
    /// The shapes do not meet.
    NoIntersection,
    /// The first shape lies entirely inside the second (or the second
    /// inside the first, for two closed shapes).
    Inside,
    /// The first shape lies entirely outside the second.
    Outside,
    /// A line touches a circle or ellipse at a single tangent point.
    Tangent,
    /// The shapes lie on the same line or curve.
    Coincident,
    /// Two lines are parallel and distinct.
    Parallel,
}

/// A single intersection point.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionPoint {
    /// The location of the intersection.
    pub point: Point,
    /// The parameter on the first shape.
    ///
    /// This is `NaN` for shapes without a parameterization (circles,
    /// ellipses, points).
    pub t1: f64,
    /// The parameter on the second shape, with the same caveat as `t1`.
    pub t2: f64,
    /// The unnormalized tangent of the first shape at the point.
    pub tangent1: Vec2,
    /// The unnormalized tangent of the second shape at the point, zero for
    /// points.
    pub tangent2: Vec2,
    /// The index of the path segment or polygon edge the point lies on.
    ///
    /// Zero unless the query decomposed a path, polygon or rectangle.
    pub segment: usize,
}

impl IntersectionPoint {
    /// A new intersection point on segment 0.
    pub fn new(point: Point, t1: f64, t2: f64, tangent1: Vec2, tangent2: Vec2) -> Self {
        IntersectionPoint {
            point,
            t1,
            t2,
            tangent1,
            tangent2,
            segment: 0,
        }
    }

    /// The same point seen from the other shape.
    #[must_use]
    pub fn swapped(&self) -> Self {
        IntersectionPoint {
            t1: self.t2,
            t2: self.t1,
            tangent1: self.tangent2,
            tangent2: self.tangent1,
            ..*self
        }
    }
}

/// The result of an intersection query.
///
/// The point list is non-empty if and only if the status is
/// [`IntersectionStatus::Intersection`], and is sorted by `t1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Intersections {
    status: IntersectionStatus,
    points: Vec<IntersectionPoint>,
}

impl Intersections {
    /// A result without points.
    ///
    /// # Panics
    ///
    /// If `status` is [`IntersectionStatus::Intersection`].
    #[track_caller]
    pub fn empty(status: IntersectionStatus) -> Self {
        assert!(
            status != IntersectionStatus::Intersection,
            "an intersection result needs points"
        );
        Intersections {
            status,
            points: Vec::new(),
        }
    }

    /// A result from a list of points.
    ///
    /// The status is `Intersection` if there are points and
    /// `NoIntersection` otherwise.
    pub fn from_points(points: Vec<IntersectionPoint>) -> Self {
        Self::from_points_or(points, IntersectionStatus::NoIntersection)
    }

    /// A result from a list of points, with the status to report if the
    /// list turns out to be empty.
    pub fn from_points_or(mut points: Vec<IntersectionPoint>, otherwise: IntersectionStatus) -> Self {
        if points.is_empty() {
            let status = if otherwise == IntersectionStatus::Intersection {
                IntersectionStatus::NoIntersection
            } else {
                otherwise
            };
            return Intersections { status, points };
        }
        points.sort_by(|a, b| {
            (a.segment, a.t1)
                .partial_cmp(&(b.segment, b.t1))
                .unwrap_or(Ordering::Equal)
        });
        Intersections {
            status: IntersectionStatus::Intersection,
            points,
        }
    }

    /// A non-empty result sorted by `t1` alone, where `segment` labels the
    /// second shape's parts.
    pub(super) fn from_points_by_t1(mut points: Vec<IntersectionPoint>) -> Self {
        if points.is_empty() {
            return Self::empty(IntersectionStatus::NoIntersection);
        }
        points.sort_by(|a, b| a.t1.partial_cmp(&b.t1).unwrap_or(Ordering::Equal));
        Intersections {
            status: IntersectionStatus::Intersection,
            points,
        }
    }

    /// The classification.
    pub fn status(&self) -> IntersectionStatus {
        self.status
    }

    /// The intersection points, sorted by `t1`.
    pub fn points(&self) -> &[IntersectionPoint] {
        &self.points
    }

    /// Consume the result, returning the points.
    pub fn into_points(self) -> Vec<IntersectionPoint> {
        self.points
    }

    /// Whether any intersection was found.
    pub fn is_intersection(&self) -> bool {
        self.status == IntersectionStatus::Intersection
    }

    /// The same result seen from the second shape.
    #[must_use]
    pub fn swapped(self) -> Self {
        if self.points.is_empty() {
            return self;
        }
        Self::from_points(self.points.iter().map(IntersectionPoint::swapped).collect())
    }
}

/// Any shape the intersection engine accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A point with a hit tolerance radius.
    Point {
        /// The point.
        point: Point,
        /// Distances up to this radius count as hits.
        tolerance: f64,
    },
    /// A line segment.
    Line(Line),
    /// A ray.
    Ray(Ray),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
    /// A circle outline.
    Circle(Circle),
    /// An ellipse outline.
    Ellipse(Ellipse),
    /// A closed polygon outline, given by its vertices.
    Polygon(Vec<Point>),
    /// A rectangle outline.
    Rect(Rect),
}

impl From<PathSeg> for Geometry {
    fn from(seg: PathSeg) -> Geometry {
        match seg {
            PathSeg::Line(l) => Geometry::Line(l),
            PathSeg::Quad(q) => Geometry::Quad(q),
            PathSeg::Cubic(c) => Geometry::Cubic(c),
        }
    }
}

impl From<Line> for Geometry {
    fn from(line: Line) -> Geometry {
        Geometry::Line(line)
    }
}

impl From<QuadBez> for Geometry {
    fn from(quad: QuadBez) -> Geometry {
        Geometry::Quad(quad)
    }
}

impl From<CubicBez> for Geometry {
    fn from(cubic: CubicBez) -> Geometry {
        Geometry::Cubic(cubic)
    }
}

impl From<Circle> for Geometry {
    fn from(circle: Circle) -> Geometry {
        Geometry::Circle(circle)
    }
}

impl From<Ellipse> for Geometry {
    fn from(ellipse: Ellipse) -> Geometry {
        Geometry::Ellipse(ellipse)
    }
}

impl From<Rect> for Geometry {
    fn from(rect: Rect) -> Geometry {
        Geometry::Rect(rect)
    }
}

/// Intersect two shapes.
///
/// `t1` in the result always refers to `a`, `t2` to `b`.
pub fn intersect(a: &Geometry, b: &Geometry) -> Intersections {
    use Geometry as G;
    match (a, b) {
        // Edge sets decompose first, so every other case sees primitives.
        (G::Polygon(vertices), _) => polygon::edges_first(&polygon::polygon_edges(vertices), b),
        (G::Rect(rect), _) => polygon::edges_first(&rect.edges(), b),
        (_, G::Polygon(vertices)) => polygon::edges_second(a, &polygon::polygon_edges(vertices)),
        (_, G::Rect(rect)) => polygon::edges_second(a, &rect.edges()),

        (G::Point { point: p, tolerance: r }, G::Point { point: q, tolerance: s }) => {
            point::point_point(*p, *q, r.max(*s))
        }
        (_, G::Point { point, tolerance }) => point::shape_point(a, *point, *tolerance),
        (G::Point { .. }, _) => intersect(b, a).swapped(),

        (G::Line(l), G::Line(m)) => line::linear_linear(&(*l).into(), &(*m).into()),
        (G::Line(l), G::Ray(r)) => line::linear_linear(&(*l).into(), &(*r).into()),
        (G::Ray(r), G::Line(l)) => line::linear_linear(&(*r).into(), &(*l).into()),
        (G::Ray(r), G::Ray(s)) => line::linear_linear(&(*r).into(), &(*s).into()),

        (G::Line(l), G::Quad(_) | G::Cubic(_)) => line::linear_curve(&(*l).into(), b),
        (G::Ray(r), G::Quad(_) | G::Cubic(_)) => line::linear_curve(&(*r).into(), b),
        (G::Quad(_) | G::Cubic(_), G::Line(_) | G::Ray(_)) => intersect(b, a).swapped(),

        (G::Quad(_) | G::Cubic(_), G::Quad(_) | G::Cubic(_)) => curve::curve_curve(a, b),

        (G::Circle(c), G::Circle(d)) => conic::circle_circle(c, d),
        (G::Circle(c), G::Ellipse(e)) => conic::ellipse_ellipse(&c.to_ellipse(), e),
        (G::Ellipse(e), G::Circle(c)) => conic::ellipse_ellipse(e, &c.to_ellipse()),
        (G::Ellipse(e), G::Ellipse(f)) => conic::ellipse_ellipse(e, f),

        (G::Line(l), G::Circle(c)) => conic::linear_ellipse(&(*l).into(), &c.to_ellipse()),
        (G::Line(l), G::Ellipse(e)) => conic::linear_ellipse(&(*l).into(), e),
        (G::Ray(r), G::Circle(c)) => conic::linear_ellipse(&(*r).into(), &c.to_ellipse()),
        (G::Ray(r), G::Ellipse(e)) => conic::linear_ellipse(&(*r).into(), e),
        (G::Quad(q), G::Circle(c)) => conic::curve_ellipse(&PathSeg::Quad(*q), &c.to_ellipse()),
        (G::Quad(q), G::Ellipse(e)) => conic::curve_ellipse(&PathSeg::Quad(*q), e),
        (G::Cubic(k), G::Circle(c)) => conic::curve_ellipse(&PathSeg::Cubic(*k), &c.to_ellipse()),
        (G::Cubic(k), G::Ellipse(e)) => conic::curve_ellipse(&PathSeg::Cubic(*k), e),
        (G::Circle(_) | G::Ellipse(_), _) => intersect(b, a).swapped(),
    }
}

/// Intersect every segment of a path with a shape.
///
/// Each point carries the index of the segment it was found on, counting
/// the closing segments generated by `ClosePath`. Points are sorted by
/// segment, then by `t1` within the segment.
///
/// With no points the status is `Inside` if every segment reported
/// `Inside`, and `NoIntersection` otherwise.
///
/// # Panics
///
/// If the path is non-empty and does not begin with `MoveTo`.
pub fn intersect_path(path: &[PathEl], other: &Geometry) -> Intersections {
    let mut points = Vec::new();
    let mut all_inside = true;
    let mut any = false;
    for (ix, seg) in segments(path).enumerate() {
        any = true;
        let result = intersect(&seg.into(), other);
        all_inside &= result.status() == IntersectionStatus::Inside;
        points.extend(result.into_points().into_iter().map(|mut p| {
            p.segment = ix;
            p
        }));
    }
    let otherwise = if any && all_inside {
        IntersectionStatus::Inside
    } else {
        IntersectionStatus::NoIntersection
    };
    Intersections::from_points_or(points, otherwise)
}

/// Power basis coefficients of a segment, constant term first.
pub(crate) fn power_basis(seg: &PathSeg) -> ArrayVec<Vec2, 4> {
    let mut result = ArrayVec::new();
    match *seg {
        PathSeg::Line(l) => result.extend([l.p0.to_vec2(), l.p1 - l.p0]),
        PathSeg::Quad(q) => {
            let (a, b, c) = q.parameters();
            result.extend([c, b, a]);
        }
        PathSeg::Cubic(k) => {
            let (a, b, c, d) = k.parameters();
            result.extend([d, c, b, a]);
        }
    }
    result
}

/// The x and y coordinate polynomials of a segment.
pub(crate) fn coordinate_polys(seg: &PathSeg) -> (Poly, Poly) {
    let coeffs = power_basis(seg);
    (
        Poly::from_ascending(coeffs.iter().map(|v| v.x)),
        Poly::from_ascending(coeffs.iter().map(|v| v.y)),
    )
}

/// Convert a curve geometry into a segment. Only called on curves.
fn as_segment(g: &Geometry) -> Option<PathSeg> {
    match *g {
        Geometry::Line(l) => Some(PathSeg::Line(l)),
        Geometry::Quad(q) => Some(PathSeg::Quad(q)),
        Geometry::Cubic(c) => Some(PathSeg::Cubic(c)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BezPath;

    #[test]
    fn dispatch_swaps_parameters() {
        let line = Geometry::Line(Line::new((0.0, 1.0), (4.0, 1.0)));
        let quad = Geometry::Quad(QuadBez::new((0.0, 0.0), (2.0, 4.0), (4.0, 0.0)));
        let a = intersect(&line, &quad);
        let b = intersect(&quad, &line);
        assert_eq!(a.points().len(), 2);
        assert_eq!(b.points().len(), 2);
        for (p, q) in a.points().iter().zip(b.points()) {
            assert!(p.point.distance(q.point) < 1e-9);
            assert!((p.t1 - q.t2).abs() < 1e-12);
        }
        assert!(b.points()[0].t1 < b.points()[1].t1);
    }

    #[test]
    fn points_sorted_by_t1() {
        let line = Geometry::Line(Line::new((10.0, 0.0), (-10.0, 0.0)));
        let circle = Geometry::Circle(Circle::new((0.0, 0.0), 5.0));
        let result = intersect(&line, &circle);
        assert_eq!(result.points().len(), 2);
        assert!(result.points()[0].point.distance(Point::new(5.0, 0.0)) < 1e-9);
        assert!(result.points()[0].t1 < result.points()[1].t1);
    }

    #[test]
    fn path_segment_indices() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        let across = Geometry::Line(Line::new((5.0, -5.0), (5.0, 15.0)));
        let result = intersect_path(path.elements(), &across);
        let segs: Vec<_> = result.points().iter().map(|p| p.segment).collect();
        assert_eq!(segs, [0, 2]);
        assert!(result.points()[1].point.distance(Point::new(5.0, 10.0)) < 1e-12);
    }

    #[test]
    fn path_inside_circle() {
        let mut path = BezPath::new();
        path.move_to((-1.0, 0.0));
        path.line_to((1.0, 0.0));
        path.quad_to((0.0, 1.0), (-1.0, 0.0));
        let circle = Geometry::Circle(Circle::new((0.0, 0.0), 5.0));
        let result = intersect_path(path.elements(), &circle);
        assert_eq!(result.status(), IntersectionStatus::Inside);
        assert!(result.points().is_empty());
    }

    #[test]
    #[should_panic(expected = "an intersection result needs points")]
    fn empty_intersection_is_rejected() {
        let _ = Intersections::empty(IntersectionStatus::Intersection);
    }
}
