// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recorded command streams, and their segments.

use core::ops::{Mul, Range};

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use crate::{
    Affine, BoundingBox, CubicBez, Line, ParamCurve, ParamCurveExtrema, PathSink, Point, QuadBez,
    Rect, Vec2, MAX_EXTREMA,
};

/// A path made of Bézier segments up to cubic, possibly with multiple subpaths.
///
/// Arcs and smooth curves are not stored; they are expanded into these
/// primitives when drawn through a [`PathBuilder`](crate::PathBuilder).
#[derive(Clone, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezPath(Vec<PathEl>);

/// The element of a Bézier path.
///
/// A valid path has `MoveTo` at the beginning of each subpath.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Move directly to the point without drawing anything, starting a new
    /// subpath.
    MoveTo(Point),
    /// Draw a line from the current location to the point.
    LineTo(Point),
    /// Draw a quadratic Bézier using the current location and the two points.
    QuadTo(Point, Point),
    /// Draw a cubic Bézier using the current location and the three points.
    CurveTo(Point, Point, Point),
    /// Close off the path.
    ClosePath,
}

/// A segment of a Bézier path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathSeg {
    /// A line segment.
    Line(Line),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
}

impl BezPath {
    /// Create a new path.
    pub fn new() -> BezPath {
        BezPath::default()
    }

    /// Create a path from a vector of path elements.
    pub fn from_vec(v: Vec<PathEl>) -> BezPath {
        BezPath(v)
    }

    /// Push a generic path element onto the path.
    pub fn push(&mut self, el: PathEl) {
        self.0.push(el);
    }

    /// Push a "move to" element onto the path.
    pub fn move_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::MoveTo(p.into()));
    }

    /// Push a "line to" element onto the path.
    pub fn line_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::LineTo(p.into()));
    }

    /// Push a "quad to" element onto the path.
    pub fn quad_to<P: Into<Point>>(&mut self, p1: P, p2: P) {
        self.push(PathEl::QuadTo(p1.into(), p2.into()));
    }

    /// Push a "curve to" element onto the path.
    pub fn curve_to<P: Into<Point>>(&mut self, p1: P, p2: P, p3: P) {
        self.push(PathEl::CurveTo(p1.into(), p2.into(), p3.into()));
    }

    /// Push a "close path" element onto the path.
    pub fn close_path(&mut self) {
        self.push(PathEl::ClosePath);
    }

    /// Get the path elements.
    pub fn elements(&self) -> &[PathEl] {
        &self.0
    }

    /// Consume the path, returning its elements.
    pub fn into_elements(self) -> Vec<PathEl> {
        self.0
    }

    /// Iterate over the path segments.
    ///
    /// A `ClosePath` yields the closing line when the subpath does not
    /// already end at its start point.
    ///
    /// # Panics
    ///
    /// If the path is non-empty and does not begin with `MoveTo`.
    pub fn segments(&self) -> impl Iterator<Item = PathSeg> + '_ {
        segments(&self.0)
    }

    /// Get the segment at the given element index.
    ///
    /// The element index counts [`PathEl`] elements, so for example includes
    /// an initial `MoveTo`.
    pub fn get_seg(&self, ix: usize) -> Option<PathSeg> {
        if ix == 0 || ix >= self.0.len() {
            return None;
        }
        let last = self.0[ix - 1].end_point()?;
        match self.0[ix] {
            PathEl::LineTo(p) => Some(PathSeg::Line(Line::new(last, p))),
            PathEl::QuadTo(p1, p2) => Some(PathSeg::Quad(QuadBez::new(last, p1, p2))),
            PathEl::CurveTo(p1, p2, p3) => Some(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3))),
            PathEl::ClosePath => self.0[..ix].iter().rev().find_map(|el| match *el {
                PathEl::MoveTo(start) => Some(PathSeg::Line(Line::new(last, start))),
                _ => None,
            }),
            PathEl::MoveTo(_) => None,
        }
    }

    /// Returns `true` if the path contains no segments.
    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|el| {
            matches!(
                *el,
                PathEl::LineTo(..) | PathEl::QuadTo(..) | PathEl::CurveTo(..)
            )
        })
    }

    /// Apply an affine transform to the path.
    pub fn apply_affine(&mut self, affine: Affine) {
        for el in self.0.iter_mut() {
            *el = affine * (*el);
        }
    }

    /// The tight bounding box of the path, or `None` if it is empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut bbox = BoundingBox::new();
        self.replay(&mut bbox);
        bbox.rect()
    }

    /// Send every element of the path into a sink, followed by `path_done`.
    pub fn replay(&self, sink: &mut impl PathSink) {
        for el in &self.0 {
            el.emit(sink);
        }
        sink.path_done();
    }
}

impl PathSink for BezPath {
    fn move_to(&mut self, p: Point) {
        self.push(PathEl::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.push(PathEl::LineTo(p));
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.push(PathEl::QuadTo(p1, p2));
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.push(PathEl::CurveTo(p1, p2, p3));
    }

    fn close_path(&mut self) {
        self.push(PathEl::ClosePath);
    }
}

impl FromIterator<PathEl> for BezPath {
    fn from_iter<T: IntoIterator<Item = PathEl>>(iter: T) -> Self {
        BezPath(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a BezPath {
    type Item = PathEl;
    type IntoIter = core::iter::Cloned<core::slice::Iter<'a, PathEl>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements().iter().cloned()
    }
}

impl PathEl {
    /// The point this element ends at, or `None` for `ClosePath`.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathEl::MoveTo(p) | PathEl::LineTo(p) | PathEl::QuadTo(_, p) => Some(p),
            PathEl::CurveTo(_, _, p) => Some(p),
            PathEl::ClosePath => None,
        }
    }

    /// Send this element into a sink.
    pub fn emit(&self, sink: &mut impl PathSink) {
        match *self {
            PathEl::MoveTo(p) => sink.move_to(p),
            PathEl::LineTo(p) => sink.line_to(p),
            PathEl::QuadTo(p1, p2) => sink.quad_to(p1, p2),
            PathEl::CurveTo(p1, p2, p3) => sink.curve_to(p1, p2, p3),
            PathEl::ClosePath => sink.close_path(),
        }
    }
}

/// Iterate over the segments of a slice of path elements.
///
/// # Panics
///
/// If the slice is non-empty and does not begin with `MoveTo`.
pub fn segments(elements: &[PathEl]) -> Segments<'_> {
    let first = match elements.first() {
        Some(PathEl::MoveTo(p)) => *p,
        Some(_) => panic!("First element has to be a PathEl::MoveTo!"),
        None => Point::ZERO,
    };
    Segments {
        elements: elements.iter(),
        start: first,
        last: first,
    }
}

/// An iterator over the segments of a path, see [`segments`].
#[derive(Clone)]
pub struct Segments<'a> {
    elements: core::slice::Iter<'a, PathEl>,
    start: Point,
    last: Point,
}

impl Iterator for Segments<'_> {
    type Item = PathSeg;

    fn next(&mut self) -> Option<PathSeg> {
        for el in &mut self.elements {
            let (ret, last) = match *el {
                PathEl::MoveTo(p) => {
                    self.start = p;
                    self.last = p;
                    continue;
                }
                PathEl::LineTo(p) => (PathSeg::Line(Line::new(self.last, p)), p),
                PathEl::QuadTo(p1, p2) => (PathSeg::Quad(QuadBez::new(self.last, p1, p2)), p2),
                PathEl::CurveTo(p1, p2, p3) => {
                    (PathSeg::Cubic(CubicBez::new(self.last, p1, p2, p3)), p3)
                }
                PathEl::ClosePath => {
                    if self.last != self.start {
                        (PathSeg::Line(Line::new(self.last, self.start)), self.start)
                    } else {
                        self.last = self.start;
                        continue;
                    }
                }
            };
            self.last = last;
            return Some(ret);
        }
        None
    }
}

impl PathSeg {
    /// Returns a new `PathSeg` describing the same path as `self`, but with
    /// the points reversed.
    #[must_use]
    pub fn reversed(&self) -> PathSeg {
        match self {
            PathSeg::Line(l) => PathSeg::Line(l.reversed()),
            PathSeg::Quad(q) => PathSeg::Quad(q.reversed()),
            PathSeg::Cubic(c) => PathSeg::Cubic(c.reversed()),
        }
    }

    /// Convert this segment to a cubic Bézier.
    pub fn to_cubic(&self) -> CubicBez {
        match *self {
            PathSeg::Line(Line { p0, p1 }) => CubicBez::new(p0, p0, p1, p1),
            PathSeg::Cubic(c) => c,
            PathSeg::Quad(q) => q.raise(),
        }
    }

    /// The segment as a path element, dropping its start point.
    pub fn as_path_el(&self) -> PathEl {
        match *self {
            PathSeg::Line(l) => PathEl::LineTo(l.p1),
            PathSeg::Quad(q) => PathEl::QuadTo(q.p1, q.p2),
            PathSeg::Cubic(c) => PathEl::CurveTo(c.p1, c.p2, c.p3),
        }
    }

    /// Send the segment into a sink as a drawing command from the current
    /// point, which must equal the segment's start.
    pub fn emit(&self, sink: &mut impl PathSink) {
        self.as_path_el().emit(sink);
    }

    /// The control polygon of the segment, start point first.
    pub fn points(&self) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        match *self {
            PathSeg::Line(l) => result.extend([l.p0, l.p1]),
            PathSeg::Quad(q) => result.extend([q.p0, q.p1, q.p2]),
            PathSeg::Cubic(c) => result.extend([c.p0, c.p1, c.p2, c.p3]),
        }
        result
    }

    /// Merge two adjacent segments of the same kind that were produced by
    /// splitting a single one.
    ///
    /// Segments of different kinds never merge.
    pub fn merge(&self, other: &PathSeg, tolerance: f64) -> Option<PathSeg> {
        match (self, other) {
            (PathSeg::Line(a), PathSeg::Line(b)) => a.merge(b, tolerance).map(PathSeg::Line),
            (PathSeg::Quad(a), PathSeg::Quad(b)) => a.merge(b, tolerance).map(PathSeg::Quad),
            (PathSeg::Cubic(a), PathSeg::Cubic(b)) => a.merge(b, tolerance).map(PathSeg::Cubic),
            _ => None,
        }
    }

    /// Parameters of the inflection points. Only cubics have any.
    pub fn inflections(&self) -> ArrayVec<f64, 2> {
        match self {
            PathSeg::Cubic(c) => c.inflections(),
            _ => ArrayVec::new(),
        }
    }

    /// Is this segment finite?
    pub fn is_finite(&self) -> bool {
        match self {
            PathSeg::Line(l) => l.is_finite(),
            PathSeg::Quad(q) => q.is_finite(),
            PathSeg::Cubic(c) => c.is_finite(),
        }
    }
}

impl ParamCurve for PathSeg {
    fn eval(&self, t: f64) -> Point {
        match *self {
            PathSeg::Line(line) => line.eval(t),
            PathSeg::Quad(quad) => quad.eval(t),
            PathSeg::Cubic(cubic) => cubic.eval(t),
        }
    }

    fn tangent(&self, t: f64) -> Vec2 {
        match *self {
            PathSeg::Line(line) => line.tangent(t),
            PathSeg::Quad(quad) => quad.tangent(t),
            PathSeg::Cubic(cubic) => cubic.tangent(t),
        }
    }

    fn split(&self, t: f64) -> (PathSeg, PathSeg) {
        match *self {
            PathSeg::Line(line) => {
                let (a, b) = line.split(t);
                (PathSeg::Line(a), PathSeg::Line(b))
            }
            PathSeg::Quad(quad) => {
                let (a, b) = quad.split(t);
                (PathSeg::Quad(a), PathSeg::Quad(b))
            }
            PathSeg::Cubic(cubic) => {
                let (a, b) = cubic.split(t);
                (PathSeg::Cubic(a), PathSeg::Cubic(b))
            }
        }
    }

    fn subsegment(&self, range: Range<f64>) -> PathSeg {
        match *self {
            PathSeg::Line(line) => PathSeg::Line(line.subsegment(range)),
            PathSeg::Quad(quad) => PathSeg::Quad(quad.subsegment(range)),
            PathSeg::Cubic(cubic) => PathSeg::Cubic(cubic.subsegment(range)),
        }
    }

    fn start(&self) -> Point {
        match *self {
            PathSeg::Line(line) => line.p0,
            PathSeg::Quad(quad) => quad.p0,
            PathSeg::Cubic(cubic) => cubic.p0,
        }
    }

    fn end(&self) -> Point {
        match *self {
            PathSeg::Line(line) => line.p1,
            PathSeg::Quad(quad) => quad.p2,
            PathSeg::Cubic(cubic) => cubic.p3,
        }
    }
}

impl ParamCurveExtrema for PathSeg {
    fn extrema(&self) -> ArrayVec<f64, MAX_EXTREMA> {
        match *self {
            PathSeg::Line(line) => line.extrema(),
            PathSeg::Quad(quad) => quad.extrema(),
            PathSeg::Cubic(cubic) => cubic.extrema(),
        }
    }
}

impl From<Line> for PathSeg {
    fn from(line: Line) -> PathSeg {
        PathSeg::Line(line)
    }
}

impl From<QuadBez> for PathSeg {
    fn from(quad: QuadBez) -> PathSeg {
        PathSeg::Quad(quad)
    }
}

impl From<CubicBez> for PathSeg {
    fn from(cubic: CubicBez) -> PathSeg {
        PathSeg::Cubic(cubic)
    }
}

impl Mul<PathEl> for Affine {
    type Output = PathEl;

    fn mul(self, other: PathEl) -> PathEl {
        match other {
            PathEl::MoveTo(p) => PathEl::MoveTo(self * p),
            PathEl::LineTo(p) => PathEl::LineTo(self * p),
            PathEl::QuadTo(p1, p2) => PathEl::QuadTo(self * p1, self * p2),
            PathEl::CurveTo(p1, p2, p3) => PathEl::CurveTo(self * p1, self * p2, self * p3),
            PathEl::ClosePath => PathEl::ClosePath,
        }
    }
}

impl Mul<PathSeg> for Affine {
    type Output = PathSeg;

    fn mul(self, other: PathSeg) -> PathSeg {
        match other {
            PathSeg::Line(line) => PathSeg::Line(Line::new(self * line.p0, self * line.p1)),
            PathSeg::Quad(quad) => PathSeg::Quad(self * quad),
            PathSeg::Cubic(cubic) => PathSeg::Cubic(self * cubic),
        }
    }
}

impl Mul<BezPath> for Affine {
    type Output = BezPath;

    fn mul(self, other: BezPath) -> BezPath {
        BezPath(other.0.iter().map(|&el| self * el).collect())
    }
}

impl<'a> Mul<&'a BezPath> for Affine {
    type Output = BezPath;

    fn mul(self, other: &BezPath) -> BezPath {
        BezPath(other.0.iter().map(|&el| self * el).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_triangle() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.quad_to((4.0, 3.0), (2.0, 3.0));
        path.close_path();
        path
    }

    #[test]
    fn segments_include_closing_line() {
        let path = closed_triangle();
        let segs: Vec<_> = path.segments().collect();
        assert_eq!(segs.len(), 3);
        assert_eq!(
            segs[2],
            PathSeg::Line(Line::new((2.0, 3.0), (0.0, 0.0)))
        );
    }

    #[test]
    #[should_panic(expected = "First element has to be a PathEl::MoveTo!")]
    fn segments_require_move_to() {
        let path = BezPath::from_vec(alloc::vec![PathEl::LineTo(Point::new(1.0, 1.0))]);
        let _ = path.segments().count();
    }

    #[test]
    fn get_seg() {
        let path = closed_triangle();
        assert_eq!(path.get_seg(0), None);
        assert_eq!(
            path.get_seg(1),
            Some(PathSeg::Line(Line::new((0.0, 0.0), (4.0, 0.0))))
        );
        assert_eq!(
            path.get_seg(3),
            Some(PathSeg::Line(Line::new((2.0, 3.0), (0.0, 0.0))))
        );
        assert_eq!(path.get_seg(4), None);
    }

    #[test]
    fn bounding_box() {
        let path = closed_triangle();
        let bbox = path.bounding_box().unwrap();
        assert_eq!((bbox.x0, bbox.y0, bbox.y1), (0.0, 0.0, 3.0));
        assert!(bbox.x1 > 3.0 && bbox.x1 <= 4.0);
        assert_eq!(BezPath::new().bounding_box(), None);
    }

    #[test]
    fn replay_round_trips() {
        let path = closed_triangle();
        let mut copy = BezPath::new();
        path.replay(&mut copy);
        assert_eq!(copy, path);
    }

    #[test]
    fn affine_mul() {
        let path = closed_triangle();
        let moved = Affine::translate((1.0, 2.0)) * &path;
        assert_eq!(moved.elements()[0], PathEl::MoveTo(Point::new(1.0, 2.0)));
        assert_eq!(moved.elements().len(), path.elements().len());
    }

    #[test]
    fn pathseg_dispatch() {
        let seg = PathSeg::Quad(QuadBez::new((0.0, 0.0), (1.0, 2.0), (2.0, 0.0)));
        assert_eq!(seg.start(), Point::new(0.0, 0.0));
        assert_eq!(seg.end(), Point::new(2.0, 0.0));
        let (a, b) = seg.split(0.4);
        let merged = a.merge(&b, 1e-9).unwrap();
        assert!(merged.eval(0.5).distance(seg.eval(0.5)) < 1e-9);
        assert_eq!(seg.reversed().start(), seg.end());
        let line = PathSeg::Line(Line::new((0.0, 0.0), (1.0, 0.0)));
        assert!(line.merge(&b, 100.0).is_none());
        assert!(seg.to_cubic().eval(0.3).distance(seg.eval(0.3)) < 1e-12);
    }
}
