// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The path construction protocol.
//!
//! Drawing commands flow into a [`PathBuilder`], which validates their order,
//! tracks the current point, and expands the composite commands (arcs and
//! smooth curves) into primitives before handing them to a [`PathSink`].
//! Sinks only ever see `move_to`, `line_to`, `quad_to`, `curve_to`,
//! `close_path` and `path_done`, so every sink handles arcs identically.

use alloc::vec::Vec;

use crate::{
    arc_to_cubics, Affine, ArcConversion, CubicBez, Line, ParamCurveExtrema, PathEl, PathSeg,
    Point, QuadBez, Rect,
};

/// A consumer of primitive drawing commands.
///
/// Implementors can rely on the commands being well ordered when they are
/// driven by a [`PathBuilder`]: every subpath starts with `move_to`.
pub trait PathSink {
    /// Start a new subpath at `p`.
    fn move_to(&mut self, p: Point);

    /// Draw a line to `p`.
    fn line_to(&mut self, p: Point);

    /// Draw a quadratic Bézier with control point `p1` ending at `p2`.
    fn quad_to(&mut self, p1: Point, p2: Point);

    /// Draw a cubic Bézier with control points `p1`, `p2` ending at `p3`.
    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point);

    /// Close the current subpath.
    fn close_path(&mut self);

    /// The path is complete; buffered output may be flushed.
    fn path_done(&mut self) {}
}

impl<S: PathSink + ?Sized> PathSink for &mut S {
    fn move_to(&mut self, p: Point) {
        (**self).move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        (**self).line_to(p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        (**self).quad_to(p1, p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        (**self).curve_to(p1, p2, p3);
    }

    fn close_path(&mut self) {
        (**self).close_path();
    }

    fn path_done(&mut self) {
        (**self).path_done();
    }
}

/// Which kind of curve produced the last control point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LastCurve {
    None,
    Quad,
    Cubic,
}

/// Cursor state of one builder session.
///
/// `subpath_start` is `None` until the first `move_to`; any other command
/// in that state is a contract violation.
#[derive(Clone, Copy, Debug)]
struct BuilderState {
    subpath_start: Option<Point>,
    last_point: Point,
    last_control_point: Point,
    last_curve: LastCurve,
    /// Set after `close_path`: the next drawing command first reopens a
    /// subpath at the closed subpath's start.
    needs_move: bool,
}

impl BuilderState {
    const EMPTY: BuilderState = BuilderState {
        subpath_start: None,
        last_point: Point::ZERO,
        last_control_point: Point::ZERO,
        last_curve: LastCurve::None,
        needs_move: false,
    };

    fn end_at(&mut self, p: Point, control: Point, curve: LastCurve) {
        self.last_point = p;
        self.last_control_point = control;
        self.last_curve = curve;
    }
}

/// A stateful path construction session driving a [`PathSink`].
///
/// ```
/// use vecpath::{BezPath, PathBuilder, Point};
///
/// let mut builder = PathBuilder::new(BezPath::new());
/// builder.move_to(Point::new(0.0, 0.0));
/// builder.line_to(Point::new(10.0, 0.0));
/// builder.arc_to(5.0, 5.0, 0.0, false, true, Point::new(10.0, 10.0));
/// builder.close_path();
/// let path = builder.finish();
/// assert_eq!(path.elements().len(), 5);
/// ```
#[derive(Debug)]
pub struct PathBuilder<S> {
    sink: S,
    state: BuilderState,
}

impl<S: PathSink> PathBuilder<S> {
    /// Start a session emitting into `sink`.
    pub fn new(sink: S) -> Self {
        PathBuilder {
            sink,
            state: BuilderState::EMPTY,
        }
    }

    /// The current point, or `None` before the first `move_to`.
    pub fn last_point(&self) -> Option<Point> {
        self.state.subpath_start.map(|_| self.state.last_point)
    }

    /// The incoming control point of the current point.
    ///
    /// This equals the current point unless the last command was a curve.
    pub fn last_control_point(&self) -> Option<Point> {
        self.state
            .subpath_start
            .map(|_| self.state.last_control_point)
    }

    /// The sink commands are emitted into.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable access to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Start a new subpath. Legal in any state.
    pub fn move_to(&mut self, p: Point) {
        self.sink.move_to(p);
        self.state.subpath_start = Some(p);
        self.state.needs_move = false;
        self.state.end_at(p, p, LastCurve::None);
    }

    /// Draw a line to `p`.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn line_to(&mut self, p: Point) {
        self.begin_segment("line_to");
        self.sink.line_to(p);
        self.state.end_at(p, p, LastCurve::None);
    }

    /// Draw a quadratic Bézier.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn quad_to(&mut self, p1: Point, p2: Point) {
        self.begin_segment("quad_to");
        self.sink.quad_to(p1, p2);
        self.state.end_at(p2, p1, LastCurve::Quad);
    }

    /// Draw a cubic Bézier.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.begin_segment("curve_to");
        self.sink.curve_to(p1, p2, p3);
        self.state.end_at(p3, p2, LastCurve::Cubic);
    }

    /// Draw a cubic Bézier whose first control point is the reflection of
    /// the previous cubic's second control point through the current point.
    ///
    /// If the previous command was not a cubic, the first control point is
    /// the current point.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn smooth_curve_to(&mut self, p2: Point, p3: Point) {
        let p1 = self.reflected_control("smooth_curve_to", LastCurve::Cubic);
        self.curve_to(p1, p2, p3);
    }

    /// Draw a quadratic Bézier whose control point is the reflection of the
    /// previous quadratic's control point through the current point.
    ///
    /// If the previous command was not a quadratic, the control point is the
    /// current point.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn smooth_quad_to(&mut self, p2: Point) {
        let p1 = self.reflected_control("smooth_quad_to", LastCurve::Quad);
        self.quad_to(p1, p2);
    }

    /// Draw an elliptical arc from the current point to `p`.
    ///
    /// The arc is expanded into cubic Béziers, or a line for degenerate
    /// arcs, see [`arc_to_cubics`].
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_rotation_degrees: f64,
        large_arc: bool,
        sweep: bool,
        p: Point,
    ) {
        self.require_open("arc_to");
        let from = self.state.last_point;
        match arc_to_cubics(from, rx, ry, x_rotation_degrees, p, large_arc, sweep) {
            ArcConversion::Line(line) => self.line_to(line.p1),
            ArcConversion::Cubics(cubics) => {
                for c in cubics {
                    self.curve_to(c.p1, c.p2, c.p3);
                }
                // Arcs never provide a control point to reflect.
                self.state.end_at(p, p, LastCurve::None);
            }
        }
    }

    /// Close the current subpath.
    ///
    /// # Panics
    ///
    /// If no `move_to` has been issued in this session.
    #[track_caller]
    pub fn close_path(&mut self) {
        self.begin_segment("close_path");
        self.sink.close_path();
        let start = self.state.subpath_start.unwrap_or(self.state.last_point);
        self.state.end_at(start, start, LastCurve::None);
        self.state.needs_move = true;
    }

    /// Replay a single path element.
    #[track_caller]
    pub fn push(&mut self, el: PathEl) {
        match el {
            PathEl::MoveTo(p) => self.move_to(p),
            PathEl::LineTo(p) => self.line_to(p),
            PathEl::QuadTo(p1, p2) => self.quad_to(p1, p2),
            PathEl::CurveTo(p1, p2, p3) => self.curve_to(p1, p2, p3),
            PathEl::ClosePath => self.close_path(),
        }
    }

    /// End the session. The cursor state is discarded; a new session may
    /// begin with `move_to`.
    pub fn path_done(&mut self) {
        self.sink.path_done();
        self.state = BuilderState::EMPTY;
    }

    /// Signal `path_done` and return the sink.
    pub fn finish(mut self) -> S {
        self.path_done();
        self.sink
    }

    #[track_caller]
    fn require_open(&self, command: &str) {
        if self.state.subpath_start.is_none() {
            panic!("{command} called before move_to: a path must begin with move_to");
        }
    }

    /// Check the precondition and reopen a closed subpath if needed.
    #[track_caller]
    fn begin_segment(&mut self, command: &str) {
        self.require_open(command);
        if self.state.needs_move {
            let p = self.state.last_point;
            self.sink.move_to(p);
            self.state.subpath_start = Some(p);
            self.state.needs_move = false;
        }
    }

    #[track_caller]
    fn reflected_control(&self, command: &str, kind: LastCurve) -> Point {
        self.require_open(command);
        let last = self.state.last_point;
        if self.state.last_curve == kind {
            (2.0 * last.to_vec2() - self.state.last_control_point.to_vec2()).to_point()
        } else {
            last
        }
    }
}

/// A sink accumulating the tight bounding box of everything drawn.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundingBox {
    bbox: Option<Rect>,
    start: Point,
    last: Point,
}

impl BoundingBox {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The bounding box, or `None` if nothing has been drawn.
    pub fn rect(&self) -> Option<Rect> {
        self.bbox
    }

    fn add(&mut self, r: Rect) {
        self.bbox = Some(match self.bbox {
            Some(b) => b.union(r),
            None => r,
        });
    }
}

impl PathSink for BoundingBox {
    fn move_to(&mut self, p: Point) {
        self.add(Rect::from_points(p, p));
        self.start = p;
        self.last = p;
    }

    fn line_to(&mut self, p: Point) {
        self.add(Rect::from_points(self.last, p));
        self.last = p;
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.add(QuadBez::new(self.last, p1, p2).bounding_box());
        self.last = p2;
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.add(CubicBez::new(self.last, p1, p2, p3).bounding_box());
        self.last = p3;
    }

    fn close_path(&mut self) {
        self.last = self.start;
    }
}

/// A sink applying an affine transform to every point before forwarding.
#[derive(Clone, Debug)]
pub struct Transformed<S> {
    affine: Affine,
    inner: S,
}

impl<S: PathSink> Transformed<S> {
    /// Wrap `inner`, transforming by `affine`.
    pub fn new(affine: Affine, inner: S) -> Self {
        Transformed { affine, inner }
    }

    /// Unwrap the downstream sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: PathSink> PathSink for Transformed<S> {
    fn move_to(&mut self, p: Point) {
        self.inner.move_to(self.affine * p);
    }

    fn line_to(&mut self, p: Point) {
        self.inner.line_to(self.affine * p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.inner.quad_to(self.affine * p1, self.affine * p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        let a = self.affine;
        self.inner.curve_to(a * p1, a * p2, a * p3);
    }

    fn close_path(&mut self) {
        self.inner.close_path();
    }

    fn path_done(&mut self) {
        self.inner.path_done();
    }
}

/// The segments of the current subpath, for sinks that transform whole
/// subpaths at once.
#[derive(Clone, Debug, Default)]
pub(crate) struct SubpathSegments {
    pub(crate) start: Point,
    pub(crate) current: Point,
    pub(crate) segs: Vec<PathSeg>,
}

impl SubpathSegments {
    pub(crate) fn move_to(&mut self, p: Point) {
        self.start = p;
        self.current = p;
        self.segs.clear();
    }

    pub(crate) fn push(&mut self, seg: PathSeg) {
        self.current = match seg {
            PathSeg::Line(l) => l.p1,
            PathSeg::Quad(q) => q.p2,
            PathSeg::Cubic(c) => c.p3,
        };
        self.segs.push(seg);
    }

    pub(crate) fn line_to(&mut self, p: Point) {
        self.push(PathSeg::Line(Line::new(self.current, p)));
    }

    pub(crate) fn quad_to(&mut self, p1: Point, p2: Point) {
        self.push(PathSeg::Quad(QuadBez::new(self.current, p1, p2)));
    }

    pub(crate) fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.push(PathSeg::Cubic(CubicBez::new(self.current, p1, p2, p3)));
    }

    /// Add the closing line, if the subpath does not already end at its
    /// start.
    pub(crate) fn close(&mut self) {
        if self.current != self.start {
            self.line_to(self.start);
        }
    }

    /// Take the segments, leaving the cursor at the subpath start so that
    /// drawing can continue after a close.
    pub(crate) fn take(&mut self) -> Vec<PathSeg> {
        self.current = self.start;
        core::mem::take(&mut self.segs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BezPath;

    #[test]
    #[should_panic(expected = "line_to called before move_to")]
    fn line_to_before_move_to() {
        let mut b = PathBuilder::new(BezPath::new());
        b.line_to(Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "arc_to called before move_to")]
    fn arc_to_before_move_to() {
        let mut b = PathBuilder::new(BezPath::new());
        b.arc_to(1.0, 1.0, 0.0, false, false, Point::new(1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "close_path called before move_to")]
    fn line_to_after_path_done() {
        let mut b = PathBuilder::new(BezPath::new());
        b.move_to(Point::new(0.0, 0.0));
        b.path_done();
        b.close_path();
    }

    #[test]
    fn smooth_curve_reflects() {
        let mut b = PathBuilder::new(BezPath::new());
        b.move_to(Point::new(0.0, 0.0));
        b.curve_to(Point::new(0.0, 1.0), Point::new(1.0, 2.0), Point::new(2.0, 2.0));
        assert_eq!(b.last_control_point(), Some(Point::new(1.0, 2.0)));
        b.smooth_curve_to(Point::new(4.0, 1.0), Point::new(4.0, 0.0));
        let path = b.finish();
        assert_eq!(
            path.elements()[2],
            PathEl::CurveTo(Point::new(3.0, 2.0), Point::new(4.0, 1.0), Point::new(4.0, 0.0))
        );
    }

    #[test]
    fn smooth_after_line_uses_current_point() {
        let mut b = PathBuilder::new(BezPath::new());
        b.move_to(Point::new(0.0, 0.0));
        b.line_to(Point::new(5.0, 0.0));
        assert_eq!(b.last_control_point(), Some(Point::new(5.0, 0.0)));
        b.smooth_quad_to(Point::new(10.0, 5.0));
        b.smooth_quad_to(Point::new(15.0, 0.0));
        let path = b.finish();
        assert_eq!(
            path.elements()[2],
            PathEl::QuadTo(Point::new(5.0, 0.0), Point::new(10.0, 5.0))
        );
        assert_eq!(
            path.elements()[3],
            PathEl::QuadTo(Point::new(15.0, 10.0), Point::new(15.0, 0.0))
        );
    }

    #[test]
    fn accessors_track_state() {
        let mut b = PathBuilder::new(BezPath::new());
        assert_eq!(b.last_point(), None);
        b.move_to(Point::new(1.0, 1.0));
        b.line_to(Point::new(3.0, 1.0));
        assert_eq!(b.last_point(), Some(Point::new(3.0, 1.0)));
        b.close_path();
        assert_eq!(b.last_point(), Some(Point::new(1.0, 1.0)));
        b.path_done();
        assert_eq!(b.last_point(), None);
    }

    #[test]
    fn drawing_after_close_reopens_subpath() {
        let mut b = PathBuilder::new(BezPath::new());
        b.move_to(Point::new(1.0, 1.0));
        b.line_to(Point::new(3.0, 1.0));
        b.close_path();
        b.line_to(Point::new(1.0, 5.0));
        let path = b.finish();
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(1.0, 1.0)),
                PathEl::LineTo(Point::new(3.0, 1.0)),
                PathEl::ClosePath,
                PathEl::MoveTo(Point::new(1.0, 1.0)),
                PathEl::LineTo(Point::new(1.0, 5.0)),
            ]
        );
    }

    #[test]
    fn arc_expands_to_cubics() {
        let mut b = PathBuilder::new(BezPath::new());
        b.move_to(Point::new(0.0, 0.0));
        b.arc_to(5.0, 5.0, 0.0, false, true, Point::new(10.0, 0.0));
        assert_eq!(b.last_point(), Some(Point::new(10.0, 0.0)));
        // Degenerate arc becomes a line.
        b.arc_to(0.0, 5.0, 0.0, false, true, Point::new(20.0, 0.0));
        let path = b.finish();
        let els = path.elements();
        assert_eq!(els.len(), 4);
        assert!(matches!(els[1], PathEl::CurveTo(..)));
        assert!(matches!(els[2], PathEl::CurveTo(_, _, p) if p == Point::new(10.0, 0.0)));
        assert_eq!(els[3], PathEl::LineTo(Point::new(20.0, 0.0)));
    }

    #[test]
    fn bounding_box_is_tight() {
        let mut b = PathBuilder::new(BoundingBox::new());
        b.move_to(Point::new(0.0, 0.0));
        b.quad_to(Point::new(1.0, 2.0), Point::new(2.0, 0.0));
        let bbox = b.finish().rect().unwrap();
        assert_eq!(bbox.x0, 0.0);
        assert_eq!(bbox.x1, 2.0);
        assert!((bbox.y1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn transformed_sink() {
        let mut path = BezPath::new();
        {
            let mut b = PathBuilder::new(Transformed::new(
                Affine::translate((10.0, 0.0)),
                &mut path,
            ));
            b.move_to(Point::new(0.0, 0.0));
            b.line_to(Point::new(1.0, 1.0));
            b.path_done();
        }
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(10.0, 0.0)),
                PathEl::LineTo(Point::new(11.0, 1.0)),
            ]
        );
    }
}
