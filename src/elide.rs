// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dropping zero-length segments.

use crate::{PathSink, Point};

/// A sink filter dropping segments that do not move the pen.
///
/// A segment is dropped when its end point and every control point lie
/// within `epsilon` of the current point, so a curve that leaves and comes
/// back is kept. `move_to`, `close_path` and `path_done` always pass through.
///
/// ```
/// use vecpath::elide::ElideEmpty;
/// use vecpath::{BezPath, PathSink, Point};
///
/// let mut sink = ElideEmpty::new(BezPath::new(), 1e-9);
/// sink.move_to(Point::new(0.0, 0.0));
/// sink.line_to(Point::new(0.0, 0.0));
/// sink.line_to(Point::new(5.0, 0.0));
/// assert_eq!(sink.into_inner().elements().len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct ElideEmpty<S> {
    inner: S,
    epsilon: f64,
    start: Point,
    current: Point,
    dropped: usize,
}

impl<S: PathSink> ElideEmpty<S> {
    /// Wrap `inner`, treating points closer than `epsilon` as equal.
    pub fn new(inner: S, epsilon: f64) -> Self {
        ElideEmpty {
            inner,
            epsilon,
            start: Point::ZERO,
            current: Point::ZERO,
            dropped: 0,
        }
    }

    /// Unwrap the downstream sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn is_empty(&mut self, points: &[Point]) -> bool {
        let eps2 = self.epsilon * self.epsilon;
        let empty = points
            .iter()
            .all(|p| p.distance_squared(self.current) <= eps2);
        if empty {
            self.dropped += 1;
        }
        empty
    }
}

impl<S: PathSink> PathSink for ElideEmpty<S> {
    fn move_to(&mut self, p: Point) {
        self.start = p;
        self.current = p;
        self.inner.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        if !self.is_empty(&[p]) {
            self.current = p;
            self.inner.line_to(p);
        }
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        if !self.is_empty(&[p1, p2]) {
            self.current = p2;
            self.inner.quad_to(p1, p2);
        }
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        if !self.is_empty(&[p1, p2, p3]) {
            self.current = p3;
            self.inner.curve_to(p1, p2, p3);
        }
    }

    fn close_path(&mut self) {
        self.current = self.start;
        self.inner.close_path();
    }

    fn path_done(&mut self) {
        if self.dropped > 0 {
            tracing::debug!(dropped = self.dropped, "elided empty segments");
            self.dropped = 0;
        }
        self.inner.path_done();
    }
}

#[cfg(test)]
mod tests {
    use super::ElideEmpty;
    use crate::{BezPath, PathBuilder, PathEl, Point};

    fn elide(epsilon: f64, draw: impl FnOnce(&mut PathBuilder<ElideEmpty<BezPath>>)) -> BezPath {
        let mut builder = PathBuilder::new(ElideEmpty::new(BezPath::new(), epsilon));
        draw(&mut builder);
        builder.finish().into_inner()
    }

    #[test]
    fn drops_short_lines() {
        let path = elide(0.1, |b| {
            b.move_to(Point::new(0.0, 0.0));
            b.line_to(Point::new(0.05, 0.0));
            b.line_to(Point::new(1.0, 0.0));
        });
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(1.0, 0.0)),
            ]
        );
    }

    #[test]
    fn dropped_segments_do_not_drift() {
        // Each step is short, but they add up to a real segment.
        let path = elide(0.1, |b| {
            b.move_to(Point::new(0.0, 0.0));
            for i in 1..=4 {
                b.line_to(Point::new(0.06 * i as f64, 0.0));
            }
        });
        assert_eq!(path.elements().len(), 3);
        assert_eq!(path.elements()[1], PathEl::LineTo(Point::new(0.12, 0.0)));
    }

    #[test]
    fn loop_curve_is_kept() {
        let path = elide(1e-9, |b| {
            b.move_to(Point::new(0.0, 0.0));
            b.curve_to(Point::new(5.0, 5.0), Point::new(-5.0, 5.0), Point::new(0.0, 0.0));
            b.quad_to(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        });
        assert_eq!(path.elements().len(), 2);
    }

    #[test]
    fn close_and_move_pass_through() {
        let path = elide(1.0, |b| {
            b.move_to(Point::new(0.0, 0.0));
            b.close_path();
            b.move_to(Point::new(0.5, 0.0));
        });
        assert_eq!(path.elements().len(), 3);
    }
}
