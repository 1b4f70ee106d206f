// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trimming the ends of open subpaths.
//!
//! [`Cut`] removes the part of each open subpath within a radius of its
//! first point and within another radius of its last point, typically to
//! make room for arrow heads or node shapes. The boundary is found by
//! intersecting the segments with a circle, so curves are cut exactly on
//! the circle.

use alloc::vec::Vec;

use crate::builder::SubpathSegments;
use crate::intersect::{intersect, Geometry};
use crate::{BezPath, Circle, ParamCurve, PathSeg, PathSink, Point};

/// Options for [`Cut`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutOptions {
    /// Radius around the first point to remove.
    pub start_radius: f64,
    /// Radius around the last point to remove.
    pub end_radius: f64,
}

impl CutOptions {
    /// Cut both ends.
    pub fn new(start_radius: f64, end_radius: f64) -> Self {
        CutOptions {
            start_radius,
            end_radius,
        }
    }
}

/// A sink filter cutting the ends of open subpaths.
///
/// Closed subpaths have no ends and pass through unchanged. A subpath that
/// lies entirely within the cut is dropped.
#[derive(Debug)]
pub struct Cut<S> {
    inner: S,
    options: CutOptions,
    subpath: SubpathSegments,
}

impl<S: PathSink> Cut<S> {
    /// Wrap `inner`.
    pub fn new(inner: S, options: CutOptions) -> Self {
        Cut {
            inner,
            options,
            subpath: SubpathSegments::default(),
        }
    }

    /// Unwrap the downstream sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn flush_open(&mut self) {
        let segs = self.subpath.take();
        let (Some(first), Some(last)) = (segs.first(), segs.last()) else {
            return;
        };
        let (start, end) = (first.start(), last.end());
        let mut segs = cut_start(segs, start, self.options.start_radius);
        segs.reverse();
        let mut segs = cut_start(
            segs.iter().map(PathSeg::reversed).collect(),
            end,
            self.options.end_radius,
        );
        segs.reverse();
        let Some(first) = segs.first() else {
            tracing::debug!("subpath removed entirely by cut");
            return;
        };
        self.inner.move_to(first.reversed().start());
        for seg in &segs {
            seg.reversed().emit(&mut self.inner);
        }
    }
}

impl<S: PathSink> PathSink for Cut<S> {
    fn move_to(&mut self, p: Point) {
        self.flush_open();
        self.subpath.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        self.subpath.line_to(p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.subpath.quad_to(p1, p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.subpath.curve_to(p1, p2, p3);
    }

    fn close_path(&mut self) {
        let segs = self.subpath.take();
        if let Some(first) = segs.first() {
            self.inner.move_to(first.start());
            for seg in &segs {
                seg.emit(&mut self.inner);
            }
        } else {
            self.inner.move_to(self.subpath.start);
        }
        self.inner.close_path();
    }

    fn path_done(&mut self) {
        self.flush_open();
        self.inner.path_done();
    }
}

/// Cut the ends of every open subpath of a path.
pub fn cut_path(path: &BezPath, options: &CutOptions) -> BezPath {
    let mut cut = Cut::new(BezPath::new(), *options);
    path.replay(&mut cut);
    cut.into_inner()
}

/// Drop the segments inside the circle around `center`, and trim the first
/// one leaving it at its last exit from the circle.
fn cut_start(segs: Vec<PathSeg>, center: Point, radius: f64) -> Vec<PathSeg> {
    if !(radius > 0.0) {
        return segs;
    }
    let circle = Geometry::Circle(Circle::new(center, radius));
    let r2 = radius * radius;
    let mut iter = segs.into_iter();
    let mut result = Vec::new();
    for seg in iter.by_ref() {
        if seg.end().distance_squared(center) < r2 {
            continue;
        }
        let exit = intersect(&seg.into(), &circle)
            .points()
            .iter()
            .map(|p| p.t1)
            .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))));
        result.push(match exit {
            Some(t) if t < 1.0 => seg.subsegment(t..1.0),
            _ => seg,
        });
        break;
    }
    result.extend(iter);
    result
}

#[cfg(test)]
mod tests {
    use super::{cut_path, CutOptions};
    use crate::{BezPath, CubicBez, ParamCurve, PathEl, Point};

    fn assert_near(p: Point, q: Point) {
        assert!(p.distance(q) < 1e-9, "{p:?} != {q:?}");
    }

    #[test]
    fn cut_line_both_ends() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let cut = cut_path(&path, &CutOptions::new(2.0, 3.0));
        let els = cut.elements();
        assert_eq!(els.len(), 2);
        assert_near(els[0].end_point().unwrap(), Point::new(2.0, 0.0));
        assert_near(els[1].end_point().unwrap(), Point::new(7.0, 0.0));
    }

    #[test]
    fn short_segments_are_dropped() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 0.5));
        let cut = cut_path(&path, &CutOptions::new(2.0, 1.0));
        let els = cut.elements();
        assert_eq!(els.len(), 2, "{els:?}");
        assert_near(els[0].end_point().unwrap(), Point::new(2.0, 0.0));
        // The end circle reaches back across the corner.
        let end = els[1].end_point().unwrap();
        assert_near(end, Point::new(10.0 - 0.75_f64.sqrt(), 0.0));
    }

    #[test]
    fn curve_is_cut_on_the_circle() {
        let c = CubicBez::new((0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0));
        let mut path = BezPath::new();
        path.move_to(c.p0);
        path.curve_to(c.p1, c.p2, c.p3);
        let cut = cut_path(&path, &CutOptions::new(3.0, 0.0));
        let start = cut.elements()[0].end_point().unwrap();
        assert!((start.distance(c.p0) - 3.0).abs() < 1e-6);
        assert_near(cut.elements()[1].end_point().unwrap(), c.p3);
    }

    #[test]
    fn whole_path_inside_cut() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        assert!(cut_path(&path, &CutOptions::new(2.0, 0.0)).is_empty());
    }

    #[test]
    fn closed_subpaths_pass_through() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.close_path();
        let cut = cut_path(&path, &CutOptions::new(2.0, 2.0));
        assert_eq!(cut.elements(), path.elements());
        assert_eq!(cut.elements().last(), Some(&PathEl::ClosePath));
    }
}
