// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stamping marker shapes along a path.
//!
//! [`Markers`] forwards the path it receives unchanged and, at the end of
//! each subpath, appends copies of the configured marker shapes. A marker is
//! drawn in a local frame where the origin sits on the path and the positive
//! x axis follows the path direction.

use alloc::vec::Vec;

use crate::builder::SubpathSegments;
use crate::{Affine, BezPath, ParamCurve, PathSeg, PathSink, Point, Transformed, Vec2};

/// The shapes to place on a path.
#[derive(Clone, Debug, Default)]
pub struct MarkerShapes {
    /// Placed at the first point, along the outgoing direction.
    pub start: Option<BezPath>,
    /// Placed at every joint between two segments, along the bisector of the
    /// incoming and outgoing directions.
    pub mid: Option<BezPath>,
    /// Placed at the last point, along the incoming direction.
    pub end: Option<BezPath>,
}

impl MarkerShapes {
    /// Set the start marker.
    #[must_use]
    pub fn with_start(mut self, shape: BezPath) -> Self {
        self.start = Some(shape);
        self
    }

    /// Set the joint marker.
    #[must_use]
    pub fn with_mid(mut self, shape: BezPath) -> Self {
        self.mid = Some(shape);
        self
    }

    /// Set the end marker.
    #[must_use]
    pub fn with_end(mut self, shape: BezPath) -> Self {
        self.end = Some(shape);
        self
    }
}

/// A sink filter adding markers to every subpath.
///
/// Markers for a subpath are emitted when the next subpath starts or the
/// path is done. A subpath without segments gets no markers.
#[derive(Debug)]
pub struct Markers<S> {
    inner: S,
    shapes: MarkerShapes,
    subpath: SubpathSegments,
}

impl<S: PathSink> Markers<S> {
    /// Wrap `inner`.
    pub fn new(inner: S, shapes: MarkerShapes) -> Self {
        Markers {
            inner,
            shapes,
            subpath: SubpathSegments::default(),
        }
    }

    /// Unwrap the downstream sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn flush(&mut self) {
        let segs = self.subpath.take();
        let (Some(first), Some(last)) = (segs.first(), segs.last()) else {
            return;
        };
        let mut placements = Vec::new();
        if let Some(shape) = &self.shapes.start {
            placements.push((shape, first.start(), start_direction(first)));
        }
        if let Some(shape) = &self.shapes.mid {
            for pair in segs.windows(2) {
                let incoming = end_direction(&pair[0]).normalize();
                let outgoing = start_direction(&pair[1]).normalize();
                let bisector = incoming + outgoing;
                // A full reversal has no bisector; follow the incoming side.
                let dir = if bisector.hypot2() < 1e-12 {
                    incoming
                } else {
                    bisector
                };
                placements.push((shape, pair[0].end(), dir));
            }
        }
        if let Some(shape) = &self.shapes.end {
            placements.push((shape, last.end(), end_direction(last)));
        }
        tracing::trace!(count = placements.len(), "placing markers");
        for (shape, p, dir) in placements {
            let affine = Affine::translate(p.to_vec2()) * Affine::rotate(dir.atan2());
            let mut sink = Transformed::new(affine, &mut self.inner);
            for el in shape.elements() {
                el.emit(&mut sink);
            }
        }
    }
}

impl<S: PathSink> PathSink for Markers<S> {
    fn move_to(&mut self, p: Point) {
        self.flush();
        self.subpath.move_to(p);
        self.inner.move_to(p);
    }

    fn line_to(&mut self, p: Point) {
        self.subpath.line_to(p);
        self.inner.line_to(p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.subpath.quad_to(p1, p2);
        self.inner.quad_to(p1, p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.subpath.curve_to(p1, p2, p3);
        self.inner.curve_to(p1, p2, p3);
    }

    fn close_path(&mut self) {
        self.subpath.close();
        self.inner.close_path();
    }

    fn path_done(&mut self) {
        self.flush();
        self.inner.path_done();
    }
}

/// Add markers to a path.
pub fn place_markers(path: &BezPath, shapes: &MarkerShapes) -> BezPath {
    let mut markers = Markers::new(BezPath::new(), shapes.clone());
    path.replay(&mut markers);
    markers.into_inner()
}

/// The direction leaving the start of a segment, skipping control points
/// that coincide with it.
fn start_direction(seg: &PathSeg) -> Vec2 {
    let points = seg.points();
    let p0 = points[0];
    points[1..]
        .iter()
        .find(|p| **p != p0)
        .map_or(Vec2::new(1.0, 0.0), |p| *p - p0)
}

/// The direction arriving at the end of a segment.
fn end_direction(seg: &PathSeg) -> Vec2 {
    -start_direction(&seg.reversed())
}
