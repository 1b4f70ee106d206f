// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset curves.
//!
//! [`Offset`] is a sink filter that shifts every subpath sideways by a fixed
//! distance. Lines move along their normal; curves are offset through their
//! control polygons (Tiller and Hanson) after subdividing until each piece
//! turns gently. Gaps at outer corners are filled with a miter or a bevel,
//! and the loops that form at inner corners are clipped away by
//! intersecting every pair of offset pieces.
//!
//! ```
//! use vecpath::offset::{offset_path, OffsetOptions};
//! use vecpath::{BezPath, PathEl, Point};
//!
//! let mut path = BezPath::new();
//! path.move_to((0.0, 0.0));
//! path.line_to((10.0, 0.0));
//! let shifted = offset_path(&path, &OffsetOptions::new(2.0));
//! assert_eq!(shifted.elements()[1], PathEl::LineTo(Point::new(10.0, 2.0)));
//! ```

use alloc::vec::Vec;

use arrayvec::ArrayVec;

use crate::builder::SubpathSegments;
use crate::intersect::{intersect, IntersectionPoint};
use crate::{BezPath, CubicBez, Line, ParamCurve, PathSeg, PathSink, Point, QuadBez, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Curves are subdivided until the control polygon of each piece turns by
/// less than this many radians.
const MAX_PIECE_TURN: f64 = 0.25;

/// Subdivision depth limit for offsetting a single curve.
const MAX_SUBDIVISION: usize = 8;

/// Intersections this close to the shared end points of two pieces are
/// not loops.
const END_EPSILON: f64 = 1e-9;

/// Options for [`Offset`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetOptions {
    /// The offset distance.
    ///
    /// Positive distances move towards [`Vec2::turn_90`] of the direction of
    /// travel, which is the left side in a y-up frame.
    pub distance: f64,
    /// Limit on the ratio of miter length to offset distance, beyond which
    /// outer corners are beveled.
    pub miter_limit: f64,
}

impl OffsetOptions {
    /// Options for the given distance, with a miter limit of 4.
    pub fn new(distance: f64) -> Self {
        OffsetOptions {
            distance,
            miter_limit: 4.0,
        }
    }

    /// Set the miter limit.
    #[must_use]
    pub fn with_miter_limit(mut self, miter_limit: f64) -> Self {
        self.miter_limit = miter_limit;
        self
    }
}

/// A sink filter emitting the offset of each subpath.
#[derive(Debug)]
pub struct Offset<S> {
    inner: S,
    options: OffsetOptions,
    subpath: SubpathSegments,
}

impl<S: PathSink> Offset<S> {
    /// Wrap `inner`.
    pub fn new(inner: S, options: OffsetOptions) -> Self {
        Offset {
            inner,
            options,
            subpath: SubpathSegments::default(),
        }
    }

    /// Unwrap the downstream sink.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn flush(&mut self, closed: bool) {
        let segs = self.subpath.take();
        let pieces = offset_subpath(&segs, closed, &self.options);
        let Some(first) = pieces.first() else {
            return;
        };
        self.inner.move_to(first.start());
        for piece in &pieces {
            piece.emit(&mut self.inner);
        }
        if closed {
            self.inner.close_path();
        }
    }
}

impl<S: PathSink> PathSink for Offset<S> {
    fn move_to(&mut self, p: Point) {
        self.flush(false);
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
        self.subpath.close();
        self.flush(true);
    }

    fn path_done(&mut self) {
        self.flush(false);
        self.inner.path_done();
    }
}

/// Offset a whole path.
pub fn offset_path(path: &BezPath, options: &OffsetOptions) -> BezPath {
    let mut offset = Offset::new(BezPath::new(), *options);
    path.replay(&mut offset);
    offset.into_inner()
}

/// Offset the segments of one subpath into a connected chain of pieces.
fn offset_subpath(segs: &[PathSeg], closed: bool, options: &OffsetOptions) -> Vec<PathSeg> {
    let d = options.distance;
    let mut segs: Vec<PathSeg> = segs
        .iter()
        .copied()
        .filter(|s| start_tangent(s).is_some())
        .collect();
    if segs.is_empty() {
        return Vec::new();
    }
    if closed {
        // Start in the middle of the first segment, so that every corner,
        // including the one at the subpath start, is an interior join.
        let (head, tail) = segs[0].subdivide();
        segs[0] = tail;
        segs.push(head);
    }
    let mut pieces: Vec<PathSeg> = Vec::new();
    let mut prev: Option<(PathSeg, Point)> = None;
    for seg in &segs {
        let mut offset = Vec::new();
        offset_seg(seg, d, &mut offset);
        let (Some(first), Some(&last)) = (offset.first(), offset.last()) else {
            continue;
        };
        if let Some((prev_seg, prev_end)) = prev {
            join(&prev_seg, seg, prev_end, first.start(), options, &mut pieces);
        }
        pieces.extend(offset);
        prev = Some((*seg, last.end()));
    }
    clip_loops(&mut pieces);
    pieces
}

/// Connect the offset of `a` ending at `from` to the offset of `b`
/// starting at `to`, both around the shared vertex.
fn join(
    a: &PathSeg,
    b: &PathSeg,
    from: Point,
    to: Point,
    options: &OffsetOptions,
    out: &mut Vec<PathSeg>,
) {
    if from.is_near(to) {
        return;
    }
    let (Some(t0), Some(t1)) = (end_tangent(a), start_tangent(b)) else {
        out.push(Line::new(from, to).into());
        return;
    };
    let outer = t0.cross(t1) * options.distance < 0.0;
    if outer {
        let vertex = a.end();
        let miter = Line::new(from, from + t0).crossing_point(Line::new(to, to + t1));
        if let Some(m) = miter {
            let limit = options.miter_limit * options.distance.abs();
            if m.distance(vertex) <= limit {
                out.push(Line::new(from, m).into());
                out.push(Line::new(m, to).into());
                return;
            }
        }
    }
    // A bevel, or at an inner corner a connector that the loop clipping
    // removes again.
    out.push(Line::new(from, to).into());
}

/// Remove the loops formed where non-adjacent pieces cross.
///
/// For each piece, the first later piece it crosses is found, and the
/// pieces between are replaced by the two clipped halves. This is
/// quadratic in the number of pieces.
fn clip_loops(pieces: &mut Vec<PathSeg>) {
    let mut i = 0;
    while i < pieces.len() {
        let mut clipped = false;
        for j in i + 2..pieces.len() {
            let result = intersect(&pieces[i].into(), &pieces[j].into());
            let hit = result
                .points()
                .iter()
                .find(|p| is_crossing(p))
                .copied();
            if let Some(hit) = hit {
                tracing::trace!(i, j, "clipping offset loop");
                let head = pieces[i].subsegment(0.0..hit.t1);
                let tail = pieces[j].subsegment(hit.t2..1.0);
                pieces.splice(i..=j, [head, tail]);
                clipped = true;
                break;
            }
        }
        if !clipped {
            i += 1;
        }
    }
}

fn is_crossing(p: &IntersectionPoint) -> bool {
    let at_start = |t: f64| t <= END_EPSILON;
    let at_end = |t: f64| t >= 1.0 - END_EPSILON;
    // The ends of a chain may touch where a closed subpath wraps around.
    let shared = (at_start(p.t1) && at_end(p.t2)) || (at_end(p.t1) && at_start(p.t2));
    !shared && p.t1.is_finite() && p.t2.is_finite()
}

/// The offset of a single segment, as one or more pieces.
fn offset_seg(seg: &PathSeg, d: f64, out: &mut Vec<PathSeg>) {
    match seg {
        PathSeg::Line(l) => {
            let n = d * unit(l.p1 - l.p0).turn_90();
            out.push(Line::new(l.p0 + n, l.p1 + n).into());
        }
        _ => offset_curve(seg, d, 0, out),
    }
}

fn offset_curve(seg: &PathSeg, d: f64, depth: usize, out: &mut Vec<PathSeg>) {
    let points = seg.points();
    if depth < MAX_SUBDIVISION && polygon_turn(&points) > MAX_PIECE_TURN {
        let (a, b) = seg.subdivide();
        offset_curve(&a, d, depth + 1, out);
        offset_curve(&b, d, depth + 1, out);
        return;
    }
    let shifted = offset_polygon(&points, d);
    out.push(match shifted.as_slice() {
        [p0, p1, p2] => QuadBez::new(*p0, *p1, *p2).into(),
        [p0, p1, p2, p3] => CubicBez::new(*p0, *p1, *p2, *p3).into(),
        _ => *seg,
    });
}

/// Total absolute turning of a control polygon, skipping zero-length legs.
fn polygon_turn(points: &[Point]) -> f64 {
    let legs: ArrayVec<Vec2, 3> = points
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|v| v.hypot2() > 0.0)
        .collect();
    legs.windows(2)
        .map(|w| w[0].cross(w[1]).atan2(w[0].dot(w[1])).abs())
        .sum()
}

/// Tiller-Hanson: offset each leg of the control polygon, and place the
/// interior control points where consecutive offset legs cross.
fn offset_polygon(points: &[Point], d: f64) -> ArrayVec<Point, 4> {
    let n = points.len();
    // Each leg's normal, borrowing a neighbor's for zero-length legs.
    let mut normals: ArrayVec<Option<Vec2>, 3> = points
        .windows(2)
        .map(|w| {
            let v = w[1] - w[0];
            (v.hypot2() > 0.0).then(|| d * unit(v).turn_90())
        })
        .collect();
    for i in 0..normals.len() {
        if normals[i].is_none() {
            normals[i] = normals[i + 1..]
                .iter()
                .chain(normals[..i].iter().rev())
                .find_map(|n| *n);
        }
    }
    let normal = |i: usize| normals[i].unwrap_or(Vec2::ZERO);
    let mut result = ArrayVec::new();
    result.push(points[0] + normal(0));
    for i in 1..n - 1 {
        let (na, nb) = (normal(i - 1), normal(i));
        let leg_a = Line::new(points[i - 1] + na, points[i] + na);
        let leg_b = Line::new(points[i] + nb, points[i + 1] + nb);
        let crossing = if leg_a.p0 == leg_a.p1 || leg_b.p0 == leg_b.p1 {
            None
        } else {
            leg_a.crossing_point(leg_b)
        };
        // Parallel legs: shift along the averaged normal.
        result.push(crossing.unwrap_or(points[i] + 0.5 * (na + nb)));
    }
    result.push(points[n - 1] + normal(n - 2));
    result
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// Direction of travel at the start, from the first distinct control point.
fn start_tangent(seg: &PathSeg) -> Option<Vec2> {
    let points = seg.points();
    points[1..]
        .iter()
        .map(|p| *p - points[0])
        .find(|v| v.hypot2() > 0.0)
}

/// Direction of travel at the end, from the last distinct control point.
fn end_tangent(seg: &PathSeg) -> Option<Vec2> {
    let points = seg.points();
    let end = points[points.len() - 1];
    points[..points.len() - 1]
        .iter()
        .rev()
        .map(|p| end - *p)
        .find(|v| v.hypot2() > 0.0)
}

#[cfg(test)]
mod tests {
    use super::{offset_path, OffsetOptions};
    use crate::{BezPath, CubicBez, ParamCurve, PathEl, Point, Rect};

    fn polyline(points: &[(f64, f64)]) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for &p in &points[1..] {
            path.line_to(p);
        }
        path
    }

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn outer_corner_miter_and_bevel() {
        let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, -10.0)]);
        let mitered = offset_path(&path, &OffsetOptions::new(1.0));
        assert_eq!(
            mitered.elements(),
            [
                PathEl::MoveTo(pt(0.0, 1.0)),
                PathEl::LineTo(pt(10.0, 1.0)),
                PathEl::LineTo(pt(11.0, 1.0)),
                PathEl::LineTo(pt(11.0, 0.0)),
                PathEl::LineTo(pt(11.0, -10.0)),
            ]
        );
        let beveled = offset_path(&path, &OffsetOptions::new(1.0).with_miter_limit(1.0));
        assert_eq!(beveled.elements()[2], PathEl::LineTo(pt(11.0, 0.0)));
        assert_eq!(beveled.elements().len(), 4);
    }

    #[test]
    fn inner_corner_is_clipped() {
        let path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let shifted = offset_path(&path, &OffsetOptions::new(1.0));
        let els = shifted.elements();
        assert_eq!(els.len(), 3, "{els:?}");
        assert_eq!(els[0], PathEl::MoveTo(pt(0.0, 1.0)));
        let corner = els[1].end_point().unwrap();
        assert!(corner.distance(pt(9.0, 1.0)) < 1e-9);
        assert_eq!(els[2].end_point(), Some(pt(9.0, 10.0)));
    }

    #[test]
    fn closed_square_shrinks() {
        let mut path = polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        path.close_path();
        let inset = offset_path(&path, &OffsetOptions::new(1.0));
        assert_eq!(inset.elements().last(), Some(&PathEl::ClosePath));
        let bbox = inset.bounding_box().unwrap();
        let expected = Rect::new(1.0, 1.0, 9.0, 9.0);
        assert!((bbox.x0 - expected.x0).abs() < 1e-9, "{bbox:?}");
        assert!((bbox.y0 - expected.y0).abs() < 1e-9, "{bbox:?}");
        assert!((bbox.x1 - expected.x1).abs() < 1e-9, "{bbox:?}");
        assert!((bbox.y1 - expected.y1).abs() < 1e-9, "{bbox:?}");
    }

    #[test]
    fn curve_keeps_distance() {
        let c = CubicBez::new((0.0, 0.0), (0.0, 50.0), (50.0, 100.0), (100.0, 100.0));
        let mut path = BezPath::new();
        path.move_to(c.p0);
        path.curve_to(c.p1, c.p2, c.p3);
        let shifted = offset_path(&path, &OffsetOptions::new(-5.0));
        for seg in shifted.segments() {
            for i in 0..=8 {
                let p = seg.eval(i as f64 / 8.0);
                // Distance to the source curve, by dense sampling.
                let d = (0..=400)
                    .map(|k| c.eval(k as f64 / 400.0).distance(p))
                    .fold(f64::INFINITY, f64::min);
                assert!((d - 5.0).abs() < 0.1, "{d}");
            }
        }
    }
}
