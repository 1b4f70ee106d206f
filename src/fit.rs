// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fitting cubic Béziers to digitized points.
//!
//! This is an error driven least squares fit after Philip J. Schneider's
//! "An Algorithm for Automatically Fitting Digitized Curves" (Graphics Gems,
//! 1990). The input is cleaned of near duplicates and split at corners.
//! Each corner-free run is first tried as one cubic with free control
//! points, which reproduces points sampled from a single cubic. Failing
//! that, the run is lightly smoothed and fitted recursively: one cubic with
//! estimated end tangents is tried for the whole run, improved by Newton
//! reparameterization, and the run is split at its worst point if the cubic
//! still misses.
//!
//! ```
//! use vecpath::fit::{fit_points, FitOptions};
//! use vecpath::{PathEl, Point};
//!
//! let points: Vec<Point> = (0..=10).map(|i| Point::new(i as f64, 0.0)).collect();
//! let path = fit_points(&points, &FitOptions::default().with_tolerance(0.1));
//! assert_eq!(
//!     path.elements(),
//!     [PathEl::MoveTo(Point::ZERO), PathEl::LineTo(Point::new(10.0, 0.0))]
//! );
//! ```

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::{BezPath, CubicBez, Line, ParamCurve, PathBuilder, PathSink, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Options for [`fit_points`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitOptions {
    /// Maximum distance between an input point and the fitted curve.
    ///
    /// Also the scale of noise removal: points closer than twice this are
    /// merged.
    pub tolerance: f64,
    /// Minimum change of direction, in radians, for a point to be a corner.
    pub corner_angle: f64,
    /// How many Newton reparameterizations to try before splitting.
    pub max_reparameterizations: usize,
    /// Weight of the center point in the 3-point smoothing pass.
    ///
    /// 1.0 disables smoothing.
    pub smoothing_weight: f64,
    /// Recursion limit for splitting a run.
    pub max_depth: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            tolerance: 1.0,
            corner_angle: 77.0_f64.to_radians(),
            max_reparameterizations: 4,
            smoothing_weight: 0.8,
            max_depth: 32,
        }
    }
}

impl FitOptions {
    /// Set the error tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the corner angle, in radians.
    #[must_use]
    pub fn with_corner_angle(mut self, corner_angle: f64) -> Self {
        self.corner_angle = corner_angle;
        self
    }

    /// Set the number of reparameterization attempts.
    #[must_use]
    pub fn with_max_reparameterizations(mut self, n: usize) -> Self {
        self.max_reparameterizations = n;
        self
    }

    /// Set the smoothing weight of the center point.
    #[must_use]
    pub fn with_smoothing_weight(mut self, weight: f64) -> Self {
        self.smoothing_weight = weight;
        self
    }

    /// Set the recursion limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Fit a path to a sequence of points.
///
/// The result is a single open subpath starting at the first point, made
/// of lines and cubic Béziers. It is empty if `points` is.
pub fn fit_points(points: &[Point], options: &FitOptions) -> BezPath {
    let mut builder = PathBuilder::new(BezPath::new());
    fit_points_into(points, options, &mut builder);
    builder.finish()
}

/// Fit a path to a sequence of points, emitting into a builder.
///
/// Starts a new subpath with `move_to`; the caller finishes the session.
pub fn fit_points_into<S: PathSink>(
    points: &[Point],
    options: &FitOptions,
    builder: &mut PathBuilder<S>,
) {
    let tolerance = options.tolerance.max(0.0);
    let points = clean(points, tolerance);
    let Some(&first) = points.first() else {
        return;
    };
    builder.move_to(first);
    let corners = find_corners(&points, tolerance, options.corner_angle);
    tracing::debug!(
        points = points.len(),
        corners = corners.len().saturating_sub(2),
        "fitting points"
    );
    let mut fitter = Fitter {
        options,
        tol2: tolerance * tolerance,
        builder,
    };
    for run in corners.windows(2) {
        let run = &points[run[0]..=run[1]];
        if !fitter.fit_single(run) {
            fitter.fit_run(&smooth(run, options.smoothing_weight));
        }
    }
}

/// Drop points closer than `2 * tolerance` to the last kept one, or exact
/// duplicates for a zero tolerance. The last point always survives.
fn clean(points: &[Point], tolerance: f64) -> Vec<Point> {
    let min_dist2 = 4.0 * tolerance * tolerance;
    let mut result: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        match result.last() {
            Some(&last) if last == p || last.distance_squared(p) < min_dist2 => {}
            _ => result.push(p),
        }
    }
    if let (Some(&last_in), Some(&last_kept)) = (points.last(), result.last()) {
        if last_kept != last_in {
            if result.len() > 1 {
                // Move the final kept point onto the true end.
                let end = result.len() - 1;
                result[end] = last_in;
            } else {
                result.push(last_in);
            }
        }
    }
    result
}

/// Indices of the run boundaries: the first point, every corner, and the
/// last point.
///
/// A point is a corner when the direction from a preceding point to it and
/// from it to a following point turns by more than `corner_angle`. The
/// neighbors are the nearest points at least `tolerance` away, searching no
/// further back than the previous corner. Two corners within `tolerance` of
/// each other merge into the sharper one.
fn find_corners(points: &[Point], tolerance: f64, corner_angle: f64) -> Vec<usize> {
    let n = points.len();
    let mut corners = alloc::vec![0];
    // The turn at the last accepted corner, for merging.
    let mut last_turn = PI;
    for i in 1..n.saturating_sub(1) {
        let p = points[i];
        let floor = corners.last().copied().unwrap_or(0);
        let prev = (floor..i)
            .rev()
            .find(|&j| points[j].distance(p) >= tolerance)
            .unwrap_or(floor);
        let next = (i + 1..n)
            .find(|&k| points[k].distance(p) >= tolerance)
            .unwrap_or(n - 1);
        let incoming = p - points[prev];
        let outgoing = points[next] - p;
        if incoming.hypot2() == 0.0 || outgoing.hypot2() == 0.0 {
            continue;
        }
        let turn = incoming.cross(outgoing).atan2(incoming.dot(outgoing)).abs();
        if turn <= corner_angle {
            continue;
        }
        let last = corners.len() - 1;
        let mergeable = last > 0 && points[corners[last]].distance(p) < tolerance;
        if mergeable {
            if turn > last_turn {
                corners[last] = i;
                last_turn = turn;
            }
        } else {
            corners.push(i);
            last_turn = turn;
        }
    }
    if n > 1 {
        corners.push(n - 1);
    }
    corners
}

/// Weighted 3-point smoothing. The end points are kept.
fn smooth(points: &[Point], weight: f64) -> Vec<Point> {
    let side = 0.5 * (1.0 - weight);
    let mut result = points.to_vec();
    for i in 1..points.len().saturating_sub(1) {
        let v = weight * points[i].to_vec2()
            + side * (points[i - 1].to_vec2() + points[i + 1].to_vec2());
        result[i] = v.to_point();
    }
    result
}

struct Fitter<'a, S> {
    options: &'a FitOptions,
    tol2: f64,
    builder: &'a mut PathBuilder<S>,
}

impl<S: PathSink> Fitter<'_, S> {
    /// Try one cubic with free control points for a whole run.
    ///
    /// Parameters start out uniform, then proportional to chord length, and
    /// are refined by Newton steps. Emits the cubic and returns `true` if
    /// one meets the tolerance.
    fn fit_single(&mut self, points: &[Point]) -> bool {
        if points.len() < 4 {
            return false;
        }
        let starts = [
            uniform_parameterize(points.len()),
            chord_length_parameterize(points),
        ];
        for u in starts {
            if let Some(curve) = self.refine_free(points, u) {
                tracing::trace!(points = points.len(), "run fits one cubic");
                self.curve(&curve);
                return true;
            }
        }
        false
    }

    fn refine_free(&self, points: &[Point], mut u: Vec<f64>) -> Option<CubicBez> {
        let mut curve = generate_free_bezier(points, &u)?;
        for _ in 0..self.options.max_reparameterizations {
            if max_error(points, &curve, &u).0 <= self.tol2 {
                return Some(curve);
            }
            u = reparameterize(points, &u, &curve)?;
            curve = generate_free_bezier(points, &u)?;
        }
        (max_error(points, &curve, &u).0 <= self.tol2).then_some(curve)
    }

    fn fit_run(&mut self, points: &[Point]) {
        match points.len() {
            0 => {}
            1 | 2 => self.line(points[points.len() - 1]),
            n => {
                let tan1 = end_tangent(points[0], points[1], points[2]);
                let tan2 = end_tangent(points[n - 1], points[n - 2], points[n - 3]);
                self.fit_cubic(points, tan1, tan2, 0);
            }
        }
    }

    /// Fit one cubic with the given end tangents, splitting as needed.
    ///
    /// `tan1` points from the start into the run, `tan2` from the end back
    /// into it.
    fn fit_cubic(&mut self, points: &[Point], tan1: Vec2, tan2: Vec2, depth: usize) {
        let n = points.len();
        if n <= 2 {
            self.line(points[n - 1]);
            return;
        }
        let mut u = chord_length_parameterize(points);
        let mut curve = generate_bezier(points, &u, tan1, tan2);
        let (mut max_err, mut split) = max_error(points, &curve, &u);
        let mut tries = 0;
        while max_err > self.tol2 && tries < self.options.max_reparameterizations {
            let Some(u_prime) = reparameterize(points, &u, &curve) else {
                break;
            };
            u = u_prime;
            curve = generate_bezier(points, &u, tan1, tan2);
            (max_err, split) = max_error(points, &curve, &u);
            tries += 1;
        }
        if max_err <= self.tol2 {
            self.curve(&curve);
            return;
        }
        if depth >= self.options.max_depth {
            tracing::debug!(depth, points = n, "curve fit depth limit, using lines");
            self.line(points[split]);
            self.line(points[n - 1]);
            return;
        }
        tracing::trace!(split, points = n, max_err, "splitting run");
        let center = center_tangent(points, split);
        self.fit_cubic(&points[..=split], tan1, center, depth + 1);
        self.fit_cubic(&points[split..], -center, tan2, depth + 1);
    }

    fn line(&mut self, p: Point) {
        if self.builder.last_point() != Some(p) {
            self.builder.line_to(p);
        }
    }

    /// Emit a cubic, or a line if its control points hug the chord.
    fn curve(&mut self, c: &CubicBez) {
        let chord = Line::new(c.p0, c.p3);
        let flat = chord.nearest(c.p1).1 <= self.tol2 && chord.nearest(c.p2).1 <= self.tol2;
        if flat {
            self.line(c.p3);
        } else {
            self.builder.curve_to(c.p1, c.p2, c.p3);
        }
    }
}

/// A unit vector, or zero for a zero input.
fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len == 0.0 {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// The direction at `p0` of the quadratic through `p0`, `p1` and `p2`, with
/// parameters proportional to chord length. Points from `p0` into the run.
///
/// Falls back to the chord towards `p1` when the points double back.
fn end_tangent(p0: Point, p1: Point, p2: Point) -> Vec2 {
    let chord = unit(p1 - p0);
    let s1 = p0.distance(p1);
    let s2 = s1 + p1.distance(p2);
    if !(s1 > 0.0 && s2 > s1) {
        return chord;
    }
    let w1 = s2 / (s1 * (s2 - s1));
    let w2 = s1 / (s2 * (s2 - s1));
    let d = unit(w1 * (p1 - p0) - w2 * (p2 - p0));
    if d.dot(chord) > 0.0 {
        d
    } else {
        chord
    }
}

/// The tangent at an interior split point, averaging the incoming and
/// outgoing chords. Points backward, like `tan2`.
fn center_tangent(points: &[Point], split: usize) -> Vec2 {
    let averaged = unit(points[split - 1] - points[split + 1]);
    if averaged != Vec2::ZERO {
        return averaged;
    }
    // A hairpin: the neighbors coincide, so use the normal of the chord.
    unit(points[split] - points[split - 1]).turn_90()
}

/// Evenly spaced parameters.
fn uniform_parameterize(n: usize) -> Vec<f64> {
    let last = (n - 1) as f64;
    (0..n).map(|i| i as f64 / last).collect()
}

/// Parameters proportional to cumulative chord length.
fn chord_length_parameterize(points: &[Point]) -> Vec<f64> {
    let mut u = Vec::with_capacity(points.len());
    let mut total = 0.0;
    u.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        u.push(total);
    }
    if total > 0.0 {
        for x in &mut u {
            *x /= total;
        }
    }
    u
}

/// Least squares cubic with fixed end points and end tangent directions.
///
/// Solves for the distances `alpha_1`, `alpha_2` of the control points
/// along the tangents. When the system is singular or a distance comes out
/// too small, falls back to the Wu/Barsky heuristic of a third of the chord.
fn generate_bezier(points: &[Point], u: &[f64], tan1: Vec2, tan2: Vec2) -> CubicBez {
    let first = points[0];
    let last = points[points.len() - 1];
    let (mut c00, mut c01, mut c11) = (0.0, 0.0, 0.0);
    let (mut x0, mut x1) = (0.0, 0.0);
    for (&p, &t) in points.iter().zip(u) {
        let mt = 1.0 - t;
        let b0 = mt * mt * mt;
        let b1 = 3.0 * t * mt * mt;
        let b2 = 3.0 * t * t * mt;
        let b3 = t * t * t;
        let a0 = tan1 * b1;
        let a1 = tan2 * b2;
        c00 += a0.dot(a0);
        c01 += a0.dot(a1);
        c11 += a1.dot(a1);
        let on_chord = (b0 + b1) * first.to_vec2() + (b2 + b3) * last.to_vec2();
        let tmp = p.to_vec2() - on_chord;
        x0 += a0.dot(tmp);
        x1 += a1.dot(tmp);
    }
    let det = c00 * c11 - c01 * c01;
    let (alpha1, alpha2) = if det == 0.0 {
        (0.0, 0.0)
    } else {
        ((x0 * c11 - x1 * c01) / det, (c00 * x1 - c01 * x0) / det)
    };
    let chord = first.distance(last);
    let epsilon = 1e-6 * chord;
    let (alpha1, alpha2) = if !(alpha1 >= epsilon && alpha2 >= epsilon) {
        (chord / 3.0, chord / 3.0)
    } else {
        (alpha1, alpha2)
    };
    CubicBez::new(first, first + tan1 * alpha1, last + tan2 * alpha2, last)
}

/// Least squares cubic with fixed end points and free inner control points.
///
/// Returns `None` when the parameters do not determine both control points.
fn generate_free_bezier(points: &[Point], u: &[f64]) -> Option<CubicBez> {
    let first = points[0].to_vec2();
    let last = points[points.len() - 1].to_vec2();
    let (mut c11, mut c12, mut c22) = (0.0, 0.0, 0.0);
    let (mut x1, mut x2) = (Vec2::ZERO, Vec2::ZERO);
    for (&p, &t) in points.iter().zip(u) {
        let mt = 1.0 - t;
        let b1 = 3.0 * t * mt * mt;
        let b2 = 3.0 * t * t * mt;
        let rest = p.to_vec2() - (mt * mt * mt) * first - (t * t * t) * last;
        c11 += b1 * b1;
        c12 += b1 * b2;
        c22 += b2 * b2;
        x1 = x1 + b1 * rest;
        x2 = x2 + b2 * rest;
    }
    let det = c11 * c22 - c12 * c12;
    if !(det > 1e-12 * c11 * c22) {
        return None;
    }
    let p1 = (c22 * x1 - c12 * x2) / det;
    let p2 = (c11 * x2 - c12 * x1) / det;
    Some(CubicBez::new(
        points[0],
        p1.to_point(),
        p2.to_point(),
        points[points.len() - 1],
    ))
}

/// Worst squared distance between a point and the curve at its parameter,
/// and the index of that point. Only interior points count.
fn max_error(points: &[Point], c: &CubicBez, u: &[f64]) -> (f64, usize) {
    let n = points.len();
    let mut max = 0.0;
    let mut split = n / 2;
    for i in 1..n - 1 {
        let d2 = c.eval(u[i]).distance_squared(points[i]);
        if d2 >= max {
            max = d2;
            split = i;
        }
    }
    (max, split)
}

/// One Newton-Raphson step towards each point's nearest curve parameter.
///
/// Returns `None` if the step would make the parameters non-monotonic.
fn reparameterize(points: &[Point], u: &[f64], c: &CubicBez) -> Option<Vec<f64>> {
    let deriv = c.deriv();
    let mut result = Vec::with_capacity(u.len());
    for (&p, &t) in points.iter().zip(u) {
        let d = c.eval(t) - p;
        let d1 = deriv.eval(t).to_vec2();
        let d2 = deriv.tangent(t);
        let denom = d1.dot(d1) + d.dot(d2);
        let next = if denom == 0.0 {
            t
        } else {
            (t - d.dot(d1) / denom).clamp(0.0, 1.0)
        };
        if result.last().is_some_and(|&prev| next <= prev) {
            return None;
        }
        result.push(next);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{clean, end_tangent, find_corners, fit_points, FitOptions};
    use crate::{CubicBez, ParamCurve, PathEl, Point, Vec2};

    fn end_points(els: &[PathEl]) -> Vec<Point> {
        els.iter().filter_map(PathEl::end_point).collect()
    }

    #[test]
    fn trivial_inputs() {
        let options = FitOptions::default();
        assert!(fit_points(&[], &options).is_empty());
        let one = fit_points(&[Point::new(1.0, 1.0)], &options);
        assert_eq!(one.elements(), [PathEl::MoveTo(Point::new(1.0, 1.0))]);
        let two = fit_points(&[Point::ZERO, Point::new(5.0, 0.0)], &options);
        assert_eq!(
            two.elements(),
            [
                PathEl::MoveTo(Point::ZERO),
                PathEl::LineTo(Point::new(5.0, 0.0))
            ]
        );
    }

    #[test]
    fn cleanup_collapses_near_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.5, 0.0),
        ];
        assert_eq!(
            clean(&points, 1.0),
            [Point::new(0.0, 0.0), Point::new(3.5, 0.0)]
        );
        assert_eq!(clean(&points, 0.0).len(), 4);
    }

    #[test]
    fn refits_a_sampled_cubic() {
        let source = CubicBez::new((0.0, 0.0), (30.0, 40.0), (70.0, 40.0), (100.0, 0.0));
        for (n, tolerance) in [(5, 0.5), (11, 0.1), (21, 0.1), (101, 0.1)] {
            let last = (n - 1) as f64;
            let points: Vec<Point> = (0..n).map(|i| source.eval(i as f64 / last)).collect();
            let path = fit_points(&points, &FitOptions::default().with_tolerance(tolerance));
            let els = path.elements();
            assert_eq!(els.len(), 2, "{n} samples: {els:?}");
            let PathEl::CurveTo(p1, p2, p3) = els[1] else {
                panic!("expected a cubic, got {els:?}");
            };
            assert_eq!(Some(&p3), points.last());
            assert!(p1.distance(source.p1) <= tolerance, "{n} samples: {p1:?}");
            assert!(p2.distance(source.p2) <= tolerance, "{n} samples: {p2:?}");
        }
    }

    #[test]
    fn end_tangent_uses_curvature() {
        // Three points 10 degrees apart on the unit circle, whose true
        // tangent at the first is vertical.
        let at = |deg: f64| {
            let a = deg.to_radians();
            Point::new(a.cos(), a.sin())
        };
        let t = end_tangent(at(0.0), at(10.0), at(20.0));
        assert!((t.hypot() - 1.0).abs() < 1e-12);
        assert!(t.x.abs() < 0.01, "{t:?}");
        // Collinear points give the chord direction.
        let straight = end_tangent(Point::ZERO, Point::new(1.0, 0.0), Point::new(3.0, 0.0));
        assert_eq!(straight, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn keeps_corners() {
        let mut points: Vec<Point> = (0..=10).map(|i| Point::new(i as f64, 0.0)).collect();
        points.extend((1..=10).map(|i| Point::new(10.0, i as f64)));
        let path = fit_points(&points, &FitOptions::default().with_tolerance(0.25));
        let els = path.elements();
        assert!(els.len() >= 3, "{els:?}");
        assert!(end_points(els).contains(&Point::new(10.0, 0.0)));
        assert_eq!(end_points(els).last(), Some(&Point::new(10.0, 10.0)));
        assert!(els[1..].iter().all(|el| matches!(el, PathEl::LineTo(_))));
    }

    #[test]
    fn nearby_corners_merge() {
        // Two sharp turns a fraction of the tolerance apart.
        let points = [
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.3),
            Point::new(5.0, 0.3),
            Point::new(0.0, 0.3),
        ];
        let corners = find_corners(&points, 1.0, 77.0_f64.to_radians());
        assert_eq!(corners.len(), 3, "{corners:?}");
    }

    #[test]
    fn noisy_input_terminates() {
        let mut rng = StdRng::seed_from_u64(42);
        let points: Vec<Point> = (0..200)
            .map(|i| {
                let x = i as f64;
                Point::new(x, (x * 0.1).sin() * 20.0 + rng.random_range(-2.0..2.0))
            })
            .collect();
        let path = fit_points(&points, &FitOptions::default());
        let last = path.elements().last().and_then(PathEl::end_point);
        assert_eq!(last, points.last().copied());
        assert!(path.elements().len() < points.len());
    }
}
