// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygons and rectangles, as sets of edges.
//!
//! The outlines are open edge sets rather than filled regions, so the only
//! statuses are `Intersection` and `NoIntersection`.

use alloc::vec::Vec;

use super::{intersect, Geometry, IntersectionPoint, Intersections};
use crate::{Line, Point};

/// The edges of a closed polygon, including the one back to the start.
///
/// Edge `i` starts at vertex `i`. Zero-length edges are kept so the
/// numbering holds; they are skipped when intersecting.
pub(super) fn polygon_edges(vertices: &[Point]) -> Vec<Line> {
    let n = vertices.len();
    if n < 2 {
        return Vec::new();
    }
    (0..n)
        .map(|i| Line::new(vertices[i], vertices[(i + 1) % n]))
        .collect()
}

/// Edges as the first shape: `t1` is the edge parameter and `segment` the
/// edge index. Points are ordered by edge, then along the edge.
pub(super) fn edges_first(edges: &[Line], other: &Geometry) -> Intersections {
    let points = tagged(edges, |edge| intersect(&Geometry::Line(*edge), other));
    Intersections::from_points(points)
}

/// Edges as the second shape: `t2` is the edge parameter and `segment` the
/// edge index.
pub(super) fn edges_second(first: &Geometry, edges: &[Line]) -> Intersections {
    let points = tagged(edges, |edge| intersect(first, &Geometry::Line(*edge)));
    Intersections::from_points_by_t1(points)
}

fn tagged(edges: &[Line], mut f: impl FnMut(&Line) -> Intersections) -> Vec<IntersectionPoint> {
    let mut points = Vec::new();
    for (ix, edge) in edges.iter().enumerate().filter(|(_, e)| e.p0 != e.p1) {
        points.extend(f(edge).into_points().into_iter().map(|mut p| {
            p.segment = ix;
            p
        }));
    }
    points
}

#[cfg(test)]
mod tests {
    use crate::intersect::{intersect, Geometry, IntersectionStatus};
    use crate::{Circle, Line, Point, Rect};

    #[test]
    fn line_through_rect() {
        let r = Geometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let l = Geometry::Line(Line::new((-5.0, 5.0), (15.0, 5.0)));
        let result = intersect(&l, &r);
        assert_eq!(result.points().len(), 2);
        assert!(result.points()[0].point.distance(Point::new(0.0, 5.0)) < 1e-12);
        assert!(result.points()[1].point.distance(Point::new(10.0, 5.0)) < 1e-12);
        assert!(result.points()[0].t1 < result.points()[1].t1);
    }

    #[test]
    fn polygon_first() {
        let triangle = Geometry::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(5.0, 10.0),
        ]);
        let c = Geometry::Circle(Circle::new((5.0, 0.0), 2.0));
        let result = intersect(&triangle, &c);
        // The base crosses the circle twice; the other edges miss it.
        assert_eq!(result.points().len(), 2);
        assert!(result.points().iter().all(|p| p.segment == 0));
    }

    #[test]
    fn edge_index_follows_vertices() {
        // A repeated vertex makes edge 1 empty; the hit is on edge 2.
        let polygon = Geometry::Polygon(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]);
        let l = Geometry::Line(Line::new((7.0, 5.0), (15.0, 5.0)));
        let result = intersect(&polygon, &l);
        assert_eq!(result.points().len(), 1);
        assert_eq!(result.points()[0].segment, 2);
        let swapped = intersect(&l, &polygon);
        assert_eq!(swapped.points()[0].segment, 2);
    }

    #[test]
    fn no_inside_status_for_edge_sets() {
        let r = Geometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let inner = Geometry::Line(Line::new((2.0, 2.0), (3.0, 3.0)));
        assert_eq!(intersect(&inner, &r).status(), IntersectionStatus::NoIntersection);
        let far = Geometry::Circle(Circle::new((50.0, 50.0), 1.0));
        assert_eq!(intersect(&r, &far).status(), IntersectionStatus::NoIntersection);
    }

    #[test]
    fn rect_rect() {
        let a = Geometry::Rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Geometry::Rect(Rect::new(5.0, 5.0, 15.0, 15.0));
        let result = intersect(&a, &b);
        assert_eq!(result.points().len(), 2);
    }
}
