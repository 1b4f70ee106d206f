// Copyright 2024 the Vecpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle.

use crate::{Line, Point};

/// An axis-aligned rectangle.
///
/// Used both as a shape for intersection queries and as the result of
/// bounding box computations.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate (left edge).
    pub x0: f64,
    /// The minimum y coordinate (top edge in y-down spaces).
    pub y0: f64,
    /// The maximum x coordinate (right edge).
    pub x1: f64,
    /// The maximum y coordinate (bottom edge in y-down spaces).
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect {
            x0: p0.x.min(p1.x),
            y0: p0.y.min(p1.y),
            x1: p0.x.max(p1.x),
            y1: p0.y.max(p1.y),
        }
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1))
    }

    /// The smallest rectangle enclosing two rectangles.
    #[inline]
    #[must_use]
    pub fn union(&self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Compute the union with one point.
    ///
    /// A succession of `union_pt` operations on a series of points,
    /// starting from a zero-area rectangle at the first point, yields their
    /// enclosing rectangle.
    #[inline]
    #[must_use]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Expand a rectangle by a constant amount in both directions.
    #[inline]
    #[must_use]
    pub fn inflate(&self, width: f64, height: f64) -> Rect {
        Rect {
            x0: self.x0 - width,
            y0: self.y0 - height,
            x1: self.x1 + width,
            y1: self.y1 + height,
        }
    }

    /// Whether the point lies inside or on the boundary.
    #[inline]
    pub fn contains(&self, pt: Point) -> bool {
        pt.x >= self.x0 && pt.x <= self.x1 && pt.y >= self.y0 && pt.y <= self.y1
    }

    /// Whether two rectangles share any point, boundaries included.
    #[inline]
    pub fn overlaps(&self, other: Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// The four edges, in order, starting at `(x0, y0)` and moving along
    /// the x axis first.
    pub fn edges(&self) -> [Line; 4] {
        let p0 = Point::new(self.x0, self.y0);
        let p1 = Point::new(self.x1, self.y0);
        let p2 = Point::new(self.x1, self.y1);
        let p3 = Point::new(self.x0, self.y1);
        [
            Line::new(p0, p1),
            Line::new(p1, p2),
            Line::new(p2, p3),
            Line::new(p3, p0),
        ]
    }
}

impl From<(Point, Point)> for Rect {
    fn from(points: (Point, Point)) -> Rect {
        Rect::from_points(points.0, points.1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Point, Rect};

    #[test]
    fn from_points_normalizes() {
        let r = Rect::from_points((10.0, 2.0), (4.0, 8.0));
        assert_eq!(r, Rect::new(4.0, 2.0, 10.0, 8.0));
        assert_eq!(r.width(), 6.0);
        assert_eq!(r.height(), 6.0);
        assert_eq!(r.center(), Point::new(7.0, 5.0));
    }

    #[test]
    fn union_and_contains() {
        let r = Rect::new(0.0, 0.0, 1.0, 1.0).union_pt(Point::new(3.0, -1.0));
        assert_eq!(r, Rect::new(0.0, -1.0, 3.0, 1.0));
        assert!(r.contains(Point::new(3.0, 0.0)));
        assert!(!r.contains(Point::new(3.1, 0.0)));
        assert!(r.overlaps(Rect::new(3.0, 1.0, 4.0, 2.0)));
        assert!(!r.overlaps(Rect::new(3.5, 1.0, 4.0, 2.0)));
    }

    #[test]
    fn edges_are_closed() {
        let edges = Rect::new(0.0, 0.0, 2.0, 1.0).edges();
        for i in 0..4 {
            assert_eq!(edges[i].p1, edges[(i + 1) % 4].p0);
        }
    }
}
