//! 2D geometry primitives
//!
//! Points, axis-aligned bounds and the handful of polygon predicates the
//! layout pipeline relies on. Coordinates are canonical inches.

use serde::{Deserialize, Serialize};

/// Tolerance for floating point comparisons on inch coordinates
pub const EPSILON: f64 = 1e-9;

/// A point in a panel's local plane or on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotate a quarter turn counter-clockwise about the origin
    pub fn rotate_quarter(self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point2,
    pub max: Point2,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: Point2::new(min_x, min_y),
            max: Point2::new(max_x, max_y),
        }
    }

    /// Bounds of a point set, `None` when the set is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Grow the box by `amount` on every edge
    pub fn inflate(&self, amount: f64) -> Self {
        Bounds::new(
            self.min.x - amount,
            self.min.y - amount,
            self.max.x + amount,
            self.max.y + amount,
        )
    }

    /// True when the interiors intersect. Boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Bounds, tolerance: f64) -> bool {
        self.min.x < other.max.x - tolerance
            && other.min.x < self.max.x - tolerance
            && self.min.y < other.max.y - tolerance
            && other.min.y < self.max.y - tolerance
    }

    /// True when `other` lies entirely inside this box
    pub fn contains(&self, other: &Bounds, tolerance: f64) -> bool {
        other.min.x >= self.min.x - tolerance
            && other.min.y >= self.min.y - tolerance
            && other.max.x <= self.max.x + tolerance
            && other.max.y <= self.max.y + tolerance
    }
}

/// Signed area of a closed polygon (positive when counter-clockwise)
pub fn signed_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Drop consecutive duplicates and a repeated closing vertex
pub fn dedup_loop(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.distance_to(p) <= tolerance) {
            continue;
        }
        out.push(*p);
    }
    while out.len() > 1 && out[0].distance_to(&out[out.len() - 1]) <= tolerance {
        out.pop();
    }
    out
}

fn orientation(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn within_segment_box(a: &Point2, b: &Point2, p: &Point2) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// Segment intersection test including touching and collinear overlap
pub fn segments_intersect(p1: &Point2, p2: &Point2, q1: &Point2, q2: &Point2) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    let straddles = |a: f64, b: f64| (a > EPSILON && b < -EPSILON) || (a < -EPSILON && b > EPSILON);
    if straddles(d1, d2) && straddles(d3, d4) {
        return true;
    }

    (d1.abs() <= EPSILON && within_segment_box(q1, q2, p1))
        || (d2.abs() <= EPSILON && within_segment_box(q1, q2, p2))
        || (d3.abs() <= EPSILON && within_segment_box(p1, p2, q1))
        || (d4.abs() <= EPSILON && within_segment_box(p1, p2, q2))
}

/// True when no two non-adjacent edges of the closed polygon touch
pub fn is_simple(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        let a1 = &points[i];
        let a2 = &points[(i + 1) % n];
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            if adjacent {
                continue;
            }
            let b1 = &points[j];
            let b2 = &points[(j + 1) % n];
            if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }
    true
}

/// Even-odd point containment test
pub fn point_in_polygon(point: &Point2, polygon: &[Point2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Edges of a closed polygon as vertex pairs, closing edge last
fn edges(points: &[Point2]) -> impl Iterator<Item = (Point2, Point2)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

/// True when `inner` lies strictly inside `outer`
///
/// Every vertex of `inner` must be inside `outer` and no edge of `inner` may
/// touch an edge of `outer`. Vertex containment alone misses a loop that
/// cuts across a notch in a concave outline.
pub fn polygon_contains(outer: &[Point2], inner: &[Point2]) -> bool {
    if !inner.iter().all(|p| point_in_polygon(p, outer)) {
        return false;
    }
    !edges(inner).any(|(a1, a2)| {
        edges(outer).any(|(b1, b2)| segments_intersect(&a1, &a2, &b1, &b2))
    })
}
