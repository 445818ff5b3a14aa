//! Core geometry types.
//!
//! Coordinates are plain `f64` pairs in long/lat degrees (x = longitude,
//! y = latitude). Rings are closed: the first vertex is repeated at the end,
//! so consecutive pairs of vertices are exactly the ring's edges.

use crate::error::{GeometryError, GeometryResult};

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A line segment defined by two endpoints.
///
/// The same type doubles as an infinite line (through both endpoints) and as
/// a ray (from the first endpoint through the second), depending on which
/// primitive in [`crate::intersect`] it is handed to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A polygon with an exterior ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    /// Exterior ring, closed.
    pub outer: Vec<Point>,
    /// Interior rings (holes), closed.
    pub holes: Vec<Vec<Point>>,
}

/// Axis-aligned bounding box, anchored at its top-left corner (min x, max y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub top_left: Point,
    pub width: f64,
    pub height: f64,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl Line {
    #[inline]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn between(start: Point, end: Point) -> Self {
        Self::new(start.x, start.y, end.x, end.y)
    }

    #[inline]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[inline]
    pub fn dx(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn dy(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Both endpoints coincide.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.x1 == self.x2 && self.y1 == self.y2
    }

    /// Point at parameter `t` (0 = start, 1 = end).
    #[inline]
    pub fn at(&self, t: f64) -> Point {
        Point::new(self.x1 + t * self.dx(), self.y1 + t * self.dy())
    }
}

impl Polygon {
    /// Create a simple polygon with no holes.
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer, holes: Vec::new() }
    }

    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self { outer, holes }
    }

    /// Bounding box of the exterior ring.
    pub fn bounding_box(&self) -> GeometryResult<BoundingBox> {
        BoundingBox::of_ring(&self.outer)
    }
}

impl BoundingBox {
    /// Bounding box of a ring.
    ///
    /// Fails on an empty ring or a non-finite coordinate.
    pub fn of_ring(ring: &[Point]) -> GeometryResult<Self> {
        if ring.is_empty() {
            return Err(GeometryError::InvalidInput("ring must not be empty".into()));
        }
        if let Some(bad) = ring.iter().find(|p| !p.is_finite()) {
            return Err(GeometryError::InvalidInput(format!(
                "invalid point in ring: [{}, {}]",
                bad.x, bad.y
            )));
        }

        let min_x = ring.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = ring.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = ring.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = ring.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            top_left: Point::new(min_x, max_y),
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.top_left.x
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.top_left.x + self.width
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.top_left.y - self.height
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.top_left.y
    }

    /// Inclusive containment.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }
}

/// Edges of a closed ring, in vertex order.
pub fn edges(ring: &[Point]) -> impl Iterator<Item = Line> + '_ {
    ring.windows(2).map(|pair| Line::between(pair[0], pair[1]))
}

/// Closed square ring with the given top-left corner, clockwise from the
/// top-left vertex.
pub fn square_ring(top_left: Point, size: f64) -> Vec<Point> {
    let Point { x, y } = top_left;
    vec![
        top_left,
        Point::new(x + size, y),
        Point::new(x + size, y - size),
        Point::new(x, y - size),
        top_left,
    ]
}

/// If `ring` is an axis-aligned rectangle, return its bounding box.
///
/// Accepts any closed ring of four distinct corners (plus the closing vertex)
/// whose edges alternate between horizontal and vertical.
pub fn as_rectangle(ring: &[Point]) -> Option<BoundingBox> {
    if ring.len() != 5 || ring[0] != ring[4] {
        return None;
    }
    let axis_aligned = edges(ring).all(|e| (e.dx() == 0.0) != (e.dy() == 0.0));
    let alternating = edges(ring)
        .zip(edges(ring).skip(1))
        .all(|(a, b)| (a.dx() == 0.0) != (b.dx() == 0.0));
    if !axis_aligned || !alternating {
        return None;
    }
    BoundingBox::of_ring(ring).ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[[f64; 2]]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn ring_bbox() {
        let bbox = BoundingBox::of_ring(&ring(&[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 5.0], [0.0, 0.0]]))
            .unwrap();
        assert_eq!(bbox.top_left, Point::new(0.0, 5.0));
        assert_eq!(bbox.width, 10.0);
        assert_eq!(bbox.height, 5.0);
        assert_eq!(bbox.min_y(), 0.0);
        assert_eq!(bbox.max_x(), 10.0);
    }

    #[test]
    fn bbox_of_negative_coordinates() {
        let bbox = BoundingBox::of_ring(&ring(&[[-3.0, -1.0], [-1.0, -4.0], [-2.0, 2.0], [-3.0, -1.0]]))
            .unwrap();
        assert_eq!(bbox.top_left, Point::new(-3.0, 2.0));
        assert_eq!(bbox.width, 2.0);
        assert_eq!(bbox.height, 6.0);
    }

    #[test]
    fn empty_ring_bbox_fails() {
        assert!(matches!(
            BoundingBox::of_ring(&[]),
            Err(GeometryError::InvalidInput(_))
        ));
    }

    #[test]
    fn non_finite_ring_bbox_fails() {
        let err = BoundingBox::of_ring(&ring(&[[0.0, 0.0], [f64::NAN, 1.0]])).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidInput(_)));
    }

    #[test]
    fn bbox_containment_is_inclusive() {
        let bbox = BoundingBox { top_left: Point::new(0.0, 4.0), width: 4.0, height: 4.0 };
        assert!(bbox.contains(Point::new(0.0, 0.0)));
        assert!(bbox.contains(Point::new(4.0, 2.0)));
        assert!(!bbox.contains(Point::new(4.1, 2.0)));
    }

    #[test]
    fn closed_ring_edges() {
        let square = square_ring(Point::new(0.0, 2.0), 2.0);
        let all: Vec<Line> = edges(&square).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], Line::new(0.0, 2.0, 2.0, 2.0));
        assert_eq!(all[3].end(), Point::new(0.0, 2.0));
    }

    #[test]
    fn line_parameter() {
        let line = Line::new(0.0, 0.0, 4.0, 2.0);
        assert_eq!(line.at(0.5), Point::new(2.0, 1.0));
        assert!(!line.is_degenerate());
        assert!(Line::new(1.0, 1.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn detects_rectangles() {
        let rect = ring(&[[178.0, 0.0], [184.0, 0.0], [184.0, 2.0], [178.0, 2.0], [178.0, 0.0]]);
        let bbox = as_rectangle(&rect).unwrap();
        assert_eq!(bbox.top_left, Point::new(178.0, 2.0));
        assert_eq!(bbox.width, 6.0);

        let square = square_ring(Point::new(-2.0, 4.0), 2.0);
        assert!(as_rectangle(&square).is_some());

        let hexagon = ring(&[[0.0, 0.0], [1.0, 1.0], [1.0, 2.0], [0.0, 3.0], [-1.0, 2.0], [-1.0, 1.0], [0.0, 0.0]]);
        assert!(as_rectangle(&hexagon).is_none());

        let diamond = ring(&[[0.0, 1.0], [1.0, 0.0], [0.0, -1.0], [-1.0, 0.0], [0.0, 1.0]]);
        assert!(as_rectangle(&diamond).is_none());
    }
}
