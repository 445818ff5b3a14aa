//! Intersection primitives for grid-cell classification.
//!
//! This is the hot path of polygon tokenization: every candidate grid cell
//! is classified against the polygon's rings through [`rings_state`].
//!
//! Every derived quantity (slope, intersection coordinate, ray parameter) is
//! rounded with [`round5`] before it is compared, so that repeated calls on
//! the same logical input always classify the same way.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{GeometryError, GeometryResult};
use crate::geometry::{BoundingBox, Line, Point, Polygon, edges, square_ring};
use crate::precision::{round5, same};

/// Upper bound on ray perturbations in [`point_in_ring`].
pub const MAX_RAY_ATTEMPTS: usize = 1000;

/// Slope increment between two ray casts.
const RAY_SLOPE_INCREMENT: f64 = 0.001;

/// Points sampled along each edge by [`rings_state`] when the rings touch.
pub const SAMPLES_PER_EDGE: usize = 200;

const SAMPLE_SEED: u64 = 0x706f_6c79_746f_6b65;

/// Relative tolerance for the parallel test on cross products.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Position of a point relative to a segment or a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointState {
    Inside,
    Outside,
    /// On the boundary: a segment endpoint, or any point of a ring's edges.
    Tangent,
}

/// Relationship of a second segment to a first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentsState {
    /// Crossing at a point interior to both segments.
    Intersect,
    Disjoint,
    /// Touching at an endpoint of either segment.
    Tangent,
    /// Collinear, and the second segment lies within the first.
    Included,
    /// Collinear, sharing more than one point, not included.
    Overlap,
}

/// Relationship of a ray to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayState {
    Intersect,
    Disjoint,
    /// The ray passes exactly through a segment endpoint.
    Tangent,
    /// The ray runs along the segment.
    Overlap,
}

/// Position of a second ring relative to a first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingState {
    Inside,
    Outside,
    Intersect,
}

// ============================================================================
// POINTS AND LINES
// ============================================================================

/// Infinite line through a segment, in slope/intercept form.
#[derive(Debug, Clone, Copy)]
enum LineEq {
    Vertical { x: f64 },
    Sloped { slope: f64, intercept: f64 },
}

impl LineEq {
    fn of(line: &Line) -> GeometryResult<Self> {
        if line.is_degenerate() {
            return Err(GeometryError::InvalidInput(
                "start and end point of line must not be the same".into(),
            ));
        }
        if line.x1 == line.x2 {
            return Ok(LineEq::Vertical { x: line.x1 });
        }
        if line.y1 == line.y2 {
            return Ok(LineEq::Sloped { slope: 0.0, intercept: line.y1 });
        }
        let slope = (line.y2 - line.y1) / (line.x2 - line.x1);
        let intercept = (line.y1 * line.x2 - line.y2 * line.x1) / (line.x2 - line.x1);
        Ok(LineEq::Sloped { slope, intercept })
    }

    fn parallel_to(&self, other: &LineEq) -> bool {
        match (self, other) {
            (LineEq::Vertical { .. }, LineEq::Vertical { .. }) => true,
            (LineEq::Sloped { slope: a, .. }, LineEq::Sloped { slope: b, .. }) => same(*a, *b),
            _ => false,
        }
    }
}

/// Whether `p` lies on the infinite line through `line`.
pub fn point_on_line(p: Point, line: &Line) -> bool {
    let (a, b) = (line.start(), line.end());
    if (same(p.x, a.x) && same(p.y, a.y)) || (same(p.x, b.x) && same(p.y, b.y)) {
        return true;
    }
    if a.x == b.x {
        return same(p.x, a.x);
    }
    if a.y == b.y {
        return same(p.y, a.y);
    }
    same((a.x - p.x) * (b.y - p.y), (b.x - p.x) * (a.y - p.y))
}

/// Where a point already known to be on the segment's line falls along it.
///
/// Compares along the segment's dominant axis, on rounded coordinates.
fn position_on_segment(p: Point, segment: &Line) -> PointState {
    let (c, a, b) = if segment.dx().abs() >= segment.dy().abs() {
        (p.x, segment.x1, segment.x2)
    } else {
        (p.y, segment.y1, segment.y2)
    };
    let (c, lo, hi) = (round5(c), round5(a.min(b)), round5(a.max(b)));
    if c == lo || c == hi {
        PointState::Tangent
    } else if c > lo && c < hi {
        PointState::Inside
    } else {
        PointState::Outside
    }
}

/// Classify a point against a segment: on an endpoint (`Tangent`), strictly
/// between the endpoints (`Inside`) or anywhere else (`Outside`).
pub fn point_segment_state(p: Point, segment: &Line) -> PointState {
    if !point_on_line(p, segment) {
        return PointState::Outside;
    }
    if segment.is_degenerate() {
        return PointState::Tangent;
    }
    position_on_segment(p, segment)
}

/// Intersection of the infinite lines through `a` and `b`.
///
/// Fails with [`GeometryError::ParallelLines`] when the lines share a slope
/// and with [`GeometryError::InvalidInput`] for a zero-length line.
pub fn line_intersect(a: &Line, b: &Line) -> GeometryResult<Point> {
    let (ea, eb) = (LineEq::of(a)?, LineEq::of(b)?);
    if ea.parallel_to(&eb) {
        return Err(GeometryError::ParallelLines);
    }

    let (x, y) = match (ea, eb) {
        (LineEq::Vertical { x }, LineEq::Sloped { slope, intercept })
        | (LineEq::Sloped { slope, intercept }, LineEq::Vertical { x }) => {
            (x, slope * x + intercept)
        }
        (LineEq::Sloped { slope: m1, intercept: b1 }, LineEq::Sloped { slope: m2, intercept: b2 }) => {
            if m1 == 0.0 {
                ((b1 - b2) / m2, b1)
            } else if m2 == 0.0 {
                ((b2 - b1) / m1, b2)
            } else {
                let x = (b2 - b1) / (m1 - m2);
                (x, m1 * x + b1)
            }
        }
        (LineEq::Vertical { .. }, LineEq::Vertical { .. }) => {
            return Err(GeometryError::ParallelLines);
        }
    };

    Ok(Point::new(round5(x), round5(y)))
}

// ============================================================================
// SEGMENTS AND RAYS
// ============================================================================

/// State of segment `b` relative to segment `a`.
pub fn segments_state(a: &Line, b: &Line) -> GeometryResult<SegmentsState> {
    let (ea, eb) = (LineEq::of(a)?, LineEq::of(b)?);

    if ea.parallel_to(&eb) {
        if !point_on_line(b.start(), a) {
            return Ok(SegmentsState::Disjoint);
        }
        return Ok(collinear_state(a, b));
    }

    let p = line_intersect(a, b)?;
    let on_a = position_on_segment(p, a);
    let on_b = position_on_segment(p, b);
    Ok(match (on_a, on_b) {
        (PointState::Outside, _) | (_, PointState::Outside) => SegmentsState::Disjoint,
        (PointState::Tangent, _) | (_, PointState::Tangent) => SegmentsState::Tangent,
        (PointState::Inside, PointState::Inside) => SegmentsState::Intersect,
    })
}

/// Collinear segments, projected onto the dominant axis of `a`.
fn collinear_state(a: &Line, b: &Line) -> SegmentsState {
    let horizontal = a.dx().abs() >= a.dy().abs();
    let interval = |l: &Line| {
        let (p, q) = if horizontal { (l.x1, l.x2) } else { (l.y1, l.y2) };
        (round5(p.min(q)), round5(p.max(q)))
    };
    let (lo_a, hi_a) = interval(a);
    let (lo_b, hi_b) = interval(b);

    if hi_b < lo_a || lo_b > hi_a {
        SegmentsState::Disjoint
    } else if lo_b >= lo_a && hi_b <= hi_a {
        SegmentsState::Included
    } else if hi_b == lo_a || lo_b == hi_a {
        SegmentsState::Tangent
    } else {
        SegmentsState::Overlap
    }
}

#[inline]
fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// State of a ray (from `ray.start()` through `ray.end()`) against a segment.
pub fn ray_segment_state(ray: &Line, segment: &Line) -> GeometryResult<RayState> {
    if ray.is_degenerate() {
        return Err(GeometryError::InvalidInput("ray direction must not be zero".into()));
    }
    if segment.is_degenerate() {
        return Err(GeometryError::InvalidInput(
            "start and end point of line must not be the same".into(),
        ));
    }

    let (rx, ry) = (ray.dx(), ray.dy());
    let (sx, sy) = (segment.dx(), segment.dy());
    let (qx, qy) = (segment.x1 - ray.x1, segment.y1 - ray.y1);

    let denom = cross(rx, ry, sx, sy);
    let scale = rx.hypot(ry) * sx.hypot(sy);

    if denom.abs() <= PARALLEL_EPSILON * scale {
        let offset = cross(qx, qy, rx, ry);
        if offset.abs() > PARALLEL_EPSILON * rx.hypot(ry) * qx.hypot(qy) {
            return Ok(RayState::Disjoint);
        }
        // Collinear: project both endpoints onto the ray.
        let len2 = rx * rx + ry * ry;
        let t0 = (qx * rx + qy * ry) / len2;
        let t1 = ((segment.x2 - ray.x1) * rx + (segment.y2 - ray.y1) * ry) / len2;
        return Ok(if t0.max(t1) < 0.0 { RayState::Disjoint } else { RayState::Overlap });
    }

    let t_ray = round5(cross(qx, qy, sx, sy) / denom);
    let t_line = round5(cross(qx, qy, rx, ry) / denom);

    Ok(if t_ray <= 0.0 || !(0.0..=1.0).contains(&t_line) {
        RayState::Disjoint
    } else if t_line == 0.0 || t_line == 1.0 {
        RayState::Tangent
    } else {
        RayState::Intersect
    })
}

// ============================================================================
// POINT IN RING (Ray Casting Algorithm)
// ============================================================================

/// Classify a point against a closed ring.
///
/// Points on any edge are `Tangent`. Otherwise a ray is cast from the point
/// and its crossings counted; odd means inside. A ray that grazes a vertex or
/// runs along an edge is tilted and cast again.
pub fn point_in_ring(p: Point, ring: &[Point]) -> GeometryResult<PointState> {
    let bbox = BoundingBox::of_ring(ring)?;
    if !bbox.contains(p) {
        return Ok(PointState::Outside);
    }

    let ring_edges: Vec<Line> = edges(ring).filter(|e| !e.is_degenerate()).collect();
    if ring_edges
        .iter()
        .any(|edge| point_segment_state(p, edge) != PointState::Outside)
    {
        return Ok(PointState::Tangent);
    }

    let mut slope = 0.0;
    for attempt in 0..MAX_RAY_ATTEMPTS {
        let ray = Line::new(p.x, p.y, p.x + 1.0, p.y + slope);
        if let Some(crossings) = count_crossings(&ray, &ring_edges)? {
            return Ok(if crossings % 2 == 1 { PointState::Inside } else { PointState::Outside });
        }
        tracing::trace!(attempt, slope, x = p.x, y = p.y, "ray grazed ring, tilting");
        slope = round5(slope + RAY_SLOPE_INCREMENT);
    }

    Err(GeometryError::RayCastingDiverged(MAX_RAY_ATTEMPTS))
}

/// Crossing count, or `None` if the ray touches a vertex or runs along an edge.
fn count_crossings(ray: &Line, ring_edges: &[Line]) -> GeometryResult<Option<usize>> {
    let mut crossings = 0;
    for edge in ring_edges {
        match ray_segment_state(ray, edge)? {
            RayState::Intersect => crossings += 1,
            RayState::Disjoint => {}
            RayState::Tangent | RayState::Overlap => return Ok(None),
        }
    }
    Ok(Some(crossings))
}

// ============================================================================
// RING VS RING
// ============================================================================

/// Whether `inner` lies inside `outer`.
///
/// Any proper crossing between edges means `Intersect`. Rings that do not
/// touch at all are classified by one vertex of `inner`. Rings that touch are
/// classified by points sampled along `inner`'s edges (never its vertices,
/// which may sit on `outer`'s boundary): samples on both sides mean
/// `Intersect`, and samples that all fall on the boundary mean the rings
/// coincide, which counts as `Inside`.
pub fn rings_state(outer: &[Point], inner: &[Point]) -> GeometryResult<RingState> {
    let outer_edges: Vec<Line> = edges(outer).filter(|e| !e.is_degenerate()).collect();
    let inner_edges: Vec<Line> = edges(inner).filter(|e| !e.is_degenerate()).collect();
    if outer_edges.is_empty() || inner_edges.is_empty() {
        return Err(GeometryError::InvalidInput(
            "ring must have at least one edge".into(),
        ));
    }

    let mut touching = false;
    for inner_edge in &inner_edges {
        for outer_edge in &outer_edges {
            match segments_state(inner_edge, outer_edge)? {
                SegmentsState::Intersect => return Ok(RingState::Intersect),
                SegmentsState::Disjoint => {}
                _ => touching = true,
            }
        }
    }

    if !touching {
        match point_in_ring(inner_edges[0].start(), outer)? {
            PointState::Inside => return Ok(RingState::Inside),
            PointState::Outside => return Ok(RingState::Outside),
            PointState::Tangent => {}
        }
    }

    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let (mut found_inside, mut found_outside) = (false, false);
    'edges: for edge in &inner_edges {
        for _ in 0..SAMPLES_PER_EDGE {
            let t: f64 = rng.random();
            if t == 0.0 {
                continue;
            }
            match point_in_ring(edge.at(t), outer)? {
                PointState::Inside => found_inside = true,
                PointState::Outside => found_outside = true,
                PointState::Tangent => {}
            }
            if found_inside && found_outside {
                break 'edges;
            }
        }
    }

    Ok(match (found_inside, found_outside) {
        (true, true) => RingState::Intersect,
        (false, true) => RingState::Outside,
        _ => RingState::Inside,
    })
}

/// Whether the axis-aligned square at `top_left` lies inside `ring`.
pub fn square_ring_state(ring: &[Point], top_left: Point, size: f64) -> GeometryResult<RingState> {
    rings_state(ring, &square_ring(top_left, size))
}

/// Bounding box of a ring, as `{top_left, width, height}`.
pub fn bounding_box(ring: &[Point]) -> GeometryResult<BoundingBox> {
    BoundingBox::of_ring(ring)
}

/// Exact containment in a polygon with holes. Boundaries count as inside,
/// including hole boundaries.
pub fn point_in_polygon(p: Point, polygon: &Polygon) -> GeometryResult<bool> {
    match point_in_ring(p, &polygon.outer)? {
        PointState::Outside => return Ok(false),
        PointState::Tangent => return Ok(true),
        PointState::Inside => {}
    }
    for hole in &polygon.holes {
        match point_in_ring(p, hole)? {
            PointState::Inside => return Ok(false),
            PointState::Tangent => return Ok(true),
            PointState::Outside => {}
        }
    }
    Ok(true)
}

// ============================================================================
// TESTS
// ============================================================================
