//! Great-circle helpers on a spherical earth.
//!
//! Coordinates are `(longitude, latitude)` in degrees, distances in meters.

use crate::geometry::{BoundingBox, Point};

/// Sphere radius used for every distance, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Haversine distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    let (phi1, phi2) = (a.y.to_radians(), b.y.to_radians());
    let d_phi = (b.y - a.y).to_radians();
    let d_lambda = (b.x - a.x).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Point reached from `start` after `meters` along the initial `bearing`
/// (degrees clockwise from north). Longitude is not normalized.
pub fn destination(start: Point, meters: f64, bearing: f64) -> Point {
    let delta = meters / EARTH_RADIUS_M;
    let theta = bearing.to_radians();
    let (phi1, lambda1) = (start.y.to_radians(), start.x.to_radians());

    let phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos()).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * phi2.sin());
    Point::new(lambda2.to_degrees(), phi2.to_degrees())
}

/// Axis-aligned long/lat rectangle enclosing the circle of `meters` around
/// `center`.
///
/// A circle that reaches a pole spans every longitude and is clamped at that
/// pole. Otherwise the circle is widest in longitude north of the center's
/// parallel when north of the equator (south of it when south), not due
/// east and west; the half-width is `asin(sin(d) / cos(lat))`. The east edge
/// may pass 180; it is never folded back below the west edge.
pub fn enclosing_rectangle(center: Point, meters: f64) -> BoundingBox {
    let delta = meters / EARTH_RADIUS_M;
    let reach = delta.to_degrees();
    let north = center.y + reach;
    let south = center.y - reach;

    let spread = delta.sin() / center.y.to_radians().cos();
    if north >= 90.0 || south <= -90.0 || spread >= 1.0 {
        let (top, bottom) = (north.min(90.0), south.max(-90.0));
        return BoundingBox {
            top_left: Point::new(-180.0, top),
            width: 360.0,
            height: top - bottom,
        };
    }

    let half_width = spread.asin().to_degrees();
    BoundingBox {
        top_left: Point::new(normalize_longitude(center.x - half_width), north),
        width: 2.0 * half_width,
        height: north - south,
    }
}

/// Longitude folded into [-180, 180).
fn normalize_longitude(x: f64) -> f64 {
    (x + 180.0).rem_euclid(360.0) - 180.0
}
