//! GeoJSON input for the long/lat dimensions.
//!
//! Ranges are `Polygon` or `MultiPolygon` objects; points are `Point`
//! objects or bare `[long, lat]` pairs. Everything here is a pure transform:
//! normalization returns a new value and never touches its input.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{PolytokenError, Result};
use crate::geometry::{Point, Polygon};

/// A `[long, lat]` pair.
pub type Position = [f64; 2];

/// A linear ring: closed, first position repeated at the end.
pub type Ring = Vec<Position>;

/// A polygonal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Area {
    /// Exterior ring followed by holes.
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Area {
    /// Parse and validate a range value.
    ///
    /// Positions follow the bounds of a bare `[long, lat]` point. Two-position
    /// rings pass validation; [`Area::normalized`] expands or rejects them.
    pub fn from_value(value: &Value, dimension: &str) -> Result<Self> {
        if !is_geojson_object(value) {
            return Err(PolytokenError::invalid_range(format!(
                "range of {dimension} dimension is not a valid geojson object"
            )));
        }
        let not_polygonal = || {
            PolytokenError::invalid_range(format!(
                "range of {dimension} dimension is not a valid Polygon or MultiPolygon"
            ))
        };
        if !matches!(value["type"].as_str(), Some("Polygon" | "MultiPolygon")) {
            return Err(not_polygonal());
        }
        let area: Area = serde_json::from_value(value.clone()).map_err(|_| not_polygonal())?;
        if !area.rings_are_valid() {
            return Err(not_polygonal());
        }
        Ok(area)
    }

    /// Rings of each member polygon.
    pub fn members(&self) -> Vec<&[Ring]> {
        match self {
            Area::Polygon { coordinates } => vec![coordinates.as_slice()],
            Area::MultiPolygon { coordinates } => coordinates.iter().map(Vec::as_slice).collect(),
        }
    }

    fn rings_are_valid(&self) -> bool {
        self.members().iter().all(|rings| {
            !rings.is_empty()
                && rings.iter().all(|ring| {
                    (ring.len() == 2 || (ring.len() >= 4 && ring.first() == ring.last()))
                        && ring.iter().all(|&position| in_bounds(position))
                })
        })
    }

    /// Copy with every two-position ring expanded to a rectangle.
    ///
    /// A two-position ring is only meaningful when it touches a pole: it then
    /// stands for the band between its two corners. Any other two-position
    /// ring is an open boundary and fails with `InvalidRange`.
    pub fn normalized(&self) -> Result<Self> {
        Ok(match self {
            Area::Polygon { coordinates } => Area::Polygon { coordinates: expand_rings(coordinates)? },
            Area::MultiPolygon { coordinates } => Area::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|rings| expand_rings(rings))
                    .collect::<Result<_>>()?,
            },
        })
    }

    /// Member polygons as geometry. Expects a normalized area.
    pub fn polygons(&self) -> Vec<Polygon> {
        self.members()
            .into_iter()
            .filter_map(|rings| {
                let (outer, holes) = rings.split_first()?;
                Some(Polygon::with_holes(
                    to_points(outer),
                    holes.iter().map(|h| to_points(h)).collect(),
                ))
            })
            .collect()
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| PolytokenError::invalid_range(format!("unserializable range: {e}")))
    }
}

fn expand_rings(rings: &[Ring]) -> Result<Vec<Ring>> {
    rings.iter().map(expand_pole_ring).collect()
}

fn expand_pole_ring(ring: &Ring) -> Result<Ring> {
    let [[a, b], [c, d]] = match ring.as_slice() {
        [first, second] => [*first, *second],
        _ => return Ok(ring.clone()),
    };
    let touches_pole = [b, d].iter().any(|lat| lat.abs() == 90.0);
    if !touches_pole {
        return Err(PolytokenError::invalid_range(
            "boundary of polygon is not a closed linear ring",
        ));
    }
    Ok(vec![[a, b], [c, b], [c, d], [a, d], [a, b]])
}

fn to_points(ring: &[Position]) -> Vec<Point> {
    ring.iter().copied().map(Point::from).collect()
}

/// -360 < long < 360 and -90 <= lat <= 90.
fn in_bounds([x, y]: Position) -> bool {
    x > -360.0 && x < 360.0 && (-90.0..=90.0).contains(&y)
}

fn is_geojson_object(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string)
}

// ============================================================================
// POINTS
// ============================================================================

/// Parse a `[long, lat]` pair or a GeoJSON `Point`.
///
/// Bare pairs accept any longitude strictly within one turn either way
/// (-360, 360); `Point` objects must stay within [-180, 180]. Latitude is
/// always within [-90, 90].
pub fn parse_point(value: &Value, dimension: &str) -> Result<Point> {
    if let Some(p) = value.as_array().and_then(|items| pair(items)) {
        if in_bounds(p.to_array()) {
            return Ok(p);
        }
    }
    if !is_geojson_object(value) {
        return Err(PolytokenError::invalid_point(format!(
            "point of {dimension} dimension is not a valid geojson object"
        )));
    }
    let point = (value["type"] == "Point")
        .then(|| value.get("coordinates").and_then(Value::as_array))
        .flatten()
        .and_then(|items| pair(items))
        .filter(|p| (-180.0..=180.0).contains(&p.x) && (-90.0..=90.0).contains(&p.y));
    point.ok_or_else(|| {
        PolytokenError::invalid_point(format!("point of {dimension} dimension is not a valid point"))
    })
}

fn pair(items: &[Value]) -> Option<Point> {
    match items {
        [x, y] => Some(Point::new(x.as_f64()?, y.as_f64()?)),
        _ => None,
    }
}

/// `{ "type": "Point", "coordinates": [long, lat] }`
pub fn point_value(p: Point) -> Value {
    json!({ "type": "Point", "coordinates": [p.x, p.y] })
}
