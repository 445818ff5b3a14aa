//! Geographic polygons.
//!
//! A polygon is covered by square cells on a long/lat grid. Each cell is
//! classified against the exterior ring and the holes; cells inside the
//! polygon become tokens at their own size, cells on its boundary are split
//! into `multiplier x multiplier` sub-cells at the next step.

use serde_json::Value;

use crate::dimension::{Dimension, TokenConfig};
use crate::error::{PolytokenError, Result};
use crate::geojson::{self, Area};
use crate::geometry::{BoundingBox, Point, Polygon, as_rectangle};
use crate::grid::{self, Cell, CellClassifier, CellState};
use crate::intersect::{RingState, point_in_polygon, rings_state};
use crate::step::StepSchedule;
use crate::token::{Token, dedup};

/// Tokenizer for GeoJSON `Polygon` and `MultiPolygon` ranges.
#[derive(Debug, Clone)]
pub struct LongLatDimension {
    name: String,
    schedule: StepSchedule,
}

impl LongLatDimension {
    pub const DEFAULT_NAME: &'static str = "LongLat";

    pub fn new(config: &TokenConfig) -> Result<Self> {
        Self::with_name(Self::DEFAULT_NAME, config)
    }

    /// Fails with `InvalidArgument` unless the step configuration is
    /// exponential.
    pub fn with_name(name: impl Into<String>, config: &TokenConfig) -> Result<Self> {
        let name = name.into();
        Ok(Self { schedule: exponential_schedule(&name, config)?, name })
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Tokens covering one polygon.
    pub fn tokens_for_polygon(&self, polygon: &Polygon) -> Result<Vec<Token>> {
        let tokens = match polygon_rectangle(polygon) {
            Some(rect) => grid::cover(&rect, &rect, &self.schedule)?,
            None => {
                let bbox = polygon.bounding_box()?;
                grid::cover(&PolygonCells::new(polygon, bbox), &bbox, &self.schedule)?
            }
        };
        Ok(dedup(tokens))
    }

    /// Tokens covering every member polygon of `area`.
    pub fn tokens_for_area(&self, area: &Area) -> Result<Vec<Token>> {
        let area = area.normalized()?;
        let mut tokens = Vec::new();
        for polygon in area.polygons() {
            tokens.extend(self.tokens_for_polygon(&polygon)?);
        }
        let tokens = dedup(tokens);
        tracing::debug!(dimension = %self.name, tokens = tokens.len(), "range tokens");
        Ok(tokens)
    }

    pub fn tokens_for_point(&self, point: Point) -> Vec<Token> {
        grid::point_cells(point, self.schedule.steps())
    }

    /// True if any member polygon contains `point`, boundaries included.
    pub fn contains(area: &Area, point: Point) -> Result<bool> {
        for polygon in area.normalized()?.polygons() {
            if point_in_polygon(point, &polygon)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn exponential_schedule(name: &str, config: &TokenConfig) -> Result<StepSchedule> {
    if !config.step.is_exponential() {
        return Err(PolytokenError::invalid_argument(format!(
            "step type must be exponential for {name} dimension"
        )));
    }
    config.schedule()
}

fn polygon_rectangle(polygon: &Polygon) -> Option<BoundingBox> {
    if polygon.holes.is_empty() {
        as_rectangle(&polygon.outer)
    } else {
        None
    }
}

impl Dimension for LongLatDimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn steps(&self) -> &[f64] {
        self.schedule.steps()
    }

    fn validate_range(&self, range: &Value) -> Result<()> {
        Area::from_value(range, &self.name).map(|_| ())
    }

    fn validate_point(&self, point: &Value) -> Result<()> {
        geojson::parse_point(point, &self.name).map(|_| ())
    }

    fn normalize_range(&self, range: &Value) -> Result<Value> {
        Area::from_value(range, &self.name)?.normalized()?.to_value()
    }

    fn normalize_point(&self, point: &Value) -> Result<Value> {
        Ok(geojson::point_value(geojson::parse_point(point, &self.name)?))
    }

    fn range_tokens(&self, range: &Value) -> Result<Vec<Token>> {
        self.tokens_for_area(&Area::from_value(range, &self.name)?)
    }

    fn point_tokens(&self, point: &Value) -> Result<Vec<Token>> {
        Ok(self.tokens_for_point(geojson::parse_point(point, &self.name)?))
    }

    fn range_contains_point(&self, range: &Value, point: &Value) -> Result<bool> {
        let area = Area::from_value(range, &self.name)?;
        Self::contains(&area, geojson::parse_point(point, &self.name)?)
    }
}

// ============================================================================
// CELL CLASSIFICATION
// ============================================================================

/// Classifies cells against a polygon's rings.
struct PolygonCells<'a> {
    polygon: &'a Polygon,
    bbox: BoundingBox,
}

impl<'a> PolygonCells<'a> {
    fn new(polygon: &'a Polygon, bbox: BoundingBox) -> Self {
        Self { polygon, bbox }
    }

    /// Cell and polygon bounding boxes share no point at all.
    fn clear_of(&self, cell: &Cell) -> bool {
        cell.max_x() < self.bbox.min_x()
            || cell.min_x() > self.bbox.max_x()
            || cell.max_y() < self.bbox.min_y()
            || cell.min_y() > self.bbox.max_y()
    }

    fn hole_state(&self, square: &[Point]) -> Result<CellState> {
        for hole in &self.polygon.holes {
            match rings_state(hole, square)? {
                RingState::Inside => return Ok(CellState::Outside),
                RingState::Intersect => return Ok(CellState::Partial),
                RingState::Outside => {
                    if rings_state(square, hole)? == RingState::Inside {
                        return Ok(CellState::Partial);
                    }
                }
            }
        }
        Ok(CellState::Inside)
    }
}

impl CellClassifier for PolygonCells<'_> {
    fn classify(&self, cell: &Cell) -> Result<CellState> {
        if self.clear_of(cell) {
            return Ok(CellState::Outside);
        }
        let square = cell.ring();
        match rings_state(&self.polygon.outer, &square)? {
            RingState::Intersect => Ok(CellState::Partial),
            RingState::Inside => self.hole_state(&square),
            // The whole polygon may fit inside one cell.
            RingState::Outside => Ok(if rings_state(&square, &self.polygon.outer)? == RingState::Inside {
                CellState::Partial
            } else {
                CellState::Outside
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn dimension() -> LongLatDimension {
        LongLatDimension::new(&TokenConfig::exponential(2.0, 2, 8)).unwrap()
    }

    fn sorted(tokens: Vec<Token>) -> Vec<String> {
        let mut out: Vec<String> = tokens.into_iter().map(Token::into_string).collect();
        out.sort();
        out
    }

    fn polygon(coords: &[[f64; 2]]) -> Polygon {
        Polygon::new(coords.iter().copied().map(Point::from).collect())
    }

    #[test]
    fn requires_exponential_steps() {
        let err = LongLatDimension::new(&TokenConfig::customized(vec![4.0, 2.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn small_polygon_inside_one_cell_is_kept() {
        let dim = dimension();
        let tiny = polygon(&[[0.5, 0.5], [1.0, 0.5], [0.75, 1.0], [0.5, 0.5]]);
        assert_eq!(sorted(dim.tokens_for_polygon(&tiny).unwrap()), vec!["0,2^2"]);
    }

    #[test]
    fn classifier_states() {
        let shape = polygon(&[[0.0, 0.0], [4.0, 4.0], [4.0, 8.0], [0.0, 12.0], [-4.0, 8.0], [-4.0, 4.0], [0.0, 0.0]]);
        let bbox = shape.bounding_box().unwrap();
        let cells = PolygonCells::new(&shape, bbox);
        assert_eq!(cells.classify(&Cell::new(0.0, 8.0, 4.0)).unwrap(), CellState::Inside);
        assert_eq!(cells.classify(&Cell::new(0.0, 4.0, 4.0)).unwrap(), CellState::Partial);
        assert_eq!(cells.classify(&Cell::new(8.0, 8.0, 4.0)).unwrap(), CellState::Outside);
        assert_eq!(cells.classify(&Cell::new(0.0, 256.0, 256.0)).unwrap(), CellState::Partial);
    }

    #[test]
    fn cell_inside_hole_is_dropped() {
        let ring = |x0: f64, y0: f64, x1: f64, y1: f64| {
            vec![
                Point::new(x0, y0),
                Point::new(x1, y0),
                Point::new(x1, y1),
                Point::new(x0, y1),
                Point::new(x0, y0),
            ]
        };
        let shape = Polygon::with_holes(ring(0.0, 0.0, 8.0, 8.0), vec![ring(2.0, 2.0, 6.0, 6.0)]);
        let cells = PolygonCells::new(&shape, shape.bounding_box().unwrap());
        assert_eq!(cells.classify(&Cell::new(2.0, 4.0, 2.0)).unwrap(), CellState::Outside);
        assert_eq!(cells.classify(&Cell::new(0.0, 8.0, 8.0)).unwrap(), CellState::Partial);
        assert_eq!(cells.classify(&Cell::new(0.0, 2.0, 2.0)).unwrap(), CellState::Inside);
    }

    #[test]
    fn point_tokens_wrap_longitude() {
        let dim = dimension();
        let tokens = dim.point_tokens(&json!([183, 1])).unwrap();
        assert!(tokens.iter().any(|t| t == "-178,2^2"));
        assert!(tokens.iter().any(|t| t == "180,4^4"));
        assert!(tokens.iter().all(|t| !t.as_str().starts_with("182,")));
    }

    #[test]
    fn normalizes_point_and_pole_range() {
        let dim = dimension();
        assert_eq!(
            dim.normalize_point(&json!([10, 20])).unwrap(),
            json!({ "type": "Point", "coordinates": [10.0, 20.0] })
        );
        let range = json!({ "type": "Polygon", "coordinates": [[[-10, 80], [10, 90]]] });
        let normalized = dim.normalize_range(&range).unwrap();
        assert_eq!(normalized["coordinates"][0].as_array().unwrap().len(), 5);
        assert_eq!(range["coordinates"][0].as_array().unwrap().len(), 2);
    }
}
