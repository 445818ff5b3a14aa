//! Geographic circles: a center point and a radius in meters.
//!
//! Tokens cover the long/lat rectangle that encloses the circle, so they
//! over-approximate the range; containment is decided by great-circle
//! distance.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::dimension::{Dimension, TokenConfig};
use crate::dimensions::long_lat::exponential_schedule;
use crate::error::{PolytokenError, Result};
use crate::geodesy;
use crate::geojson;
use crate::geometry::Point;
use crate::grid;
use crate::step::StepSchedule;
use crate::token::{Token, dedup};

/// A parsed `{ point, radius }` range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    /// Meters.
    pub radius: f64,
}

#[derive(Deserialize)]
struct RawCircle {
    point: Value,
    radius: Value,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn from_value(value: &Value, dimension: &str) -> Result<Self> {
        let invalid = || {
            PolytokenError::invalid_range(format!(
                "Invalid {dimension} range: expected {{ point, radius }}"
            ))
        };
        if !value.is_object() {
            return Err(invalid());
        }
        let raw: RawCircle = serde_json::from_value(value.clone()).map_err(|_| invalid())?;
        let radius = raw.radius.as_f64().ok_or_else(|| {
            PolytokenError::invalid_range(format!("radius of {dimension} range must be numeric"))
        })?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PolytokenError::invalid_range(format!(
                "radius of {dimension} range must be positive, got {radius}"
            )));
        }
        let center = geojson::parse_point(&raw.point, dimension)?;
        Ok(Self::new(center, radius))
    }

    pub fn contains(&self, point: Point) -> bool {
        geodesy::distance(self.center, point) <= self.radius
    }

    pub fn to_value(&self) -> Value {
        json!({ "point": geojson::point_value(self.center), "radius": self.radius })
    }
}

/// Tokenizer for `{ point, radius }` ranges.
#[derive(Debug, Clone)]
pub struct LongLatRadiusDimension {
    name: String,
    schedule: StepSchedule,
}

impl LongLatRadiusDimension {
    pub const DEFAULT_NAME: &'static str = "LongLatRadius";

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

    pub fn tokens_for_circle(&self, circle: &Circle) -> Result<Vec<Token>> {
        let rect = geodesy::enclosing_rectangle(circle.center, circle.radius);
        let tokens = dedup(grid::cover(&rect, &rect, &self.schedule)?);
        tracing::debug!(
            dimension = %self.name,
            radius = circle.radius,
            tokens = tokens.len(),
            "range tokens"
        );
        Ok(tokens)
    }

    pub fn tokens_for_point(&self, point: Point) -> Vec<Token> {
        grid::point_cells(point, self.schedule.steps())
    }
}

impl Dimension for LongLatRadiusDimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn steps(&self) -> &[f64] {
        self.schedule.steps()
    }

    fn validate_range(&self, range: &Value) -> Result<()> {
        Circle::from_value(range, &self.name).map(|_| ())
    }

    fn validate_point(&self, point: &Value) -> Result<()> {
        geojson::parse_point(point, &self.name).map(|_| ())
    }

    fn normalize_range(&self, range: &Value) -> Result<Value> {
        Ok(Circle::from_value(range, &self.name)?.to_value())
    }

    fn normalize_point(&self, point: &Value) -> Result<Value> {
        Ok(geojson::point_value(geojson::parse_point(point, &self.name)?))
    }

    fn range_tokens(&self, range: &Value) -> Result<Vec<Token>> {
        self.tokens_for_circle(&Circle::from_value(range, &self.name)?)
    }

    fn point_tokens(&self, point: &Value) -> Result<Vec<Token>> {
        Ok(self.tokens_for_point(geojson::parse_point(point, &self.name)?))
    }

    fn range_contains_point(&self, range: &Value, point: &Value) -> Result<bool> {
        let circle = Circle::from_value(range, &self.name)?;
        Ok(circle.contains(geojson::parse_point(point, &self.name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn dimension() -> LongLatRadiusDimension {
        LongLatRadiusDimension::new(&TokenConfig::exponential(2.0, 2, 8)).unwrap()
    }

    #[test]
    fn parses_circle() {
        let circle = Circle::from_value(&json!({ "point": [-80, 30], "radius": 10000 }), "r").unwrap();
        assert_eq!(circle, Circle::new(Point::new(-80.0, 30.0), 10_000.0));
    }

    #[test]
    fn rejects_bad_circles() {
        let dim = dimension();
        let cases = [
            (json!({ "point": [-80, 30] }), ErrorKind::InvalidRange),
            (json!({ "point": [-80, 30], "radius": "far" }), ErrorKind::InvalidRange),
            (json!({ "point": [-80, 30], "radius": 0 }), ErrorKind::InvalidRange),
            (json!({ "point": [-80, 30], "radius": -5 }), ErrorKind::InvalidRange),
            (json!({ "point": "NOPE", "radius": 10 }), ErrorKind::InvalidPoint),
            (json!([1, 2]), ErrorKind::InvalidRange),
        ];
        for (range, kind) in cases {
            assert_eq!(dim.validate_range(&range).unwrap_err().kind(), kind, "{range}");
        }
    }

    #[test]
    fn requires_exponential_steps() {
        let err = LongLatRadiusDimension::new(&TokenConfig::customized(vec![2.0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn circle_containment() {
        let circle = Circle::new(Point::new(30.0, 40.0), 10_000.0);
        assert!(circle.contains(Point::new(30.0, 40.0)));
        assert!(circle.contains(Point::new(30.05, 40.05)));
        assert!(!circle.contains(Point::new(30.1, 40.1)));
    }
}
