//! Compound tokens over several dimensions.
//!
//! A polytype holds an ordered list of dimensions. Ranges and points are
//! passed as JSON arrays with one entry per dimension; every combination of
//! per-dimension tokens becomes one compound token, joined with `&` in
//! dimension order.

use serde_json::Value;

use crate::dimension::Dimension;
use crate::error::{PolytokenError, Result};
use crate::token::{COMPOUND_DELIMITER, Token, dedup};

/// Ordered set of dimensions that tokenize together.
pub struct Polytype {
    dimensions: Vec<Box<dyn Dimension>>,
}

impl std::fmt::Debug for Polytype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Polytype")
            .field("dimensions", &self.dimensions.iter().map(|d| d.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Polytype {
    pub const DELIMITER: &'static str = COMPOUND_DELIMITER;

    pub fn new(dimensions: Vec<Box<dyn Dimension>>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(PolytokenError::invalid_argument(
                "polytype needs at least one dimension",
            ));
        }
        Ok(Self { dimensions })
    }

    pub fn dimensions(&self) -> &[Box<dyn Dimension>] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Always false; construction rejects an empty dimension list.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn validate_range(&self, ranges: &Value) -> Result<()> {
        for (dimension, range) in self.dimensions.iter().zip(self.ranges(ranges)?) {
            dimension.validate_range(range)?;
        }
        Ok(())
    }

    pub fn validate_point(&self, points: &Value) -> Result<()> {
        for (dimension, point) in self.dimensions.iter().zip(self.points(points)?) {
            dimension.validate_point(point)?;
        }
        Ok(())
    }

    pub fn normalize_range(&self, ranges: &Value) -> Result<Value> {
        self.dimensions
            .iter()
            .zip(self.ranges(ranges)?)
            .map(|(dimension, range)| dimension.normalize_range(range))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    pub fn normalize_point(&self, points: &Value) -> Result<Value> {
        self.dimensions
            .iter()
            .zip(self.points(points)?)
            .map(|(dimension, point)| dimension.normalize_point(point))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }

    /// Compound tokens covering the cartesian product of the ranges.
    pub fn range_tokens(&self, ranges: &Value) -> Result<Vec<Token>> {
        let per_dimension = self
            .dimensions
            .iter()
            .zip(self.ranges(ranges)?)
            .map(|(dimension, range)| dimension.range_tokens(range))
            .collect::<Result<Vec<_>>>()?;
        let tokens = cartesian(&per_dimension);
        tracing::debug!(dimensions = self.len(), tokens = tokens.len(), "compound range tokens");
        Ok(tokens)
    }

    pub fn point_tokens(&self, points: &Value) -> Result<Vec<Token>> {
        let per_dimension = self
            .dimensions
            .iter()
            .zip(self.points(points)?)
            .map(|(dimension, point)| dimension.point_tokens(point))
            .collect::<Result<Vec<_>>>()?;
        Ok(cartesian(&per_dimension))
    }

    /// True only if every dimension's range contains its point.
    pub fn range_contains_point(&self, ranges: &Value, points: &Value) -> Result<bool> {
        let ranges = self.ranges(ranges)?;
        let points = self.points(points)?;
        for ((dimension, range), point) in self.dimensions.iter().zip(ranges).zip(points) {
            if !dimension.range_contains_point(range, point)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn ranges<'a>(&self, ranges: &'a Value) -> Result<&'a [Value]> {
        self.tuple(ranges).ok_or_else(|| {
            PolytokenError::invalid_range(format!(
                "ranges should be an array with one entry per dimension ({})",
                self.len()
            ))
        })
    }

    fn points<'a>(&self, points: &'a Value) -> Result<&'a [Value]> {
        self.tuple(points).ok_or_else(|| {
            PolytokenError::invalid_point(format!(
                "points should be an array with one entry per dimension ({})",
                self.len()
            ))
        })
    }

    fn tuple<'a>(&self, value: &'a Value) -> Option<&'a [Value]> {
        value
            .as_array()
            .map(Vec::as_slice)
            .filter(|items| items.len() == self.len())
    }
}

/// Every combination of one token per dimension, first dimension outermost.
fn cartesian(per_dimension: &[Vec<Token>]) -> Vec<Token> {
    let mut combinations: Vec<Vec<&Token>> = vec![Vec::new()];
    for tokens in per_dimension {
        combinations = combinations
            .iter()
            .flat_map(|prefix| {
                tokens.iter().map(move |token| {
                    let mut next = prefix.clone();
                    next.push(token);
                    next
                })
            })
            .collect();
    }
    dedup(combinations.into_iter().map(Token::compound))
}
