//! Numeric intervals.
//!
//! A range `[min, max]` is split into aligned cells, coarsest step first.
//! Whatever a step cannot cover with whole cells (the stretch before the
//! first aligned coordinate and the stretch after the last full cell) goes
//! down to the next finer step. The finest step tiles what is left, even if
//! that overshoots `max`.

use serde_json::Value;

use crate::dimension::{Dimension, TokenConfig};
use crate::error::{PolytokenError, Result};
use crate::precision::{ceil_to_step, floor_to_step, round5};
use crate::step::StepSchedule;
use crate::token::{Token, dedup};

/// Tokenizer for real-valued intervals.
#[derive(Debug, Clone)]
pub struct NumericDimension {
    name: String,
    schedule: StepSchedule,
}

impl NumericDimension {
    pub const DEFAULT_NAME: &'static str = "Numeric";

    pub fn new(config: &TokenConfig) -> Result<Self> {
        Self::with_name(Self::DEFAULT_NAME, config)
    }

    pub fn with_name(name: impl Into<String>, config: &TokenConfig) -> Result<Self> {
        Ok(Self { name: name.into(), schedule: config.schedule()? })
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Tokens covering `[min, max]`.
    pub fn tokens_for_range(&self, min: f64, max: f64) -> Result<Vec<Token>> {
        check_bounds(&self.name, min, max)?;
        let tokens = dedup(interval_tokens(min, max, self.schedule.steps()));
        tracing::debug!(dimension = %self.name, min, max, tokens = tokens.len(), "range tokens");
        Ok(tokens)
    }

    /// One token per step: the cell holding `point` at that step.
    pub fn tokens_for_point(&self, point: f64) -> Result<Vec<Token>> {
        if !point.is_finite() {
            return Err(PolytokenError::invalid_point(format!(
                "Numeric point of {} dimension should be a finite number",
                self.name
            )));
        }
        Ok(scalar_point_tokens(point, self.schedule.steps()))
    }

    /// Inclusive at both ends.
    pub fn contains(min: f64, max: f64, point: f64) -> bool {
        point >= min && point <= max
    }

    fn parse_range(&self, range: &Value) -> Result<(f64, f64)> {
        let items = range.as_array().ok_or_else(|| {
            PolytokenError::invalid_range(format!(
                "Range of {} dimension should be an array",
                self.name
            ))
        })?;
        if items.len() != 2 {
            return Err(PolytokenError::invalid_range(format!(
                "Range of {} dimension should have length of two",
                self.name
            )));
        }
        let (Some(min), Some(max)) = (items[0].as_f64(), items[1].as_f64()) else {
            return Err(PolytokenError::invalid_range(format!(
                "Range of {} dimension should consist of numbers",
                self.name
            )));
        };
        check_bounds(&self.name, min, max)?;
        Ok((min, max))
    }

    fn parse_point(&self, point: &Value) -> Result<f64> {
        point.as_f64().ok_or_else(|| {
            PolytokenError::invalid_point(format!(
                "Numeric point of {} dimension should be a number",
                self.name
            ))
        })
    }
}

fn check_bounds(name: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() {
        return Err(PolytokenError::invalid_range(format!(
            "Range of {name} dimension should consist of finite numbers"
        )));
    }
    if max <= min {
        return Err(PolytokenError::invalid_range(format!(
            "upper bound of {name} dimension must be greater than range lower bound"
        )));
    }
    Ok(())
}

impl Dimension for NumericDimension {
    fn name(&self) -> &str {
        &self.name
    }

    fn steps(&self) -> &[f64] {
        self.schedule.steps()
    }

    fn validate_range(&self, range: &Value) -> Result<()> {
        self.parse_range(range).map(|_| ())
    }

    fn validate_point(&self, point: &Value) -> Result<()> {
        self.parse_point(point).map(|_| ())
    }

    fn range_tokens(&self, range: &Value) -> Result<Vec<Token>> {
        let (min, max) = self.parse_range(range)?;
        self.tokens_for_range(min, max)
    }

    fn point_tokens(&self, point: &Value) -> Result<Vec<Token>> {
        self.tokens_for_point(self.parse_point(point)?)
    }

    fn range_contains_point(&self, range: &Value, point: &Value) -> Result<bool> {
        let (min, max) = self.parse_range(range)?;
        Ok(Self::contains(min, max, self.parse_point(point)?))
    }
}

// ============================================================================
// INTERVAL DECOMPOSITION
// ============================================================================

/// Cover `[min, max]` with scalar tokens over `steps` (coarsest first).
///
/// Shared with the time dimension, which runs it on epoch milliseconds.
pub(crate) fn interval_tokens(min: f64, max: f64, steps: &[f64]) -> Vec<Token> {
    decompose(min, max, 0, steps)
}

fn decompose(min: f64, max: f64, level: usize, steps: &[f64]) -> Vec<Token> {
    if max - min <= 0.0 {
        return Vec::new();
    }

    let Some(&step) = steps.get(level) else {
        let Some(&finest) = steps.last() else {
            return Vec::new();
        };
        return tile(min, max, finest);
    };
    if step > max - min {
        return decompose(min, max, level + 1, steps);
    }

    let pivot = ceil_to_step(min, step);
    let count = round5((max - pivot) / step).floor().max(0.0) as usize;
    let end = round5(pivot + count as f64 * step);

    let mut tokens: Vec<Token> = (0..count)
        .map(|i| Token::scalar(round5(pivot + i as f64 * step), step))
        .collect();
    tokens.extend(decompose(end, max, level + 1, steps));
    tokens.extend(decompose(min, pivot, level + 1, steps));
    tokens
}

/// Cells of size `step` from the one holding `min` until `max` is reached.
fn tile(min: f64, max: f64, step: f64) -> Vec<Token> {
    let start = floor_to_step(min, step);
    let count = round5((max - start) / step).ceil().max(0.0) as usize;
    (0..count)
        .map(|i| Token::scalar(round5(start + i as f64 * step), step))
        .collect()
}

/// The cell holding `point` at each step.
pub(crate) fn scalar_point_tokens(point: f64, steps: &[f64]) -> Vec<Token> {
    steps
        .iter()
        .map(|&step| Token::scalar(floor_to_step(point, step), step))
        .collect()
}
