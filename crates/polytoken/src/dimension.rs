//! The dimension contract.
//!
//! A dimension is one coordinate space (numbers, time, long/lat) with its own
//! validation, normalization and tokenization rules. Dimensions are built
//! once from a [`TokenConfig`] and never change afterwards, so a single
//! instance can serve any number of threads.
//!
//! Ranges and points cross this trait as [`serde_json::Value`], the shape in
//! which the compound layer receives them. Each concrete dimension also has
//! a typed API that the trait methods parse into.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PolytokenError, Result};
use crate::step::{StepConfig, StepSchedule};
use crate::token::Token;

/// Per-dimension token configuration.
///
/// ```json
/// { "step": { "type": "exponential", "base": 2, "multiplier": 2, "stepNum": 8 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub step: StepConfig,
}

impl TokenConfig {
    pub fn new(step: StepConfig) -> Self {
        Self { step }
    }

    pub fn exponential(base: f64, multiplier: u32, step_num: u32) -> Self {
        Self::new(StepConfig::exponential(base, multiplier, step_num))
    }

    pub fn customized(steps: impl Into<Vec<f64>>) -> Self {
        Self::new(StepConfig::customized(steps))
    }

    /// Parse a config from its JSON form.
    pub fn from_json(value: &Value) -> Result<Self> {
        if value.get("step").is_none() {
            return Err(PolytokenError::invalid_argument("missing step configuration"));
        }
        serde_json::from_value(value.clone()).map_err(|e| {
            PolytokenError::invalid_argument(format!("invalid step configuration: {e}"))
        })
    }

    /// Validate the step configuration and build its schedule.
    pub fn schedule(&self) -> Result<StepSchedule> {
        StepSchedule::from_config(&self.step)
    }
}

/// A segmentable space that tokenizes ranges and points.
///
/// Any token of `range_tokens(r)` that also appears in `point_tokens(p)`
/// means `p` may lie in `r`; `range_contains_point` gives the exact answer.
pub trait Dimension: Send + Sync {
    /// Name used in error messages and by the registry.
    fn name(&self) -> &str;

    /// Step sizes, coarsest first.
    fn steps(&self) -> &[f64];

    fn validate_range(&self, range: &Value) -> Result<()>;

    fn validate_point(&self, point: &Value) -> Result<()>;

    fn normalize_range(&self, range: &Value) -> Result<Value> {
        self.validate_range(range)?;
        Ok(range.clone())
    }

    fn normalize_point(&self, point: &Value) -> Result<Value> {
        self.validate_point(point)?;
        Ok(point.clone())
    }

    /// Tokens covering `range`, deduplicated, in generation order.
    fn range_tokens(&self, range: &Value) -> Result<Vec<Token>>;

    /// Tokens of every cell that contains `point`.
    fn point_tokens(&self, point: &Value) -> Result<Vec<Token>>;

    /// Exact containment test, independent of the token grid.
    fn range_contains_point(&self, _range: &Value, _point: &Value) -> Result<bool> {
        Err(PolytokenError::UnsupportedOperation(format!(
            "{} dimension does not support containment checks",
            self.name()
        )))
    }
}
