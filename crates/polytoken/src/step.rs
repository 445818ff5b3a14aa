//! Step schedules: the granularities a dimension tokenizes at.
//!
//! A schedule is built once, when a dimension is constructed, and runs from
//! the coarsest step to the finest.

use serde::{Deserialize, Serialize};

use crate::error::{PolytokenError, Result};
use crate::precision::round5;

/// Step configuration as it appears in a token config.
///
/// ```json
/// { "type": "exponential", "base": 2, "multiplier": 2, "stepNum": 8 }
/// { "type": "customized", "steps": [1000, 60000, 3600000] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StepConfig {
    Exponential {
        /// Finest step.
        base: f64,
        /// Ratio between neighbouring steps. Also the subdivision factor of
        /// the polygon grid.
        multiplier: u32,
        #[serde(rename = "stepNum")]
        step_num: u32,
    },
    Customized { steps: Vec<f64> },
}

impl StepConfig {
    pub fn exponential(base: f64, multiplier: u32, step_num: u32) -> Self {
        StepConfig::Exponential { base, multiplier, step_num }
    }

    pub fn customized(steps: impl Into<Vec<f64>>) -> Self {
        StepConfig::Customized { steps: steps.into() }
    }

    pub fn is_exponential(&self) -> bool {
        matches!(self, StepConfig::Exponential { .. })
    }
}

/// Validated, descending list of step sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct StepSchedule {
    steps: Vec<f64>,
    multiplier: Option<u32>,
}

impl StepSchedule {
    pub fn from_config(config: &StepConfig) -> Result<Self> {
        let schedule = match config {
            StepConfig::Exponential { base, multiplier, step_num } => {
                exponential_steps(*base, *multiplier, *step_num)?
            }
            StepConfig::Customized { steps } => customized_steps(steps)?,
        };

        tracing::debug!(
            steps = ?schedule.steps,
            exponential = schedule.multiplier.is_some(),
            "built step schedule"
        );
        Ok(schedule)
    }

    /// Steps, coarsest first.
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    pub fn coarsest(&self) -> f64 {
        self.steps[0]
    }

    pub fn finest(&self) -> f64 {
        self.steps[self.steps.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; construction rejects empty schedules.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Subdivision factor, present only for exponential schedules.
    pub fn multiplier(&self) -> Option<u32> {
        self.multiplier
    }

    pub fn is_exponential(&self) -> bool {
        self.multiplier.is_some()
    }
}

fn exponential_steps(base: f64, multiplier: u32, step_num: u32) -> Result<StepSchedule> {
    if !base.is_finite() || base <= 0.0 {
        return Err(PolytokenError::invalid_argument(format!(
            "step base must be a positive number, got {base}"
        )));
    }
    if multiplier < 1 {
        return Err(PolytokenError::invalid_argument(
            "step multiplier must be an integer >= 1",
        ));
    }
    if step_num < 1 {
        return Err(PolytokenError::invalid_argument("stepNum must be >= 1"));
    }

    let ratio = f64::from(multiplier);
    let mut steps = Vec::with_capacity(step_num as usize);
    for i in (0..step_num).rev() {
        let exponent = i32::try_from(i)
            .map_err(|_| PolytokenError::invalid_argument("stepNum is too large"))?;
        let step = round5(base * ratio.powi(exponent));
        if !step.is_finite() {
            return Err(PolytokenError::invalid_argument(format!(
                "step {base} * {multiplier}^{i} overflows"
            )));
        }
        steps.push(step);
    }

    Ok(StepSchedule { steps, multiplier: Some(multiplier) })
}

fn customized_steps(steps: &[f64]) -> Result<StepSchedule> {
    if steps.is_empty() {
        return Err(PolytokenError::invalid_argument(
            "customized steps must not be empty",
        ));
    }
    if let Some(bad) = steps.iter().find(|s| !s.is_finite() || **s <= 0.0) {
        return Err(PolytokenError::invalid_argument(format!(
            "customized steps must be positive numbers, got {bad}"
        )));
    }

    let mut steps = steps.to_vec();
    steps.sort_by(|a, b| b.total_cmp(a));
    Ok(StepSchedule { steps, multiplier: None })
}
