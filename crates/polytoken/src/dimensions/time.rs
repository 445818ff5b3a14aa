//! Timestamps.
//!
//! Ranges and points are converted to epoch milliseconds and then tokenized
//! exactly like numeric intervals. Accepted inputs:
//!
//! - a JSON number of milliseconds since the epoch
//! - an RFC 3339 string (`2016-01-02T03:05:00Z`, `2016-01-02T03:05:00+01:00`)
//! - `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DDTHH:MM:SS[.fff]`, read as UTC
//! - `YYYY-MM-DD`, read as midnight UTC

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Value, json};

use crate::dimension::{Dimension, TokenConfig};
use crate::dimensions::numeric::{interval_tokens, scalar_point_tokens};
use crate::error::{PolytokenError, Result};
use crate::step::StepSchedule;
use crate::token::{Token, dedup};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Tokenizer for time ranges, in epoch milliseconds.
#[derive(Debug, Clone)]
pub struct TimeDimension {
    name: String,
    schedule: StepSchedule,
}

impl TimeDimension {
    pub const DEFAULT_NAME: &'static str = "Time";

    pub fn new(config: &TokenConfig) -> Result<Self> {
        Self::with_name(Self::DEFAULT_NAME, config)
    }

    pub fn with_name(name: impl Into<String>, config: &TokenConfig) -> Result<Self> {
        Ok(Self { name: name.into(), schedule: config.schedule()? })
    }

    pub fn schedule(&self) -> &StepSchedule {
        &self.schedule
    }

    /// Tokens covering `[begin, end]`.
    pub fn tokens_between(&self, begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Token>> {
        self.tokens_for_millis(begin.timestamp_millis() as f64, end.timestamp_millis() as f64)
    }

    pub fn tokens_at(&self, instant: DateTime<Utc>) -> Vec<Token> {
        scalar_point_tokens(instant.timestamp_millis() as f64, self.schedule.steps())
    }

    fn tokens_for_millis(&self, begin: f64, end: f64) -> Result<Vec<Token>> {
        if end <= begin {
            return Err(PolytokenError::invalid_range(format!(
                "end of {} dimension range must be after its begin",
                self.name
            )));
        }
        let tokens = dedup(interval_tokens(begin, end, self.schedule.steps()));
        tracing::debug!(dimension = %self.name, begin, end, tokens = tokens.len(), "range tokens");
        Ok(tokens)
    }

    fn parse_range(&self, range: &Value) -> Result<(f64, f64)> {
        let items = range
            .as_array()
            .filter(|items| items.len() == 2)
            .ok_or_else(|| {
                PolytokenError::invalid_range(format!(
                    "Range of {} dimension should be an array of two dates",
                    self.name
                ))
            })?;
        let (Some(begin), Some(end)) = (parse_millis(&items[0]), parse_millis(&items[1])) else {
            return Err(PolytokenError::invalid_range(format!(
                "Range of {} dimension should consist of valid dates",
                self.name
            )));
        };
        if end <= begin {
            return Err(PolytokenError::invalid_range(format!(
                "end of {} dimension range must be after its begin",
                self.name
            )));
        }
        Ok((begin, end))
    }

    fn parse_point(&self, point: &Value) -> Result<f64> {
        parse_millis(point).ok_or_else(|| {
            PolytokenError::invalid_point(format!(
                "Point of {} dimension should be a valid date",
                self.name
            ))
        })
    }
}

/// Epoch milliseconds of a JSON date value.
pub fn parse_millis(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|ms| ms.is_finite()),
        Value::String(s) => parse_date(s).map(|dt| dt.timestamp_millis() as f64),
        _ => None,
    }
}

/// Parse a date string in any of the accepted formats.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Integral milliseconds serialize as integers.
fn millis_value(ms: f64) -> Value {
    if ms.fract() == 0.0 && ms.abs() < 9.0e15 {
        json!(ms as i64)
    } else {
        json!(ms)
    }
}

impl Dimension for TimeDimension {
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

    /// `[begin_ms, end_ms]`.
    fn normalize_range(&self, range: &Value) -> Result<Value> {
        let (begin, end) = self.parse_range(range)?;
        Ok(Value::Array(vec![millis_value(begin), millis_value(end)]))
    }

    fn normalize_point(&self, point: &Value) -> Result<Value> {
        Ok(millis_value(self.parse_point(point)?))
    }

    fn range_tokens(&self, range: &Value) -> Result<Vec<Token>> {
        let (begin, end) = self.parse_range(range)?;
        self.tokens_for_millis(begin, end)
    }

    fn point_tokens(&self, point: &Value) -> Result<Vec<Token>> {
        Ok(scalar_point_tokens(self.parse_point(point)?, self.schedule.steps()))
    }

    fn range_contains_point(&self, range: &Value, point: &Value) -> Result<bool> {
        let (begin, end) = self.parse_range(range)?;
        let at = self.parse_point(point)?;
        Ok(at >= begin && at <= end)
    }
}
