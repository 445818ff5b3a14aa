//! Five-significant-digit rounding.
//!
//! Slopes, intercepts, intersection coordinates and grid-cell coordinates all
//! go through [`round5`] before they are compared or formatted. Two tokens that
//! denote the same cell must be byte-identical, and repeated classification of
//! the same geometry must give the same answer, so there is exactly one
//! rounding rule and every arithmetic boundary uses it.

const SCALE: f64 = 100_000.0;

/// Round to five decimal places. Integers and non-finite values pass through.
///
/// Idempotent: `round5(round5(x)) == round5(x)`.
#[inline]
pub fn round5(value: f64) -> f64 {
    if !value.is_finite() || value.fract() == 0.0 {
        return value;
    }
    let rounded = (value * SCALE).round() / SCALE;
    // (-0.00000001 * SCALE).round() is -0.0
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Rounded equality.
#[inline]
pub fn same(a: f64, b: f64) -> bool {
    round5(a) == round5(b)
}

/// Largest multiple of `step` that is `<= value`.
#[inline]
pub fn floor_to_step(value: f64, step: f64) -> f64 {
    round5(round5(value / step).floor() * step)
}

/// Smallest multiple of `step` that is `>= value`.
#[inline]
pub fn ceil_to_step(value: f64, step: f64) -> f64 {
    round5(round5(value / step).ceil() * step)
}

/// Format a coordinate for embedding in a token string.
///
/// Rounds first, prints integers without a fractional part and never
/// prints negative zero.
pub fn format_coordinate(value: f64) -> String {
    let rounded = round5(value);
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{}", rounded)
}
