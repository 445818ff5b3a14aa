//! Coverage and membership properties of numeric range tokens.

use polytoken::{Dimension, NumericDimension, Token, TokenConfig};
use proptest::prelude::*;
use serde_json::json;

fn base_two() -> NumericDimension {
    NumericDimension::new(&TokenConfig::exponential(2.0, 2, 8)).unwrap()
}

fn base_three() -> NumericDimension {
    NumericDimension::new(&TokenConfig::exponential(3.0, 3, 4)).unwrap()
}

/// The half-open interval `[start, start + step)` a scalar token names.
fn interval(token: &Token) -> (f64, f64) {
    let (start, step) = token.as_str().split_once('^').unwrap();
    let start: f64 = start.parse().unwrap();
    let step: f64 = step.parse().unwrap();
    (start, start + step)
}

fn covered(tokens: &[Token], p: f64) -> bool {
    tokens.iter().map(interval).any(|(lo, hi)| lo <= p && p < hi)
}

#[test]
fn point_inside_range_shares_a_token() {
    let dim = base_two();
    let range = dim.range_tokens(&json!([2, 6])).unwrap();
    let point = dim.point_tokens(&json!(3.7)).unwrap();
    let shared: Vec<&str> = point
        .iter()
        .filter(|t| range.contains(t))
        .map(Token::as_str)
        .collect();
    assert_eq!(shared, vec!["2^2"]);
}

#[test]
fn point_outside_range_shares_nothing() {
    let dim = base_two();
    let range = dim.range_tokens(&json!([2, 6])).unwrap();
    let point = dim.point_tokens(&json!(6.5)).unwrap();
    assert!(!point.iter().any(|t| range.contains(t)));
}

#[test]
fn negative_ranges() {
    let dim = base_two();
    let tokens = dim.range_tokens(&json!([-8, -2])).unwrap();
    let strs: Vec<&str> = tokens.iter().map(Token::as_str).collect();
    assert_eq!(strs, vec!["-8^4", "-4^2"]);
}

#[test]
fn custom_name_in_messages() {
    let dim = NumericDimension::with_name("price", &TokenConfig::customized(vec![10.0, 1.0]))
        .unwrap();
    let err = dim.range_tokens(&json!({ "min": 1 })).unwrap_err();
    assert_eq!(err.to_string(), "invalid range: Range of price dimension should be an array");
}

proptest! {
    #[test]
    fn range_tokens_cover_every_point(
        start in -100_000i32..100_000,
        len in 1i32..50_000,
        offsets in prop::collection::vec(0.0f64..1.0, 1..16),
    ) {
        let min = f64::from(start) / 100.0;
        let max = f64::from(start + len) / 100.0;
        for dim in [base_two(), base_three()] {
            let tokens = dim.tokens_for_range(min, max).unwrap();
            prop_assert!(!tokens.is_empty());
            prop_assert!(covered(&tokens, min));
            for offset in &offsets {
                let k = (offset * f64::from(len)).floor() as i32;
                let p = f64::from(start + k.min(len - 1)) / 100.0;
                prop_assert!(covered(&tokens, p), "{} not covered in [{}, {}]", p, min, max);
            }
        }
    }

    #[test]
    fn contained_points_share_a_token(
        start in -100_000i32..100_000,
        len in 1i32..50_000,
        offset in 0.0f64..1.0,
    ) {
        let min = f64::from(start) / 100.0;
        let max = f64::from(start + len) / 100.0;
        let k = ((offset * f64::from(len)).floor() as i32).min(len - 1);
        let p = f64::from(start + k) / 100.0;

        let dim = base_two();
        let range = dim.tokens_for_range(min, max).unwrap();
        let point = dim.tokens_for_point(p).unwrap();
        prop_assert!(NumericDimension::contains(min, max, p));
        prop_assert!(point.iter().any(|t| range.contains(t)), "{} in [{}, {}]", p, min, max);
    }

    #[test]
    fn tokens_are_unique(start in -10_000i32..10_000, len in 1i32..10_000) {
        let dim = base_two();
        let tokens = dim.tokens_for_range(f64::from(start), f64::from(start + len)).unwrap();
        let mut sorted = tokens.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), tokens.len());
    }
}
