//! Mixed-dimension polytypes built through the registry.

use polytoken::{DimensionSpec, ErrorKind, Polytoken, Polytype, TokenConfig};
use serde_json::{Value, json};

fn price_and_place() -> Polytype {
    Polytoken::new()
        .create_polytype(&[
            DimensionSpec::new("Numeric", TokenConfig::exponential(2.0, 2, 8)),
            DimensionSpec::new("LongLat", TokenConfig::exponential(2.0, 2, 8)),
        ])
        .unwrap()
}

fn square() -> Value {
    json!({ "type": "Polygon", "coordinates": [[[0, 0], [0, 32], [32, 32], [32, 0], [0, 0]]] })
}

#[test]
fn compound_tokens_follow_dimension_order() {
    let tokens = price_and_place().range_tokens(&json!([[2, 6], square()])).unwrap();
    let strs: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
    assert_eq!(strs, vec!["4^2&0,32^32", "2^2&0,32^32"]);
}

#[test]
fn matching_point_shares_a_compound_token() {
    let polytype = price_and_place();
    let ranges = json!([[2, 6], square()]);
    let range = polytype.range_tokens(&ranges).unwrap();

    let inside = json!([3.5, [10, 20]]);
    let point = polytype.point_tokens(&inside).unwrap();
    assert!(point.iter().any(|t| range.contains(t)));
    assert!(polytype.range_contains_point(&ranges, &inside).unwrap());

    let wrong_place = json!([3.5, [40, 20]]);
    let point = polytype.point_tokens(&wrong_place).unwrap();
    assert!(!point.iter().any(|t| range.contains(t)));
    assert!(!polytype.range_contains_point(&ranges, &wrong_place).unwrap());
}

#[test]
fn normalizes_each_dimension() {
    let polytype = price_and_place();
    let normalized = polytype.normalize_point(&json!([3, [10, 20]])).unwrap();
    assert_eq!(normalized, json!([3, { "type": "Point", "coordinates": [10.0, 20.0] }]));
}

#[test]
fn built_from_json_description() {
    let polytype = Polytoken::new()
        .create_polytype_from_json(&json!([
            { "name": "Time", "tokenConfig": { "step": { "type": "customized", "steps": [60000, 3600000] } } },
            { "name": "LongLatRadius", "tokenConfig": { "step": { "type": "exponential", "base": 2, "multiplier": 2, "stepNum": 8 } } }
        ]))
        .unwrap();
    let ranges = json!([
        ["2016-01-02T03:00:00Z", "2016-01-02T04:00:00Z"],
        { "point": [-80, 30], "radius": 10000 }
    ]);
    assert_eq!(polytype.range_tokens(&ranges).unwrap().len(), 4);
    assert!(
        polytype
            .range_contains_point(&ranges, &json!(["2016-01-02T03:30:00Z", [-80, 30]]))
            .unwrap()
    );
}

#[test]
fn geographic_dimensions_reject_customized_steps() {
    let err = Polytoken::new()
        .create_polytype(&[DimensionSpec::new("LongLat", TokenConfig::customized(vec![2.0, 1.0]))])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn unknown_dimension_name() {
    let err = Polytoken::new()
        .create_polytype(&[DimensionSpec::new("Elevation", TokenConfig::exponential(2.0, 2, 4))])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(err.to_string().contains("Elevation"));
}
