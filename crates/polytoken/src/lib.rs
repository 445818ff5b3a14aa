//! # polytoken
//!
//! Hierarchical range tokens for numbers, timestamps and long/lat geometry.
//!
//! A range (an interval, a polygon, a circle) is turned into a set of tokens,
//! each naming one grid cell at one resolution. A point is turned into the
//! tokens of every cell that holds it. A stored range can then match a point
//! by plain token equality: if the two token sets share an entry, the point
//! may lie in the range, and [`Dimension::range_contains_point`] settles it.
//!
//! ```
//! use polytoken::{Dimension, NumericDimension, TokenConfig};
//! use serde_json::json;
//!
//! let numeric = NumericDimension::new(&TokenConfig::exponential(2.0, 2, 8))?;
//! let range = numeric.range_tokens(&json!([2, 6]))?;
//! let point = numeric.point_tokens(&json!(3.7))?;
//! assert!(point.iter().any(|t| range.contains(t)));
//! # Ok::<(), polytoken::PolytokenError>(())
//! ```
//!
//! Several dimensions combine into a [`Polytype`], usually built through the
//! [`Polytoken`] registry.

pub mod dimension;
pub mod dimensions;
pub mod error;
pub mod geodesy;
pub mod geojson;
pub mod geometry;
pub mod grid;
pub mod intersect;
pub mod polytype;
pub mod precision;
pub mod registry;
pub mod step;
pub mod token;

// Re-export common types at crate root for convenience.
pub use dimension::{Dimension, TokenConfig};
pub use dimensions::{
    Circle, DimensionKind, LongLatDimension, LongLatRadiusDimension, NumericDimension,
    TimeDimension,
};
pub use error::{ErrorKind, GeometryError, PolytokenError, Result};
pub use geojson::Area;
pub use geometry::{BoundingBox, Line, Point, Polygon};
pub use intersect::{PointState, RingState, point_in_polygon, point_in_ring, rings_state};
pub use polytype::Polytype;
pub use precision::round5;
pub use registry::{DimensionSpec, Polytoken};
pub use step::{StepConfig, StepSchedule};
pub use token::Token;
