//! The built-in dimensions.
//!
//! Each kind implements [`Dimension`] and also exposes a typed API.

mod long_lat;
mod long_lat_radius;
mod numeric;
mod time;

pub use long_lat::LongLatDimension;
pub use long_lat_radius::{Circle, LongLatRadiusDimension};
pub use numeric::NumericDimension;
pub use time::{TimeDimension, parse_date, parse_millis};

use crate::dimension::{Dimension, TokenConfig};
use crate::error::Result;

/// Available dimension kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    Numeric,
    Time,
    LongLat,
    LongLatRadius,
}

impl DimensionKind {
    /// Get all built-in kinds.
    pub fn all() -> &'static [DimensionKind] {
        &[
            DimensionKind::Numeric,
            DimensionKind::Time,
            DimensionKind::LongLat,
            DimensionKind::LongLatRadius,
        ]
    }

    /// Registry name, also the default dimension name.
    pub fn name(&self) -> &'static str {
        match self {
            DimensionKind::Numeric => NumericDimension::DEFAULT_NAME,
            DimensionKind::Time => TimeDimension::DEFAULT_NAME,
            DimensionKind::LongLat => LongLatDimension::DEFAULT_NAME,
            DimensionKind::LongLatRadius => LongLatRadiusDimension::DEFAULT_NAME,
        }
    }

    /// Parse kind from its registry name.
    pub fn from_name(name: &str) -> Option<DimensionKind> {
        Self::all().iter().copied().find(|kind| kind.name() == name)
    }

    /// Whether the kind only accepts exponential step configurations.
    pub fn needs_exponential_steps(&self) -> bool {
        matches!(self, DimensionKind::LongLat | DimensionKind::LongLatRadius)
    }

    /// Build a dimension of this kind.
    pub fn build(&self, config: &TokenConfig) -> Result<Box<dyn Dimension>> {
        Ok(match self {
            DimensionKind::Numeric => Box::new(NumericDimension::new(config)?),
            DimensionKind::Time => Box::new(TimeDimension::new(config)?),
            DimensionKind::LongLat => Box::new(LongLatDimension::new(config)?),
            DimensionKind::LongLatRadius => Box::new(LongLatRadiusDimension::new(config)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn names_round_trip() {
        for kind in DimensionKind::all() {
            assert_eq!(DimensionKind::from_name(kind.name()), Some(*kind));
        }
        assert_eq!(DimensionKind::from_name("numeric"), None);
    }

    #[test]
    fn builds_each_kind() {
        let config = TokenConfig::exponential(2.0, 2, 4);
        for kind in DimensionKind::all() {
            let dimension = kind.build(&config).unwrap();
            assert_eq!(dimension.name(), kind.name());
            assert_eq!(dimension.steps(), &[16.0, 8.0, 4.0, 2.0]);
        }
    }

    #[test]
    fn geographic_kinds_reject_customized_steps() {
        let config = TokenConfig::customized(vec![10.0, 1.0]);
        for kind in DimensionKind::all() {
            let built = kind.build(&config);
            if kind.needs_exponential_steps() {
                assert_eq!(built.err().map(|e| e.kind()), Some(ErrorKind::InvalidArgument));
            } else {
                assert!(built.is_ok());
            }
        }
    }
}
