//! Name-to-constructor registry.
//!
//! ```json
//! [
//!   { "name": "Numeric", "tokenConfig": { "step": { "type": "exponential", "base": 2, "multiplier": 2, "stepNum": 8 } } },
//!   { "name": "LongLat", "tokenConfig": { "step": { "type": "exponential", "base": 2, "multiplier": 2, "stepNum": 8 } } }
//! ]
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dimension::{Dimension, TokenConfig};
use crate::dimensions::DimensionKind;
use crate::error::{PolytokenError, Result};
use crate::polytype::Polytype;

/// Builds a dimension from its token config.
pub type Constructor = Box<dyn Fn(&TokenConfig) -> Result<Box<dyn Dimension>> + Send + Sync>;

/// One entry of a polytype description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    #[serde(rename = "tokenConfig")]
    pub token_config: TokenConfig,
}

impl DimensionSpec {
    pub fn new(name: impl Into<String>, token_config: TokenConfig) -> Self {
        Self { name: name.into(), token_config }
    }
}

/// Registry of dimension constructors, keyed by name.
pub struct Polytoken {
    constructors: HashMap<String, Constructor>,
}

impl Default for Polytoken {
    fn default() -> Self {
        Self::new()
    }
}

impl Polytoken {
    /// Registry with every [`DimensionKind`] registered under its name.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for &kind in DimensionKind::all() {
            registry.register(kind.name(), move |config| kind.build(config));
        }
        registry
    }

    pub fn empty() -> Self {
        Self { constructors: HashMap::new() }
    }

    /// Register `constructor` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&TokenConfig) -> Result<Box<dyn Dimension>> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(%name, "registered dimension");
        self.constructors.insert(name, Box::new(constructor));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create_dimension(&self, spec: &DimensionSpec) -> Result<Box<dyn Dimension>> {
        let constructor = self.constructors.get(&spec.name).ok_or_else(|| {
            PolytokenError::invalid_argument(format!("Invalid dimension specified: {}", spec.name))
        })?;
        constructor(&spec.token_config)
    }

    pub fn create_polytype(&self, specs: &[DimensionSpec]) -> Result<Polytype> {
        let dimensions = specs
            .iter()
            .map(|spec| self.create_dimension(spec))
            .collect::<Result<Vec<_>>>()?;
        Polytype::new(dimensions)
    }

    /// Like [`Polytoken::create_polytype`], from the JSON form.
    pub fn create_polytype_from_json(&self, specs: &Value) -> Result<Polytype> {
        let specs: Vec<DimensionSpec> = serde_json::from_value(specs.clone()).map_err(|e| {
            PolytokenError::invalid_argument(format!("invalid polytype description: {e}"))
        })?;
        self.create_polytype(&specs)
    }
}
