use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// number of building parameters in a feature vector
pub const N_FEATURES: usize = 8;

/// Positions of the building parameters in a feature vector. The order is the one the
/// regression formulas were fitted with and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FeatureIndex {
    RelativeCompactness,
    SurfaceArea,
    WallArea,
    RoofArea,
    Height,
    Orientation,
    GlazingArea,
    GlazingDistribution,
}

impl FeatureIndex {
    pub fn position(&self) -> usize {
        *self as usize
    }

    pub fn from_position(position: usize) -> Option<FeatureIndex> {
        FeatureIndex::iter().nth(position)
    }

    /// parses a snake_case feature name, an unknown name is a configuration error
    pub fn from_name(name: &str) -> EvaluatorResult<FeatureIndex> {
        FeatureIndex::from_str(name.trim())
            .map_err(|_| EvaluatorError::configuration(format!("unknown feature '{}'", name)))
    }

    /// human readable name used for plot axes and tables
    pub fn label(&self) -> &'static str {
        match self {
            FeatureIndex::RelativeCompactness => "Relative Compactness",
            FeatureIndex::SurfaceArea => "Surface Area",
            FeatureIndex::WallArea => "Wall Area",
            FeatureIndex::RoofArea => "Roof Area",
            FeatureIndex::Height => "Overall Height",
            FeatureIndex::Orientation => "Orientation",
            FeatureIndex::GlazingArea => "Glazing Area",
            FeatureIndex::GlazingDistribution => "Glazing Area Distribution",
        }
    }

    /// recognized input range (low, high); the input layer constrains values to it,
    /// the evaluator does not enforce it
    pub fn range(&self) -> (f64, f64) {
        match self {
            FeatureIndex::RelativeCompactness => (0.6, 1.0),
            FeatureIndex::SurfaceArea => (500.0, 900.0),
            FeatureIndex::WallArea => (200.0, 400.0),
            FeatureIndex::RoofArea => (100.0, 300.0),
            FeatureIndex::Height => (3.0, 7.0),
            FeatureIndex::Orientation => (2.0, 5.0),
            FeatureIndex::GlazingArea => (0.0, 0.4),
            FeatureIndex::GlazingDistribution => (0.0, 5.0),
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            FeatureIndex::RelativeCompactness => 0.8,
            FeatureIndex::SurfaceArea => 700.0,
            FeatureIndex::WallArea => 300.0,
            FeatureIndex::RoofArea => 200.0,
            FeatureIndex::Height => 5.0,
            FeatureIndex::Orientation => 3.0,
            FeatureIndex::GlazingArea => 0.2,
            FeatureIndex::GlazingDistribution => 2.0,
        }
    }
}

/// Complete, ordered set of the 8 building parameters. Immutable: `with` returns a new vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; N_FEATURES],
}

impl FeatureVector {
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self { values }
    }

    /// default input values of the demo
    pub fn defaults() -> Self {
        let mut values = [0.0; N_FEATURES];
        for feature in FeatureIndex::iter() {
            values[feature.position()] = feature.default_value();
        }
        Self { values }
    }

    /// builds a vector from values in feature order; the wrong number of entries or a
    /// non-finite entry is a configuration error, never silently defaulted
    pub fn from_slice(values: &[f64]) -> EvaluatorResult<Self> {
        if values.len() != N_FEATURES {
            return Err(EvaluatorError::configuration(format!(
                "expected {} features, got {}",
                N_FEATURES,
                values.len()
            )));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(EvaluatorError::configuration(format!(
                "feature {} is not a finite number: {}",
                FeatureIndex::from_position(pos).map_or_else(|| pos.to_string(), |f| f.to_string()),
                values[pos]
            )));
        }
        let mut array = [0.0; N_FEATURES];
        array.copy_from_slice(values);
        Ok(Self { values: array })
    }

    /// builds a vector from a name -> value map which must name every feature exactly
    pub fn from_named(named: &HashMap<String, f64>) -> EvaluatorResult<Self> {
        for name in named.keys() {
            FeatureIndex::from_name(name)?;
        }
        let mut values = Vec::with_capacity(N_FEATURES);
        for feature in FeatureIndex::iter() {
            let value = named.get(&feature.to_string()).ok_or_else(|| {
                EvaluatorError::configuration(format!("missing feature '{}'", feature))
            })?;
            values.push(*value);
        }
        Self::from_slice(&values)
    }

    pub fn get(&self, feature: FeatureIndex) -> f64 {
        self.values[feature.position()]
    }

    /// copy of the vector with one entry replaced
    pub fn with(&self, feature: FeatureIndex, value: f64) -> Self {
        let mut values = self.values;
        values[feature.position()] = value;
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// values of the given features, in the given order
    pub fn select(&self, features: &[FeatureIndex]) -> Vec<f64> {
        features.iter().map(|f| self.get(*f)).collect()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = FeatureIndex::iter()
            .map(|feature| format!("{}={}", feature, self.get(feature)))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
