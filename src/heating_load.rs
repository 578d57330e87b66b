#![allow(non_snake_case)]
//! Heating load prediction from 8 building parameters with closed-form formulas found by
//! symbolic regression, or with a pre-trained model behind the same interface.
//!# Example
//! ```
//! use RustedHeatLoad::heating_load::evaluator::FormulaEvaluator;
//! use RustedHeatLoad::heating_load::features::{FeatureIndex, FeatureVector};
//! use RustedHeatLoad::heating_load::formula::FormulaVariant;
//! let evaluator = FormulaEvaluator::new();
//! let features = FeatureVector::defaults().with(FeatureIndex::GlazingArea, 0.2);
//! let load = evaluator.evaluate_point(&features, FormulaVariant::QuarticRoot).unwrap();
//! assert!((load - 3.0901).abs() < 1e-3);
//! let sweep = evaluator
//!     .evaluate_sweep(&features, FormulaVariant::QuarticRoot, FeatureIndex::GlazingArea, (0.0, 0.4), 1000)
//!     .unwrap();
//! let (best_glazing, _min_load) = evaluator.find_minimum(&sweep).unwrap();
//! assert!((best_glazing - 0.4).abs() < 1e-6);
//! ```

/// error enum shared by the whole module
pub mod errors;
/// feature names, positions, recognized ranges and the immutable feature vector
pub mod features;
/// the closed-form formulas and their compilation into guarded closures
pub mod formula;
/// point, sweep, grid evaluation and argmin over a sweep
pub mod evaluator;
/// PredictionSource trait: closed-form formulas and learned models behind one interface
///# Example
/// ```
/// use RustedHeatLoad::heating_load::features::FeatureVector;
/// use RustedHeatLoad::heating_load::prediction::{LearnedModelSource, LinearModel, PredictionSource};
/// let source = LearnedModelSource::from_names(
///     "linear",
///     Box::new(LinearModel::new(2.8, vec![-0.2])),
///     &["glazing_area"],
/// )
/// .unwrap();
/// assert!((source.predict(&FeatureVector::defaults()).unwrap() - 2.76).abs() < 1e-12);
/// ```
pub mod prediction;
/// side by side comparison of sources and brute force optimization along one axis
pub mod comparison;
/// configuration of one interaction cycle read from a task document
pub mod session;
/// synthetic training dataset
pub mod dataset;
