use crate::Utils::task_parser::TaskDocument;
use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::heating_load::formula::{CompiledFormula, FormulaVariant};
use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use log::info;
use nalgebra::DVector;
use std::path::Path;

/// Anything that maps a complete feature vector to a heating load.
#[enum_dispatch]
pub trait PredictionSource {
    fn predict(&self, features: &FeatureVector) -> EvaluatorResult<f64>;
    fn name(&self) -> String;
}

////////////////////////////////////////////////////////////////
//  CLOSED FORM
////////////////////////////////////////////////////////////////
pub struct ClosedFormSource {
    compiled: CompiledFormula,
}

impl ClosedFormSource {
    pub fn new(variant: FormulaVariant) -> EvaluatorResult<Self> {
        Ok(Self {
            compiled: variant.compile()?,
        })
    }

    pub fn variant(&self) -> FormulaVariant {
        self.compiled.variant()
    }
}

impl PredictionSource for ClosedFormSource {
    fn predict(&self, features: &FeatureVector) -> EvaluatorResult<f64> {
        self.compiled.evaluate(features)
    }

    fn name(&self) -> String {
        self.compiled.variant().to_string()
    }
}

////////////////////////////////////////////////////////////////
//  LEARNED MODEL
////////////////////////////////////////////////////////////////
/// Prediction contract of a pre-trained model: one output from inputs in the model's own
/// feature order.
pub trait LearnedModel: Send + Sync {
    fn predict(&self, inputs: &[f64]) -> f64;
    /// number of inputs the model was trained on
    fn n_inputs(&self) -> usize;
    fn describe(&self) -> String;
}

/// intercept + sum(coef_i * x_i)
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: DVector<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients: DVector::from_vec(coefficients),
        }
    }
}

impl LearnedModel for LinearModel {
    fn predict(&self, inputs: &[f64]) -> f64 {
        let x = DVector::from_column_slice(inputs);
        self.intercept + self.coefficients.dot(&x)
    }

    fn n_inputs(&self) -> usize {
        self.coefficients.len()
    }

    fn describe(&self) -> String {
        format!(
            "linear model, intercept {}, {} coefficients",
            self.intercept,
            self.coefficients.len()
        )
    }
}

/// Adapter from a loaded model to `PredictionSource`: picks the features the model expects,
/// in the order it expects them.
pub struct LearnedModelSource {
    label: String,
    model: Box<dyn LearnedModel>,
    ordering: Vec<FeatureIndex>,
}

impl LearnedModelSource {
    /// the ordering must be non-empty, without repeats, and match the model's input count
    pub fn new(
        label: &str,
        model: Box<dyn LearnedModel>,
        ordering: Vec<FeatureIndex>,
    ) -> EvaluatorResult<Self> {
        if ordering.is_empty() {
            return Err(EvaluatorError::configuration(
                "learned model feature ordering is empty",
            ));
        }
        if let Some(feature) = ordering.iter().duplicates().next() {
            return Err(EvaluatorError::configuration(format!(
                "feature '{}' appears twice in the learned model ordering",
                feature
            )));
        }
        if ordering.len() != model.n_inputs() {
            return Err(EvaluatorError::configuration(format!(
                "learned model expects {} inputs, ordering names {} features",
                model.n_inputs(),
                ordering.len()
            )));
        }
        Ok(Self {
            label: label.to_string(),
            model,
            ordering,
        })
    }

    /// same as `new` with the ordering given by feature names
    pub fn from_names(
        label: &str,
        model: Box<dyn LearnedModel>,
        names: &[&str],
    ) -> EvaluatorResult<Self> {
        let ordering = names
            .iter()
            .map(|name| FeatureIndex::from_name(name))
            .collect::<EvaluatorResult<Vec<FeatureIndex>>>()?;
        Self::new(label, model, ordering)
    }

    /// Reads a linear model bundle from the `model` section of a task document:
    /// ```text
    /// model
    ///   name: linear_glazing
    ///   features: glazing_area
    ///   coefficients: -0.2
    ///   intercept: 2.8
    /// ```
    pub fn from_document(doc: &TaskDocument) -> EvaluatorResult<Self> {
        let section = "model";
        if !doc.has_section(section) {
            return Err(EvaluatorError::configuration("no 'model' section in document"));
        }
        let label = doc
            .string(section, "name")
            .map_err(EvaluatorError::Configuration)?
            .unwrap_or_else(|| "learned_model".to_string());
        let names = doc
            .strings(section, "features")
            .ok_or_else(|| EvaluatorError::configuration("model section has no 'features'"))?;
        let coefficients = doc
            .floats(section, "coefficients")
            .map_err(EvaluatorError::Configuration)?
            .ok_or_else(|| EvaluatorError::configuration("model section has no 'coefficients'"))?;
        let intercept = doc
            .float(section, "intercept")
            .map_err(EvaluatorError::Configuration)?
            .unwrap_or(0.0);
        let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let source = Self::from_names(
            &label,
            Box::new(LinearModel::new(intercept, coefficients)),
            &names,
        )?;
        info!("loaded {}: {}", source.label, source.model.describe());
        Ok(source)
    }

    pub fn load(path: &Path) -> EvaluatorResult<Self> {
        let doc = TaskDocument::from_file(path).map_err(EvaluatorError::Configuration)?;
        Self::from_document(&doc)
    }

    pub fn ordering(&self) -> &[FeatureIndex] {
        &self.ordering
    }
}

impl PredictionSource for LearnedModelSource {
    fn predict(&self, features: &FeatureVector) -> EvaluatorResult<f64> {
        let inputs = features.select(&self.ordering);
        let value = self.model.predict(&inputs);
        if !value.is_finite() {
            return Err(EvaluatorError::Domain {
                expression: self.label.clone(),
                detail: format!("model returned non-finite value {}", value),
            });
        }
        Ok(value)
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}

/// Static dispatch over the available prediction sources
#[enum_dispatch(PredictionSource)]
pub enum PredictionSourceEnum {
    ClosedForm(ClosedFormSource),
    Learned(LearnedModelSource),
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_glazing_model() -> LearnedModelSource {
        LearnedModelSource::from_names(
            "linear",
            Box::new(LinearModel::new(2.8, vec![-0.2])),
            &["glazing_area"],
        )
        .unwrap()
    }

    #[test]
    fn test_closed_form_source() {
        let source = ClosedFormSource::new(FormulaVariant::QuarticRoot).unwrap();
        assert_eq!(source.name(), "quartic_root");
        assert_eq!(source.variant(), FormulaVariant::QuarticRoot);
        let value = source.predict(&FeatureVector::defaults()).unwrap();
        assert_relative_eq!(value, 3.0901, epsilon = 1e-3);
    }

    #[test]
    fn test_learned_source_matches_linear_formula() {
        let learned = linear_glazing_model();
        let closed = ClosedFormSource::new(FormulaVariant::LinearGlazing).unwrap();
        for g in [0.0, 0.1, 0.25, 0.4] {
            let features = FeatureVector::defaults().with(FeatureIndex::GlazingArea, g);
            assert_relative_eq!(
                learned.predict(&features).unwrap(),
                closed.predict(&features).unwrap(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_learned_source_reorders_features() {
        // model trained on (surface_area, relative_compactness)
        let source = LearnedModelSource::from_names(
            "two_inputs",
            Box::new(LinearModel::new(0.0, vec![1.0, 1000.0])),
            &["surface_area", "relative_compactness"],
        )
        .unwrap();
        let value = source.predict(&FeatureVector::defaults()).unwrap();
        assert_relative_eq!(value, 700.0 + 800.0, epsilon = 1e-9);
        assert_eq!(
            source.ordering(),
            &[FeatureIndex::SurfaceArea, FeatureIndex::RelativeCompactness]
        );
    }

    #[test]
    fn test_learned_source_ordering_errors() {
        let unknown = LearnedModelSource::from_names(
            "bad",
            Box::new(LinearModel::new(0.0, vec![1.0])),
            &["window_area"],
        );
        assert!(matches!(unknown, Err(EvaluatorError::Configuration(_))));
        let repeated = LearnedModelSource::from_names(
            "bad",
            Box::new(LinearModel::new(0.0, vec![1.0, 1.0])),
            &["height", "height"],
        );
        assert!(matches!(repeated, Err(EvaluatorError::Configuration(_))));
        let mismatch = LearnedModelSource::from_names(
            "bad",
            Box::new(LinearModel::new(0.0, vec![1.0, 1.0])),
            &["height"],
        );
        assert!(matches!(mismatch, Err(EvaluatorError::Configuration(_))));
    }

    #[test]
    fn test_enum_dispatch() {
        let sources: Vec<PredictionSourceEnum> = vec![
            ClosedFormSource::new(FormulaVariant::QuarticPolynomial)
                .unwrap()
                .into(),
            linear_glazing_model().into(),
        ];
        let features = FeatureVector::defaults();
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["quartic_polynomial", "linear"]);
        assert_relative_eq!(sources[0].predict(&features).unwrap(), 3.301084634832, epsilon = 1e-9);
        assert_relative_eq!(sources[1].predict(&features).unwrap(), 2.76, epsilon = 1e-12);
    }

    #[test]
    fn test_from_document() {
        let doc = TaskDocument::parse(
            "model\n  name: glazing_fit\n  features: glazing_area, height\n  coefficients: -0.2, 0.1\n  intercept: 2.8\n",
        )
        .unwrap();
        let source = LearnedModelSource::from_document(&doc).unwrap();
        assert_eq!(source.name(), "glazing_fit");
        let value = source.predict(&FeatureVector::defaults()).unwrap();
        assert_relative_eq!(value, 2.8 - 0.04 + 0.5, epsilon = 1e-12);

        let doc = TaskDocument::parse("model\n  features: glazing_area\n").unwrap();
        assert!(LearnedModelSource::from_document(&doc).is_err());
        let doc = TaskDocument::parse("source\n  kind: learned\n").unwrap();
        assert!(LearnedModelSource::from_document(&doc).is_err());
    }
}
