use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::GuardedFn;
use log::debug;
use std::collections::HashMap;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Closed-form heating load formulas found by symbolic regression. Each formula is written
/// over its own local variables x0, x1, ... which are bound to positions of the feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum FormulaVariant {
    /// 3.090366*sqrt(1 - 0.104708072692815*glazing_area^4), root argument floored at 0
    QuarticRoot,
    /// 3.3015666 - 0.30122823*glazing_area^4
    QuarticPolynomial,
    /// roof_area + 28.24*(compactness*orientation - 2.37)^2 + 0.84/(surface_area + 0.54)
    CompactnessRational,
    /// linear approximation 2.8 - 0.2*glazing_area
    LinearGlazing,
}

impl FormulaVariant {
    pub fn from_name(name: &str) -> EvaluatorResult<FormulaVariant> {
        FormulaVariant::from_str(name.trim())
            .map_err(|_| EvaluatorError::configuration(format!("unknown formula variant '{}'", name)))
    }

    /// formula text over the local variables
    pub fn expression_str(&self) -> &'static str {
        match self {
            FormulaVariant::QuarticRoot => "3.090366*sqrt(1 - 0.104708072692815*x6^4)",
            FormulaVariant::QuarticPolynomial => "3.3015666 - 0.30122823*x6^4",
            FormulaVariant::CompactnessRational => {
                "x2 + 28.24*(x0*x3 - 2.37)^2 + 0.84/(x1 + 0.54)"
            }
            FormulaVariant::LinearGlazing => "2.8 - 0.2*x6",
        }
    }

    /// local variable name -> feature it reads
    pub fn bindings(&self) -> Vec<(&'static str, FeatureIndex)> {
        match self {
            FormulaVariant::QuarticRoot
            | FormulaVariant::QuarticPolynomial
            | FormulaVariant::LinearGlazing => vec![("x6", FeatureIndex::GlazingArea)],
            FormulaVariant::CompactnessRational => vec![
                ("x0", FeatureIndex::RelativeCompactness),
                ("x1", FeatureIndex::SurfaceArea),
                ("x2", FeatureIndex::RoofArea),
                ("x3", FeatureIndex::Orientation),
            ],
        }
    }

    /// features the formula depends on
    pub fn features(&self) -> Vec<FeatureIndex> {
        self.bindings().into_iter().map(|(_, f)| f).collect()
    }

    /// parses the formula and checks that it only references bound variables
    pub fn setup(&self) -> EvaluatorResult<Expr> {
        let expr = Expr::parse_expression(self.expression_str()).map_err(|e| {
            EvaluatorError::configuration(format!("formula {} does not parse: {}", self, e))
        })?;
        let bound: Vec<&str> = self.bindings().iter().map(|(name, _)| *name).collect();
        for var in expr.all_arguments_are_variables() {
            if !bound.contains(&var.as_str()) {
                return Err(EvaluatorError::configuration(format!(
                    "formula {} references unbound variable {}",
                    self, var
                )));
            }
        }
        Ok(expr)
    }

    /// the formula with feature labels in place of local variables, for display
    pub fn equation_string(&self) -> EvaluatorResult<String> {
        let expr = self.setup()?;
        let names: HashMap<String, String> = self
            .bindings()
            .into_iter()
            .map(|(name, feature)| (name.to_string(), feature.label().to_string()))
            .collect();
        Ok(expr.rename_variables(&names).to_string())
    }

    pub fn compile(&self) -> EvaluatorResult<CompiledFormula> {
        let expr = self.setup()?;
        let bindings = self.bindings();
        let names: Vec<&str> = bindings.iter().map(|(name, _)| *name).collect();
        let function = expr
            .lambdify_guarded(&names)
            .map_err(EvaluatorError::Configuration)?;
        debug!("compiled formula {}: {}", self, expr);
        Ok(CompiledFormula {
            variant: *self,
            features: bindings.into_iter().map(|(_, f)| f).collect(),
            function,
        })
    }
}

/// A formula turned into a guarded closure together with the feature positions it reads.
pub struct CompiledFormula {
    variant: FormulaVariant,
    features: Vec<FeatureIndex>,
    function: GuardedFn,
}

impl CompiledFormula {
    pub fn variant(&self) -> FormulaVariant {
        self.variant
    }

    pub fn evaluate(&self, features: &FeatureVector) -> EvaluatorResult<f64> {
        let args = features.select(&self.features);
        let value = (self.function)(&args)?;
        if !value.is_finite() {
            return Err(EvaluatorError::Domain {
                expression: self.variant.expression_str().to_string(),
                detail: format!("non-finite result {} for {:?}", value, args),
            });
        }
        Ok(value)
    }
}
