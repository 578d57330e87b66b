use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::evaluator::{FormulaEvaluator, SweepResult};
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::heating_load::prediction::PredictionSource;
use log::info;
use std::fmt;
use tabled::{builder::Builder, settings::Style};

/// number of samples of the brute force optimization
pub const OPTIMIZATION_SAMPLES: usize = 1000;

/// one row of the source comparison table
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub name: String,
    pub prediction: f64,
    pub difference: f64,
}

/// Evaluates every source at the same point. The difference column is taken against the
/// first source.
pub fn compare_sources<S: PredictionSource>(
    features: &FeatureVector,
    sources: &[S],
) -> EvaluatorResult<Vec<ComparisonRow>> {
    let Some(reference) = sources.first() else {
        return Err(EvaluatorError::configuration("no prediction sources to compare"));
    };
    let reference_value = reference.predict(features)?;
    let mut rows = Vec::with_capacity(sources.len());
    for source in sources {
        let prediction = source.predict(features)?;
        rows.push(ComparisonRow {
            name: source.name(),
            prediction,
            difference: prediction - reference_value,
        });
    }
    Ok(rows)
}

/// rows printed with 4 decimals
pub fn comparison_table(rows: &[ComparisonRow]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["source", "prediction", "difference"]);
    for row in rows {
        builder.push_record([
            row.name.clone(),
            format!("{:.4}", row.prediction),
            format!("{:+.4}", row.difference),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

/// Result of minimizing the heating load along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationReport {
    pub source: String,
    pub axis: FeatureIndex,
    pub optimal_input: f64,
    pub minimal_output: f64,
    pub sweep: SweepResult,
}

impl fmt::Display for OptimizationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Optimal {}: {:.4}, minimum heating load: {:.4} ({})",
            self.axis.label(),
            self.optimal_input,
            self.minimal_output,
            self.source
        )
    }
}

/// sweep + argmin along `axis`, all other features fixed
pub fn optimize_axis<S: PredictionSource + ?Sized>(
    features: &FeatureVector,
    source: &S,
    axis: FeatureIndex,
    range: (f64, f64),
    count: usize,
) -> EvaluatorResult<OptimizationReport> {
    let evaluator = FormulaEvaluator::new();
    let sweep = evaluator.evaluate_sweep_with(features, source, axis, range, count)?;
    let (optimal_input, minimal_output) = evaluator.find_minimum(&sweep)?;
    let report = OptimizationReport {
        source: source.name(),
        axis,
        optimal_input,
        minimal_output,
        sweep,
    };
    info!("{}", report);
    Ok(report)
}
