use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::heating_load::formula::FormulaVariant;
use crate::heating_load::prediction::{ClosedFormSource, PredictionSource};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

/// Outputs of a one-dimensional sweep: `outputs[k]` is the prediction with `axis` set to `inputs[k]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub axis: FeatureIndex,
    pub inputs: DVector<f64>,
    pub outputs: DVector<f64>,
}

impl SweepResult {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// (input, output) pairs in sample order
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.inputs
            .iter()
            .zip(self.outputs.iter())
            .map(|(&x, &y)| (x, y))
            .collect()
    }
}

/// Outputs of a two-dimensional sweep. `values[(i, j)]` holds the prediction with
/// `axis_x` at `x[j]` and `axis_y` at `y[i]`, so the matrix is `y.len() x x.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridResult {
    pub axis_x: FeatureIndex,
    pub axis_y: FeatureIndex,
    pub x: DVector<f64>,
    pub y: DVector<f64>,
    pub values: DMatrix<f64>,
}

/// `count` evenly spaced samples over [low, high], both ends included; the last sample is
/// exactly `high`
pub fn linspace(low: f64, high: f64, count: usize) -> EvaluatorResult<DVector<f64>> {
    if count < 2 {
        return Err(EvaluatorError::invalid_range(format!(
            "count must be at least 2, got {}",
            count
        )));
    }
    if !low.is_finite() || !high.is_finite() {
        return Err(EvaluatorError::invalid_range(format!(
            "range bounds must be finite, got [{}, {}]",
            low, high
        )));
    }
    if low >= high {
        return Err(EvaluatorError::invalid_range(format!(
            "low must be below high, got [{}, {}]",
            low, high
        )));
    }
    let step = (high - low) / (count - 1) as f64;
    if !step.is_finite() {
        return Err(EvaluatorError::invalid_range(format!(
            "range [{}, {}] is too wide to sample",
            low, high
        )));
    }
    let mut samples = DVector::from_fn(count, |i, _| low + step * i as f64);
    samples[count - 1] = high;
    Ok(samples)
}

/// Stateless evaluator of heating load predictions. The plain methods take a
/// `FormulaVariant`; the `*_with` methods take any `PredictionSource`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    pub fn new() -> Self {
        FormulaEvaluator
    }

    pub fn evaluate_point(
        &self,
        features: &FeatureVector,
        variant: FormulaVariant,
    ) -> EvaluatorResult<f64> {
        let source = ClosedFormSource::new(variant)?;
        self.evaluate_point_with(features, &source)
    }

    pub fn evaluate_sweep(
        &self,
        features: &FeatureVector,
        variant: FormulaVariant,
        axis: FeatureIndex,
        range: (f64, f64),
        count: usize,
    ) -> EvaluatorResult<SweepResult> {
        let source = ClosedFormSource::new(variant)?;
        self.evaluate_sweep_with(features, &source, axis, range, count)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_grid(
        &self,
        features: &FeatureVector,
        variant: FormulaVariant,
        axis_x: FeatureIndex,
        range_x: (f64, f64),
        axis_y: FeatureIndex,
        range_y: (f64, f64),
        count_x: usize,
        count_y: usize,
    ) -> EvaluatorResult<GridResult> {
        let source = ClosedFormSource::new(variant)?;
        self.evaluate_grid_with(
            features, &source, axis_x, range_x, axis_y, range_y, count_x, count_y,
        )
    }

    /// (argmin input, minimum output) of a sweep; ties go to the first sample
    pub fn find_minimum(&self, sweep: &SweepResult) -> EvaluatorResult<(f64, f64)> {
        if sweep.is_empty() || sweep.outputs.len() != sweep.inputs.len() {
            return Err(EvaluatorError::invalid_range(
                "cannot take the minimum of an empty sweep",
            ));
        }
        let mut best = 0;
        for (k, &value) in sweep.outputs.iter().enumerate().skip(1) {
            if value < sweep.outputs[best] {
                best = k;
            }
        }
        debug!(
            "minimum over {}: {} at {}",
            sweep.axis, sweep.outputs[best], sweep.inputs[best]
        );
        Ok((sweep.inputs[best], sweep.outputs[best]))
    }

    ////////////////////////////////////////////////////////////////
    //  GENERIC OVER PREDICTION SOURCES
    ////////////////////////////////////////////////////////////////
    pub fn evaluate_point_with<S: PredictionSource + ?Sized>(
        &self,
        features: &FeatureVector,
        source: &S,
    ) -> EvaluatorResult<f64> {
        source.predict(features)
    }

    pub fn evaluate_sweep_with<S: PredictionSource + ?Sized>(
        &self,
        features: &FeatureVector,
        source: &S,
        axis: FeatureIndex,
        range: (f64, f64),
        count: usize,
    ) -> EvaluatorResult<SweepResult> {
        let inputs = linspace(range.0, range.1, count)?;
        let mut outputs = DVector::zeros(count);
        for (k, &x) in inputs.iter().enumerate() {
            outputs[k] = source.predict(&features.with(axis, x))?;
        }
        info!(
            "sweep of {} over {} on [{}, {}], {} samples",
            source.name(),
            axis,
            range.0,
            range.1,
            count
        );
        Ok(SweepResult {
            axis,
            inputs,
            outputs,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn evaluate_grid_with<S: PredictionSource + ?Sized>(
        &self,
        features: &FeatureVector,
        source: &S,
        axis_x: FeatureIndex,
        range_x: (f64, f64),
        axis_y: FeatureIndex,
        range_y: (f64, f64),
        count_x: usize,
        count_y: usize,
    ) -> EvaluatorResult<GridResult> {
        if axis_x == axis_y {
            return Err(EvaluatorError::configuration(format!(
                "grid axes must differ, both are {}",
                axis_x
            )));
        }
        let x = linspace(range_x.0, range_x.1, count_x)?;
        let y = linspace(range_y.0, range_y.1, count_y)?;
        let mut values = DMatrix::zeros(count_y, count_x);
        for (i, &y_i) in y.iter().enumerate() {
            let row_features = features.with(axis_y, y_i);
            for (j, &x_j) in x.iter().enumerate() {
                values[(i, j)] = source.predict(&row_features.with(axis_x, x_j))?;
            }
        }
        info!(
            "grid of {} over {} x {}, {} x {} cells",
            source.name(),
            axis_x,
            axis_y,
            count_y,
            count_x
        );
        Ok(GridResult {
            axis_x,
            axis_y,
            x,
            y,
            values,
        })
    }
}
