use crate::Utils::logger::{save_grid_csv, save_sweep_csv};
use crate::Utils::plots::{plot_grid_surface, plot_sweep};
use crate::Utils::task_parser::TaskDocument;
use crate::heating_load::comparison::{
    ComparisonRow, OPTIMIZATION_SAMPLES, OptimizationReport, compare_sources, optimize_axis,
};
use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::evaluator::{FormulaEvaluator, GridResult, SweepResult};
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::heating_load::formula::FormulaVariant;
use crate::heating_load::prediction::{
    ClosedFormSource, LearnedModelSource, PredictionSource, PredictionSourceEnum,
};
use log::{LevelFilter, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which prediction source a session uses.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    ClosedForm(FormulaVariant),
    /// linear model bundle, either the `model` section of the session document or a separate file
    Learned(Option<PathBuf>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub axis: FeatureIndex,
    pub range: (f64, f64),
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub axis_x: FeatureIndex,
    pub range_x: (f64, f64),
    pub axis_y: FeatureIndex,
    pub range_y: (f64, f64),
    pub count_x: usize,
    pub count_y: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub csv: bool,
    pub plots: bool,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub file: Option<String>,
}

/// Everything one interaction cycle needs. Missing sections and keys take the defaults of
/// the interactive demo.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub features: FeatureVector,
    pub source: SourceConfig,
    /// sources shown next to the active one in the comparison table
    pub compare: Vec<FormulaVariant>,
    pub sweep: SweepConfig,
    pub grid: GridConfig,
    pub optimization_count: usize,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
    document: TaskDocument,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            features: FeatureVector::defaults(),
            source: SourceConfig::ClosedForm(FormulaVariant::QuarticRoot),
            compare: vec![FormulaVariant::QuarticPolynomial, FormulaVariant::LinearGlazing],
            sweep: SweepConfig {
                axis: FeatureIndex::GlazingArea,
                range: FeatureIndex::GlazingArea.range(),
                count: 100,
            },
            grid: GridConfig {
                axis_x: FeatureIndex::GlazingArea,
                range_x: FeatureIndex::GlazingArea.range(),
                axis_y: FeatureIndex::RelativeCompactness,
                range_y: FeatureIndex::RelativeCompactness.range(),
                count_x: 50,
                count_y: 50,
            },
            optimization_count: OPTIMIZATION_SAMPLES,
            output: OutputConfig {
                csv: false,
                plots: false,
                dir: PathBuf::from("results"),
            },
            logging: LoggingConfig {
                level: LevelFilter::Info,
                file: None,
            },
            document: TaskDocument::default(),
        }
    }
}

fn conf<T>(res: Result<T, String>) -> EvaluatorResult<T> {
    res.map_err(EvaluatorError::Configuration)
}

fn parse_level(name: &str) -> EvaluatorResult<LevelFilter> {
    match name {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(EvaluatorError::configuration(format!(
            "log level must be off, error, warn, info, debug or trace, got '{}'",
            other
        ))),
    }
}

/// a "low, high" pair
fn read_range(doc: &TaskDocument, section: &str, key: &str) -> EvaluatorResult<Option<(f64, f64)>> {
    match conf(doc.floats(section, key))? {
        None => Ok(None),
        Some(values) if values.len() == 2 => Ok(Some((values[0], values[1]))),
        Some(values) => Err(EvaluatorError::configuration(format!(
            "{}.{} expects low, high; got {} values",
            section,
            key,
            values.len()
        ))),
    }
}

fn read_axis(doc: &TaskDocument, section: &str, key: &str) -> EvaluatorResult<Option<FeatureIndex>> {
    conf(doc.string(section, key))?
        .map(|name| FeatureIndex::from_name(&name))
        .transpose()
}

fn read_count(doc: &TaskDocument, section: &str, key: &str) -> EvaluatorResult<Option<usize>> {
    match conf(doc.counts(section, key))? {
        None => Ok(None),
        Some(values) if values.len() == 1 => Ok(Some(values[0])),
        Some(values) => Err(EvaluatorError::configuration(format!(
            "{}.{} expects one count, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

impl SessionConfig {
    pub fn from_document(doc: TaskDocument) -> EvaluatorResult<SessionConfig> {
        let mut config = SessionConfig::default();

        // features: named values on top of the defaults
        let mut named: HashMap<String, f64> = HashMap::new();
        for key in doc.keys("features") {
            let value = conf(doc.float("features", &key))?.ok_or_else(|| {
                EvaluatorError::configuration(format!("feature '{}' has no value", key))
            })?;
            named.insert(key, value);
        }
        let mut values = config.features.as_slice().to_vec();
        for (name, value) in named {
            let feature = FeatureIndex::from_name(&name)?;
            let (low, high) = feature.range();
            if value < low || value > high {
                warn!(
                    "{} = {} is outside the recognized range [{}, {}]",
                    feature, value, low, high
                );
            }
            values[feature.position()] = value;
        }
        config.features = FeatureVector::from_slice(&values)?;

        // source
        let kind = conf(doc.string("source", "kind"))?.unwrap_or_else(|| "closed_form".to_string());
        config.source = match kind.as_str() {
            "closed_form" => {
                let variant = match conf(doc.string("source", "variant"))? {
                    Some(name) => FormulaVariant::from_name(&name)?,
                    None => FormulaVariant::QuarticRoot,
                };
                SourceConfig::ClosedForm(variant)
            }
            "learned" => {
                SourceConfig::Learned(conf(doc.string("source", "model_file"))?.map(PathBuf::from))
            }
            other => {
                return Err(EvaluatorError::configuration(format!(
                    "source kind must be closed_form or learned, got '{}'",
                    other
                )));
            }
        };
        if let Some(names) = doc.strings("source", "compare") {
            config.compare = names
                .iter()
                .map(|name| FormulaVariant::from_name(name))
                .collect::<EvaluatorResult<Vec<FormulaVariant>>>()?;
        }

        // sweep
        if let Some(axis) = read_axis(&doc, "sweep", "axis")? {
            config.sweep.axis = axis;
            config.sweep.range = axis.range();
        }
        if let Some(range) = read_range(&doc, "sweep", "range")? {
            config.sweep.range = range;
        }
        if let Some(count) = read_count(&doc, "sweep", "count")? {
            config.sweep.count = count;
        }

        // grid
        if let Some(axis) = read_axis(&doc, "grid", "x_axis")? {
            config.grid.axis_x = axis;
            config.grid.range_x = axis.range();
        }
        if let Some(range) = read_range(&doc, "grid", "x_range")? {
            config.grid.range_x = range;
        }
        if let Some(axis) = read_axis(&doc, "grid", "y_axis")? {
            config.grid.axis_y = axis;
            config.grid.range_y = axis.range();
        }
        if let Some(range) = read_range(&doc, "grid", "y_range")? {
            config.grid.range_y = range;
        }
        match conf(doc.counts("grid", "count"))?.as_deref() {
            None => {}
            Some([n]) => {
                config.grid.count_x = *n;
                config.grid.count_y = *n;
            }
            Some([nx, ny]) => {
                config.grid.count_x = *nx;
                config.grid.count_y = *ny;
            }
            Some(other) => {
                return Err(EvaluatorError::configuration(format!(
                    "grid.count expects one or two counts, got {}",
                    other.len()
                )));
            }
        }

        if let Some(count) = read_count(&doc, "optimization", "count")? {
            config.optimization_count = count;
        }

        // output
        if let Some(csv) = conf(doc.boolean("output", "csv"))? {
            config.output.csv = csv;
        }
        if let Some(plots) = conf(doc.boolean("output", "plots"))? {
            config.output.plots = plots;
        }
        if let Some(dir) = conf(doc.string("output", "dir"))? {
            config.output.dir = PathBuf::from(dir);
        }

        // logging
        if let Some(level) = conf(doc.string("logging", "level"))? {
            config.logging.level = parse_level(&level)?;
        }
        config.logging.file = conf(doc.string("logging", "file"))?;

        config.document = doc;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> EvaluatorResult<SessionConfig> {
        let doc = conf(TaskDocument::from_file(path))?;
        Self::from_document(doc)
    }

    /// builds the active prediction source
    pub fn build_source(&self) -> EvaluatorResult<PredictionSourceEnum> {
        match &self.source {
            SourceConfig::ClosedForm(variant) => Ok(ClosedFormSource::new(*variant)?.into()),
            SourceConfig::Learned(Some(path)) => Ok(LearnedModelSource::load(path)?.into()),
            SourceConfig::Learned(None) => Ok(LearnedModelSource::from_document(&self.document)?.into()),
        }
    }

    /// the active source followed by the comparison sources, without repeating the active one
    pub fn build_sources(&self) -> EvaluatorResult<Vec<PredictionSourceEnum>> {
        let mut sources = vec![self.build_source()?];
        for variant in &self.compare {
            if self.source != SourceConfig::ClosedForm(*variant) {
                sources.push(ClosedFormSource::new(*variant)?.into());
            }
        }
        Ok(sources)
    }
}

/// Everything one interaction cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    pub source: String,
    pub prediction: f64,
    /// display form of the active formula, None for a learned model
    pub equation: Option<String>,
    pub comparison: Vec<ComparisonRow>,
    pub optimization: OptimizationReport,
    pub sweep: SweepResult,
    pub grid: GridResult,
    /// csv and png files written
    pub artefacts: Vec<PathBuf>,
}

/// One interaction cycle: point prediction, comparison, sweep, grid, optimization and the
/// optional csv/png outputs. The feature vector of the config is only read.
pub fn run_session(config: &SessionConfig) -> EvaluatorResult<SessionReport> {
    let evaluator = FormulaEvaluator::new();
    let sources = config.build_sources()?;
    let active = &sources[0];
    let features = &config.features;

    let prediction = evaluator.evaluate_point_with(features, active)?;
    info!("heating load predicted by {}: {:.4}", active.name(), prediction);
    let equation = match &config.source {
        SourceConfig::ClosedForm(variant) => Some(variant.equation_string()?),
        SourceConfig::Learned(_) => None,
    };
    let comparison = compare_sources(features, &sources)?;
    let sweep = evaluator.evaluate_sweep_with(
        features,
        active,
        config.sweep.axis,
        config.sweep.range,
        config.sweep.count,
    )?;
    let grid = &config.grid;
    let grid = evaluator.evaluate_grid_with(
        features,
        active,
        grid.axis_x,
        grid.range_x,
        grid.axis_y,
        grid.range_y,
        grid.count_x,
        grid.count_y,
    )?;
    let optimization = optimize_axis(
        features,
        active,
        config.sweep.axis,
        config.sweep.range,
        config.optimization_count,
    )?;

    let mut artefacts = Vec::new();
    if config.output.csv || config.output.plots {
        fs::create_dir_all(&config.output.dir)?;
    }
    if config.output.csv {
        let sweep_path = config.output.dir.join("sweep.csv");
        save_sweep_csv(&sweep, &sweep_path)?;
        let grid_path = config.output.dir.join("grid.csv");
        save_grid_csv(&grid, &grid_path)?;
        artefacts.push(sweep_path);
        artefacts.push(grid_path);
    }
    if config.output.plots {
        let sweep_path = config.output.dir.join("sweep.png");
        let title = format!("Heating load vs {}", config.sweep.axis.label());
        plot_sweep(&sweep, &title, &sweep_path)?;
        let grid_path = config.output.dir.join("surface.png");
        plot_grid_surface(&grid, "Heating load surface", &grid_path)?;
        artefacts.push(sweep_path);
        artefacts.push(grid_path);
    }

    Ok(SessionReport {
        source: active.name(),
        prediction,
        equation,
        comparison,
        optimization,
        sweep,
        grid,
        artefacts,
    })
}

impl FromStr for SessionConfig {
    type Err = EvaluatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let doc = conf(TaskDocument::parse(s))?;
        Self::from_document(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_empty_document_gives_demo_defaults() {
        let config = SessionConfig::from_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.sweep.count, 100);
        assert_eq!(config.sweep.range, (0.0, 0.4));
        assert_eq!((config.grid.count_x, config.grid.count_y), (50, 50));
        assert_eq!(config.optimization_count, 1000);
    }

    #[test]
    fn test_full_document() {
        let text = "features
  glazing_area: 0.3
  surface_area: 650
source
  kind: closed_form
  variant: compactness_rational
  compare: quartic_root, linear_glazing
sweep
  axis: roof_area
  count: 25
grid
  x_axis: relative_compactness
  y_axis: orientation
  y_range: 2, 4
  count: 20, 10
optimization
  count: 500
output
  csv: true
  plots: false
  dir: out
logging
  level: debug
  file: session.log
";
        let config = SessionConfig::from_str(text).unwrap();
        assert_eq!(config.features.get(FeatureIndex::GlazingArea), 0.3);
        assert_eq!(config.features.get(FeatureIndex::SurfaceArea), 650.0);
        assert_eq!(config.features.get(FeatureIndex::Height), 5.0);
        assert_eq!(
            config.source,
            SourceConfig::ClosedForm(FormulaVariant::CompactnessRational)
        );
        assert_eq!(config.sweep.axis, FeatureIndex::RoofArea);
        assert_eq!(config.sweep.range, (100.0, 300.0));
        assert_eq!(config.sweep.count, 25);
        assert_eq!(config.grid.axis_x, FeatureIndex::RelativeCompactness);
        assert_eq!(config.grid.range_x, (0.6, 1.0));
        assert_eq!(config.grid.range_y, (2.0, 4.0));
        assert_eq!((config.grid.count_x, config.grid.count_y), (20, 10));
        assert_eq!(config.optimization_count, 500);
        assert!(config.output.csv);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.logging.level, LevelFilter::Debug);
        assert_eq!(config.logging.file, Some("session.log".to_string()));

        let sources = config.build_sources().unwrap();
        let names: Vec<String> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec!["compactness_rational", "quartic_root", "linear_glazing"]
        );
    }

    #[test]
    fn test_configuration_errors() {
        for text in [
            "features\n  window_area: 3",
            "features\n  height: tall",
            "source\n  variant: cubic",
            "source\n  kind: neural",
            "sweep\n  range: 0.1",
            "sweep\n  axis: storeys",
            "grid\n  count: 1, 2, 3",
            "logging\n  level: loud",
            "features\n  height 5",
        ] {
            assert!(
                matches!(SessionConfig::from_str(text), Err(EvaluatorError::Configuration(_))),
                "expected configuration error for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_learned_source_inline_model() {
        let text = "source
  kind: learned
model
  name: inline_linear
  features: glazing_area
  coefficients: -0.2
  intercept: 2.8
";
        let config = SessionConfig::from_str(text).unwrap();
        assert_eq!(config.source, SourceConfig::Learned(None));
        let source = config.build_source().unwrap();
        assert_eq!(source.name(), "inline_linear");
        assert_relative_eq!(
            source.predict(&config.features).unwrap(),
            2.76,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_learned_source_from_file() {
        let dir = tempdir().unwrap();
        let model_path = dir.path().join("model.txt");
        fs::write(
            &model_path,
            "model\n  features: height\n  coefficients: 2\n  intercept: 1\n",
        )
        .unwrap();
        let session_path = dir.path().join("session.txt");
        fs::write(
            &session_path,
            format!("source\n  kind: learned\n  model_file: {}\n", model_path.display()),
        )
        .unwrap();
        let config = SessionConfig::from_file(&session_path).unwrap();
        let source = config.build_source().unwrap();
        assert_relative_eq!(source.predict(&config.features).unwrap(), 11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_run_session_defaults() {
        let config = SessionConfig::default();
        let report = run_session(&config).unwrap();
        assert_eq!(report.source, "quartic_root");
        assert_relative_eq!(report.prediction, 3.0901, epsilon = 1e-3);
        assert!(report.equation.unwrap().contains("Glazing Area"));
        assert_eq!(report.comparison.len(), 3);
        assert_eq!(report.sweep.len(), 100);
        assert_eq!(report.grid.values.shape(), (50, 50));
        assert_relative_eq!(report.optimization.optimal_input, 0.4, epsilon = 1e-6);
        assert!(report.artefacts.is_empty());
        assert_eq!(config.features, FeatureVector::defaults());
    }

    #[test]
    fn test_run_session_writes_csv() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results");
        let text = format!(
            "sweep\n  count: 10\ngrid\n  count: 4, 3\noutput\n  csv: true\n  dir: {}\n",
            out.display()
        );
        let config = SessionConfig::from_str(&text).unwrap();
        let report = run_session(&config).unwrap();
        assert_eq!(report.artefacts, vec![out.join("sweep.csv"), out.join("grid.csv")]);
        for path in &report.artefacts {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_run_session_writes_plots() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("plots");
        let text = format!(
            "sweep\n  count: 50\ngrid\n  count: 10\noutput\n  plots: true\n  dir: {}\n",
            out.display()
        );
        let config = SessionConfig::from_str(&text).unwrap();
        let report = run_session(&config).unwrap();
        assert_eq!(
            report.artefacts,
            vec![out.join("sweep.png"), out.join("surface.png")]
        );
        for path in &report.artefacts {
            assert!(path.exists());
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }

    #[test]
    fn test_run_session_invalid_sweep() {
        let config = SessionConfig::from_str("sweep\n  range: 0.4, 0.0").unwrap();
        assert!(matches!(
            run_session(&config),
            Err(EvaluatorError::InvalidRange { .. })
        ));
    }
}
