#![allow(non_snake_case)]
use RustedHeatLoad::Examples::heating_load_examples::heating_load_examples;
use RustedHeatLoad::Utils::logger::init_logger;
use RustedHeatLoad::heating_load::comparison::comparison_table;
use RustedHeatLoad::heating_load::dataset::{
    DEFAULT_SAMPLES, DEFAULT_SEED, generate_dataset, head, save_dataset_csv,
};
use RustedHeatLoad::heating_load::errors::{EvaluatorError, EvaluatorResult};
use RustedHeatLoad::heating_load::session::{SessionConfig, run_session};
use log::{LevelFilter, error};
use std::env;
use std::path::Path;

fn parse_arg<T: std::str::FromStr>(arg: Option<&String>, default: T, what: &str) -> EvaluatorResult<T> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse::<T>()
            .map_err(|_| EvaluatorError::configuration(format!("{} must be a number, got '{}'", what, s))),
    }
}

/// one interaction cycle, from a task document or from the defaults
fn run_cycle(task: Option<&Path>) -> EvaluatorResult<()> {
    let config = match task {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    init_logger(config.logging.level, config.logging.file.as_deref());
    let report = run_session(&config)?;

    println!("Predicted Heating Load ({}): {:.4}", report.source, report.prediction);
    if let Some(equation) = &report.equation {
        println!("Discovered equation: heating_load = {}", equation);
    }
    println!("{}", comparison_table(&report.comparison));
    println!("{}", report.optimization);
    for path in &report.artefacts {
        println!("written: {}", path.display());
    }
    Ok(())
}

/// dataset <path> [n_samples] [seed]
fn write_dataset(args: &[String]) -> EvaluatorResult<()> {
    init_logger(LevelFilter::Info, None);
    let path = args
        .first()
        .ok_or_else(|| EvaluatorError::configuration("usage: dataset <path> [n_samples] [seed]"))?;
    let n_samples = parse_arg(args.get(1), DEFAULT_SAMPLES, "n_samples")?;
    let seed = parse_arg(args.get(2), DEFAULT_SEED, "seed")?;
    let samples = generate_dataset(n_samples, seed)?;
    save_dataset_csv(&samples, Path::new(path))?;
    println!("{}", head(&samples, 5));
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(|s| s.as_str()) {
        Some("dataset") => write_dataset(&args[1..]),
        Some("example") => parse_arg(args.get(1), 0usize, "example").and_then(heating_load_examples),
        Some(path) => run_cycle(Some(Path::new(path))),
        None => run_cycle(None),
    };
    if let Err(e) = result {
        error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
