// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::Utils::logger::{init_logger, save_grid_csv, save_sweep_csv};
use crate::Utils::plots::{plot_grid_surface, plot_sweep};
use crate::heating_load::comparison::{
    OPTIMIZATION_SAMPLES, compare_sources, comparison_table, optimize_axis,
};
use crate::heating_load::dataset::{DEFAULT_SAMPLES, DEFAULT_SEED, generate_dataset, head};
use crate::heating_load::errors::EvaluatorResult;
use crate::heating_load::evaluator::FormulaEvaluator;
use crate::heating_load::features::{FeatureIndex, FeatureVector};
use crate::heating_load::formula::FormulaVariant;
use crate::heating_load::prediction::{
    ClosedFormSource, LearnedModelSource, LinearModel, PredictionSourceEnum,
};
use log::LevelFilter;
use std::path::Path;
use strum::IntoEnumIterator;

#[allow(dead_code)]
pub fn heating_load_examples(example: usize) -> EvaluatorResult<()> {
    init_logger(LevelFilter::Info, None);
    let evaluator = FormulaEvaluator::new();
    match example {
        0 => {
            // POINT PREDICTION with every formula at the default building
            let features = FeatureVector::defaults();
            println!("building: {}", features);
            for variant in FormulaVariant::iter() {
                let load = evaluator.evaluate_point(&features, variant)?;
                println!("{:>22}: {:.4}   {}", variant.to_string(), load, variant.equation_string()?);
            }
        }
        1 => {
            // RESPONSE CURVE over glazing area and its minimum
            let features = FeatureVector::defaults();
            let sweep = evaluator.evaluate_sweep(
                &features,
                FormulaVariant::QuarticRoot,
                FeatureIndex::GlazingArea,
                (0.0, 0.4),
                100,
            )?;
            let (argmin, min) = evaluator.find_minimum(&sweep)?;
            println!("Optimal Glazing Area: {:.4}, Minimum Heating Load: {:.4}", argmin, min);
            save_sweep_csv(&sweep, Path::new("heating_load_sweep.csv"))?;
            plot_sweep(&sweep, "Heating load vs glazing area", Path::new("heating_load_sweep.png"))?;
        }
        2 => {
            // RESPONSE SURFACE over relative compactness and orientation
            let grid = evaluator.evaluate_grid(
                &FeatureVector::defaults(),
                FormulaVariant::CompactnessRational,
                FeatureIndex::RelativeCompactness,
                FeatureIndex::RelativeCompactness.range(),
                FeatureIndex::Orientation,
                FeatureIndex::Orientation.range(),
                50,
                50,
            )?;
            save_grid_csv(&grid, Path::new("heating_load_grid.csv"))?;
            plot_grid_surface(&grid, "Heating load surface", Path::new("heating_load_grid.png"))?;
        }
        3 => {
            // SYMBOLIC FORMULA vs LEARNED LINEAR MODEL
            let learned = LearnedModelSource::from_names(
                "linear_model",
                Box::new(LinearModel::new(2.8, vec![-0.2])),
                &["glazing_area"],
            )?;
            let sources: Vec<PredictionSourceEnum> = vec![
                ClosedFormSource::new(FormulaVariant::QuarticRoot)?.into(),
                ClosedFormSource::new(FormulaVariant::QuarticPolynomial)?.into(),
                learned.into(),
            ];
            let features = FeatureVector::defaults().with(FeatureIndex::GlazingArea, 0.3);
            let rows = compare_sources(&features, &sources)?;
            println!("{}", comparison_table(&rows));
            for source in &sources {
                let report = optimize_axis(
                    &features,
                    source,
                    FeatureIndex::GlazingArea,
                    FeatureIndex::GlazingArea.range(),
                    OPTIMIZATION_SAMPLES,
                )?;
                println!("{}", report);
            }
        }
        4 => {
            // SYNTHETIC DATASET
            let samples = generate_dataset(DEFAULT_SAMPLES, DEFAULT_SEED)?;
            println!("{}", head(&samples, 5));
        }
        _ => {
            println!("no example {}", example);
        }
    }
    Ok(())
}
