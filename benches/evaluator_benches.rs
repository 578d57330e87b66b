use RustedHeatLoad::heating_load::evaluator::FormulaEvaluator;
use RustedHeatLoad::heating_load::features::{FeatureIndex, FeatureVector};
use RustedHeatLoad::heating_load::formula::FormulaVariant;
use RustedHeatLoad::heating_load::prediction::ClosedFormSource;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_point(c: &mut Criterion) {
    let evaluator = FormulaEvaluator::new();
    let features = FeatureVector::defaults();
    let source = ClosedFormSource::new(FormulaVariant::CompactnessRational).unwrap();
    // compile + evaluate vs evaluate with an already compiled formula
    c.bench_function("point, compile each call", |b| {
        b.iter(|| evaluator.evaluate_point(black_box(&features), FormulaVariant::CompactnessRational))
    });
    c.bench_function("point, precompiled", |b| {
        b.iter(|| evaluator.evaluate_point_with(black_box(&features), &source))
    });
}

fn bench_sweep_and_argmin(c: &mut Criterion) {
    let evaluator = FormulaEvaluator::new();
    let features = FeatureVector::defaults();
    c.bench_function("quartic root sweep 1000 + argmin", |b| {
        b.iter(|| {
            let sweep = evaluator
                .evaluate_sweep(
                    black_box(&features),
                    FormulaVariant::QuarticRoot,
                    FeatureIndex::GlazingArea,
                    (0.0, 0.4),
                    1000,
                )
                .unwrap();
            evaluator.find_minimum(&sweep).unwrap()
        })
    });
}

fn bench_grid(c: &mut Criterion) {
    let evaluator = FormulaEvaluator::new();
    let features = FeatureVector::defaults();
    c.bench_function("compactness rational grid 50x50", |b| {
        b.iter(|| {
            evaluator.evaluate_grid(
                black_box(&features),
                FormulaVariant::CompactnessRational,
                FeatureIndex::RelativeCompactness,
                (0.6, 1.0),
                FeatureIndex::Orientation,
                (2.0, 5.0),
                50,
                50,
            )
        })
    });
}

criterion_group!(benches, bench_point, bench_sweep_and_argmin, bench_grid);
criterion_main!(benches);
