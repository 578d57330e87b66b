//! Synthetic building energy dataset with a known physical heating load law,
//! 0.08*surface_area*delta_T/relative_compactness + 0.5*wall_area - 2*glazing_area*surface_area,
//! plus Gaussian noise. Used to produce training data for symbolic regression; it is not an
//! input of the evaluator.
use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use csv::Writer;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, Uniform};
use std::path::Path;

pub const DEFAULT_SAMPLES: usize = 5000;
pub const DEFAULT_SEED: u64 = 42;
/// standard deviation of the noise added to the heating load
pub const NOISE_STD: f64 = 50.0;

pub const COLUMNS: [&str; 8] = [
    "relative_compactness",
    "surface_area",
    "wall_area",
    "roof_area",
    "height",
    "glazing_area",
    "delta_T",
    "heating_load",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSample {
    pub relative_compactness: f64,
    pub surface_area: f64,
    pub wall_area: f64,
    pub roof_area: f64,
    pub height: f64,
    pub glazing_area: f64,
    pub delta_t: f64,
    pub heating_load: f64,
}

impl BuildingSample {
    /// heating load of the underlying law, without noise
    pub fn physical_load(&self) -> f64 {
        0.08 * self.surface_area * self.delta_t / self.relative_compactness + 0.5 * self.wall_area
            - 2.0 * self.glazing_area * self.surface_area
    }

    /// values in `COLUMNS` order
    pub fn values(&self) -> [f64; 8] {
        [
            self.relative_compactness,
            self.surface_area,
            self.wall_area,
            self.roof_area,
            self.height,
            self.glazing_area,
            self.delta_t,
            self.heating_load,
        ]
    }
}

fn uniform_column(rng: &mut StdRng, low: f64, high: f64, n: usize) -> EvaluatorResult<Vec<f64>> {
    let dist = Uniform::new(low, high)
        .map_err(|e| EvaluatorError::configuration(format!("uniform [{}, {}): {}", low, high, e)))?;
    Ok((0..n).map(|_| dist.sample(rng)).collect())
}

/// Draws `n_samples` buildings from a seeded generator; the same seed gives the same dataset.
/// Columns are drawn one after another, noise last.
pub fn generate_dataset(n_samples: usize, seed: u64) -> EvaluatorResult<Vec<BuildingSample>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let relative_compactness = uniform_column(&mut rng, 0.6, 1.0, n_samples)?;
    let surface_area = uniform_column(&mut rng, 500.0, 900.0, n_samples)?;
    let wall_area = uniform_column(&mut rng, 200.0, 400.0, n_samples)?;
    let roof_area = uniform_column(&mut rng, 100.0, 300.0, n_samples)?;
    let height = uniform_column(&mut rng, 3.0, 7.0, n_samples)?;
    let glazing_area = uniform_column(&mut rng, 0.0, 0.4, n_samples)?;
    let delta_t = uniform_column(&mut rng, 15.0, 25.0, n_samples)?;
    let noise = Normal::new(0.0, NOISE_STD)
        .map_err(|e| EvaluatorError::configuration(format!("noise distribution: {}", e)))?;

    let mut samples = Vec::with_capacity(n_samples);
    for k in 0..n_samples {
        let mut sample = BuildingSample {
            relative_compactness: relative_compactness[k],
            surface_area: surface_area[k],
            wall_area: wall_area[k],
            roof_area: roof_area[k],
            height: height[k],
            glazing_area: glazing_area[k],
            delta_t: delta_t[k],
            heating_load: 0.0,
        };
        sample.heating_load = sample.physical_load() + noise.sample(&mut rng);
        samples.push(sample);
    }
    info!("generated {} synthetic buildings with seed {}", n_samples, seed);
    Ok(samples)
}

/// first `n` rows formatted as a table header + lines
pub fn head(samples: &[BuildingSample], n: usize) -> String {
    let mut lines = vec![COLUMNS.join("\t")];
    for sample in samples.iter().take(n) {
        let row: Vec<String> = sample.values().iter().map(|v| format!("{:.4}", v)).collect();
        lines.push(row.join("\t"));
    }
    lines.join("\n")
}

pub fn save_dataset_csv(samples: &[BuildingSample], path: &Path) -> EvaluatorResult<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for sample in samples {
        writer.write_record(sample.values().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    info!("dataset saved to {}", path.display());
    Ok(())
}
