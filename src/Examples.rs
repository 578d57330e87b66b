//! examples of usage of RustedHeatLoad
/// point, sweep, grid, comparison and dataset examples
pub mod heating_load_examples;
