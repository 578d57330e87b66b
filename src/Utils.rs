//! different utility modules used throughout the project
/// logger initialization and saving of sweeps and grids into csv files
pub mod logger;
/// line plot of a sweep and 3-D surface plot of a grid (png, plotters crate)
pub mod plots;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4" which has titles and
/// pairs key-vector of values into a TaskDocument with typed getters.
///# Example
/// ```
/// use RustedHeatLoad::Utils::task_parser::TaskDocument;
/// let doc = TaskDocument::parse("sweep\n  axis: glazing_area\n  range: 0.0, 0.4\n").unwrap();
/// assert_eq!(doc.floats("sweep", "range").unwrap(), Some(vec![0.0, 0.4]));
/// ```
pub mod task_parser;
