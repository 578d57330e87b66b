use crate::heating_load::errors::EvaluatorResult;
use crate::heating_load::evaluator::{GridResult, SweepResult};
use chrono::Local;
use csv::Writer;
use log::info;
use simplelog::*;
use std::fs::File;
use std::path::Path;

/// log_YYYY-MM-DD_HH-MM-SS.txt
pub fn timestamped_log_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Terminal logger plus an optional file logger. A second call (logger already set) is ignored.
/// "auto" as file name means a timestamped log file.
pub fn init_logger(level: LevelFilter, file: Option<&str>) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(name) = file {
        let name = if name == "auto" {
            timestamped_log_name()
        } else {
            name.to_string()
        };
        match File::create(&name) {
            Ok(log_file) => loggers.push(WriteLogger::new(level, Config::default(), log_file)),
            Err(e) => eprintln!("cannot create log file {}: {}", name, e),
        }
    }
    let _ = CombinedLogger::init(loggers);
}

/// two columns: the swept feature and heating_load
pub fn save_sweep_csv(sweep: &SweepResult, path: &Path) -> EvaluatorResult<()> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([sweep.axis.to_string(), "heating_load".to_string()])?;
    for (x, y) in sweep.pairs() {
        writer.write_record([x.to_string(), y.to_string()])?;
    }
    writer.flush()?;
    info!("sweep saved to {}", path.display());
    Ok(())
}

/// first row: "y_axis\x_axis" followed by the x samples; then one row per y sample
pub fn save_grid_csv(grid: &GridResult, path: &Path) -> EvaluatorResult<()> {
    let mut writer = Writer::from_path(path)?;
    let mut headers = vec![format!("{}\\{}", grid.axis_y, grid.axis_x)];
    headers.extend(grid.x.iter().map(|x| x.to_string()));
    writer.write_record(&headers)?;
    for (i, row) in grid.values.row_iter().enumerate() {
        let mut row_data = vec![grid.y[i].to_string()];
        row_data.extend(row.iter().map(|val| val.to_string()));
        writer.write_record(&row_data)?;
    }
    writer.flush()?;
    info!("grid saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heating_load::evaluator::FormulaEvaluator;
    use crate::heating_load::features::{FeatureIndex, FeatureVector};
    use crate::heating_load::formula::FormulaVariant;
    use tempfile::tempdir;

    #[test]
    fn test_log_name() {
        let name = timestamped_log_name();
        assert!(name.starts_with("log_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_save_sweep_csv() {
        let evaluator = FormulaEvaluator::new();
        let sweep = evaluator
            .evaluate_sweep(
                &FeatureVector::defaults(),
                FormulaVariant::QuarticPolynomial,
                FeatureIndex::GlazingArea,
                (0.0, 0.4),
                11,
            )
            .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("sweep.csv");
        save_sweep_csv(&sweep, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "glazing_area,heating_load");
        assert_eq!(lines[1], "0,3.3015666");
    }

    #[test]
    fn test_save_grid_csv() {
        let evaluator = FormulaEvaluator::new();
        let grid = evaluator
            .evaluate_grid(
                &FeatureVector::defaults(),
                FormulaVariant::QuarticRoot,
                FeatureIndex::GlazingArea,
                (0.0, 0.4),
                FeatureIndex::Height,
                (3.0, 7.0),
                3,
                2,
            )
            .unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        save_grid_csv(&grid, &path).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "height\\glazing_area");
        assert_eq!(rows[0].len(), 4);
        assert_eq!(&rows[1][0], "3");
        assert_eq!(&rows[2][0], "7");
        let corner: f64 = rows[2][3].parse().unwrap();
        assert_eq!(corner, grid.values[(1, 2)]);
    }

    #[test]
    fn test_save_into_missing_dir_is_io_error() {
        let evaluator = FormulaEvaluator::new();
        let sweep = evaluator
            .evaluate_sweep(
                &FeatureVector::defaults(),
                FormulaVariant::LinearGlazing,
                FeatureIndex::GlazingArea,
                (0.0, 0.4),
                2,
            )
            .unwrap();
        let dir = tempdir().unwrap();
        let err = save_sweep_csv(&sweep, &dir.path().join("no").join("sweep.csv")).unwrap_err();
        assert!(matches!(
            err,
            crate::heating_load::errors::EvaluatorError::Io(_)
        ));
    }
}
