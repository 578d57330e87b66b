use crate::heating_load::errors::{EvaluatorError, EvaluatorResult};
use crate::heating_load::evaluator::{GridResult, SweepResult};
use log::info;
use plotters::prelude::*;
use std::path::Path;

fn plot_error<E: std::fmt::Display>(e: E) -> EvaluatorError {
    EvaluatorError::Io(format!("plotting failed: {}", e))
}

/// min and max of the values, widened when the values are all equal
fn padded_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let pad = if max - min > 1e-12 {
        0.05 * (max - min)
    } else {
        0.05 * max.abs().max(1.0)
    };
    (min - pad, max + pad)
}

/// heating load along the swept feature, PNG line chart
pub fn plot_sweep(sweep: &SweepResult, title: &str, path: &Path) -> EvaluatorResult<()> {
    if sweep.is_empty() {
        return Err(EvaluatorError::invalid_range("nothing to plot in an empty sweep"));
    }
    let x_min = sweep.inputs.min();
    let x_max = sweep.inputs.max();
    let (y_min, y_max) = padded_bounds(sweep.outputs.iter());

    let root_area = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(plot_error)?;
    chart
        .configure_mesh()
        .x_desc(sweep.axis.label())
        .y_desc("Heating Load")
        .draw()
        .map_err(plot_error)?;
    chart
        .draw_series(LineSeries::new(sweep.pairs(), &BLUE))
        .map_err(plot_error)?
        .label("heating load")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;
    root_area.present().map_err(plot_error)?;
    info!("sweep plot saved to {}", path.display());
    Ok(())
}

/// 3-D response surface of a grid, one coloured quad per grid cell
pub fn plot_grid_surface(grid: &GridResult, title: &str, path: &Path) -> EvaluatorResult<()> {
    let (n_y, n_x) = grid.values.shape();
    if n_x < 2 || n_y < 2 {
        return Err(EvaluatorError::invalid_range(
            "a surface needs at least 2 samples per axis",
        ));
    }
    let (z_min, z_max) = padded_bounds(grid.values.iter());

    let root_area = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root_area.fill(&WHITE).map_err(plot_error)?;
    let mut chart = ChartBuilder::on(&root_area)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .build_cartesian_3d(
            grid.x.min()..grid.x.max(),
            z_min..z_max,
            grid.y.min()..grid.y.max(),
        )
        .map_err(plot_error)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.3;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.15))
        .max_light_lines(3)
        .draw()
        .map_err(plot_error)?;

    let v = &grid.values;
    let mut cells = Vec::with_capacity((n_x - 1) * (n_y - 1));
    for i in 0..n_y - 1 {
        for j in 0..n_x - 1 {
            let mean = (v[(i, j)] + v[(i, j + 1)] + v[(i + 1, j)] + v[(i + 1, j + 1)]) / 4.0;
            // blue for low load, red for high
            let t = ((mean - z_min) / (z_max - z_min)).clamp(0.0, 1.0);
            let color = HSLColor(0.66 * (1.0 - t), 0.8, 0.5);
            cells.push(Polygon::new(
                vec![
                    (grid.x[j], v[(i, j)], grid.y[i]),
                    (grid.x[j + 1], v[(i, j + 1)], grid.y[i]),
                    (grid.x[j + 1], v[(i + 1, j + 1)], grid.y[i + 1]),
                    (grid.x[j], v[(i + 1, j)], grid.y[i + 1]),
                ],
                color.mix(0.8).filled(),
            ));
        }
    }
    chart.draw_series(cells).map_err(plot_error)?;
    root_area.present().map_err(plot_error)?;
    info!(
        "surface plot of {} x {} saved to {}",
        grid.axis_x,
        grid.axis_y,
        path.display()
    );
    Ok(())
}
