//! Exploratory figures of the raw and cleaned tables

use super::colormap::{coolwarm, jet, normalize};
use super::stats::{correlation_matrix, histogram, min_max};
use super::{draw_colorbar, draw_histogram, padded, FONT};
use crate::data::column_values;
use crate::error::{PipelineError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

const BINS: usize = 50;

/// Pearson correlation heatmap of every column, annotated with coefficients
pub fn correlation_heatmap(df: &DataFrame, path: &Path) -> Result<()> {
    let names = column_names(df);
    if names.is_empty() {
        return Err(PipelineError::DataError("no columns to correlate".to_string()));
    }
    let columns = names
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<Vec<_>>>()?;
    let corr = correlation_matrix(&columns);
    let n = names.len() as i32;

    let root = BitMapBackend::new(path, (1150, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let (main, bar) = root.split_horizontally(1050);

    let mut chart = ChartBuilder::on(&main)
        .caption("Correlation Matrix", (FONT, 26))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(0i32..n, n..0i32)?;

    let (width, height) = chart.plotting_area().dim_in_pixel();
    let cell_w = width as i32 / n;
    let cell_h = height as i32 / n;
    let label = |v: &i32| names.get(*v as usize).cloned().unwrap_or_default();

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(names.len() + 1)
        .y_labels(names.len() + 1)
        .x_label_offset(cell_w / 2)
        .y_label_offset(cell_h / 2)
        .x_label_formatter(&label)
        .y_label_formatter(&label)
        .label_style((FONT, 12))
        .draw()?;

    let cells: Vec<(i32, i32, f64)> = (0..n)
        .flat_map(|i| (0..n).map(move |j| (i, j)))
        .map(|(i, j)| (i, j, corr[[i as usize, j as usize]]))
        .collect();

    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        Rectangle::new([(j, i), (j + 1, i + 1)], coolwarm((r + 1.0) / 2.0).filled())
    }))?;

    let text_style = (FONT, 13)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(i, j, r)| {
        EmptyElement::at((j, i))
            + Text::new(format!("{:.2}", r), (cell_w / 2, cell_h / 2), text_style.clone())
    }))?;

    draw_colorbar(&bar, -1.0, 1.0, coolwarm, "Pearson r")?;
    root.present()?;
    info!(path = %path.display(), "Saved correlation heatmap");
    Ok(())
}

/// One histogram per column, three per row
pub fn distributions(df: &DataFrame, path: &Path) -> Result<()> {
    let names = column_names(df);
    if names.is_empty() {
        return Err(PipelineError::DataError("no columns to plot".to_string()));
    }
    let rows = names.len().div_ceil(3);

    let root = BitMapBackend::new(path, (1500, 380 * rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((rows, 3));

    for (area, name) in areas.iter().zip(names.iter()) {
        let hist = histogram(&column_values(df, name)?, BINS)?;
        draw_histogram(area, &hist, name, RGBColor(70, 130, 180), None)?;
    }

    root.present()?;
    info!(path = %path.display(), "Saved feature distributions");
    Ok(())
}

/// Longitude/latitude scatter, coloured by house value and sized by population
pub fn geospatial_plot(df: &DataFrame, path: &Path) -> Result<()> {
    let lon = column_values(df, "Longitude")?;
    let lat = column_values(df, "Latitude")?;
    let value = column_values(df, "MedHouseVal")?;
    let population = column_values(df, "Population")?;

    let empty = || PipelineError::DataError("no rows to plot".to_string());
    let (lon_lo, lon_hi) = min_max(&lon).ok_or_else(empty)?;
    let (lat_lo, lat_hi) = min_max(&lat).ok_or_else(empty)?;
    let (v_lo, v_hi) = min_max(&value).ok_or_else(empty)?;
    let (x_lo, x_hi) = padded(lon_lo, lon_hi, 0.03);
    let (y_lo, y_hi) = padded(lat_lo, lat_hi, 0.03);

    let root = BitMapBackend::new(path, (1100, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let (main, bar) = root.split_horizontally(1000);

    let mut chart = ChartBuilder::on(&main)
        .caption("Geospatial Distribution of House Values", (FONT, 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Longitude")
        .y_desc("Latitude")
        .draw()?;

    chart.draw_series((0..lon.len()).map(|i| {
        let radius = ((population[i] / 1000.0).sqrt() * 2.0).clamp(1.0, 8.0).round() as i32;
        let color = jet(normalize(value[i], v_lo, v_hi));
        Circle::new((lon[i], lat[i]), radius, color.mix(0.4).filled())
    }))?;

    draw_colorbar(&bar, v_lo, v_hi, jet, "Median House Value")?;
    root.present()?;
    info!(path = %path.display(), points = lon.len(), "Saved geospatial plot");
    Ok(())
}

/// Raw and cleaned histograms side by side for each of `columns`, with the
/// column maximum in each caption
pub fn distribution_comparison_grid(
    raw: &DataFrame,
    cleaned: &DataFrame,
    columns: &[String],
    path: &Path,
) -> Result<()> {
    if columns.is_empty() {
        return Err(PipelineError::DataError("no columns to compare".to_string()));
    }

    let root = BitMapBackend::new(path, (1400, 330 * columns.len() as u32)).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((columns.len(), 2));

    for (row, name) in columns.iter().enumerate() {
        for (col, (df, label, color)) in [
            (raw, "before", RGBColor(205, 92, 92)),
            (cleaned, "after", RGBColor(60, 179, 113)),
        ]
        .into_iter()
        .enumerate()
        {
            let values = column_values(df, name)?;
            let hist = histogram(&values, BINS)?;
            let max = min_max(&values).map(|(_, hi)| hi).unwrap_or(f64::NAN);
            let caption = format!("{} ({} outlier removal), max = {:.2}", name, label, max);
            draw_histogram(&areas[row * 2 + col], &hist, &caption, color, None)?;
        }
    }

    root.present()?;
    info!(path = %path.display(), "Saved distribution comparison grid");
    Ok(())
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|name| name.to_string()).collect()
}
