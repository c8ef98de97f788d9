//! Figures for the housing pipeline
//!
//! Every figure is a PNG rendered with `plotters` from data that an earlier
//! stage already computed. Rendering has no effect on the pipeline beyond
//! the written file.

pub mod architecture;
pub mod colormap;
pub mod diagnostics;
pub mod eda;
pub mod stats;

pub use architecture::model_architecture;
pub use diagnostics::{loss_curve, predicted_vs_actual, residuals_hist};
pub use eda::{correlation_heatmap, distribution_comparison_grid, distributions, geospatial_plot};
pub use stats::{correlation_matrix, histogram, pearson, Histogram};

use crate::config::PathsConfig;
use crate::error::{PipelineError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const CORRELATION_MATRIX: &str = "correlation_matrix.png";
pub const DISTRIBUTIONS: &str = "distributions.png";
pub const GEOSPATIAL: &str = "geospatial_plot.png";
pub const DISTRIBUTION_COMPARISON: &str = "distribution_comparison_grid.png";
pub const LOSS_CURVE: &str = "loss_curve.png";
pub const PREDICTED_VS_ACTUAL: &str = "predicted_vs_actual.png";
pub const RESIDUALS: &str = "residuals_hist.png";
pub const MODEL_ARCHITECTURE: &str = "model_architecture.png";

const FONT: &str = "sans-serif";

/// Output directory for figures, created on first use
#[derive(Debug, Clone)]
pub struct Figures {
    dir: PathBuf,
}

impl Figures {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(paths.figures_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for `file_name`, creating the directory if needed
    pub fn path(&self, file_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;
        Ok(self.dir.join(file_name))
    }
}

/// Draw `hist` as adjacent bars filling `area`, with an optional vertical
/// line at `marker`
fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    hist: &Histogram,
    caption: &str,
    color: RGBColor,
    marker: Option<f64>,
) -> Result<()> {
    let (lo, hi) = match (hist.edges.first(), hist.edges.last()) {
        (Some(&lo), Some(&hi)) => (lo, hi),
        _ => return Ok(()),
    };
    let y_max = (hist.max_count().max(1) as f64) * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption(caption, (FONT, 16))
        .margin(8)
        .x_label_area_size(25)
        .y_label_area_size(45)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .y_labels(5)
        .label_style((FONT, 11))
        .draw()?;

    chart.draw_series(hist.bins().map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], color.mix(0.75).filled())
    }))?;

    if let Some(x) = marker.filter(|x| (lo..=hi).contains(x)) {
        chart.draw_series(LineSeries::new(vec![(x, 0.0), (x, y_max)], BLACK.stroke_width(2)))?;
    }

    Ok(())
}

/// Vertical colour scale from `lo` (bottom) to `hi` (top)
fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lo: f64,
    hi: f64,
    cmap: fn(f64) -> RGBColor,
    label: &str,
) -> Result<()> {
    const STEPS: usize = 100;
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let step = (hi - lo) / STEPS as f64;

    let mut chart = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(5)
        .y_desc(label)
        .label_style((FONT, 11))
        .draw()?;

    chart.draw_series((0..STEPS).map(|i| {
        let y0 = lo + step * i as f64;
        let t = (i as f64 + 0.5) / STEPS as f64;
        Rectangle::new([(0.0, y0), (1.0, y0 + step)], cmap(t).filled())
    }))?;

    Ok(())
}

/// Axis range around `[lo, hi]` with a margin of `frac` of its width
fn padded(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let pad = if hi > lo { (hi - lo) * frac } else { 0.5 };
    (lo - pad, hi + pad)
}
