//! Training and evaluation figures

use super::stats::{histogram, min_max};
use super::{draw_histogram, padded, FONT};
use crate::error::{PipelineError, Result};
use crate::evaluation::Evaluation;
use crate::training::TrainingHistory;
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

/// Train and validation RMSE per epoch, with the best epoch marked
pub fn loss_curve(history: &TrainingHistory, path: &Path) -> Result<()> {
    if history.is_empty() {
        return Err(PipelineError::DataError("training history is empty".to_string()));
    }

    let epochs = history.len() as f64;
    let all: Vec<f64> = history
        .train_rmse
        .iter()
        .chain(history.val_rmse.iter())
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let (lo, hi) = min_max(&all).ok_or_else(|| {
        PipelineError::DataError("training history has no finite values".to_string())
    })?;
    let (y_lo, y_hi) = padded(lo, hi, 0.05);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Training and Validation RMSE", (FONT, 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(55)
        .build_cartesian_2d(1.0..epochs.max(2.0), y_lo.max(0.0)..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("RMSE")
        .draw()?;

    let series = |values: &[f64]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v))
            .collect()
    };

    chart
        .draw_series(LineSeries::new(series(&history.train_rmse), BLUE.stroke_width(2)))?
        .label("Train RMSE")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart
        .draw_series(LineSeries::new(series(&history.val_rmse), RED.stroke_width(2)))?
        .label("Validation RMSE")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    if let Some(best) = history.best_epoch() {
        let best_val = history.val_rmse[best - 1];
        chart
            .draw_series(std::iter::once(Circle::new((best as f64, best_val), 6, BLACK.filled())))?
            .label(format!("Best epoch {} ({:.4})", best, best_val))
            .legend(|(x, y)| Circle::new((x + 10, y), 4, BLACK.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    info!(path = %path.display(), epochs = history.len(), "Saved loss curve");
    Ok(())
}

/// Predicted against actual values with the ideal `y = x` line
pub fn predicted_vs_actual(eval: &Evaluation, path: &Path) -> Result<()> {
    let values: Vec<f64> = eval.y_true.iter().chain(eval.y_pred.iter()).copied().collect();
    let (lo, hi) = min_max(&values)
        .ok_or_else(|| PipelineError::DataError("no predictions to plot".to_string()))?;
    let (lo, hi) = padded(lo, hi, 0.03);

    let root = BitMapBackend::new(path, (900, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!("Predicted vs Actual (R² = {:.4})", eval.metrics.r2);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT, 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(lo..hi, lo..hi)?;

    chart
        .configure_mesh()
        .x_desc("Actual")
        .y_desc("Predicted")
        .draw()?;

    chart
        .draw_series(
            eval.y_true
                .iter()
                .zip(eval.y_pred.iter())
                .map(|(&t, &p)| Circle::new((t, p), 3, RGBColor(30, 144, 255).mix(0.5).filled())),
        )?
        .label("Test samples")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, RGBColor(30, 144, 255).filled()));

    chart
        .draw_series(LineSeries::new(vec![(lo, lo), (hi, hi)], RED.stroke_width(2)))?
        .label("Ideal")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    info!(path = %path.display(), "Saved predicted vs actual plot");
    Ok(())
}

/// Histogram of residuals with a marker at zero
pub fn residuals_hist(eval: &Evaluation, path: &Path) -> Result<()> {
    let residuals = eval.residuals().to_vec();
    let hist = histogram(&residuals, 50)?;

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    draw_histogram(
        &root,
        &hist,
        "Residual Distribution (actual - predicted)",
        RGBColor(147, 112, 219),
        Some(0.0),
    )?;

    root.present()?;
    info!(path = %path.display(), "Saved residual histogram");
    Ok(())
}
