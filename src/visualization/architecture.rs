//! Layer diagram of the MLP

use super::FONT;
use crate::error::{PipelineError, Result};
use crate::training::Activation;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

/// Most neurons drawn per layer; wider layers are elided
const MAX_NEURONS: usize = 8;

/// Title line for each layer in `layer_sizes` (input first, output last)
pub fn layer_labels(layer_sizes: &[usize], activation: Activation) -> Vec<String> {
    let last = layer_sizes.len().saturating_sub(1);
    layer_sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| match i {
            0 => format!("Input: {} features", size),
            i if i == last => format!("Output: {} (linear)", size),
            i => format!("Hidden {}: {} ({})", i, size, activation.name()),
        })
        .collect()
}

/// Draw boxes for each layer, a column of neurons inside, and arrows
/// between consecutive layers
pub fn model_architecture(layer_sizes: &[usize], activation: Activation, path: &Path) -> Result<()> {
    if layer_sizes.len() < 2 {
        return Err(PipelineError::InvalidParameter {
            name: "layer_sizes".to_string(),
            value: format!("{:?}", layer_sizes),
            reason: "need at least an input and an output layer".to_string(),
        });
    }

    let labels = layer_labels(layer_sizes, activation);
    let n_layers = layer_sizes.len() as f64;
    let box_w = 0.6 / n_layers;
    let center_x = |i: usize| (i as f64 + 0.5) / n_layers;

    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("MLP Regressor Architecture", (FONT, 28))
        .margin(20)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

    let centered = (FONT, 16)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    for (i, &size) in layer_sizes.iter().enumerate() {
        let x = center_x(i);
        let fill = match i {
            0 => RGBColor(173, 216, 230),
            i if i + 1 == layer_sizes.len() => RGBColor(255, 182, 193),
            _ => RGBColor(144, 238, 144),
        };

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - box_w / 2.0, 0.15), (x + box_w / 2.0, 0.85)],
            fill.mix(0.6).filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - box_w / 2.0, 0.15), (x + box_w / 2.0, 0.85)],
            BLACK.stroke_width(2),
        )))?;

        let shown = size.min(MAX_NEURONS);
        let spacing = 0.55 / shown.max(1) as f64;
        let top = 0.5 + spacing * (shown as f64 - 1.0) / 2.0;
        chart.draw_series((0..shown).map(|k| {
            Circle::new((x, top - spacing * k as f64), 9, fill.filled())
        }))?;
        chart.draw_series((0..shown).map(|k| {
            Circle::new((x, top - spacing * k as f64), 9, BLACK.stroke_width(1))
        }))?;

        if size > MAX_NEURONS {
            chart.draw_series(std::iter::once(Text::new(
                format!("+{} more", size - MAX_NEURONS),
                (x, 0.19),
                centered.clone(),
            )))?;
        }
        chart.draw_series(std::iter::once(Text::new(labels[i].clone(), (x, 0.92), centered.clone())))?;
    }

    for i in 0..layer_sizes.len() - 1 {
        let start = center_x(i) + box_w / 2.0 + 0.01;
        let end = center_x(i + 1) - box_w / 2.0 - 0.01;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(start, 0.5), (end, 0.5)],
            BLACK.stroke_width(2),
        )))?;
        chart.draw_series(std::iter::once(Polygon::new(
            vec![(end, 0.5), (end - 0.015, 0.52), (end - 0.015, 0.48)],
            BLACK.filled(),
        )))?;
    }

    chart.draw_series(std::iter::once(Text::new(
        "Optimizer: Adam | Loss: squared error + L2".to_string(),
        (0.5, 0.05),
        centered,
    )))?;

    root.present()?;
    info!(path = %path.display(), layers = ?layer_sizes, "Saved architecture diagram");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_labels() {
        let labels = layer_labels(&[9, 64, 32, 1], Activation::ReLU);
        assert_eq!(
            labels,
            vec![
                "Input: 9 features".to_string(),
                "Hidden 1: 64 (ReLU)".to_string(),
                "Hidden 2: 32 (ReLU)".to_string(),
                "Output: 1 (linear)".to_string(),
            ]
        );
    }

    #[test]
    fn test_too_few_layers() {
        let dir = tempfile::tempdir().unwrap();
        let err = model_architecture(&[9], Activation::ReLU, &dir.path().join("a.png")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { .. }));
    }
}
