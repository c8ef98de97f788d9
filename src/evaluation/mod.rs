//! Test-set evaluation

mod metrics;

pub use metrics::{rmse, RegressionMetrics};

use crate::data::Dataset;
use crate::error::Result;
use crate::training::IncrementalRegressor;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Predictions and metrics on a held-out partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub metrics: RegressionMetrics,
    pub y_true: Array1<f64>,
    pub y_pred: Array1<f64>,
}

impl Evaluation {
    /// `y_true - y_pred`
    pub fn residuals(&self) -> Array1<f64> {
        &self.y_true - &self.y_pred
    }
}

/// Score `model` on `data`. Reads only; repeated calls give equal results.
pub fn evaluate<M: IncrementalRegressor>(model: &M, data: &Dataset) -> Result<Evaluation> {
    let y_pred = model.predict(&data.x)?;
    let metrics = RegressionMetrics::compute(&data.y, &y_pred)?;

    info!(
        n = metrics.n_samples,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2,
        "Evaluated model"
    );

    Ok(Evaluation {
        metrics,
        y_true: data.y.clone(),
        y_pred,
    })
}
