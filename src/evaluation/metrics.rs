//! Regression metrics

use crate::error::{PipelineError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Metrics for regression evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// R-squared
    pub r2: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute regression metrics
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        // MSE
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n;

        // MAE
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        // R²
        let y_mean: f64 = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2,
            n_samples: y_true.len(),
        })
    }
}

/// Root-mean-squared error
pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    Ok(mse.sqrt())
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.is_empty() {
        return Err(PipelineError::DataError("cannot score an empty set".to_string()));
    }
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_regression_metrics() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];

        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();
        assert!((metrics.mse - 0.006).abs() < 1e-12);
        assert!((metrics.mae - 0.06).abs() < 1e-12);
        assert!((metrics.r2 - (1.0 - 0.03 / 10.0)).abs() < 1e-12);
        assert_eq!(metrics.n_samples, 5);
    }

    #[test]
    fn test_rmse_matches_metrics() {
        let y_true = array![0.0, 0.0, 0.0, 0.0];
        let y_pred = array![1.0, -1.0, 1.0, -1.0];
        assert_eq!(rmse(&y_true, &y_pred).unwrap(), 1.0);
        assert_eq!(RegressionMetrics::compute(&y_true, &y_pred).unwrap().rmse, 1.0);
    }

    #[test]
    fn test_constant_target_r2() {
        let y = array![2.0, 2.0, 2.0];
        assert_eq!(RegressionMetrics::compute(&y, &y).unwrap().r2, 1.0);
        assert_eq!(RegressionMetrics::compute(&y, &array![2.0, 2.5, 2.0]).unwrap().r2, 0.0);
    }

    #[test]
    fn test_mean_prediction_has_zero_r2() {
        let y = array![1.0, 2.0, 3.0];
        let metrics = RegressionMetrics::compute(&y, &array![2.0, 2.0, 2.0]).unwrap();
        assert!(metrics.r2.abs() < 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let empty = Array1::<f64>::zeros(0);
        assert!(matches!(rmse(&empty, &empty), Err(PipelineError::DataError(_))));
        assert!(matches!(
            RegressionMetrics::compute(&array![1.0, 2.0], &array![1.0]),
            Err(PipelineError::ShapeError { .. })
        ));
    }
}
