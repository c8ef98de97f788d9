//! Z-score feature scaling

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Standard scaler: `(x - mean) / std` per feature.
///
/// Statistics use the population standard deviation. A zero standard
/// deviation is replaced by 1.0 so constant features map to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create a new, unfitted scaler
    pub fn new() -> Self {
        Self {
            mean: Array1::zeros(0),
            scale: Array1::zeros(0),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(PipelineError::ShapeError {
                expected: "at least one row".to_string(),
                actual: "0 rows".to_string(),
            });
        }

        let mean = x.mean_axis(Axis(0)).ok_or_else(|| {
            PipelineError::DataError("cannot compute mean of empty matrix".to_string())
        })?;
        let std = x.std_axis(Axis(0), 0.0);

        self.scale = std.mapv(|s| if s == 0.0 { 1.0 } else { s });
        self.mean = mean;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data using the fitted statistics
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check(x)?;
        Ok((x - &self.mean) / &self.scale)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Inverse transform the data
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check(x)?;
        Ok(x * &self.scale + &self.mean)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn check(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }
        if x.ncols() != self.mean.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.mean.len()),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();

        for col in scaled.columns() {
            assert!(col.mean().unwrap().abs() < 1e-10);
            assert!((col.var(0.0) - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_transform_uses_fitted_statistics() {
        let train = array![[0.0], [2.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&train).unwrap();
        let before = scaler.clone();

        let other = scaler.transform(&array![[4.0], [1.0]]).unwrap();
        assert_eq!(other, array![[3.0], [0.0]]);
        assert_eq!(scaler, before);
    }

    #[test]
    fn test_constant_feature() {
        let x = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, -3.0], [2.0, 0.5], [7.0, 9.0]];
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&x).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();
        for (o, r) in x.iter().zip(restored.iter()) {
            assert!((o - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_errors() {
        let scaler = StandardScaler::new();
        assert!(matches!(scaler.transform(&array![[1.0]]), Err(PipelineError::ModelNotFitted)));

        let mut scaler = StandardScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(scaler.transform(&array![[1.0]]), Err(PipelineError::ShapeError { .. })));
    }
}
