//! Preprocessing configuration

use super::ThresholdMode;
use crate::data::TARGET;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for outlier removal and partitioning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Columns filtered by quantile threshold, in filtering order
    pub outlier_columns: Vec<String>,

    /// Quantile above which rows are dropped (rows must be strictly below)
    pub outlier_quantile: f64,

    /// Whether thresholds follow the shrinking table or the original one
    pub threshold_mode: ThresholdMode,

    /// Fraction of the cleaned table held out for testing
    pub test_fraction: f64,

    /// Fraction of the cleaned table used for validation. The second split
    /// takes `val_fraction / (1 - test_fraction)` of the remainder.
    pub val_fraction: f64,

    /// Target column name
    pub target_column: String,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            outlier_columns: ["AveRooms", "AveBedrms", "Population", "AveOccup"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            outlier_quantile: 0.99,
            threshold_mode: ThresholdMode::Sequential,
            test_fraction: 0.15,
            val_fraction: 0.15,
            target_column: TARGET.to_string(),
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the outlier columns
    pub fn with_outlier_columns(mut self, columns: &[&str]) -> Self {
        self.outlier_columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Builder method to set the threshold mode
    pub fn with_threshold_mode(mut self, mode: ThresholdMode) -> Self {
        self.threshold_mode = mode;
        self
    }

    /// Builder method to set the split fractions
    pub fn with_fractions(mut self, test_fraction: f64, val_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self.val_fraction = val_fraction;
        self
    }

    /// Validation fraction relative to the rows left after the test split
    pub fn relative_val_fraction(&self) -> f64 {
        self.val_fraction / (1.0 - self.test_fraction)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.outlier_quantile > 0.0 && self.outlier_quantile <= 1.0) {
            return Err(invalid("outlier_quantile", self.outlier_quantile, "must be in (0, 1]"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid("test_fraction", self.test_fraction, "must be in (0, 1)"));
        }
        if !(self.val_fraction > 0.0 && self.test_fraction + self.val_fraction < 1.0) {
            return Err(invalid(
                "val_fraction",
                self.val_fraction,
                "must be positive and leave rows for training",
            ));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: f64, reason: &str) -> PipelineError {
    PipelineError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PreprocessingConfig::default();
        assert_eq!(config.outlier_columns, vec!["AveRooms", "AveBedrms", "Population", "AveOccup"]);
        assert_eq!(config.outlier_quantile, 0.99);
        assert_eq!(config.threshold_mode, ThresholdMode::Sequential);
        assert!((config.relative_val_fraction() - 0.15 / 0.85).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_fractions_without_training_rows() {
        let config = PreprocessingConfig::new().with_fractions(0.5, 0.5);
        assert!(matches!(config.validate(), Err(PipelineError::InvalidParameter { .. })));
    }

    #[test]
    fn test_rejects_bad_quantile() {
        let mut config = PreprocessingConfig::new();
        config.outlier_quantile = 0.0;
        assert!(config.validate().is_err());
    }
}
