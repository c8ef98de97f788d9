//! Training configuration

use super::neural_network::MLPConfig;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};

/// Training loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Upper bound on epochs
    pub max_epochs: usize,
    /// Epochs without a strict validation improvement before stopping
    pub patience: usize,
    /// Progress is logged on epoch 1 and every `log_every` epochs
    pub log_every: usize,
    /// Network hyperparameters
    pub mlp: MLPConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_epochs: 100,
            patience: 15,
            log_every: 10,
            mlp: MLPConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Create a new training configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set max epochs
    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Builder method to set patience
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Builder method to set logging interval
    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Builder method to set network hyperparameters
    pub fn with_mlp(mut self, mlp: MLPConfig) -> Self {
        self.mlp = mlp;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_epochs", self.max_epochs),
            ("patience", self.patience),
            ("log_every", self.log_every),
            ("mlp.batch_size", self.mlp.batch_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PipelineError::InvalidParameter {
                    name: name.to_string(),
                    value: value.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if !(self.mlp.learning_rate > 0.0 && self.mlp.learning_rate.is_finite()) {
            return Err(PipelineError::InvalidParameter {
                name: "mlp.learning_rate".to_string(),
                value: self.mlp.learning_rate.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
        if self.mlp.alpha < 0.0 {
            return Err(PipelineError::InvalidParameter {
                name: "mlp.alpha".to_string(),
                value: self.mlp.alpha.to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TrainingConfig::default();
        assert_eq!(config.max_epochs, 100);
        assert_eq!(config.patience, 15);
        assert_eq!(config.mlp.hidden_layers, vec![64, 32]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_patience_rejected() {
        let err = TrainingConfig::new().with_patience(0).validate().unwrap_err();
        assert!(err.to_string().contains("patience"));
    }

    #[test]
    fn test_partial_json() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"max_epochs": 5, "mlp": {"batch_size": 32}}"#).unwrap();
        assert_eq!(config.max_epochs, 5);
        assert_eq!(config.patience, 15);
        assert_eq!(config.mlp.batch_size, 32);
        assert_eq!(config.mlp.alpha, 0.05);
    }
}
