//! Pipeline configuration
//!
//! Every stage receives its paths and constants from a [`PipelineConfig`]
//! instead of hard-coded relative paths. The defaults reproduce the
//! conventional layout (`data/processed`, `outputs/figures`) and the
//! constants of the reference run.

use crate::error::{PipelineError, Result};
use crate::preprocessing::PreprocessingConfig;
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// CSV export of the California Housing frame
    pub raw_data: PathBuf,
    /// Directory for partitions, scaler, feature names and the best model
    pub processed_dir: PathBuf,
    /// Directory for rendered figures
    pub figures_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_data: PathBuf::from("data/raw/california_housing.csv"),
            processed_dir: PathBuf::from("data/processed"),
            figures_dir: PathBuf::from("outputs/figures"),
        }
    }
}

/// Top-level configuration threaded through every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub preprocessing: PreprocessingConfig,
    pub training: TrainingConfig,
    /// Seed for partitioning and model initialization
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            preprocessing: PreprocessingConfig::default(),
            training: TrainingConfig::default(),
            seed: 42,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| PipelineError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Builder method to set the raw dataset location
    pub fn with_raw_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.raw_data = path.into();
        self
    }

    /// Builder method to set the processed-artifact directory
    pub fn with_processed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.processed_dir = dir.into();
        self
    }

    /// Builder method to set the figure directory
    pub fn with_figures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.figures_dir = dir.into();
        self
    }

    /// Builder method to set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Builder method to replace the training configuration
    pub fn with_training(mut self, training: TrainingConfig) -> Self {
        self.training = training;
        self
    }

    /// Builder method to replace the preprocessing configuration
    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.paths.processed_dir, PathBuf::from("data/processed"));
        assert_eq!(config.paths.figures_dir, PathBuf::from("outputs/figures"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.training.max_epochs, 100);
        assert_eq!(config.training.patience, 15);
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::new()
            .with_processed_dir("/tmp/p")
            .with_figures_dir("/tmp/f")
            .with_seed(7);
        assert_eq!(config.paths.processed_dir, PathBuf::from("/tmp/p"));
        assert_eq!(config.paths.figures_dir, PathBuf::from("/tmp/f"));
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{ "seed": 11, "training": {{ "patience": 3 }} }}"#).unwrap();

        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 11);
        assert_eq!(config.training.patience, 3);
        assert_eq!(config.training.max_epochs, 100);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "not json").unwrap();
        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = PipelineConfig::load(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingArtifact { .. }));
    }
}
