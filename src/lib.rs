//! housing-mlp - California Housing regression pipeline
//!
//! This crate provides an end-to-end regression pipeline:
//! - Loading and validating the housing table
//! - Outlier removal, feature engineering, partitioning and scaling
//! - MLP training with epoch-wise checkpointing and early stopping
//! - Test-set evaluation and figures
//!
//! # Modules
//!
//! ## Core
//! - [`data`] - Schema, CSV loading, synthetic tables
//! - [`preprocessing`] - Outliers, features, partitions, scaling
//! - [`training`] - MLP regressor and the training loop
//! - [`evaluation`] - Regression metrics
//!
//! ## Infrastructure
//! - [`config`] - Pipeline configuration
//! - [`artifacts`] - Persisted partitions, scaler and models
//! - [`pipeline`] - Stage runner
//! - [`visualization`] - PNG figures
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Core modules
pub mod data;
pub mod preprocessing;
pub mod training;
pub mod evaluation;

// Infrastructure
pub mod config;
pub mod artifacts;
pub mod pipeline;
pub mod visualization;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifacts::{ArtifactStore, Split};
    pub use crate::config::{PathsConfig, PipelineConfig};
    pub use crate::data::{Dataset, HousingLoader, SyntheticHousing};
    pub use crate::error::{PipelineError, Result};
    pub use crate::evaluation::{evaluate, Evaluation, RegressionMetrics};
    pub use crate::pipeline::Pipeline;
    pub use crate::preprocessing::{PreparedData, PreprocessingConfig, Preprocessor, StandardScaler, ThresholdMode};
    pub use crate::training::{
        Checkpoint, IncrementalRegressor, MLPConfig, MLPRegressor, MemoryCheckpoint, TrainingConfig,
        TrainingHistory, TrainingLoop, TrainingOutcome,
    };
}
