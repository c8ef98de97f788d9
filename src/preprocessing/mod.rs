//! Data preprocessing module
//!
//! Provides the cleaning and preparation steps of the housing pipeline:
//! - Quantile-threshold outlier removal
//! - Feature engineering (ratio feature, log1p transforms)
//! - Seeded two-stage train/validation/test partitioning
//! - Z-score scaling fitted on the training partition

mod config;
mod pipeline;
mod scaler;
pub mod outlier;
pub mod split;
pub mod transforms;

pub use config::PreprocessingConfig;
pub use outlier::{FilterStep, OutlierFilter, OutlierReport, ThresholdMode};
pub use pipeline::{PreparedData, PreprocessOutput, Preprocessor};
pub use scaler::StandardScaler;
pub use split::{Partition, Partitioner};
pub use transforms::{FeatureEngineer, RatioFeature};
