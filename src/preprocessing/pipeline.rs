//! Preprocessing pipeline: outliers → features → partitions → scaling

use super::{FeatureEngineer, OutlierFilter, OutlierReport, Partition, Partitioner, PreprocessingConfig, StandardScaler};
use crate::data::{split_features_target, Dataset};
use crate::error::Result;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Scaled partitions ready for training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedData {
    pub train: Dataset,
    pub val: Dataset,
    pub test: Dataset,
    /// Scaler fitted on the training features only
    pub scaler: StandardScaler,
    pub feature_names: Vec<String>,
    /// Row indices into the cleaned, feature-engineered table
    pub partition: Partition,
}

/// Everything `Preprocessor::run` produces
#[derive(Debug, Clone)]
pub struct PreprocessOutput {
    pub prepared: PreparedData,
    pub outliers: OutlierReport,
}

/// Housing preprocessor
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessingConfig,
    features: FeatureEngineer,
    seed: u64,
}

impl Preprocessor {
    /// Create a preprocessor; `seed` drives the partition shuffles
    pub fn new(config: PreprocessingConfig, seed: u64) -> Self {
        Self {
            config,
            features: FeatureEngineer::default(),
            seed,
        }
    }

    /// Replace the feature engineering step
    pub fn with_feature_engineer(mut self, features: FeatureEngineer) -> Self {
        self.features = features;
        self
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Drop rows at or above the configured quantile of each outlier column
    pub fn remove_outliers(&self, df: &DataFrame) -> Result<(DataFrame, OutlierReport)> {
        OutlierFilter::new(self.config.outlier_columns.clone(), self.config.outlier_quantile)
            .with_mode(self.config.threshold_mode)
            .apply(df)
    }

    /// Add the ratio feature and the log-transformed columns
    pub fn engineer_features(&self, df: &DataFrame) -> Result<DataFrame> {
        self.features.transform(df)
    }

    /// Separate the target, partition rows, and scale with train statistics
    pub fn split_and_scale(&self, df: &DataFrame) -> Result<PreparedData> {
        self.config.validate()?;

        let (full, feature_names) = split_features_target(df, &self.config.target_column)?;
        let partition = Partitioner::new(
            self.config.test_fraction,
            self.config.relative_val_fraction(),
            self.seed,
        )
        .partition(full.len())?;

        let train_raw = full.select_rows(&partition.train);
        let val_raw = full.select_rows(&partition.val);
        let test_raw = full.select_rows(&partition.test);

        let mut scaler = StandardScaler::new();
        let train = Dataset::new(scaler.fit_transform(&train_raw.x)?, train_raw.y)?;
        let val = Dataset::new(scaler.transform(&val_raw.x)?, val_raw.y)?;
        let test = Dataset::new(scaler.transform(&test_raw.x)?, test_raw.y)?;

        info!(
            rows = full.len(),
            features = feature_names.len(),
            train = train.len(),
            val = val.len(),
            test = test.len(),
            "Partitioned and scaled"
        );

        Ok(PreparedData {
            train,
            val,
            test,
            scaler,
            feature_names,
            partition,
        })
    }

    /// Full preprocessing of a raw table
    pub fn run(&self, df: &DataFrame) -> Result<PreprocessOutput> {
        let (cleaned, outliers) = self.remove_outliers(df)?;
        let engineered = self.engineer_features(&cleaned)?;
        let prepared = self.split_and_scale(&engineered)?;
        Ok(PreprocessOutput { prepared, outliers })
    }
}
