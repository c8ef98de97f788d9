//! Feature engineering
//!
//! Derives ratio features and replaces skewed columns with their `log1p`
//! transform. New columns are appended in the order ratios, then logs.

use crate::data::column_values;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A derived `numerator / denominator` column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioFeature {
    pub name: String,
    pub numerator: String,
    pub denominator: String,
}

impl RatioFeature {
    pub fn new(name: &str, numerator: &str, denominator: &str) -> Self {
        Self {
            name: name.to_string(),
            numerator: numerator.to_string(),
            denominator: denominator.to_string(),
        }
    }
}

/// Feature engineering step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEngineer {
    ratios: Vec<RatioFeature>,
    /// Columns replaced by `<prefix><name> = ln(1 + x)`
    log1p_columns: Vec<String>,
    log_prefix: String,
}

impl Default for FeatureEngineer {
    /// `BedroomsPerRoom = AveBedrms / AveRooms`, log1p of `MedInc` and `Population`
    fn default() -> Self {
        Self {
            ratios: vec![RatioFeature::new("BedroomsPerRoom", "AveBedrms", "AveRooms")],
            log1p_columns: vec!["MedInc".to_string(), "Population".to_string()],
            log_prefix: "Log_".to_string(),
        }
    }
}

impl FeatureEngineer {
    pub fn new(ratios: Vec<RatioFeature>, log1p_columns: Vec<String>) -> Self {
        Self {
            ratios,
            log1p_columns,
            log_prefix: "Log_".to_string(),
        }
    }

    /// Name of the log column replacing `column`
    pub fn log_name(&self, column: &str) -> String {
        format!("{}{}", self.log_prefix, column)
    }

    /// Column names produced for an input with `input` columns
    pub fn output_columns(&self, input: &[String]) -> Vec<String> {
        input
            .iter()
            .filter(|c| !self.log1p_columns.contains(c))
            .cloned()
            .chain(self.ratios.iter().map(|r| r.name.clone()))
            .chain(self.log1p_columns.iter().map(|c| self.log_name(c)))
            .collect()
    }

    /// Apply the feature engineering to a table.
    ///
    /// A zero denominator or a log input at or below -1 is an error rather
    /// than an infinite or NaN feature.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut result = df.clone();

        for ratio in &self.ratios {
            let num = column_values(df, &ratio.numerator)?;
            let den = column_values(df, &ratio.denominator)?;
            if let Some(row) = den.iter().position(|&d| d == 0.0) {
                return Err(PipelineError::NumericError(format!(
                    "{} is zero at row {}; cannot derive {}",
                    ratio.denominator, row, ratio.name
                )));
            }
            let values: Vec<f64> = num.iter().zip(&den).map(|(n, d)| n / d).collect();
            result.with_column(Series::new(ratio.name.as_str().into(), values))?;
        }

        for column in &self.log1p_columns {
            let values = column_values(df, column)?;
            if let Some(row) = values.iter().position(|&v| v <= -1.0) {
                return Err(PipelineError::NumericError(format!(
                    "{} is {} at row {}; log1p is undefined",
                    column, values[row], row
                )));
            }
            let logged: Vec<f64> = values.iter().map(|v| v.ln_1p()).collect();
            result = result.drop(column)?;
            result.with_column(Series::new(self.log_name(column).as_str().into(), logged))?;
        }

        debug!(columns = result.width(), "Engineered features");
        Ok(result)
    }
}
