//! Quantile-threshold outlier removal
//!
//! Rows whose value in a filtered column is at or above that column's
//! quantile threshold are removed. Columns are processed in the configured
//! order.
//!
//! In [`ThresholdMode::Sequential`] each threshold is computed on the table
//! left over by the previous columns, so the retained fraction depends on
//! column order. [`ThresholdMode::Simultaneous`] computes every threshold on
//! the input table and filters once.

use crate::data::column_values;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// How column thresholds relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdMode {
    /// Threshold of column k is computed after filtering columns 0..k
    Sequential,
    /// All thresholds are computed on the unfiltered table
    Simultaneous,
}

impl Default for ThresholdMode {
    fn default() -> Self {
        ThresholdMode::Sequential
    }
}

/// One column's filtering step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStep {
    pub column: String,
    /// `None` when the table was already empty
    pub threshold: Option<f64>,
    pub rows_before: usize,
    pub rows_after: usize,
}

/// Summary of an outlier-removal pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierReport {
    pub mode: ThresholdMode,
    pub initial_rows: usize,
    pub final_rows: usize,
    pub steps: Vec<FilterStep>,
}

impl OutlierReport {
    /// Number of removed rows
    pub fn removed(&self) -> usize {
        self.initial_rows - self.final_rows
    }
}

/// Quantile-threshold outlier filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierFilter {
    columns: Vec<String>,
    quantile: f64,
    mode: ThresholdMode,
}

impl OutlierFilter {
    /// Create a filter over `columns` at the given quantile
    pub fn new(columns: Vec<String>, quantile: f64) -> Self {
        Self {
            columns,
            quantile,
            mode: ThresholdMode::Sequential,
        }
    }

    /// Set the threshold mode
    pub fn with_mode(mut self, mode: ThresholdMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Remove outlier rows, returning the filtered table and a report
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, OutlierReport)> {
        let initial_rows = df.height();
        let (filtered, steps) = match self.mode {
            ThresholdMode::Sequential => self.apply_sequential(df)?,
            ThresholdMode::Simultaneous => self.apply_simultaneous(df)?,
        };

        let report = OutlierReport {
            mode: self.mode,
            initial_rows,
            final_rows: filtered.height(),
            steps,
        };
        info!(
            removed = report.removed(),
            from = initial_rows,
            to = report.final_rows,
            quantile = self.quantile,
            "Removed outliers"
        );
        Ok((filtered, report))
    }

    fn apply_sequential(&self, df: &DataFrame) -> Result<(DataFrame, Vec<FilterStep>)> {
        let mut current = df.clone();
        let mut steps = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let values = column_values(&current, column)?;
            let rows_before = current.height();
            let threshold = self.threshold(&current, column, &values)?;

            if let Some(t) = threshold {
                let keep: Vec<bool> = values.iter().map(|&v| v < t).collect();
                current = current.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
            }

            debug!(column = %column, ?threshold, rows_before, rows_after = current.height(), "Filtered column");
            steps.push(FilterStep {
                column: column.clone(),
                threshold,
                rows_before,
                rows_after: current.height(),
            });
        }

        Ok((current, steps))
    }

    fn apply_simultaneous(&self, df: &DataFrame) -> Result<(DataFrame, Vec<FilterStep>)> {
        let mut keep = vec![true; df.height()];
        let mut steps = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let values = column_values(df, column)?;
            let rows_before = keep.iter().filter(|&&k| k).count();
            let threshold = self.threshold(df, column, &values)?;

            if let Some(t) = threshold {
                for (k, &v) in keep.iter_mut().zip(&values) {
                    *k = *k && v < t;
                }
            }

            steps.push(FilterStep {
                column: column.clone(),
                threshold,
                rows_before,
                rows_after: keep.iter().filter(|&&k| k).count(),
            });
        }

        let filtered = df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?;
        Ok((filtered, steps))
    }

    /// Linear-interpolation quantile of `column`; `None` on an empty table
    fn threshold(&self, df: &DataFrame, column: &str, values: &[f64]) -> Result<Option<f64>> {
        if values.is_empty() {
            return Ok(None);
        }

        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            return Err(PipelineError::DegenerateColumn {
                column: column.to_string(),
                value: min,
            });
        }

        let series = df
            .column(column)
            .map_err(|_| PipelineError::FeatureNotFound(column.to_string()))?
            .cast(&DataType::Float64)?;
        let threshold = series
            .as_materialized_series()
            .f64()?
            .quantile(self.quantile, QuantileMethod::Linear)?;
        Ok(threshold)
    }
}
