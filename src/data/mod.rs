//! Dataset schema, loading and in-memory partitions
//!
//! The table is a `polars::DataFrame` with the California Housing frame
//! layout. Once the target is separated, rows live in [`Dataset`] as an
//! `ndarray` feature matrix plus a target vector.

pub mod loader;
pub mod synthetic;

pub use loader::HousingLoader;
pub use synthetic::SyntheticHousing;

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Target column
pub const TARGET: &str = "MedHouseVal";

/// Canonical column order of the raw table (target last)
pub const COLUMNS: [&str; 9] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
    TARGET,
];

/// Row-aligned feature matrix and target vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
}

impl Dataset {
    /// Pair a feature matrix with its targets. Row counts must match.
    pub fn new(x: Array2<f64>, y: Array1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Gather the given rows, in order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }
}

/// Read one column as `f64` values. A null or non-numeric cell is an error.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
    let as_f64 = column.cast(&DataType::Float64)?;
    let values = as_f64
        .as_materialized_series()
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PipelineError::DataError(format!("column {} is missing a value at row {}", name, row))
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    Ok(values)
}

/// Extract named columns into a row-major `Array2<f64>`
pub fn columns_to_array2(df: &DataFrame, names: &[String]) -> Result<Array2<f64>> {
    let col_data: Vec<Vec<f64>> = names
        .iter()
        .map(|name| column_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    Ok(Array2::from_shape_fn((df.height(), names.len()), |(r, c)| col_data[c][r]))
}

/// Separate `target` from the remaining columns. Returns the full dataset
/// and the ordered feature names.
pub fn split_features_target(df: &DataFrame, target: &str) -> Result<(Dataset, Vec<String>)> {
    if df.column(target).is_err() {
        return Err(PipelineError::FeatureNotFound(target.to_string()));
    }

    let feature_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != target)
        .map(|name| name.to_string())
        .collect();

    let x = columns_to_array2(df, &feature_names)?;
    let y = Array1::from(column_values(df, target)?);
    Ok((Dataset::new(x, y)?, feature_names))
}
