//! Dataset loading

use super::COLUMNS;
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Loader for the California Housing table.
///
/// Reads a CSV export of the dataset frame, keeps the canonical columns in
/// canonical order, casts them to `Float64` and rejects missing values.
pub struct HousingLoader {
    path: PathBuf,
    infer_schema_length: usize,
}

impl HousingLoader {
    /// Create a loader for the CSV at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            infer_schema_length: 1000,
        }
    }

    /// Set how many rows are scanned to infer column types
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the table
    pub fn load(&self) -> Result<DataFrame> {
        let file = File::open(&self.path).map_err(|e| PipelineError::io(&self.path, e))?;

        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()?;

        let df = normalize_schema(&raw)?;
        info!(
            path = %self.path.display(),
            rows = df.height(),
            cols = df.width(),
            "Loaded California Housing table"
        );
        Ok(df)
    }
}

/// Select the canonical columns as `Float64`, failing on absent columns,
/// missing values or values that are not finite numbers.
pub fn normalize_schema(df: &DataFrame) -> Result<DataFrame> {
    let columns = COLUMNS
        .iter()
        .map(|name| {
            let column = df
                .column(name)
                .map_err(|_| PipelineError::FeatureNotFound(name.to_string()))?;
            if column.null_count() > 0 {
                return Err(PipelineError::DataError(format!(
                    "column {} has {} missing values",
                    name,
                    column.null_count()
                )));
            }
            let column = column.cast(&DataType::Float64)?;
            let values = column.as_materialized_series().f64()?;
            for (row, value) in values.into_iter().enumerate() {
                match value {
                    Some(v) if v.is_finite() => {}
                    Some(v) => {
                        return Err(PipelineError::DataError(format!(
                            "column {} has non-finite value {} at row {}",
                            name, v, row
                        )))
                    }
                    None => {
                        return Err(PipelineError::DataError(format!(
                            "column {} has a non-numeric value at row {}",
                            name, row
                        )))
                    }
                }
            }
            Ok(column)
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "MedInc,HouseAge,AveRooms,AveBedrms,Population,AveOccup,Latitude,Longitude,MedHouseVal";

    fn create_test_csv(header: &str, rows: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{}", header).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    #[test]
    fn test_load_canonical_csv() {
        let file = create_test_csv(
            HEADER,
            &[
                "8.3252,41,6.98,1.02,322,2.55,37.88,-122.23,4.526",
                "8.3014,21,6.23,0.97,2401,2.10,37.86,-122.22,3.585",
            ],
        );

        let df = HousingLoader::new(file.path()).load().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 9);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, COLUMNS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        assert_eq!(df.column("HouseAge").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_reorders_and_drops_extra_columns() {
        let file = create_test_csv(
            "Extra,MedHouseVal,Longitude,Latitude,AveOccup,Population,AveBedrms,AveRooms,HouseAge,MedInc",
            &["x,4.5,-122.2,37.9,2.5,322,1.0,7.0,41,8.3"],
        );

        let df = HousingLoader::new(file.path()).load().unwrap();
        assert_eq!(df.width(), 9);
        assert_eq!(df.get_column_names()[0].as_str(), "MedInc");
        assert_eq!(df.get_column_names()[8].as_str(), "MedHouseVal");
    }

    #[test]
    fn test_missing_column_is_reported() {
        let file = create_test_csv("MedInc,HouseAge", &["1.0,2.0"]);
        let err = HousingLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::FeatureNotFound(_)));
    }

    #[test]
    fn test_missing_values_are_rejected() {
        let file = create_test_csv(HEADER, &["8.3,41,6.9,1.0,,2.5,37.8,-122.2,4.5"]);
        let err = HousingLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::DataError(_)));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        for bad in ["NaN", "inf", "-inf"] {
            let row = format!("{},41,6.9,1.0,322,2.5,37.8,-122.2,4.5", bad);
            let file = create_test_csv(HEADER, &["8.3,21,6.2,0.9,2401,2.1,37.8,-122.2,3.5", &row]);
            let err = HousingLoader::new(file.path()).load().unwrap_err();
            assert!(matches!(err, PipelineError::DataError(_)), "{} was accepted", bad);
            assert!(err.to_string().contains("MedInc"));
        }
    }

    #[test]
    fn test_non_numeric_value_is_rejected() {
        let file = create_test_csv(
            HEADER,
            &["8.3,21,6.2,0.9,2401,2.1,37.8,-122.2,3.5", "8.3,41,6.9,1.0,n/a,2.5,37.8,-122.2,4.5"],
        );
        let err = HousingLoader::new(file.path()).load().unwrap_err();
        assert!(matches!(err, PipelineError::DataError(_)));
        assert!(err.to_string().contains("Population"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = HousingLoader::new("/nonexistent/housing.csv").load().unwrap_err();
        assert!(matches!(err, PipelineError::MissingArtifact { .. }));
        assert!(err.to_string().contains("/nonexistent/housing.csv"));
    }
}
