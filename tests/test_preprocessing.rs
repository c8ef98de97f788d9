//! Integration tests for preprocessing: outliers, features, partitions, scaling

use housing_mlp::data::{column_values, split_features_target, SyntheticHousing};
use housing_mlp::preprocessing::{
    FeatureEngineer, OutlierFilter, PreprocessingConfig, Preprocessor, StandardScaler, ThresholdMode,
};
use polars::prelude::*;
use proptest::prelude::*;

fn outlier_columns() -> Vec<String> {
    PreprocessingConfig::default().outlier_columns
}

// ============================================================================
// Outlier removal
// ============================================================================

#[test]
fn test_sequential_thresholds_use_filtered_table() {
    let df = SyntheticHousing::new(2000).generate().unwrap();
    let filter = OutlierFilter::new(outlier_columns(), 0.99);
    let (cleaned, report) = filter.apply(&df).unwrap();

    assert_eq!(report.mode, ThresholdMode::Sequential);
    assert_eq!(report.steps.len(), 4);
    assert_eq!(report.initial_rows, 2000);
    assert_eq!(report.final_rows, cleaned.height());
    assert_eq!(report.steps[0].rows_before, 2000);
    for pair in report.steps.windows(2) {
        assert_eq!(pair[0].rows_after, pair[1].rows_before);
    }

    // Every surviving value is strictly below its step threshold
    for step in &report.steps {
        let threshold = step.threshold.unwrap();
        assert!(column_values(&cleaned, &step.column)
            .unwrap()
            .iter()
            .all(|&v| v < threshold));
    }
}

#[test]
fn test_simultaneous_mode_is_configurable() {
    let df = SyntheticHousing::new(1500).with_seed(11).generate().unwrap();
    let config = PreprocessingConfig::default().with_threshold_mode(ThresholdMode::Simultaneous);
    let (cleaned, report) = Preprocessor::new(config, 42).remove_outliers(&df).unwrap();

    assert_eq!(report.mode, ThresholdMode::Simultaneous);
    assert!(cleaned.height() < 1500);
    assert_eq!(report.final_rows, cleaned.height());
}

// ============================================================================
// Feature engineering
// ============================================================================

#[test]
fn test_engineered_columns_and_values() {
    let df = df!(
        "MedInc" => &[0.0, 3.0],
        "HouseAge" => &[10.0, 20.0],
        "AveRooms" => &[4.0, 5.0],
        "AveBedrms" => &[1.0, 2.5],
        "Population" => &[0.0, 1000.0],
        "AveOccup" => &[2.0, 3.0],
        "Latitude" => &[34.0, 37.0],
        "Longitude" => &[-118.0, -122.0],
        "MedHouseVal" => &[1.5, 2.5]
    )
    .unwrap();

    let out = FeatureEngineer::default().transform(&df).unwrap();
    let names: Vec<String> = out.get_column_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(
        names,
        vec![
            "HouseAge", "AveRooms", "AveBedrms", "AveOccup", "Latitude", "Longitude",
            "MedHouseVal", "BedroomsPerRoom", "Log_MedInc", "Log_Population",
        ]
    );

    assert_eq!(column_values(&out, "BedroomsPerRoom").unwrap(), vec![0.25, 0.5]);
    let log_inc = column_values(&out, "Log_MedInc").unwrap();
    assert_eq!(log_inc[0], 0.0);
    assert!((log_inc[1] - 4.0_f64.ln()).abs() < 1e-12);
}

#[test]
fn test_zero_rooms_is_rejected() {
    let df = df!(
        "MedInc" => &[1.0],
        "HouseAge" => &[10.0],
        "AveRooms" => &[0.0],
        "AveBedrms" => &[1.0],
        "Population" => &[10.0],
        "AveOccup" => &[2.0],
        "Latitude" => &[34.0],
        "Longitude" => &[-118.0],
        "MedHouseVal" => &[1.5]
    )
    .unwrap();
    let err = FeatureEngineer::default().transform(&df).unwrap_err();
    assert!(err.to_string().contains("AveRooms"));
}

// ============================================================================
// Partitioning and scaling
// ============================================================================

#[test]
fn test_scaler_fitted_on_train_only() {
    let df = SyntheticHousing::new(800).generate().unwrap();
    let pre = Preprocessor::new(PreprocessingConfig::default(), 42);
    let engineered = pre.engineer_features(&pre.remove_outliers(&df).unwrap().0).unwrap();
    let data = pre.split_and_scale(&engineered).unwrap();

    let (full, _) = split_features_target(&engineered, "MedHouseVal").unwrap();
    let mut expected = StandardScaler::new();
    expected.fit(&full.select_rows(&data.partition.train).x).unwrap();
    assert_eq!(data.scaler, expected);

    let mut on_everything = StandardScaler::new();
    on_everything.fit(&full.x).unwrap();
    assert_ne!(data.scaler, on_everything);
}

#[test]
fn test_same_seed_same_partitions() {
    let df = SyntheticHousing::new(500).generate().unwrap();
    let a = Preprocessor::new(PreprocessingConfig::default(), 9).run(&df).unwrap();
    let b = Preprocessor::new(PreprocessingConfig::default(), 9).run(&df).unwrap();
    assert_eq!(a.prepared.partition, b.prepared.partition);
    assert_eq!(a.prepared.train, b.prepared.train);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_outlier_removal_never_grows(rows in 20_usize..600, seed in any::<u64>(), simultaneous in any::<bool>()) {
        let df = SyntheticHousing::new(rows).with_seed(seed).generate().unwrap();
        let mode = if simultaneous { ThresholdMode::Simultaneous } else { ThresholdMode::Sequential };
        let (cleaned, report) = OutlierFilter::new(outlier_columns(), 0.99).with_mode(mode).apply(&df).unwrap();

        prop_assert!(cleaned.height() <= df.height());
        prop_assert_eq!(report.removed(), df.height() - cleaned.height());
        for step in &report.steps {
            prop_assert!(step.rows_after <= step.rows_before);
        }
    }

    #[test]
    fn prop_log_features_non_negative(rows in 1_usize..200, seed in any::<u64>()) {
        let df = SyntheticHousing::new(rows).with_seed(seed).generate().unwrap();
        let out = FeatureEngineer::default().transform(&df).unwrap();
        for name in ["Log_MedInc", "Log_Population"] {
            prop_assert!(column_values(&out, name).unwrap().iter().all(|&v| v >= 0.0));
        }
        prop_assert_eq!(out.width(), df.width() + 1);
    }

    #[test]
    fn prop_partitions_cover_cleaned_rows(rows in 60_usize..500, seed in any::<u64>()) {
        let df = SyntheticHousing::new(rows).with_seed(seed).generate().unwrap();
        let output = Preprocessor::new(PreprocessingConfig::default(), seed).run(&df).unwrap();
        let data = &output.prepared;

        let n = output.outliers.final_rows;
        prop_assert_eq!(data.partition.len(), n);
        prop_assert_eq!(data.test.len(), (0.15 * n as f64).ceil() as usize);
        prop_assert_eq!(data.train.len() + data.val.len() + data.test.len(), n);

        let mut all: Vec<usize> = data.partition.train.iter()
            .chain(&data.partition.val)
            .chain(&data.partition.test)
            .copied()
            .collect();
        all.sort_unstable();
        all.dedup();
        prop_assert_eq!(all.len(), n);
    }
}
