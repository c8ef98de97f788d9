//! Pipeline stages
//!
//! Each stage reads its inputs from the locations in [`PipelineConfig`] and
//! persists its outputs for the next one:
//! analyze → (partitions, scaler, feature names) → train → (best model,
//! history) → evaluate.

use crate::artifacts::{ArtifactStore, Split};
use crate::config::PipelineConfig;
use crate::data::{HousingLoader, COLUMNS};
use crate::error::{PipelineError, Result};
use crate::evaluation::{evaluate, Evaluation};
use crate::preprocessing::{FeatureEngineer, OutlierReport, Preprocessor};
use crate::training::{neural_network, MLPRegressor, TrainingLoop, TrainingOutcome};
use crate::visualization::{self as viz, Figures};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// What the analysis stage produced
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub raw_rows: usize,
    pub outliers: OutlierReport,
    pub feature_names: Vec<String>,
    pub train_rows: usize,
    pub val_rows: usize,
    pub test_rows: usize,
    pub figures: Vec<PathBuf>,
}

/// Results of `Pipeline::run`
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub analysis: AnalysisReport,
    pub training: TrainingOutcome,
    pub evaluation: Evaluation,
}

/// Headline numbers of an evaluation, in target units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DollarReading {
    pub rmse_dollars: f64,
    pub mae_dollars: f64,
}

impl DollarReading {
    /// The target is in units of $100,000
    pub const UNIT: f64 = 100_000.0;

    pub fn from_evaluation(eval: &Evaluation) -> Self {
        Self {
            rmse_dollars: eval.metrics.rmse * Self::UNIT,
            mae_dollars: eval.metrics.mae * Self::UNIT,
        }
    }
}

/// Stage runner over one configuration
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    render_figures: bool,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            render_figures: true,
        }
    }

    /// Skip every figure; artifacts are still written
    pub fn without_figures(mut self) -> Self {
        self.render_figures = false;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> ArtifactStore {
        ArtifactStore::from_config(&self.config.paths)
    }

    pub fn figures(&self) -> Figures {
        Figures::from_config(&self.config.paths)
    }

    fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.config.preprocessing.clone(), self.config.seed)
    }

    /// Read the raw dataset from `paths.raw_data`
    pub fn load_raw(&self) -> Result<DataFrame> {
        HousingLoader::new(&self.config.paths.raw_data).load()
    }

    /// Load, explore, preprocess and persist the partitions
    pub fn analyze(&self) -> Result<AnalysisReport> {
        let raw = self.load_raw()?;
        self.analyze_table(&raw)
    }

    /// [`Pipeline::analyze`] on an already loaded table
    pub fn analyze_table(&self, raw: &DataFrame) -> Result<AnalysisReport> {
        let mut figures = Vec::new();
        if self.render_figures {
            let out = self.figures();
            let path = out.path(viz::CORRELATION_MATRIX)?;
            viz::correlation_heatmap(raw, &path)?;
            figures.push(path);

            let path = out.path(viz::DISTRIBUTIONS)?;
            viz::distributions(raw, &path)?;
            figures.push(path);

            let path = out.path(viz::GEOSPATIAL)?;
            viz::geospatial_plot(raw, &path)?;
            figures.push(path);
        }

        let output = self.preprocessor().run(raw)?;
        let prepared = &output.prepared;
        self.store().save_prepared(prepared)?;

        info!(
            dir = %self.store().dir().display(),
            removed = output.outliers.removed(),
            "Saved partitions, scaler and feature names"
        );

        Ok(AnalysisReport {
            raw_rows: raw.height(),
            feature_names: prepared.feature_names.clone(),
            train_rows: prepared.train.len(),
            val_rows: prepared.val.len(),
            test_rows: prepared.test.len(),
            outliers: output.outliers,
            figures,
        })
    }

    /// Train on the persisted partitions, checkpointing the best model
    pub fn train(&self) -> Result<TrainingOutcome> {
        let training = &self.config.training;
        training.validate()?;

        let store = self.store();
        let train = store.load_split(Split::Train)?;
        let val = store.load_split(Split::Val)?;
        if train.n_features() != val.n_features() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} validation features", train.n_features()),
                actual: format!("{} validation features", val.n_features()),
            });
        }

        let mut model = MLPRegressor::new(training.mlp.clone(), self.config.seed);
        let mut checkpoint = store.clone();
        let outcome = TrainingLoop::from_config(training).run(&mut model, &train, &val, &mut checkpoint)?;
        store.save_history(&outcome.history)?;

        if self.render_figures {
            viz::loss_curve(&outcome.history, &self.figures().path(viz::LOSS_CURVE)?)?;
        }
        Ok(outcome)
    }

    /// Score the best checkpoint on the test partition
    pub fn evaluate(&self) -> Result<Evaluation> {
        let store = self.store();
        let model = store.load_model()?;
        let test = store.load_split(Split::Test)?;
        let evaluation = evaluate(&model, &test)?;

        if self.render_figures {
            let out = self.figures();
            viz::predicted_vs_actual(&evaluation, &out.path(viz::PREDICTED_VS_ACTUAL)?)?;
            viz::residuals_hist(&evaluation, &out.path(viz::RESIDUALS)?)?;
        }
        Ok(evaluation)
    }

    /// Histograms of the filtered columns before and after outlier removal
    pub fn compare_distributions(&self) -> Result<PathBuf> {
        let raw = self.load_raw()?;
        let (cleaned, report) = self.preprocessor().remove_outliers(&raw)?;
        info!(removed = report.removed(), "Outlier removal for comparison");

        let path = self.figures().path(viz::DISTRIBUTION_COMPARISON)?;
        viz::distribution_comparison_grid(
            &raw,
            &cleaned,
            &self.config.preprocessing.outlier_columns,
            &path,
        )?;
        Ok(path)
    }

    /// Diagram of the configured network. The input width comes from the
    /// persisted feature names when present.
    pub fn draw_architecture(&self) -> Result<PathBuf> {
        let n_features = match self.store().load_feature_names() {
            Ok(names) => names.len(),
            Err(PipelineError::MissingArtifact { path }) => {
                warn!(path = %path.display(), "No feature names yet, assuming the housing schema");
                self.default_feature_count()
            }
            Err(e) => return Err(e),
        };

        let mlp = &self.config.training.mlp;
        let sizes = neural_network::layer_sizes(n_features, &mlp.hidden_layers);
        let path = self.figures().path(viz::MODEL_ARCHITECTURE)?;
        viz::model_architecture(&sizes, mlp.activation, &path)?;
        Ok(path)
    }

    /// analyze → train → evaluate
    pub fn run(&self) -> Result<RunSummary> {
        let analysis = self.analyze()?;
        let training = self.train()?;
        let evaluation = self.evaluate()?;
        Ok(RunSummary {
            analysis,
            training,
            evaluation,
        })
    }

    fn default_feature_count(&self) -> usize {
        let raw: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        FeatureEngineer::default()
            .output_columns(&raw)
            .iter()
            .filter(|c| **c != self.config.preprocessing.target_column)
            .count()
    }
}
