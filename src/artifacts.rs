//! Persisted pipeline artifacts
//!
//! Every artifact is a JSON file in one directory (by default
//! `data/processed`). Writes go to a temporary file that is then renamed over
//! the target, so a reader never sees a half-written file.

use crate::config::PathsConfig;
use crate::data::Dataset;
use crate::error::{PipelineError, Result};
use crate::preprocessing::{PreparedData, StandardScaler};
use crate::training::{Checkpoint, MLPRegressor, TrainingHistory};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SCALER_FILE: &str = "scaler.json";
pub const FEATURE_NAMES_FILE: &str = "feature_names.json";
pub const BEST_MODEL_FILE: &str = "best_model_mlp.json";
pub const HISTORY_FILE: &str = "training_history.json";

/// One of the three persisted partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub fn file_name(&self) -> &'static str {
        match self {
            Split::Train => "train_data.json",
            Split::Val => "val_data.json",
            Split::Test => "test_data.json",
        }
    }
}

/// Directory-backed artifact store
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(paths.processed_dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Persist partitions, scaler and feature names
    pub fn save_prepared(&self, data: &PreparedData) -> Result<()> {
        self.save_split(Split::Train, &data.train)?;
        self.save_split(Split::Val, &data.val)?;
        self.save_split(Split::Test, &data.test)?;
        self.write_json(SCALER_FILE, &data.scaler)?;
        self.write_json(FEATURE_NAMES_FILE, &data.feature_names)?;
        Ok(())
    }

    pub fn save_split(&self, split: Split, data: &Dataset) -> Result<()> {
        self.write_json(split.file_name(), data)
    }

    pub fn load_split(&self, split: Split) -> Result<Dataset> {
        let data: Dataset = self.read_json(split.file_name())?;
        // Revalidate row alignment; the file may have been edited by hand
        Dataset::new(data.x, data.y)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler> {
        self.read_json(SCALER_FILE)
    }

    pub fn load_feature_names(&self) -> Result<Vec<String>> {
        self.read_json(FEATURE_NAMES_FILE)
    }

    pub fn save_model(&self, model: &MLPRegressor) -> Result<()> {
        self.write_json(BEST_MODEL_FILE, model)
    }

    pub fn load_model(&self) -> Result<MLPRegressor> {
        self.read_json(BEST_MODEL_FILE)
    }

    pub fn save_history(&self, history: &TrainingHistory) -> Result<()> {
        self.write_json(HISTORY_FILE, history)
    }

    pub fn load_history(&self) -> Result<TrainingHistory> {
        self.read_json(HISTORY_FILE)
    }

    fn write_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::io(&self.dir, e))?;

        let target = self.path(file_name);
        let tmp = self.path(&format!("{}.tmp", file_name));
        let json = serde_json::to_string(value)?;

        fs::write(&tmp, json).map_err(|e| PipelineError::io(&tmp, e))?;
        fs::rename(&tmp, &target).map_err(|e| PipelineError::io(&target, e))?;
        debug!(path = %target.display(), "Wrote artifact");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file_name: &str) -> Result<T> {
        let path = self.path(file_name);
        let json = fs::read_to_string(&path).map_err(|e| PipelineError::io(&path, e))?;
        serde_json::from_str(&json).map_err(|e| {
            PipelineError::SerializationError(format!("{}: {}", path.display(), e))
        })
    }
}

impl<M: Serialize> Checkpoint<M> for ArtifactStore {
    fn save_best(&mut self, _epoch: usize, model: &M) -> Result<()> {
        self.write_json(BEST_MODEL_FILE, model)
    }
}
