//! Epoch-wise training loop with checkpointing and early stopping

use super::early_stopping::{EarlyStopping, Observation};
use super::{Checkpoint, IncrementalRegressor, TrainingConfig};
use crate::data::Dataset;
use crate::error::{PipelineError, Result};
use crate::evaluation::rmse;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-epoch train and validation RMSE
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub train_rmse: Vec<f64>,
    pub val_rmse: Vec<f64>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, train_rmse: f64, val_rmse: f64) {
        self.train_rmse.push(train_rmse);
        self.val_rmse.push(val_rmse);
    }

    /// Number of recorded epochs
    pub fn len(&self) -> usize {
        self.val_rmse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val_rmse.is_empty()
    }

    /// 1-based epoch with the lowest validation RMSE (first one on ties)
    pub fn best_epoch(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.val_rmse.iter().enumerate() {
            if best.map_or(v.is_finite(), |(_, b)| v < b) {
                best = Some((i + 1, v));
            }
        }
        best.map(|(epoch, _)| epoch)
    }

    /// Lowest validation RMSE seen up to and including each epoch
    pub fn running_best(&self) -> Vec<f64> {
        self.val_rmse
            .iter()
            .scan(f64::INFINITY, |best, &v| {
                if v < *best {
                    *best = v;
                }
                Some(*best)
            })
            .collect()
    }
}

/// Summary of a finished training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingOutcome {
    pub history: TrainingHistory,
    /// Epoch whose model was checkpointed last
    pub best_epoch: usize,
    pub best_val_rmse: f64,
    pub epochs_run: usize,
    pub stopped_early: bool,
}

/// Manual training loop over an [`IncrementalRegressor`]
#[derive(Debug, Clone)]
pub struct TrainingLoop {
    max_epochs: usize,
    patience: usize,
    log_every: usize,
}

impl TrainingLoop {
    pub fn new(max_epochs: usize, patience: usize) -> Self {
        Self {
            max_epochs,
            patience,
            log_every: 10,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            max_epochs: config.max_epochs,
            patience: config.patience,
            log_every: config.log_every,
        }
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Train `model` until validation RMSE stalls for `patience` epochs or
    /// `max_epochs` is reached. Every strict validation improvement is
    /// written to `checkpoint`.
    pub fn run<M, C>(
        &self,
        model: &mut M,
        train: &Dataset,
        val: &Dataset,
        checkpoint: &mut C,
    ) -> Result<TrainingOutcome>
    where
        M: IncrementalRegressor,
        C: Checkpoint<M>,
    {
        if self.max_epochs == 0 || self.patience == 0 {
            return Err(PipelineError::InvalidParameter {
                name: "max_epochs/patience".to_string(),
                value: format!("{}/{}", self.max_epochs, self.patience),
                reason: "both must be at least 1".to_string(),
            });
        }

        info!(
            max_epochs = self.max_epochs,
            patience = self.patience,
            train = train.len(),
            val = val.len(),
            "Starting training"
        );

        let mut stopper = EarlyStopping::new(self.patience);
        let mut history = TrainingHistory::new();
        let mut stopped_early = false;

        for epoch in 1..=self.max_epochs {
            model.advance_one_epoch(&train.x, &train.y)?;

            let train_rmse = rmse(&train.y, &model.predict(&train.x)?)?;
            let val_rmse = rmse(&val.y, &model.predict(&val.x)?)?;
            history.push(train_rmse, val_rmse);

            if epoch == 1 || epoch % self.log_every.max(1) == 0 {
                info!(epoch, train_rmse, val_rmse, "Epoch");
            }

            if stopper.observe(epoch, val_rmse) == Observation::Improved {
                checkpoint.save_best(epoch, model)?;
                debug!(epoch, val_rmse, "New best model saved");
            }

            if stopper.should_stop() {
                stopped_early = true;
                info!(
                    epoch,
                    best_epoch = stopper.best_epoch().unwrap_or(0),
                    "Early stopping: no validation improvement for {} epochs",
                    self.patience
                );
                break;
            }
        }

        let best_epoch = stopper.best_epoch().ok_or_else(|| {
            PipelineError::TrainingError("validation RMSE never became finite".to_string())
        })?;

        info!(best_epoch, best_val_rmse = stopper.best_score(), "Training finished");

        Ok(TrainingOutcome {
            epochs_run: history.len(),
            history,
            best_epoch,
            best_val_rmse: stopper.best_score(),
            stopped_early,
        })
    }
}
