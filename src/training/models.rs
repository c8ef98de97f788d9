//! Model and checkpoint traits

use crate::error::Result;
use ndarray::{Array1, Array2};

/// A regressor that can be trained one epoch at a time
pub trait IncrementalRegressor {
    /// One full pass over the training data, continuing from the current
    /// parameters. The first call initializes the model for `x.ncols()`
    /// features.
    fn advance_one_epoch(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// Single-slot store for the best model seen so far
pub trait Checkpoint<M> {
    /// Overwrite the stored snapshot with `model`, reached at `epoch`
    fn save_best(&mut self, epoch: usize, model: &M) -> Result<()>;
}

/// Checkpoint that keeps the snapshot in memory
#[derive(Debug, Clone)]
pub struct MemoryCheckpoint<M> {
    best: Option<(usize, M)>,
    saves: usize,
}

impl<M> Default for MemoryCheckpoint<M> {
    fn default() -> Self {
        Self { best: None, saves: 0 }
    }
}

impl<M> MemoryCheckpoint<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epoch of the stored snapshot
    pub fn epoch(&self) -> Option<usize> {
        self.best.as_ref().map(|(epoch, _)| *epoch)
    }

    pub fn model(&self) -> Option<&M> {
        self.best.as_ref().map(|(_, model)| model)
    }

    pub fn into_model(self) -> Option<M> {
        self.best.map(|(_, model)| model)
    }

    /// Number of times the slot was overwritten
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl<M: Clone> Checkpoint<M> for MemoryCheckpoint<M> {
    fn save_best(&mut self, epoch: usize, model: &M) -> Result<()> {
        self.best = Some((epoch, model.clone()));
        self.saves += 1;
        Ok(())
    }
}
