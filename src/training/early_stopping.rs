//! Patience-based early stopping

use serde::{Deserialize, Serialize};

/// Result of observing one validation score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Strictly better than every previous score
    Improved,
    /// Equal to or worse than the best so far
    NoImprovement,
}

/// Tracks the best validation score and epochs since it was reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlyStopping {
    patience: usize,
    best_score: f64,
    best_epoch: Option<usize>,
    epochs_since_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_score: f64::INFINITY,
            best_epoch: None,
            epochs_since_improvement: 0,
        }
    }

    /// Record the validation score (lower is better) reached at `epoch`
    pub fn observe(&mut self, epoch: usize, score: f64) -> Observation {
        if score < self.best_score {
            self.best_score = score;
            self.best_epoch = Some(epoch);
            self.epochs_since_improvement = 0;
            Observation::Improved
        } else {
            self.epochs_since_improvement += 1;
            Observation::NoImprovement
        }
    }

    pub fn should_stop(&self) -> bool {
        self.epochs_since_improvement >= self.patience
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn epochs_since_improvement(&self) -> usize {
        self.epochs_since_improvement
    }
}
