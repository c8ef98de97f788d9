//! Model training module
//!
//! Provides:
//! - An MLP regressor trained one epoch at a time with Adam
//! - The [`IncrementalRegressor`] and [`Checkpoint`] seams
//! - A training loop with best-model checkpointing and early stopping

mod config;
mod engine;
mod models;
pub mod early_stopping;
pub mod neural_network;

pub use config::TrainingConfig;
pub use early_stopping::{EarlyStopping, Observation};
pub use engine::{TrainingHistory, TrainingLoop, TrainingOutcome};
pub use models::{Checkpoint, IncrementalRegressor, MemoryCheckpoint};
pub use neural_network::{Activation, MLPConfig, MLPRegressor};
