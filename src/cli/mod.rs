//! Housing pipeline CLI
//!
//! One subcommand per pipeline stage, plus `run` to chain them and
//! `synthesize` to produce a stand-in dataset.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::data::SyntheticHousing;
use crate::evaluation::Evaluation;
use crate::pipeline::{AnalysisReport, DollarReading, Pipeline};
use crate::training::TrainingOutcome;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<22} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing-mlp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "California Housing regression with an early-stopped MLP")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON configuration file; missing fields take their defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the dataset, render EDA figures, preprocess and save partitions
    Analyze,

    /// Train the MLP on the saved partitions with early stopping
    Train,

    /// Evaluate the best saved model on the test partition
    Evaluate,

    /// Compare distributions before and after outlier removal
    Compare,

    /// Draw the network architecture
    Architecture,

    /// Write a synthetic dataset with the housing schema
    Synthesize {
        /// Number of rows
        #[arg(short, long, default_value = "20640")]
        rows: usize,

        /// Output CSV (defaults to the configured raw data path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generator seed (defaults to the configured seed)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Analyze, train and evaluate in sequence
    Run,
}

/// Load the configuration named on the command line, or the defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    Ok(PipelineConfig::load_or_default(path)?)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_analyze(config: &PipelineConfig) -> anyhow::Result<AnalysisReport> {
    section("Analyze");
    let pipeline = Pipeline::new(config.clone());

    step_run(&format!("Loading {}", config.paths.raw_data.display()));
    let start = Instant::now();
    let raw = pipeline.load_raw()?;
    step_done(&format!("{} rows × {} cols in {:?}", raw.height(), raw.width(), start.elapsed()));

    step_run("Exploring and preprocessing");
    let start = Instant::now();
    let report = pipeline.analyze_table(&raw)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    for step in &report.outliers.steps {
        let threshold = step
            .threshold
            .map(|t| format!("{:.3}", t))
            .unwrap_or_else(|| "-".to_string());
        kv(
            &step.column,
            &format!("< {}   {} → {} rows", threshold, step.rows_before, step.rows_after),
        );
    }
    kv(
        "Outliers removed",
        &format!(
            "{} ({} → {} rows, {:?})",
            report.outliers.removed(),
            report.outliers.initial_rows,
            report.outliers.final_rows,
            report.outliers.mode
        ),
    );
    kv("Features", &report.feature_names.join(", "));
    kv(
        "Partitions",
        &format!(
            "train {} · val {} · test {}",
            report.train_rows, report.val_rows, report.test_rows
        ),
    );

    println!();
    for path in &report.figures {
        step_ok(&format!("Saved {}", path.display()));
    }
    step_ok(&format!("Artifacts in {}", config.paths.processed_dir.display()));
    Ok(report)
}

pub fn cmd_train(config: &PipelineConfig) -> anyhow::Result<TrainingOutcome> {
    section("Train");
    let pipeline = Pipeline::new(config.clone());
    let mlp = &config.training.mlp;

    kv("Hidden layers", &format!("{:?} ({})", mlp.hidden_layers, mlp.activation.name()));
    kv(
        "Optimizer",
        &format!("Adam lr={} alpha={} batch={}", mlp.learning_rate, mlp.alpha, mlp.batch_size),
    );
    kv(
        "Early stopping",
        &format!("patience {} · max {} epochs", config.training.patience, config.training.max_epochs),
    );
    println!();

    step_run("Training MLP");
    let start = Instant::now();
    let outcome = pipeline.train()?;
    step_done(&format!("{} epochs in {:?}", outcome.epochs_run, start.elapsed()));

    println!();
    let last_train = outcome.history.train_rmse.last().copied().unwrap_or(f64::NAN);
    kv("Best epoch", &outcome.best_epoch.to_string());
    kv("Best val RMSE", &format!("{:.4}", outcome.best_val_rmse));
    kv("Final train RMSE", &format!("{:.4}", last_train));
    kv(
        "Stopped",
        if outcome.stopped_early { "early (patience exhausted)" } else { "at max epochs" },
    );
    println!();
    step_ok(&format!(
        "Best model saved to {}",
        pipeline.store().path(crate::artifacts::BEST_MODEL_FILE).display()
    ));
    Ok(outcome)
}

pub fn cmd_evaluate(config: &PipelineConfig) -> anyhow::Result<Evaluation> {
    section("Evaluate");
    let pipeline = Pipeline::new(config.clone());

    step_run("Scoring best model on test partition");
    let start = Instant::now();
    let evaluation = pipeline.evaluate()?;
    step_done(&format!("{:?}", start.elapsed()));

    let m = &evaluation.metrics;
    let dollars = DollarReading::from_evaluation(&evaluation);
    println!();
    kv("Samples", &m.n_samples.to_string());
    kv("RMSE", &format!("{:.4}  (≈ ${:.0})", m.rmse, dollars.rmse_dollars));
    kv("MAE", &format!("{:.4}  (≈ ${:.0})", m.mae, dollars.mae_dollars));
    println!("  {:<22} {}", muted("R²"), format!("{:.4}", m.r2).white().bold());
    println!();
    step_ok(&format!("Figures in {}", config.paths.figures_dir.display()));
    Ok(evaluation)
}

pub fn cmd_compare(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Compare");
    step_run("Rendering before/after distributions");
    let path = Pipeline::new(config.clone()).compare_distributions()?;
    step_done(&path.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_architecture(config: &PipelineConfig) -> anyhow::Result<()> {
    section("Architecture");
    step_run("Drawing network diagram");
    let path = Pipeline::new(config.clone()).draw_architecture()?;
    step_done(&path.display().to_string());
    println!();
    Ok(())
}

pub fn cmd_synthesize(
    config: &PipelineConfig,
    rows: usize,
    output: Option<&Path>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    section("Synthesize");
    let output = output.unwrap_or(config.paths.raw_data.as_path());

    step_run(&format!("Writing {} rows", rows));
    let df = SyntheticHousing::new(rows)
        .with_seed(seed.unwrap_or(config.seed))
        .write_csv(output)?;
    step_done(&format!("{} rows × {} cols → {}", df.height(), df.width(), output.display()));
    println!();
    Ok(())
}

pub fn cmd_run(config: &PipelineConfig) -> anyhow::Result<()> {
    let start = Instant::now();
    cmd_analyze(config)?;
    cmd_train(config)?;
    let evaluation = cmd_evaluate(config)?;

    section("Summary");
    kv("Test R²", &format!("{:.4}", evaluation.metrics.r2));
    kv("Total time", &format!("{:?}", start.elapsed()));
    println!();
    Ok(())
}
