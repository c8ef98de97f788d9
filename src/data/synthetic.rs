//! Synthetic housing tables
//!
//! Generates tables with the California Housing schema whose target is a
//! known linear function of the raw features plus small uniform noise.
//! Used to exercise the pipeline end to end without the real export.

use super::{COLUMNS, TARGET};
use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Synthetic dataset generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticHousing {
    n_rows: usize,
    seed: u64,
    /// Half-width of the uniform noise added to the target
    noise: f64,
}

impl SyntheticHousing {
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            seed: 42,
            noise: 0.1,
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set noise half-width
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.abs();
        self
    }

    /// The noiseless target for one row of raw features
    pub fn target(
        med_inc: f64,
        house_age: f64,
        ave_rooms: f64,
        ave_occup: f64,
        latitude: f64,
    ) -> f64 {
        0.5 + 0.35 * med_inc + 0.015 * house_age + 0.1 * ave_rooms - 0.2 * ave_occup
            - 0.05 * (latitude - 32.5)
    }

    /// Generate the table
    pub fn generate(&self) -> Result<DataFrame> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let n = self.n_rows;
        let mut cols: Vec<Vec<f64>> = vec![Vec::with_capacity(n); COLUMNS.len()];

        for _ in 0..n {
            let med_inc = rng.gen_range(0.5..15.0);
            let house_age = rng.gen_range(1.0..52.0_f64).round();
            let ave_rooms = rng.gen_range(2.0..10.0);
            let ave_bedrms = ave_rooms * rng.gen_range(0.15..0.3);
            let population = rng.gen_range(50.0..5000.0_f64).round();
            let ave_occup = rng.gen_range(1.5..5.0);
            let latitude = rng.gen_range(32.5..42.0);
            let longitude = rng.gen_range(-124.3..-114.3);
            let noise = if self.noise > 0.0 {
                rng.gen_range(-self.noise..self.noise)
            } else {
                0.0
            };
            let value = Self::target(med_inc, house_age, ave_rooms, ave_occup, latitude) + noise;

            let row = [
                med_inc, house_age, ave_rooms, ave_bedrms, population, ave_occup, latitude,
                longitude, value,
            ];
            for (col, v) in cols.iter_mut().zip(row) {
                col.push(v);
            }
        }

        let columns: Vec<Column> = COLUMNS
            .iter()
            .zip(cols)
            .map(|(name, values)| Series::new((*name).into(), values).into())
            .collect();

        let df = DataFrame::new(columns)?;
        info!(rows = n, seed = self.seed, target = TARGET, "Generated synthetic housing table");
        Ok(df)
    }

    /// Generate the table and write it as CSV
    pub fn write_csv(&self, path: &Path) -> Result<DataFrame> {
        let mut df = self.generate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
        }
        let mut file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
        CsvWriter::new(&mut file).finish(&mut df)?;
        Ok(df)
    }
}
