//! Seeded train/validation/test partitioning
//!
//! Each stage shuffles with a fresh generator seeded by the configured seed
//! and holds out `ceil(fraction * n)` rows, so a given seed and row count
//! always produce the same partition.

use crate::error::{PipelineError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Disjoint row-index sets over the cleaned table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

impl Partition {
    /// Total number of rows covered
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Two-stage splitter: test first, then validation from the remainder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partitioner {
    test_fraction: f64,
    /// Fraction of the post-test remainder used for validation
    relative_val_fraction: f64,
    seed: u64,
}

impl Partitioner {
    pub fn new(test_fraction: f64, relative_val_fraction: f64, seed: u64) -> Self {
        Self {
            test_fraction,
            relative_val_fraction,
            seed,
        }
    }

    /// Partition `n_rows` row indices
    pub fn partition(&self, n_rows: usize) -> Result<Partition> {
        let all: Vec<usize> = (0..n_rows).collect();
        let (rest, test) = self.holdout(&all, self.test_fraction)?;
        let (train, val) = self.holdout(&rest, self.relative_val_fraction)?;
        Ok(Partition { train, val, test })
    }

    /// Shuffle `indices` and split off `ceil(fraction * n)` of them
    fn holdout(&self, indices: &[usize], fraction: f64) -> Result<(Vec<usize>, Vec<usize>)> {
        let n = indices.len();
        let n_held = (fraction * n as f64).ceil() as usize;
        if n_held == 0 || n_held >= n {
            return Err(PipelineError::InvalidParameter {
                name: "fraction".to_string(),
                value: fraction.to_string(),
                reason: format!("holding out {} of {} rows leaves an empty split", n_held, n),
            });
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let mut shuffled = indices.to_vec();
        shuffled.shuffle(&mut rng);

        let kept = shuffled.split_off(n_held);
        Ok((kept, shuffled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_sizes_for_original_fractions() {
        let p = Partitioner::new(0.15, 0.15 / 0.85, 42).partition(1000).unwrap();
        assert_eq!(p.test.len(), 150);
        assert_eq!(p.val.len(), 150);
        assert_eq!(p.train.len(), 700);
    }

    #[test]
    fn test_same_seed_same_partition() {
        let a = Partitioner::new(0.15, 0.2, 9).partition(321).unwrap();
        let b = Partitioner::new(0.15, 0.2, 9).partition(321).unwrap();
        assert_eq!(a, b);
        let c = Partitioner::new(0.15, 0.2, 10).partition(321).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_too_few_rows() {
        let err = Partitioner::new(0.15, 0.2, 1).partition(1).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter { .. }));
    }

    proptest! {
        #[test]
        fn prop_partition_is_disjoint_cover(n in 10_usize..2000, seed in any::<u64>()) {
            let p = Partitioner::new(0.15, 0.15 / 0.85, seed).partition(n).unwrap();

            let all: HashSet<usize> = p.train.iter().chain(&p.val).chain(&p.test).copied().collect();
            prop_assert_eq!(all.len(), n);
            prop_assert_eq!(p.len(), n);
            prop_assert!(all.iter().all(|&i| i < n));

            let expected_test = (0.15 * n as f64).ceil() as usize;
            prop_assert_eq!(p.test.len(), expected_test);
            let rest = n - expected_test;
            prop_assert_eq!(p.val.len(), ((0.15 / 0.85) * rest as f64).ceil() as usize);
        }
    }
}
