//! Summary statistics behind the figures

use crate::error::{PipelineError, Result};
use ndarray::Array2;

/// Equal-width histogram. `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(lower, upper, count)` per bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(self.counts.iter())
            .map(|(e, &c)| (e[0], e[1], c))
    }
}

/// Bin the finite entries of `values` into `bins` equal-width bins spanning
/// their range. The last bin includes its upper edge. A constant input gets
/// the range `[v - 0.5, v + 0.5]`.
pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(PipelineError::InvalidParameter {
            name: "bins".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (mut lo, mut hi) = min_max(&finite)
        .ok_or_else(|| PipelineError::DataError("histogram of an empty column".to_string()))?;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}

/// Smallest and largest value, `None` when empty
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Pearson correlation coefficient; NaN when either input is constant
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

/// Pairwise Pearson correlations between columns
pub fn correlation_matrix(columns: &[Vec<f64>]) -> Array2<f64> {
    let n = columns.len();
    let mut corr = Array2::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            corr[[i, j]] = r;
            corr[[j, i]] = r;
        }
    }
    corr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts() {
        let hist = histogram(&[0.0, 0.1, 0.5, 0.9, 1.0], 2).unwrap();
        assert_eq!(hist.edges, vec![0.0, 0.5, 1.0]);
        assert_eq!(hist.counts, vec![2, 3]);
        assert_eq!(hist.max_count(), 3);
        assert_eq!(hist.bins().count(), 2);
    }

    #[test]
    fn test_histogram_constant_and_nan() {
        let hist = histogram(&[2.0, 2.0, f64::NAN], 4).unwrap();
        assert_eq!(hist.edges.first(), Some(&1.5));
        assert_eq!(hist.edges.last(), Some(&2.5));
        assert_eq!(hist.counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_errors() {
        assert!(histogram(&[], 10).is_err());
        assert!(histogram(&[1.0], 0).is_err());
    }

    #[test]
    fn test_pearson() {
        let a = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&a, &[2.0, 4.0, 6.0, 8.0]) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &[4.0, 3.0, 2.0, 1.0]) + 1.0).abs() < 1e-12);
        assert!(pearson(&a, &[1.0, 1.0, 1.0, 1.0]).is_nan());
    }

    #[test]
    fn test_correlation_matrix_is_symmetric() {
        let cols = vec![vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 2.0], vec![0.0, 5.0, 1.0]];
        let corr = correlation_matrix(&cols);
        for i in 0..3 {
            assert!((corr[[i, i]] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(corr[[i, j]], corr[[j, i]]);
            }
        }
    }
}
