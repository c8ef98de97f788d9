//! Neural Network (Multi-Layer Perceptron) regressor
//!
//! A feedforward network trained with mini-batch Adam. Training is
//! incremental: each call to [`MLPRegressor::advance_one_epoch`] makes one
//! pass over the data and keeps weights and optimizer moments from the
//! previous call.

use ndarray::{Array1, Array2, Axis};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::IncrementalRegressor;
use crate::error::{PipelineError, Result};

/// Activation function for hidden layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Activation {
    /// Rectified Linear Unit
    ReLU,
    /// Sigmoid
    Sigmoid,
    /// Hyperbolic tangent
    Tanh,
    /// Linear (identity)
    Linear,
}

impl Default for Activation {
    fn default() -> Self {
        Self::ReLU
    }
}

impl Activation {
    pub fn name(&self) -> &'static str {
        match self {
            Activation::ReLU => "ReLU",
            Activation::Sigmoid => "Sigmoid",
            Activation::Tanh => "Tanh",
            Activation::Linear => "Linear",
        }
    }
}

/// Neural Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MLPConfig {
    /// Hidden layer sizes
    pub hidden_layers: Vec<usize>,
    /// Activation function for hidden layers
    pub activation: Activation,
    /// Adam step size
    pub learning_rate: f64,
    /// L2 regularization
    pub alpha: f64,
    /// Mini-batch size (clipped to the number of samples)
    pub batch_size: usize,
    /// Adam first-moment decay
    pub beta_1: f64,
    /// Adam second-moment decay
    pub beta_2: f64,
    /// Adam numerical stabilizer
    pub epsilon: f64,
}

impl Default for MLPConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![64, 32],
            activation: Activation::ReLU,
            learning_rate: 0.001,
            alpha: 0.05,
            batch_size: 200,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Adam moment estimates, kept across epochs
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AdamState {
    m_w: Vec<Array2<f64>>,
    v_w: Vec<Array2<f64>>,
    m_b: Vec<Array1<f64>>,
    v_b: Vec<Array1<f64>>,
    t: i32,
}

/// Multi-Layer Perceptron Regressor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MLPRegressor {
    config: MLPConfig,
    seed: u64,
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
    adam: Option<AdamState>,
    n_features: usize,
    epochs_trained: usize,
    loss_curve: Vec<f64>,
    is_fitted: bool,
}

impl MLPRegressor {
    /// Create an untrained network. `seed` drives weight initialization and
    /// the per-epoch shuffles.
    pub fn new(config: MLPConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            weights: Vec::new(),
            biases: Vec::new(),
            adam: None,
            n_features: 0,
            epochs_trained: 0,
            loss_curve: Vec::new(),
            is_fitted: false,
        }
    }

    /// Initialize weights for `n_features` inputs. Called on the first epoch
    /// when not done explicitly.
    pub fn initialize(&mut self, n_features: usize) -> Result<()> {
        if n_features == 0 {
            return Err(PipelineError::ShapeError {
                expected: "at least one feature".to_string(),
                actual: "0 features".to_string(),
            });
        }
        self.n_features = n_features;
        self.initialize_weights();
        self.adam = Some(AdamState {
            m_w: self.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect(),
            v_w: self.weights.iter().map(|w| Array2::zeros(w.raw_dim())).collect(),
            m_b: self.biases.iter().map(|b| Array1::zeros(b.len())).collect(),
            v_b: self.biases.iter().map(|b| Array1::zeros(b.len())).collect(),
            t: 0,
        });
        self.epochs_trained = 0;
        self.loss_curve.clear();
        self.is_fitted = true;
        Ok(())
    }

    /// One pass over `(x, y)` in shuffled mini-batches, continuing from the
    /// current parameters.
    pub fn advance_one_epoch(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("{} targets", x.nrows()),
                actual: format!("{} targets", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(PipelineError::TrainingError("empty training set".to_string()));
        }
        if !self.is_fitted {
            self.initialize(x.ncols())?;
        }
        self.check_features(x)?;

        let n_samples = x.nrows();
        let batch_size = self.config.batch_size.clamp(1, n_samples);

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(
            self.seed.wrapping_add(self.epochs_trained as u64 + 1),
        );
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut rng);

        let mut accumulated_loss = 0.0;
        for batch_indices in indices.chunks(batch_size) {
            let x_batch = x.select(Axis(0), batch_indices);
            let y_batch = y.select(Axis(0), batch_indices);

            let (activations, z_values) = self.forward(&x_batch);
            accumulated_loss += self.batch_loss(&y_batch, &activations) * batch_indices.len() as f64;

            let gradients = self.backward(&y_batch, &activations, &z_values);
            self.adam_step(gradients);
        }

        let loss = accumulated_loss / n_samples as f64;
        if !loss.is_finite() {
            return Err(PipelineError::TrainingError(format!(
                "loss diverged to {} at epoch {}",
                loss,
                self.epochs_trained + 1
            )));
        }

        self.loss_curve.push(loss);
        self.epochs_trained += 1;
        Ok(())
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }
        self.check_features(x)?;
        let (mut activations, _) = self.forward(x);
        let output = activations.pop().ok_or(PipelineError::ModelNotFitted)?;
        Ok(output.column(0).to_owned())
    }

    /// Layer widths from input to output, e.g. `[9, 64, 32, 1]`
    pub fn layer_sizes(&self) -> Vec<usize> {
        layer_sizes(self.n_features, &self.config.hidden_layers)
    }

    pub fn config(&self) -> &MLPConfig {
        &self.config
    }

    pub fn epochs_trained(&self) -> usize {
        self.epochs_trained
    }

    /// Mean training loss per epoch (squared error / 2 plus L2 penalty)
    pub fn loss_curve(&self) -> &[f64] {
        &self.loss_curve
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Total number of weights and biases
    pub fn n_parameters(&self) -> usize {
        self.weights.iter().map(|w| w.len()).sum::<usize>()
            + self.biases.iter().map(|b| b.len()).sum::<usize>()
    }

    fn check_features(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }
        Ok(())
    }

    fn initialize_weights(&mut self) {
        self.weights.clear();
        self.biases.clear();

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        let sizes = self.layer_sizes();

        for pair in sizes.windows(2) {
            let (n_in, n_out) = (pair[0], pair[1]);

            // Glorot uniform; sigmoid uses the narrower bound
            let factor = if self.config.activation == Activation::Sigmoid { 2.0 } else { 6.0 };
            let bound = (factor / (n_in + n_out) as f64).sqrt();

            let weights = Array2::from_shape_fn((n_in, n_out), |_| rng.gen_range(-bound..bound));
            let biases = Array1::from_shape_fn(n_out, |_| rng.gen_range(-bound..bound));

            self.weights.push(weights);
            self.biases.push(biases);
        }
    }

    fn forward(&self, x: &Array2<f64>) -> (Vec<Array2<f64>>, Vec<Array2<f64>>) {
        let mut activations = vec![x.clone()];
        let mut z_values = Vec::with_capacity(self.weights.len());
        let last = self.weights.len() - 1;

        for (i, (w, b)) in self.weights.iter().zip(self.biases.iter()).enumerate() {
            let z = activations[i].dot(w) + b;
            let a = if i < last {
                activate(&z, self.config.activation)
            } else {
                z.clone() // Linear output for regression
            };
            z_values.push(z);
            activations.push(a);
        }

        (activations, z_values)
    }

    fn batch_loss(&self, y: &Array1<f64>, activations: &[Array2<f64>]) -> f64 {
        let n = y.len() as f64;
        let output = activations[activations.len() - 1].column(0);
        let squared: f64 = output.iter().zip(y.iter()).map(|(p, t)| (p - t).powi(2)).sum();
        let l2: f64 = self.weights.iter().map(|w| w.iter().map(|v| v * v).sum::<f64>()).sum();
        squared / (2.0 * n) + 0.5 * self.config.alpha * l2 / n
    }

    fn backward(
        &self,
        y: &Array1<f64>,
        activations: &[Array2<f64>],
        z_values: &[Array2<f64>],
    ) -> Vec<(Array2<f64>, Array1<f64>)> {
        let n = y.len() as f64;
        let mut gradients = Vec::with_capacity(self.weights.len());

        // Output layer error (squared loss gradient)
        let y_2d = y.clone().insert_axis(Axis(1));
        let mut delta = &activations[activations.len() - 1] - &y_2d;

        for i in (0..self.weights.len()).rev() {
            let grad_w = (activations[i].t().dot(&delta) + &self.weights[i] * self.config.alpha) / n;
            let grad_b = delta.sum_axis(Axis(0)) / n;

            if i > 0 {
                delta = delta.dot(&self.weights[i].t())
                    * activate_derivative(&z_values[i - 1], self.config.activation);
            }
            gradients.push((grad_w, grad_b));
        }

        gradients.reverse();
        gradients
    }

    fn adam_step(&mut self, gradients: Vec<(Array2<f64>, Array1<f64>)>) {
        let MLPConfig { learning_rate, beta_1, beta_2, epsilon, .. } = self.config;
        let Some(adam) = self.adam.as_mut() else {
            return;
        };

        adam.t += 1;
        let step = learning_rate * (1.0 - beta_2.powi(adam.t)).sqrt() / (1.0 - beta_1.powi(adam.t));

        for (i, (grad_w, grad_b)) in gradients.into_iter().enumerate() {
            adam.m_w[i] = &adam.m_w[i] * beta_1 + &grad_w * (1.0 - beta_1);
            adam.v_w[i] = &adam.v_w[i] * beta_2 + &grad_w.mapv(|g| g * g) * (1.0 - beta_2);
            adam.m_b[i] = &adam.m_b[i] * beta_1 + &grad_b * (1.0 - beta_1);
            adam.v_b[i] = &adam.v_b[i] * beta_2 + &grad_b.mapv(|g| g * g) * (1.0 - beta_2);

            let update_w = &adam.m_w[i] / &adam.v_w[i].mapv(|v| v.sqrt() + epsilon) * step;
            let update_b = &adam.m_b[i] / &adam.v_b[i].mapv(|v| v.sqrt() + epsilon) * step;
            self.weights[i] -= &update_w;
            self.biases[i] -= &update_b;
        }
    }
}

impl IncrementalRegressor for MLPRegressor {
    fn advance_one_epoch(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        MLPRegressor::advance_one_epoch(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        MLPRegressor::predict(self, x)
    }
}

/// Layer widths for an MLP with the given input width and hidden layers
pub fn layer_sizes(n_features: usize, hidden_layers: &[usize]) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(hidden_layers.len() + 2);
    sizes.push(n_features);
    sizes.extend_from_slice(hidden_layers);
    sizes.push(1);
    sizes
}

fn activate(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| if v > 0.0 || v.is_nan() { v } else { 0.0 }),
        Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
        Activation::Tanh => z.mapv(|v| v.tanh()),
        Activation::Linear => z.clone(),
    }
}

fn activate_derivative(z: &Array2<f64>, activation: Activation) -> Array2<f64> {
    match activation {
        Activation::ReLU => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
        Activation::Sigmoid => {
            let sig = activate(z, Activation::Sigmoid);
            &sig * &(1.0 - &sig)
        }
        Activation::Tanh => {
            let t = z.mapv(|v| v.tanh());
            1.0 - &t * &t
        }
        Activation::Linear => Array2::ones(z.raw_dim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_regression_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((100, 2), |(i, j)| {
            let t = i as f64 / 50.0 - 1.0;
            if j == 0 { t } else { (t * 3.0).sin() }
        });
        let y: Array1<f64> = x.rows().into_iter().map(|row| row[0] * 2.0 + row[1] + 0.5).collect();
        (x, y)
    }

    fn mse(y: &Array1<f64>, p: &Array1<f64>) -> f64 {
        y.iter().zip(p.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f64>() / y.len() as f64
    }

    #[test]
    fn test_default_architecture() {
        let mut mlp = MLPRegressor::new(MLPConfig::default(), 42);
        mlp.initialize(9).unwrap();
        assert_eq!(mlp.layer_sizes(), vec![9, 64, 32, 1]);
        assert_eq!(mlp.n_parameters(), 9 * 64 + 64 + 64 * 32 + 32 + 32 + 1);
    }

    #[test]
    fn test_warm_start_reduces_error() {
        let (x, y) = create_regression_data();
        let config = MLPConfig {
            hidden_layers: vec![32, 16],
            learning_rate: 0.01,
            batch_size: 20,
            alpha: 0.0001,
            ..Default::default()
        };
        let mut mlp = MLPRegressor::new(config, 42);

        mlp.advance_one_epoch(&x, &y).unwrap();
        let early = mse(&y, &mlp.predict(&x).unwrap());
        for _ in 0..200 {
            mlp.advance_one_epoch(&x, &y).unwrap();
        }
        let late = mse(&y, &mlp.predict(&x).unwrap());

        assert_eq!(mlp.epochs_trained(), 201);
        assert_eq!(mlp.loss_curve().len(), 201);
        assert!(late < early, "MSE should drop with more epochs ({} vs {})", late, early);
        assert!(late < y.var(0.0), "MSE ({}) should be below variance ({})", late, y.var(0.0));
    }

    #[test]
    fn test_epoch_continues_from_current_weights() {
        let (x, y) = create_regression_data();
        let mut a = MLPRegressor::new(MLPConfig::default(), 7);
        a.advance_one_epoch(&x, &y).unwrap();
        let snapshot = a.clone();
        a.advance_one_epoch(&x, &y).unwrap();

        let mut b = snapshot;
        b.advance_one_epoch(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (x, y) = create_regression_data();
        let mut a = MLPRegressor::new(MLPConfig::default(), 3);
        let mut b = MLPRegressor::new(MLPConfig::default(), 3);
        for _ in 0..3 {
            a.advance_one_epoch(&x, &y).unwrap();
            b.advance_one_epoch(&x, &y).unwrap();
        }
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_errors() {
        let mlp = MLPRegressor::new(MLPConfig::default(), 0);
        assert!(matches!(mlp.predict(&Array2::zeros((1, 2))), Err(PipelineError::ModelNotFitted)));

        let (x, y) = create_regression_data();
        let mut mlp = MLPRegressor::new(MLPConfig::default(), 0);
        mlp.advance_one_epoch(&x, &y).unwrap();
        assert!(matches!(mlp.predict(&Array2::zeros((1, 3))), Err(PipelineError::ShapeError { .. })));
    }

    #[test]
    fn test_divergence_is_an_error() {
        let x = Array2::from_elem((4, 1), 1.0);
        let y = Array1::from_elem(4, f64::NAN);
        let mut mlp = MLPRegressor::new(MLPConfig::default(), 0);
        let err = mlp.advance_one_epoch(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingError(_)));
    }

    #[test]
    fn test_non_finite_feature_fails_first_epoch() {
        let (mut x, y) = create_regression_data();
        x[[10, 0]] = f64::NAN;
        let mut mlp = MLPRegressor::new(MLPConfig::default(), 0);
        let err = mlp.advance_one_epoch(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::TrainingError(_)));
    }

    #[test]
    fn test_relu_propagates_nan() {
        let z = Array2::from_shape_vec((1, 3), vec![f64::NAN, -1.0, 2.0]).unwrap();
        let relu = activate(&z, Activation::ReLU);
        assert!(relu[[0, 0]].is_nan());
        assert_eq!(relu[[0, 1]], 0.0);
        assert_eq!(relu[[0, 2]], 2.0);
    }

    #[test]
    fn test_activation_functions() {
        let z = Array2::from_shape_vec((2, 3), vec![-1.0, 0.0, 1.0, -2.0, 0.5, 2.0]).unwrap();

        let relu = activate(&z, Activation::ReLU);
        assert_eq!(relu[[0, 0]], 0.0);
        assert_eq!(relu[[0, 2]], 1.0);

        let sigmoid = activate(&z, Activation::Sigmoid);
        assert!((sigmoid[[0, 1]] - 0.5).abs() < 0.001);

        let d = activate_derivative(&z, Activation::ReLU);
        assert_eq!(d[[1, 0]], 0.0);
        assert_eq!(d[[1, 2]], 1.0);
    }

    #[test]
    fn test_serde_snapshot_predicts_identically() {
        let (x, y) = create_regression_data();
        let mut mlp = MLPRegressor::new(MLPConfig::default(), 1);
        mlp.advance_one_epoch(&x, &y).unwrap();

        let json = serde_json::to_string(&mlp).unwrap();
        let restored: MLPRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(mlp.predict(&x).unwrap(), restored.predict(&x).unwrap());
    }
}
