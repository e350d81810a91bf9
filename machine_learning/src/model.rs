use ndarray::{Array1, ArrayView1};

use crate::{
    Batch, MlErr, Result,
    optimization::{GradientDescentWithMomentum, Optimizer},
};

/// The outcome of running a model over a single batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchEval {
    pub loss: f64,
    pub correct: usize,
    pub total: usize,
}

impl BatchEval {
    /// The ratio of correct predictions, 0 for an empty batch.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        self.correct as f64 / self.total as f64
    }
}

/// A trainable model whose whole state can be exported and restored as an opaque blob.
pub trait Model: Send {
    /// Runs the model over `batch` without changing it.
    ///
    /// # Arguments
    /// * `batch` - The batch to evaluate.
    ///
    /// # Returns
    /// The batch loss and prediction counts.
    fn evaluate(&self, batch: &Batch<'_>) -> Result<BatchEval>;

    /// Runs the model over `batch` and then applies a single optimization step.
    ///
    /// # Arguments
    /// * `batch` - The batch to train on.
    ///
    /// # Returns
    /// The loss and prediction counts measured before the step was applied.
    fn train_step(&mut self, batch: &Batch<'_>) -> Result<BatchEval>;

    /// Exports the parameters of the model.
    fn export_state(&self) -> Vec<u8>;

    /// Replaces the parameters of the model with a previously exported state.
    ///
    /// # Arguments
    /// * `state` - A blob produced by `export_state` on a model of the same shape.
    ///
    /// # Returns
    /// An error if the blob does not match the shape of this model.
    fn load_state(&mut self, state: &[u8]) -> Result<()>;
}

const EPS: f32 = 1e-7;

/// A binary classifier trained with gradient descent with momentum over the binary cross entropy.
///
/// The parameters are laid out flat, the weights first and the bias last.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: GradientDescentWithMomentum,
}

impl LogisticRegression {
    /// Creates a new `LogisticRegression` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `features` - The amount of features per sample.
    /// * `learning_rate` - The learning rate of the optimizer.
    /// * `momentum` - The momentum of the optimizer.
    ///
    /// # Returns
    /// A new `LogisticRegression` instance.
    pub fn new(features: usize, learning_rate: f32, momentum: f32) -> Self {
        let len = features + 1;

        Self {
            params: vec![0.; len],
            grad: vec![0.; len],
            optimizer: GradientDescentWithMomentum::new(len, learning_rate, momentum),
        }
    }

    /// The flat parameters, weights first and bias last.
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    fn features(&self) -> usize {
        self.params.len() - 1
    }

    fn check_batch(&self, batch: &Batch<'_>) -> Result<()> {
        let features = self.features();

        if batch.x.ncols() != features {
            return Err(MlErr::SizeMismatch {
                a: "batch features",
                b: "model features",
                got: batch.x.ncols(),
                expected: features,
            });
        }

        Ok(())
    }

    fn predict(&self, batch: &Batch<'_>) -> Array1<f32> {
        let (weights, bias) = self.params.split_at(self.features());
        let weights = ArrayView1::from(weights);

        (batch.x.dot(&weights) + bias[0]).mapv(|z| 1. / (1. + (-z).exp()))
    }

    fn score(probs: &Array1<f32>, labels: ArrayView1<'_, f32>) -> BatchEval {
        let total = labels.len();
        let mut loss = 0.0f64;
        let mut correct = 0;

        for (&p, &y) in probs.iter().zip(labels) {
            let p = p.clamp(EPS, 1. - EPS);
            loss -= f64::from(y * p.ln() + (1. - y) * (1. - p).ln());

            if (p >= 0.5) == (y >= 0.5) {
                correct += 1;
            }
        }

        if total > 0 {
            loss /= total as f64;
        }

        BatchEval {
            loss,
            correct,
            total,
        }
    }
}

impl Model for LogisticRegression {
    fn evaluate(&self, batch: &Batch<'_>) -> Result<BatchEval> {
        self.check_batch(batch)?;
        let probs = self.predict(batch);
        Ok(Self::score(&probs, batch.y))
    }

    fn train_step(&mut self, batch: &Batch<'_>) -> Result<BatchEval> {
        self.check_batch(batch)?;
        let probs = self.predict(batch);
        let eval = Self::score(&probs, batch.y);

        if batch.is_empty() {
            return Ok(eval);
        }

        let n = batch.len() as f32;
        let delta = (&probs - &batch.y) / n;
        let features = self.features();

        let grad_w = batch.x.t().dot(&delta);
        self.grad[..features]
            .iter_mut()
            .zip(&grad_w)
            .for_each(|(g, v)| *g = *v);
        self.grad[features] = delta.sum();

        self.optimizer.update_params(&self.grad, &mut self.params)?;
        Ok(eval)
    }

    fn export_state(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.params).to_vec()
    }

    fn load_state(&mut self, state: &[u8]) -> Result<()> {
        let expected = self.params.len() * size_of::<f32>();

        if state.len() != expected {
            return Err(MlErr::MalformedState {
                got: state.len(),
                expected,
            });
        }

        self.params = bytemuck::pod_collect_to_vec(state);
        Ok(())
    }
}
