use std::num::NonZeroUsize;

use machine_learning::{Dataset, Model};
use rand::rngs::StdRng;

use super::{Validation, Validator};
use crate::{Result, ServerErr};

/// Scores candidates over a random subset of a held-out dataset.
///
/// The dataset is reshuffled before every validation, so each candidate is scored on
/// different batches and the whole set is reached over time.
#[derive(Debug, Clone)]
pub struct HeldOutValidator {
    dataset: Dataset,
    batch_size: NonZeroUsize,
    max_batch: NonZeroUsize,
    rng: StdRng,
}

impl HeldOutValidator {
    /// Creates a new `HeldOutValidator`.
    ///
    /// # Arguments
    /// * `dataset` - The held-out samples, never seen by a trainer.
    /// * `batch_size` - The amount of samples per validation batch.
    /// * `max_batch` - The amount of batches to evaluate per candidate.
    /// * `rng` - Drives the reshuffle before each validation.
    ///
    /// # Returns
    /// A new `HeldOutValidator` instance.
    pub fn new(
        dataset: Dataset,
        batch_size: NonZeroUsize,
        max_batch: NonZeroUsize,
        rng: StdRng,
    ) -> Self {
        Self {
            dataset,
            batch_size,
            max_batch,
            rng,
        }
    }
}

impl Validator for HeldOutValidator {
    /// Sums the loss of at most `max_batch` batches and divides it by `max_batch`,
    /// even when the dataset runs out of batches earlier. The accuracy is taken over
    /// every sample actually seen.
    fn validate<M: Model + ?Sized>(&mut self, model: &M) -> Result<Validation> {
        let max_batch = self.max_batch.get();
        let mut loss = 0.0;
        let mut correct = 0;
        let mut total = 0;

        self.dataset.shuffle(&mut self.rng);
        for batch in self.dataset.batches(self.batch_size).take(max_batch) {
            let eval = model.evaluate(&batch).map_err(ServerErr::Validation)?;
            loss += eval.loss;
            correct += eval.correct;
            total += eval.total;
        }

        if total == 0 {
            return Err(ServerErr::EmptyValidationSet);
        }

        Ok(Validation {
            loss: loss / max_batch as f64,
            accuracy: correct as f64 / total as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::LogisticRegression;
    use ndarray::{Array1, Array2};
    use rand::SeedableRng;

    use super::*;

    fn held_out(dataset: Dataset, batch_size: usize, max_batch: usize) -> HeldOutValidator {
        HeldOutValidator::new(
            dataset,
            NonZeroUsize::new(batch_size).unwrap(),
            NonZeroUsize::new(max_batch).unwrap(),
            StdRng::seed_from_u64(7),
        )
    }

    fn validator(samples: usize, batch_size: usize, max_batch: usize) -> HeldOutValidator {
        let x = Array2::zeros((samples, 2));
        let y = Array1::from_elem(samples, 1.0);
        held_out(Dataset::new(x, y).unwrap(), batch_size, max_batch)
    }

    #[test]
    fn loss_is_averaged_over_the_configured_batches() {
        let model = LogisticRegression::new(2, 0.1, 0.0);
        let ln2 = std::f64::consts::LN_2;

        let full = validator(40, 8, 5).validate(&model).unwrap();
        assert!((full.loss - ln2).abs() < 1e-6);

        // only 2 of the 5 batches exist, the denominator stays 5
        let short = validator(16, 8, 5).validate(&model).unwrap();
        assert!((short.loss - ln2 * 2.0 / 5.0).abs() < 1e-6);
    }

    #[test]
    fn accuracy_counts_every_seen_sample() {
        let model = LogisticRegression::new(2, 0.1, 0.0);
        let validation = validator(20, 8, 2).validate(&model).unwrap();

        // the zero model predicts 0.5 which rounds to the positive label
        assert_eq!(validation.accuracy, 1.0);
    }

    #[test]
    fn every_validation_draws_a_fresh_subset() {
        // 16 positives up front, 84 negatives behind them
        let x = Array2::zeros((100, 2));
        let y = Array1::from_shape_fn(100, |i| if i < 16 { 1.0 } else { 0.0 });
        let mut validator = held_out(Dataset::new(x, y).unwrap(), 8, 2);
        let model = LogisticRegression::new(2, 0.1, 0.0);

        // the zero model is right only on positives, so a lower accuracy means a
        // negative sample behind the first two batches was scored
        let accuracies: Vec<f64> = (0..20)
            .map(|_| validator.validate(&model).unwrap().accuracy)
            .collect();

        assert!(accuracies.iter().any(|&accuracy| accuracy < 1.0));
        assert!(accuracies.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn empty_dataset_fails() {
        let model = LogisticRegression::new(2, 0.1, 0.0);
        let err = validator(0, 8, 2).validate(&model).unwrap_err();
        assert!(matches!(err, ServerErr::EmptyValidationSet));
    }
}
