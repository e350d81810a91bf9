use std::num::NonZeroUsize;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Distribution, Normal};

use crate::{MlErr, Result};

/// A contiguous slice of samples, `x` holds one row per sample and `y` its binary label.
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    pub x: ArrayView2<'a, f32>,
    pub y: ArrayView1<'a, f32>,
}

impl Batch<'_> {
    /// The amount of samples in this batch.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// An in-memory labeled dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<f32>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The samples, one per row.
    /// * `y` - The labels, one per sample.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the amount of rows and labels differ.
    pub fn new(x: Array2<f32>, y: Array1<f32>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                a: "labels",
                b: "samples",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    /// Samples two gaussian clusters with unit variance, one per label, centered
    /// at `-separation / 2` and `separation / 2` on every feature.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `samples` - The amount of samples to generate.
    /// * `features` - The amount of features per sample.
    /// * `separation` - The distance between both cluster centers on each axis.
    ///
    /// # Returns
    /// A new `Dataset` or an error if the distribution could not be built.
    pub fn two_clusters<R: Rng>(
        rng: &mut R,
        samples: usize,
        features: usize,
        separation: f32,
    ) -> Result<Self> {
        let half = separation / 2.0;
        let negative = Normal::new(-half, 1.0)
            .map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
        let positive =
            Normal::new(half, 1.0).map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;

        let mut x = Array2::zeros((samples, features));
        let mut y = Array1::zeros(samples);

        for (mut row, label) in x.rows_mut().into_iter().zip(y.iter_mut()) {
            let is_positive = rng.random_bool(0.5);
            let dist = if is_positive { &positive } else { &negative };

            row.iter_mut().for_each(|v| *v = dist.sample(&mut *rng));
            *label = if is_positive { 1.0 } else { 0.0 };
        }

        Self::new(x, y)
    }

    /// The amount of samples.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// The amount of features per sample.
    pub fn features(&self) -> usize {
        self.x.ncols()
    }

    /// Randomly permutes the samples in place.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        self.x = self.x.select(Axis(0), &order);
        self.y = self.y.select(Axis(0), &order);
    }

    /// Splits off the last `len` samples into a new dataset.
    ///
    /// # Arguments
    /// * `len` - The amount of samples to move into the returned dataset.
    ///
    /// # Returns
    /// The remaining samples and the split off ones, in that order.
    pub fn split_tail(self, len: usize) -> (Self, Self) {
        let at = self.len().saturating_sub(len);
        let (x_head, x_tail) = self.x.view().split_at(Axis(0), at);
        let (y_head, y_tail) = self.y.view().split_at(Axis(0), at);

        let head = Self {
            x: x_head.to_owned(),
            y: y_head.to_owned(),
        };
        let tail = Self {
            x: x_tail.to_owned(),
            y: y_tail.to_owned(),
        };

        (head, tail)
    }

    /// Iterates the dataset in consecutive batches, the last one may be smaller.
    ///
    /// # Arguments
    /// * `batch_size` - The maximum amount of samples per batch.
    ///
    /// # Returns
    /// An iterator over the batches.
    pub fn batches(&self, batch_size: NonZeroUsize) -> impl Iterator<Item = Batch<'_>> {
        let n = batch_size.get();

        self.x
            .axis_chunks_iter(Axis(0), n)
            .zip(self.y.axis_chunks_iter(Axis(0), n))
            .map(|(x, y)| Batch { x, y })
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn tiny() -> Dataset {
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![0.0, 1.0, 2.0, 3.0, 4.0];
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn rejects_mismatched_labels() {
        let x = Array2::zeros((3, 2));
        let y = Array1::zeros(2);
        assert!(Dataset::new(x, y).is_err());
    }

    #[test]
    fn last_batch_is_partial() {
        let dataset = tiny();
        let sizes: Vec<_> = dataset
            .batches(NonZeroUsize::new(2).unwrap())
            .map(|b| b.len())
            .collect();

        assert_eq!(sizes, [2, 2, 1]);
    }

    #[test]
    fn shuffle_keeps_rows_paired() {
        let mut dataset = tiny();
        let mut rng = StdRng::seed_from_u64(7);
        dataset.shuffle(&mut rng);

        for batch in dataset.batches(NonZeroUsize::new(1).unwrap()) {
            assert_eq!(batch.x[[0, 0]], batch.y[0]);
            assert_eq!(batch.x[[0, 1]], batch.y[0]);
        }

        let mut labels: Vec<_> = dataset.y.to_vec();
        labels.sort_by(f32::total_cmp);
        assert_eq!(labels, [0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn split_tail_moves_last_samples() {
        let (head, tail) = tiny().split_tail(2);
        assert_eq!(head.len(), 3);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail.y.to_vec(), [3.0, 4.0]);
    }

    #[test]
    fn clusters_have_binary_labels() {
        let mut rng = StdRng::seed_from_u64(1);
        let dataset = Dataset::two_clusters(&mut rng, 64, 3, 4.0).unwrap();

        assert_eq!(dataset.len(), 64);
        assert_eq!(dataset.features(), 3);
        assert!(dataset.y.iter().all(|&l| l == 0.0 || l == 1.0));
    }
}
