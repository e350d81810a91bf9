use machine_learning::Dataset;
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// The synthetic two-cluster dataset a run trains and validates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Samples every trainer walks through.
    pub samples: usize,
    /// Held-out samples, only the parameter server sees them.
    pub validation_samples: usize,
    pub features: usize,
    /// Distance between both cluster centers on each feature.
    pub separation: f32,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            samples: 6000,
            validation_samples: 1000,
            features: 10,
            separation: 1.0,
        }
    }
}

impl DatasetConfig {
    pub(super) fn validate(&self) -> Result<(), OrchestratorError> {
        if self.samples == 0 || self.validation_samples == 0 || self.features == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "dataset samples, validation_samples and features must be greater than zero"
                    .into(),
            ));
        }

        if !self.separation.is_finite() {
            return Err(OrchestratorError::InvalidConfig(
                "dataset separation must be finite".into(),
            ));
        }

        Ok(())
    }

    /// Samples the training and held-out sets.
    ///
    /// # Arguments
    /// * `seed` - Seeds the generator, drawn from the OS when missing.
    ///
    /// # Returns
    /// The training set and the held-out set, in that order.
    ///
    /// # Errors
    /// Returns `OrchestratorError::Dataset` if the data could not be sampled.
    pub fn generate(&self, seed: Option<u64>) -> Result<(Dataset, Dataset), OrchestratorError> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let total = self.samples + self.validation_samples;
        let dataset = Dataset::two_clusters(&mut rng, total, self.features, self.separation)?;
        Ok(dataset.split_tail(self.validation_samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_disjoint_sets_of_the_configured_sizes() {
        let cfg = DatasetConfig {
            samples: 100,
            validation_samples: 30,
            features: 3,
            separation: 2.0,
        };

        let (train, held_out) = cfg.generate(Some(9)).unwrap();
        assert_eq!(train.len(), 100);
        assert_eq!(held_out.len(), 30);
        assert_eq!(held_out.features(), 3);
    }
}
