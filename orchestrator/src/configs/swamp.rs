use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use super::DatasetConfig;
use crate::error::OrchestratorError;

/// The whole run's configuration, every missing field takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwampConfig {
    pub trainer_number: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub momentum: f32,
    pub seed: Option<u64>,
    pub free_trial_steps: usize,
    pub pull_probability: f64,
    pub loss_sample_interval: usize,
    pub log_interval: usize,
    pub validate_batch_size: usize,
    pub validate_max_batch: usize,
    pub recv_timeout_ms: u64,
    pub dataset: DatasetConfig,
}

impl Default for SwampConfig {
    fn default() -> Self {
        Self {
            trainer_number: 1,
            epochs: 1,
            batch_size: 64,
            learning_rate: 0.01,
            momentum: 0.5,
            seed: Some(1),
            free_trial_steps: 10,
            pull_probability: 0.0,
            loss_sample_interval: 1,
            log_interval: 50,
            validate_batch_size: 64,
            validate_max_batch: 5,
            recv_timeout_ms: 1000,
            dataset: DatasetConfig::default(),
        }
    }
}

impl SwampConfig {
    /// Parses a configuration from its json representation.
    ///
    /// # Errors
    /// Returns `OrchestratorError::Json` if the text is not a valid configuration.
    pub fn from_json(text: &str) -> Result<Self, OrchestratorError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a json configuration file.
    ///
    /// # Errors
    /// Returns an `OrchestratorError` if the file can't be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OrchestratorError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Checks every field is within its domain.
    ///
    /// # Errors
    /// Returns `OrchestratorError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let non_zero = [
            ("trainer_number", self.trainer_number),
            ("epochs", self.epochs),
            ("batch_size", self.batch_size),
            ("loss_sample_interval", self.loss_sample_interval),
            ("log_interval", self.log_interval),
            ("validate_batch_size", self.validate_batch_size),
            ("validate_max_batch", self.validate_max_batch),
        ];

        if let Some((name, _)) = non_zero.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("{name} must be greater than zero")));
        }

        if !(0.0..=1.0).contains(&self.pull_probability) {
            return Err(invalid(format!(
                "pull_probability must be within [0, 1], got {}",
                self.pull_probability
            )));
        }

        if self.recv_timeout_ms == 0 {
            return Err(invalid("recv_timeout_ms must be greater than zero".into()));
        }

        if !self.learning_rate.is_finite() || !self.momentum.is_finite() {
            return Err(invalid("learning_rate and momentum must be finite".into()));
        }

        self.dataset.validate()
    }
}

fn invalid(msg: String) -> OrchestratorError {
    OrchestratorError::InvalidConfig(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = SwampConfig::from_json(r#"{ "trainer_number": 4, "pull_probability": 0.3 }"#)
            .unwrap();

        assert_eq!(cfg.trainer_number, 4);
        assert_eq!(cfg.pull_probability, 0.3);
        assert_eq!(cfg.free_trial_steps, 10);
        assert_eq!(cfg.validate_max_batch, 5);
        assert_eq!(cfg.recv_timeout_ms, 1000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = SwampConfig::from_json(r#"{ "trainers": 4 }"#).unwrap_err();
        assert!(matches!(err, OrchestratorError::Json(_)));
    }

    #[test]
    fn zero_trainers_is_invalid() {
        let cfg = SwampConfig {
            trainer_number: 0,
            ..SwampConfig::default()
        };

        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config: trainer_number must be greater than zero"
        );
    }

    #[test]
    fn pull_probability_out_of_range_is_invalid() {
        for p in [-0.1, 1.5, f64::NAN] {
            let cfg = SwampConfig {
                pull_probability: p,
                ..SwampConfig::default()
            };
            assert!(cfg.validate().is_err(), "accepted {p}");
        }
    }

    #[test]
    fn zero_validation_batches_is_invalid() {
        let cfg = SwampConfig {
            validate_max_batch: 0,
            ..SwampConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
