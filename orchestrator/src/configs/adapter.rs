use std::{num::NonZeroUsize, time::Duration};

use parameter_server::ServerConfig;
use worker::WorkerConfig;

use super::SwampConfig;
use crate::error::OrchestratorError;

/// The per actor configurations a `SwampConfig` adapts into.
#[derive(Debug, Clone)]
pub struct ActorConfigs {
    pub trainers: NonZeroUsize,
    pub worker: WorkerConfig,
    pub server: ServerConfig,
    pub validate_batch_size: NonZeroUsize,
    pub validate_max_batch: NonZeroUsize,
}

#[derive(Debug, Default)]
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    /// Validates `cfg` and splits it into the configurations of each actor.
    ///
    /// # Errors
    /// Returns `OrchestratorError::InvalidConfig` if `cfg` is not valid.
    pub fn adapt(&self, cfg: &SwampConfig) -> Result<ActorConfigs, OrchestratorError> {
        cfg.validate()?;

        let worker = self.adapt_worker(cfg)?;
        let server = ServerConfig::new(Duration::from_millis(cfg.recv_timeout_ms));

        Ok(ActorConfigs {
            trainers: non_zero("trainer_number", cfg.trainer_number)?,
            worker,
            server,
            validate_batch_size: non_zero("validate_batch_size", cfg.validate_batch_size)?,
            validate_max_batch: non_zero("validate_max_batch", cfg.validate_max_batch)?,
        })
    }

    fn adapt_worker(&self, cfg: &SwampConfig) -> Result<WorkerConfig, OrchestratorError> {
        Ok(WorkerConfig {
            epochs: non_zero("epochs", cfg.epochs)?,
            batch_size: non_zero("batch_size", cfg.batch_size)?,
            free_trial_steps: cfg.free_trial_steps,
            pull_probability: cfg.pull_probability,
            loss_sample_interval: non_zero("loss_sample_interval", cfg.loss_sample_interval)?,
            log_interval: non_zero("log_interval", cfg.log_interval)?,
            seed: cfg.seed,
        })
    }
}

fn non_zero(name: &str, value: usize) -> Result<NonZeroUsize, OrchestratorError> {
    NonZeroUsize::new(value)
        .ok_or_else(|| OrchestratorError::InvalidConfig(format!("{name} must be greater than zero")))
}
