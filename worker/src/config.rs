use std::num::NonZeroUsize;

/// Immutable execution bounds for a trainer.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Passes over the local dataset.
    pub epochs: NonZeroUsize,
    pub batch_size: NonZeroUsize,
    /// Local gradient steps between two push/pull decisions.
    pub free_trial_steps: usize,
    /// Probability of pulling on a decision that does not push.
    pub pull_probability: f64,
    /// Batches between two metric samples.
    pub loss_sample_interval: NonZeroUsize,
    /// Batches between two progress lines.
    pub log_interval: NonZeroUsize,
    /// Base seed, each trainer offsets it by its id. Seeded from the OS when missing.
    pub seed: Option<u64>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        // SAFETY: every literal is non zero.
        let nz = |n| NonZeroUsize::new(n).unwrap();

        Self {
            epochs: nz(1),
            batch_size: nz(64),
            free_trial_steps: 10,
            pull_probability: 0.0,
            loss_sample_interval: nz(1),
            log_interval: nz(50),
            seed: Some(1),
        }
    }
}
