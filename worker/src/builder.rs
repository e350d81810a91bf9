use comms::{
    SnapshotReader, Uploader,
    metrics::{self, MetricsLog, PullLog},
};
use machine_learning::{Dataset, Model};
use rand::{SeedableRng, rngs::StdRng};

use crate::{SyncPolicy, Worker, WorkerConfig, WorkerMetrics, state::WorkerState};

/// Wires trainers to the shared upload channel and snapshot cell.
pub struct WorkerBuilder {
    cfg: WorkerConfig,
    uploader: Uploader,
    snapshots: SnapshotReader,
}

impl WorkerBuilder {
    /// Creates a new `WorkerBuilder`.
    ///
    /// # Args
    /// * `cfg` - The configuration every built trainer runs with.
    /// * `uploader` - The sending end of the upload channel.
    /// * `snapshots` - A read handle over the shared snapshot cell.
    ///
    /// # Returns
    /// A new `WorkerBuilder` instance.
    pub fn new(cfg: WorkerConfig, uploader: Uploader, snapshots: SnapshotReader) -> Self {
        Self {
            cfg,
            uploader,
            snapshots,
        }
    }

    /// Builds the trainer `id`.
    ///
    /// # Args
    /// * `id` - The trainer's identifier, also offsets the configured seed.
    /// * `model` - The trainer's private model.
    /// * `dataset` - The trainer's private copy of the training set.
    ///
    /// # Returns
    /// The trainer along with read handles over its metrics and pull series.
    pub fn build<M: Model>(
        &self,
        id: usize,
        model: M,
        dataset: Dataset,
    ) -> (Worker<M>, MetricsLog, PullLog) {
        let rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_os_rng(),
        };

        let (recorder, metrics_log) = metrics::series();
        let (pulls, pull_log) = metrics::series();

        let state = WorkerState {
            id,
            epoch: 0,
            model,
            policy: SyncPolicy::new(self.cfg.free_trial_steps, self.cfg.pull_probability),
            rng,
            uploader: self.uploader.clone(),
            snapshots: self.snapshots.clone(),
            recorder,
            pulls,
            metrics: WorkerMetrics::default(),
        };

        let worker = Worker::new(self.cfg.clone(), dataset, state);
        (worker, metrics_log, pull_log)
    }
}
