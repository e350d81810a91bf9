use log::info;
use machine_learning::{Dataset, Model};

use crate::{Result, Schedule, WorkerConfig, WorkerMetrics, state::WorkerState};

/// A trainer.
///
/// It walks its own shuffled copy of the dataset for a fixed amount of epochs, taking local
/// gradient steps and, every `free_trial_steps` steps, either pushing its model to the
/// parameter server, pulling the shared snapshot or neither.
///
/// `run` never blocks on the upload channel nor on the shared snapshot, it is meant to be
/// driven from a blocking thread.
pub struct Worker<M: Model> {
    cfg: WorkerConfig,
    schedule: Schedule,
    dataset: Dataset,
    state: WorkerState<M>,
}

impl<M: Model> Worker<M> {
    pub(crate) fn new(cfg: WorkerConfig, dataset: Dataset, state: WorkerState<M>) -> Self {
        let schedule = Schedule::new(cfg.loss_sample_interval, cfg.log_interval);

        Self {
            cfg,
            schedule,
            dataset,
            state,
        }
    }

    /// Trains for the configured amount of epochs.
    ///
    /// # Returns
    /// The run's counters or the first error, which stops this trainer only.
    pub fn run(mut self) -> Result<WorkerMetrics> {
        let id = self.state.id;
        info!(trainer_id = id, samples = self.dataset.len(); "trainer started");

        for epoch in 1..=self.cfg.epochs.get() {
            self.state.epoch = epoch;
            self.dataset.shuffle(&mut self.state.rng);

            for (batch_idx, batch) in self.dataset.batches(self.cfg.batch_size).enumerate() {
                let eval = self.state.step(&batch)?;

                if self.schedule.should_sample(batch_idx) {
                    self.state.recorder.record(eval.loss, eval.accuracy());
                }

                if self.schedule.should_log(batch_idx) {
                    info!(
                        trainer_id = id,
                        epoch = epoch,
                        batch = batch_idx,
                        loss = eval.loss;
                        "training"
                    );
                }
            }

            info!(trainer_id = id, epoch = epoch; "trainer done epoch");
        }

        let metrics = self.state.metrics;
        info!(
            trainer_id = id,
            steps = metrics.steps,
            pushes = metrics.pushes,
            pulls = metrics.pulls;
            "trainer finished"
        );

        Ok(metrics)
    }
}
