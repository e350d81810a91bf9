use comms::{
    SnapshotReader, Uploader,
    metrics::{MetricsRecorder, PullRecorder},
    msg::CandidateMessage,
};
use log::debug;
use machine_learning::{Batch, BatchEval, Model};
use rand::rngs::StdRng;

use crate::{Decision, Result, SyncPolicy, WorkerErr, WorkerMetrics};

/// Everything a trainer mutates while walking its dataset.
pub(crate) struct WorkerState<M: Model> {
    pub id: usize,
    pub epoch: usize,
    pub model: M,
    pub policy: SyncPolicy,
    pub rng: StdRng,
    pub uploader: Uploader,
    pub snapshots: SnapshotReader,
    pub recorder: MetricsRecorder,
    pub pulls: PullRecorder,
    pub metrics: WorkerMetrics,
}

impl<M: Model> WorkerState<M> {
    /// Runs a single local step over `batch`, either a gradient step or a decision.
    ///
    /// # Arguments
    /// * `batch` - The current batch.
    ///
    /// # Returns
    /// The loss and accuracy counts of the model on this batch.
    pub fn step(&mut self, batch: &Batch<'_>) -> Result<BatchEval> {
        let epoch = self.epoch;
        self.metrics.bump_step();
        self.metrics.add_rows(batch.len());

        if !self.policy.is_decision_point() {
            let eval = self
                .model
                .train_step(batch)
                .map_err(|source| WorkerErr::Training { epoch, source })?;

            self.policy.on_train();
            return Ok(eval);
        }

        let eval = self
            .model
            .evaluate(batch)
            .map_err(|source| WorkerErr::Training { epoch, source })?;

        self.metrics.decisions += 1;

        match self.policy.decide(eval.loss, &mut self.rng) {
            Decision::Push => self.push(eval.loss),
            Decision::Pull => self.pull()?,
            Decision::Hold => {}
        }

        Ok(eval)
    }

    fn push(&mut self, loss: f64) {
        let state = self.model.export_state();
        self.uploader.send(&CandidateMessage::new(&state, loss));
        self.metrics.pushes += 1;

        debug!(trainer_id = self.id, loss = loss; "pushed candidate");
    }

    fn pull(&mut self) -> Result<()> {
        let Some(snapshot) = self.snapshots.get() else {
            self.metrics.empty_pulls += 1;
            debug!(trainer_id = self.id; "nothing to pull yet");
            return Ok(());
        };

        self.model
            .load_state(snapshot.state())
            .map_err(|source| WorkerErr::SnapshotLoad {
                epoch: self.epoch,
                version: snapshot.version(),
                source,
            })?;

        self.policy.adopt(snapshot.loss());
        self.pulls.record(snapshot.loss());
        self.metrics.pulls += 1;

        debug!(
            trainer_id = self.id,
            version = snapshot.version(),
            loss = snapshot.loss();
            "pulled snapshot"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use comms::{metrics, snapshot_cell, upload_channel};
    use machine_learning::{Dataset, LogisticRegression};
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn pull_on_an_empty_cell_keeps_model_and_reference() {
        let (uploader, _uploads) = upload_channel();
        let (_writer, snapshots) = snapshot_cell();
        let (recorder, _) = metrics::series();
        let (pulls, pull_log) = metrics::series();

        let mut rng = StdRng::seed_from_u64(3);
        let dataset = Dataset::two_clusters(&mut rng, 16, 2, 4.0).unwrap();

        let mut state = WorkerState {
            id: 0,
            epoch: 0,
            model: LogisticRegression::new(2, 0.1, 0.5),
            policy: SyncPolicy::new(0, 1.0),
            rng,
            uploader,
            snapshots,
            recorder,
            pulls,
            metrics: WorkerMetrics::default(),
        };

        let batch = dataset.batches(NonZeroUsize::new(16).unwrap()).next().unwrap();
        state.model.train_step(&batch).unwrap();
        assert_eq!(state.policy.decide(0.3, &mut state.rng), Decision::Push);

        let before = state.model.export_state();
        state.pull().unwrap();

        assert_eq!(state.model.export_state(), before);
        assert_eq!(state.policy.reference_score(), 0.3);
        assert_eq!(state.metrics.empty_pulls, 1);
        assert_eq!(state.metrics.pulls, 0);
        assert!(pull_log.is_empty());
    }
}
