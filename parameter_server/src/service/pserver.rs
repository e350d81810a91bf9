use comms::{
    Received, SnapshotWriter, Upload, UploadReceiver, metrics::MetricsRecorder,
    msg::CandidateMessage,
};
use log::{debug, error, info};
use machine_learning::Model;
use tokio::task;
use tokio_util::sync::CancellationToken;

use crate::{
    Result, ServerConfig, ServerErr, ServerStats,
    validation::{Validation, Validator},
};

/// What happened to the candidate handled by a single loop iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Nothing arrived before the receive timeout.
    Empty,
    /// The reported loss did not beat the best validated loss, validation was skipped.
    PreFiltered,
    /// The candidate was validated and did not improve.
    Rejected { loss: f64 },
    /// The candidate was published under `version`.
    Accepted { version: u64, loss: f64 },
    /// The server was cancelled while the candidate was being validated.
    Discarded,
}

/// The result of validating a candidate, not yet applied to the server state.
enum Verdict<'a> {
    PreFiltered,
    Rejected(f64),
    Accept {
        state: &'a [u8],
        loss: f64,
        validation: Validation,
    },
}

/// The validating coordinator.
///
/// It drains candidates from the upload channel, validates them with its own private
/// model and publishes the ones that improve on the best validated loss so far.
pub struct ParameterServer<M: Model, V: Validator> {
    model: M,
    validator: V,
    uploads: UploadReceiver,
    snapshot: SnapshotWriter,
    recorder: MetricsRecorder,
    best_loss: f64,
    stats: ServerStats,
    cfg: ServerConfig,
}

impl<M: Model, V: Validator> ParameterServer<M, V> {
    /// Creates a new `ParameterServer`.
    ///
    /// # Arguments
    /// * `model` - The private model candidates are loaded into, shaped like the trainers' ones.
    /// * `validator` - The candidate scorer.
    /// * `uploads` - The receiving end of the upload channel.
    /// * `snapshot` - The single writer of the shared model cell.
    /// * `recorder` - The series accepted candidates are logged to.
    /// * `cfg` - The runtime bounds.
    ///
    /// # Returns
    /// A new `ParameterServer` instance.
    pub fn new(
        model: M,
        validator: V,
        uploads: UploadReceiver,
        snapshot: SnapshotWriter,
        recorder: MetricsRecorder,
        cfg: ServerConfig,
    ) -> Self {
        Self {
            model,
            validator,
            uploads,
            snapshot,
            recorder,
            best_loss: f64::INFINITY,
            stats: ServerStats::default(),
            cfg,
        }
    }

    /// The validated loss of the last accepted candidate, infinity until the first accept.
    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn stats(&self) -> ServerStats {
        self.stats
    }

    /// Runs the server loop until `token` is cancelled.
    ///
    /// # Arguments
    /// * `token` - The external stop signal.
    ///
    /// # Returns
    /// The final counters or the first fatal error.
    pub async fn run(mut self, token: CancellationToken) -> Result<ServerStats> {
        let timeout_ms = self.cfg.recv_timeout().as_millis() as u64;
        info!(timeout_ms = timeout_ms; "parameter server started");

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                res = self.step(&token) => {
                    if let Err(e) = res {
                        error!("parameter server stopped: {e}");
                        return Err(e);
                    }
                }
            }
        }

        let ServerStats {
            received,
            pre_filtered,
            rejected,
            accepted,
        } = self.stats;
        info!(
            received = received,
            pre_filtered = pre_filtered,
            rejected = rejected,
            accepted = accepted;
            "parameter server stopped"
        );

        Ok(self.stats)
    }

    /// Waits for at most one candidate and handles it.
    ///
    /// Must be called from a multi threaded runtime, validation blocks the current worker
    /// thread. A candidate whose validation ends after `token` was cancelled is discarded.
    ///
    /// # Arguments
    /// * `token` - The external stop signal.
    ///
    /// # Returns
    /// What happened to the candidate or a fatal error.
    pub async fn step(&mut self, token: &CancellationToken) -> Result<Outcome> {
        let upload = match self.uploads.recv_timeout(self.cfg.recv_timeout()).await {
            Received::Empty => return Ok(Outcome::Empty),
            Received::Upload(upload) => upload,
        };

        let verdict = task::block_in_place(|| self.assess(&upload))?;

        if token.is_cancelled() {
            debug!("cancelled during validation, candidate discarded");
            return Ok(Outcome::Discarded);
        }

        Ok(self.commit(verdict))
    }

    /// Decodes, pre-filters and validates a single candidate, publishing it if it improves.
    ///
    /// # Arguments
    /// * `upload` - The candidate as it came out of the upload channel.
    ///
    /// # Returns
    /// What happened to the candidate or an error if it could not be decoded, loaded or validated.
    pub fn handle(&mut self, upload: &Upload) -> Result<Outcome> {
        let verdict = self.assess(upload)?;
        Ok(self.commit(verdict))
    }

    fn assess<'a>(&mut self, upload: &'a Upload) -> Result<Verdict<'a>> {
        let CandidateMessage { state, loss } = upload.candidate()?;
        self.stats.received += 1;

        self.model.load_state(state).map_err(ServerErr::ModelLoad)?;

        // written negated so that a NaN loss never gets through
        if !(loss < self.best_loss) {
            debug!(loss = loss, best = self.best_loss; "candidate pre-filtered");
            return Ok(Verdict::PreFiltered);
        }

        let validation = self.validator.validate(&self.model)?;

        if !(validation.loss < self.best_loss) {
            debug!(
                loss = loss,
                validated = validation.loss,
                best = self.best_loss;
                "candidate rejected"
            );
            return Ok(Verdict::Rejected(validation.loss));
        }

        Ok(Verdict::Accept {
            state,
            loss,
            validation,
        })
    }

    fn commit(&mut self, verdict: Verdict<'_>) -> Outcome {
        match verdict {
            Verdict::PreFiltered => {
                self.stats.pre_filtered += 1;
                Outcome::PreFiltered
            }
            Verdict::Rejected(loss) => {
                self.stats.rejected += 1;
                Outcome::Rejected { loss }
            }
            Verdict::Accept {
                state,
                loss,
                validation,
            } => {
                self.best_loss = validation.loss;
                let version = self.snapshot.publish(state.to_vec(), loss);
                self.recorder.record(validation.loss, validation.accuracy);
                self.stats.accepted += 1;

                info!(
                    version = version,
                    loss = validation.loss,
                    accuracy = validation.accuracy;
                    "accepted candidate"
                );

                Outcome::Accepted {
                    version,
                    loss: validation.loss,
                }
            }
        }
    }
}
