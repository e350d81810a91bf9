use std::collections::BTreeMap;

use comms::metrics::{self, MetricsLog, PullLog};
use log::{error, info, warn};
use machine_learning::{Dataset, Model};
use parameter_server::{HeldOutValidator, ParameterServer, ServerStats};
use rand::{SeedableRng, rngs::StdRng};
use tokio::{
    runtime::{Builder, Runtime},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use worker::{WorkerBuilder, WorkerMetrics};

use crate::{
    configs::ActorConfigs,
    error::OrchestratorError,
    report::{self, RunReport, Series, TrainerSummary},
};

type ServerHandle = JoinHandle<parameter_server::Result<ServerStats>>;
type TrainerHandle = JoinHandle<worker::Result<WorkerMetrics>>;

#[derive(Debug)]
struct TrainerRun {
    id: usize,
    handle: TrainerHandle,
    metrics: MetricsLog,
    pulls: PullLog,
}

/// Represents an ongoing training run in the background.
///
/// The parameter server runs as an async task and every trainer on its own blocking
/// thread, they only share the upload channel and the snapshot cell.
#[derive(Debug)]
pub struct Session {
    runtime: Runtime,
    token: CancellationToken,
    server: ServerHandle,
    server_log: MetricsLog,
    trainers: Vec<TrainerRun>,
}

impl Session {
    /// Creates a new `Session`, spawning the parameter server and every trainer.
    ///
    /// # Arguments
    /// * `actors` - The adapted per actor configurations.
    /// * `train_set` - The training set, every trainer gets its own copy.
    /// * `held_out` - The parameter server's validation set.
    /// * `model` - Builds a fresh model, called once per actor.
    ///
    /// # Returns
    /// A new `Session` instance or an io error if the runtime could not be built.
    pub fn new<M, F>(
        actors: ActorConfigs,
        train_set: Dataset,
        held_out: Dataset,
        model: F,
    ) -> Result<Self, OrchestratorError>
    where
        M: Model + 'static,
        F: Fn() -> M,
    {
        let runtime = Builder::new_multi_thread().enable_all().build()?;

        let (uploader, uploads) = comms::upload_channel();
        let (writer, reader) = comms::snapshot_cell();
        let (recorder, server_log) = metrics::series();

        // trainers take seed + id, the server takes the next one
        let rng = match actors.worker.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(actors.trainers.get() as u64)),
            None => StdRng::from_os_rng(),
        };
        let validator = HeldOutValidator::new(
            held_out,
            actors.validate_batch_size,
            actors.validate_max_batch,
            rng,
        );
        let server = ParameterServer::new(
            model(),
            validator,
            uploads,
            writer,
            recorder,
            actors.server,
        );

        let token = CancellationToken::new();
        let server = runtime.spawn(server.run(token.clone()));

        let builder = WorkerBuilder::new(actors.worker, uploader, reader);
        let trainers = (0..actors.trainers.get())
            .map(|id| {
                let (worker, metrics, pulls) = builder.build(id, model(), train_set.clone());
                let handle = runtime.spawn_blocking(move || worker.run());

                TrainerRun {
                    id,
                    handle,
                    metrics,
                    pulls,
                }
            })
            .collect();

        info!(trainers = actors.trainers.get(); "session started");

        Ok(Self {
            runtime,
            token,
            server,
            server_log,
            trainers,
        })
    }

    /// Waits for every trainer to finish, then stops the parameter server.
    ///
    /// A failing trainer does not stop the others, nor does a failing parameter server,
    /// both are reported instead.
    ///
    /// # Returns
    /// The run's report or an error if the parameter server task panicked.
    pub fn wait(self) -> Result<RunReport, OrchestratorError> {
        let Self {
            runtime,
            token,
            server,
            server_log,
            trainers,
        } = self;

        runtime.block_on(async move {
            let mut series = BTreeMap::new();
            let mut summaries = Vec::with_capacity(trainers.len());

            for TrainerRun {
                id,
                handle,
                metrics,
                pulls,
            } in trainers
            {
                let summary = match handle.await {
                    Ok(Ok(metrics)) => TrainerSummary {
                        id,
                        metrics: Some(metrics),
                        failure: None,
                    },
                    Ok(Err(e)) => {
                        warn!(trainer_id = id; "trainer failed: {e}");
                        TrainerSummary {
                            id,
                            metrics: None,
                            failure: Some(e.to_string()),
                        }
                    }
                    Err(e) => {
                        warn!(trainer_id = id; "trainer task failed: {e}");
                        TrainerSummary {
                            id,
                            metrics: None,
                            failure: Some(e.to_string()),
                        }
                    }
                };

                summaries.push(summary);
                series.insert(report::trainer_key(id), Series::Metrics(metrics.records()));
                series.insert(report::pull_key(id), Series::Pulls(pulls.records()));
            }

            info!("every trainer finished, stopping the parameter server");
            token.cancel();

            let (stats, coordinator_failure) = match server.await? {
                Ok(stats) => (Some(stats), None),
                Err(e) => {
                    error!("parameter server died during the run: {e}");
                    (None, Some(e.to_string()))
                }
            };

            series.insert(report::PS_KEY.to_string(), Series::Metrics(server_log.records()));

            Ok::<_, OrchestratorError>(RunReport {
                series,
                trainers: summaries,
                server: stats,
                coordinator_failure,
            })
        })
    }
}
