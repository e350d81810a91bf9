pub mod configs;
pub mod error;
pub mod report;
mod session;

use machine_learning::{Dataset, Model};

pub use error::OrchestratorError;
pub use report::{BestMetrics, RunReport};
pub use session::Session;

use crate::configs::{Adapter, SwampConfig};

/// Starts a swamp training run and returns the active session.
///
/// # Arguments
/// * `cfg` - The run's configuration.
/// * `train_set` - The training set, every trainer walks its own shuffled copy.
/// * `held_out` - The set candidates are validated on.
/// * `model` - Builds a fresh model, called once per trainer plus once for the parameter server.
///
/// # Errors
/// Returns an `OrchestratorError` if the configuration is invalid or the runtime can't start.
pub fn train<M, F>(
    cfg: &SwampConfig,
    train_set: Dataset,
    held_out: Dataset,
    model: F,
) -> Result<Session, OrchestratorError>
where
    M: Model + 'static,
    F: Fn() -> M,
{
    log::info!("adapting configs");
    let actors = Adapter::new().adapt(cfg)?;

    if train_set.features() != held_out.features() {
        return Err(OrchestratorError::InvalidConfig(format!(
            "training set has {} features but the held-out set has {}",
            train_set.features(),
            held_out.features()
        )));
    }

    log::info!(
        "starting {} trainer(s) over {} samples, validating on {}",
        actors.trainers,
        train_set.len(),
        held_out.len()
    );
    Session::new(actors, train_set, held_out, model)
}
