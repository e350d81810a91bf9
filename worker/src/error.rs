use std::{error::Error, fmt};

use machine_learning::MlErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Trainer runtime failures, all of them are fatal to the owning trainer.
#[derive(Debug)]
pub enum WorkerErr {
    Training {
        epoch: usize,
        source: MlErr,
    },
    SnapshotLoad {
        epoch: usize,
        version: u64,
        source: MlErr,
    },
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Training { epoch, source } => {
                write!(f, "training failed at epoch {epoch}: {source}")
            }
            WorkerErr::SnapshotLoad {
                epoch,
                version,
                source,
            } => write!(
                f,
                "failed to load snapshot v{version} at epoch {epoch}: {source}"
            ),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Training { source, .. } | WorkerErr::SnapshotLoad { source, .. } => {
                Some(source)
            }
        }
    }
}
