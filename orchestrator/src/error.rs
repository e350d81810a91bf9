use std::fmt;

use machine_learning::MlErr;

/// All errors that can occur in the orchestrator.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before anything is spawned.
    InvalidConfig(String),
    /// The configuration file is not valid json.
    Json(serde_json::Error),
    /// The datasets could not be built.
    Dataset(MlErr),
    /// The parameter server task panicked or was aborted.
    Join(tokio::task::JoinError),
    /// An underlying I/O error not covered by the above variants.
    Io(std::io::Error),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::Json(e) => write!(f, "malformed config: {e}"),
            Self::Dataset(e) => write!(f, "dataset error: {e}"),
            Self::Join(e) => write!(f, "parameter server task failed: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Dataset(e) => Some(e),
            Self::Join(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<MlErr> for OrchestratorError {
    fn from(e: MlErr) -> Self {
        Self::Dataset(e)
    }
}

impl From<tokio::task::JoinError> for OrchestratorError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Join(e)
    }
}
