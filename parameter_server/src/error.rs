use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use machine_learning::MlErr;

/// The parameter server module's result type.
pub type Result<T> = std::result::Result<T, ServerErr>;

/// Failures that stop the parameter server for good, none of them is retried.
#[derive(Debug)]
pub enum ServerErr {
    MalformedCandidate(io::Error),
    ModelLoad(MlErr),
    Validation(MlErr),
    EmptyValidationSet,
}

impl Display for ServerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerErr::MalformedCandidate(e) => write!(f, "malformed candidate: {e}"),
            ServerErr::ModelLoad(e) => write!(f, "failed to load candidate state: {e}"),
            ServerErr::Validation(e) => write!(f, "validation failed: {e}"),
            ServerErr::EmptyValidationSet => {
                f.write_str("validation failed: the held-out dataset yielded no samples")
            }
        }
    }
}

impl Error for ServerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServerErr::MalformedCandidate(e) => Some(e),
            ServerErr::ModelLoad(e) | ServerErr::Validation(e) => Some(e),
            ServerErr::EmptyValidationSet => None,
        }
    }
}

impl From<io::Error> for ServerErr {
    fn from(value: io::Error) -> Self {
        Self::MalformedCandidate(value)
    }
}
