use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    MalformedState {
        got: usize,
        expected: usize,
    },
    InvalidDistribution(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            MlErr::MalformedState { got, expected } => write!(
                f,
                "The model state is malformed, got {got} bytes and expected {expected}"
            ),
            MlErr::InvalidDistribution(detail) => {
                write!(f, "Failed to build a sampling distribution: {detail}")
            }
        }
    }
}

impl Error for MlErr {}
