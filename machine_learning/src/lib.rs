pub mod dataset;
pub mod error;
pub mod model;
pub mod optimization;

pub use dataset::{Batch, Dataset};
pub use error::{MlErr, Result};
pub use model::{BatchEval, LogisticRegression, Model};
