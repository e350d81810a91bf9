mod config;
mod error;
mod service;
mod validation;

pub use config::ServerConfig;
pub use error::{Result, ServerErr};
pub use service::{Outcome, ParameterServer, ServerStats};
pub use validation::{HeldOutValidator, Validation, Validator};
