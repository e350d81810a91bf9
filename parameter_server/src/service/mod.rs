mod pserver;
mod stats;

pub use pserver::{Outcome, ParameterServer};
pub use stats::ServerStats;
