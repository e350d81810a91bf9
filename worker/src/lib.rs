mod builder;
mod config;
mod error;
mod metrics;
mod policy;
mod schedule;
mod state;
mod worker;

pub use builder::WorkerBuilder;
pub use config::WorkerConfig;
pub use error::{Result, WorkerErr};
pub use metrics::WorkerMetrics;
pub use policy::{Decision, SyncPolicy};
pub use schedule::Schedule;
pub use worker::Worker;
