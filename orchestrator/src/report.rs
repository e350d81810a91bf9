use std::collections::BTreeMap;

use comms::metrics::{MetricRecord, PullRecord};
use parameter_server::ServerStats;
use serde::Serialize;
use worker::WorkerMetrics;

/// The series key of the parameter server.
pub const PS_KEY: &str = "ps";

/// The series key of trainer `id`.
pub fn trainer_key(id: usize) -> String {
    format!("trainer-{id}")
}

/// The pull series key of trainer `id`.
pub fn pull_key(id: usize) -> String {
    format!("trainer-{id}-pull")
}

/// A single actor's recorded samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Series {
    Metrics(Vec<MetricRecord>),
    Pulls(Vec<PullRecord>),
}

/// How a trainer's run ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerSummary {
    pub id: usize,
    pub metrics: Option<WorkerMetrics>,
    pub failure: Option<String>,
}

/// The lowest loss and the best accuracy the parameter server ever validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestMetrics {
    pub lowest_loss: f64,
    pub best_accuracy: f64,
}

/// Everything a finished run leaves behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub series: BTreeMap<String, Series>,
    pub trainers: Vec<TrainerSummary>,
    pub server: Option<ServerStats>,
    pub coordinator_failure: Option<String>,
}

impl RunReport {
    /// The parameter server's accepted samples, in acceptance order.
    pub fn ps(&self) -> &[MetricRecord] {
        match self.series.get(PS_KEY) {
            Some(Series::Metrics(records)) => records,
            _ => &[],
        }
    }

    /// Scans the parameter server's series, each field is optimized independently.
    ///
    /// # Returns
    /// Infinity and zero when nothing was ever accepted.
    pub fn best_metrics(&self) -> BestMetrics {
        let init = BestMetrics {
            lowest_loss: f64::INFINITY,
            best_accuracy: 0.0,
        };

        self.ps().iter().fold(init, |best, r| BestMetrics {
            lowest_loss: best.lowest_loss.min(r.loss),
            best_accuracy: best.best_accuracy.max(r.accuracy),
        })
    }

    /// Renders the report as pretty printed json.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
