//! Per-actor, append-only sample series.
//!
//! Every actor owns the single `Recorder` of its series, the matching `Log` handles are
//! read by the reporting side once the run is over.

use std::{sync::Arc, time::Instant};

use parking_lot::Mutex;

/// A loss / accuracy sample.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricRecord {
    pub elapsed: f64,
    pub loss: f64,
    pub accuracy: f64,
}

/// The loss of a snapshot a trainer pulled.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PullRecord {
    pub elapsed: f64,
    pub loss: f64,
}

/// Rounds `value` to 4 decimal places, infinities and NaN are left untouched.
pub fn round4(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    (value * 1e4).round() / 1e4
}

type Records<T> = Arc<Mutex<Vec<T>>>;

/// The writing end of a series.
#[derive(Debug)]
pub struct Recorder<T> {
    start: Instant,
    records: Records<T>,
}

impl<T> Recorder<T> {
    /// Seconds since this recorder was created, rounded to 4 decimal places.
    pub fn elapsed(&self) -> f64 {
        round4(self.start.elapsed().as_secs_f64())
    }

    /// Creates a new read handle over this series.
    pub fn log(&self) -> Log<T> {
        Log {
            records: Arc::clone(&self.records),
        }
    }

    fn push(&mut self, record: T) {
        self.records.lock().push(record);
    }
}

impl Recorder<MetricRecord> {
    /// Appends a loss / accuracy sample, stamped with the elapsed time.
    ///
    /// # Arguments
    /// * `loss` - The observed loss.
    /// * `accuracy` - The observed accuracy.
    pub fn record(&mut self, loss: f64, accuracy: f64) {
        let record = MetricRecord {
            elapsed: self.elapsed(),
            loss: round4(loss),
            accuracy: round4(accuracy),
        };

        self.push(record);
    }
}

impl Recorder<PullRecord> {
    /// Appends the loss of a pulled snapshot, stamped with the elapsed time.
    ///
    /// # Arguments
    /// * `loss` - The loss the snapshot was published with.
    pub fn record(&mut self, loss: f64) {
        let record = PullRecord {
            elapsed: self.elapsed(),
            loss: round4(loss),
        };

        self.push(record);
    }
}

/// A read handle over a series.
#[derive(Debug)]
pub struct Log<T> {
    records: Records<T>,
}

impl<T> Clone for Log<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<T: Clone> Log<T> {
    /// Copies out every record appended so far, in append order.
    pub fn records(&self) -> Vec<T> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type MetricsRecorder = Recorder<MetricRecord>;
pub type MetricsLog = Log<MetricRecord>;
pub type PullRecorder = Recorder<PullRecord>;
pub type PullLog = Log<PullRecord>;

/// Creates a new, empty series whose clock starts now.
///
/// # Returns
/// The single recorder and a read handle.
pub fn series<T>() -> (Recorder<T>, Log<T>) {
    let recorder = Recorder {
        start: Instant::now(),
        records: Arc::new(Mutex::new(Vec::new())),
    };
    let log = recorder.log();
    (recorder, log)
}
