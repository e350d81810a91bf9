use serde::Serialize;

/// Counters over a trainer's run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerMetrics {
    pub steps: u64,
    pub decisions: u64,
    pub pushes: u64,
    pub pulls: u64,
    pub empty_pulls: u64,
    /// Training rows walked through, decision batches included.
    pub rows_seen: u64,
}

impl WorkerMetrics {
    #[inline]
    pub fn bump_step(&mut self) {
        self.steps += 1;
    }

    #[inline]
    pub fn add_rows(&mut self, n: usize) {
        self.rows_seen += n as u64;
    }
}
