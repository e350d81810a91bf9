use std::num::NonZeroUsize;

/// Defines on which batches a trainer samples its metrics and reports progress.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub sample_interval: NonZeroUsize,
    pub log_interval: NonZeroUsize,
}

impl Schedule {
    pub fn new(sample_interval: NonZeroUsize, log_interval: NonZeroUsize) -> Self {
        Self {
            sample_interval,
            log_interval,
        }
    }

    /// Returns true if the batch's loss and accuracy should be recorded.
    #[inline]
    pub fn should_sample(&self, batch_idx: usize) -> bool {
        batch_idx % self.sample_interval.get() == 0
    }

    /// Returns true if a progress line should be logged for this batch.
    #[inline]
    pub fn should_log(&self, batch_idx: usize) -> bool {
        batch_idx % self.log_interval.get() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_schedule() {
        let s = Schedule::new(
            NonZeroUsize::new(3).unwrap(),
            NonZeroUsize::new(50).unwrap(),
        );
        assert!(s.should_sample(0));
        assert!(!s.should_sample(1));
        assert!(!s.should_sample(2));
        assert!(s.should_sample(3));
        assert!(!s.should_sample(4));
        assert!(s.should_sample(6));
    }

    #[test]
    fn interval_of_one_samples_every_batch() {
        let s = Schedule::new(NonZeroUsize::MIN, NonZeroUsize::MIN);
        assert!((0..10).all(|i| s.should_sample(i) && s.should_log(i)));
    }
}
