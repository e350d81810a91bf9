use rand::Rng;

/// What a trainer does with the model it holds at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Upload the local model as a candidate.
    Push,
    /// Replace the local model with the shared snapshot.
    Pull,
    /// Keep training locally.
    Hold,
}

/// The push / pull decision state machine of a single trainer.
///
/// A trainer takes `free_trial_steps` local gradient steps, then reaches a decision point.
/// At a decision point it pushes if its loss beats the last score it pushed or pulled,
/// otherwise it pulls with probability `pull_probability`. The step counter is reset after
/// every decision, whatever the outcome.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    free_trial_steps: usize,
    pull_probability: f64,
    steps_since_sync: usize,
    reference_score: f64,
}

impl SyncPolicy {
    /// Creates a new `SyncPolicy`.
    ///
    /// # Arguments
    /// * `free_trial_steps` - The amount of local steps between decisions.
    /// * `pull_probability` - The probability of pulling when not pushing.
    ///
    /// # Returns
    /// A new `SyncPolicy` instance with an infinite reference score.
    pub fn new(free_trial_steps: usize, pull_probability: f64) -> Self {
        Self {
            free_trial_steps,
            pull_probability,
            steps_since_sync: 0,
            reference_score: f64::INFINITY,
        }
    }

    /// The loss of the last pushed or pulled model.
    pub fn reference_score(&self) -> f64 {
        self.reference_score
    }

    pub fn steps_since_sync(&self) -> usize {
        self.steps_since_sync
    }

    /// Returns true if the next step must be a decision instead of a gradient step.
    #[inline]
    pub fn is_decision_point(&self) -> bool {
        self.steps_since_sync >= self.free_trial_steps
    }

    /// Counts a local gradient step.
    #[inline]
    pub fn on_train(&mut self) {
        self.steps_since_sync += 1;
    }

    /// Decides between pushing, pulling or neither and resets the step counter.
    ///
    /// A push updates the reference score to `loss` right away, a pull only does once
    /// the snapshot is actually adopted through `adopt`.
    ///
    /// # Arguments
    /// * `loss` - The local loss at this decision point.
    /// * `rng` - The trainer's random number generator.
    ///
    /// # Returns
    /// The decision taken.
    pub fn decide<R: Rng>(&mut self, loss: f64, rng: &mut R) -> Decision {
        self.steps_since_sync = 0;

        if loss < self.reference_score {
            self.reference_score = loss;
            return Decision::Push;
        }

        if rng.random::<f64>() < self.pull_probability {
            Decision::Pull
        } else {
            Decision::Hold
        }
    }

    /// Takes the loss of a pulled snapshot as the new reference score.
    pub fn adopt(&mut self, loss: f64) {
        self.reference_score = loss;
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn decisions_happen_every_free_trial_steps() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(3, 0.5);
        let mut pattern = Vec::new();

        for step in 0..12 {
            if policy.is_decision_point() {
                pattern.push(step);
                policy.decide(1.0, &mut rng);
                assert_eq!(policy.steps_since_sync(), 0);
            } else {
                policy.on_train();
            }
        }

        assert_eq!(pattern, [3, 7, 11]);
    }

    #[test]
    fn zero_free_trial_steps_decides_every_step() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(0, 0.0);

        assert!(policy.is_decision_point());
        assert_eq!(policy.decide(0.9, &mut rng), Decision::Push);
        assert!(policy.is_decision_point());
        assert_eq!(policy.decide(0.95, &mut rng), Decision::Hold);
    }

    #[test]
    fn improvement_pushes_and_updates_the_reference() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(0, 1.0);

        assert_eq!(policy.decide(0.7, &mut rng), Decision::Push);
        assert_eq!(policy.reference_score(), 0.7);
        assert_eq!(policy.decide(0.6, &mut rng), Decision::Push);
        assert_eq!(policy.reference_score(), 0.6);
    }

    #[test]
    fn every_decision_pulls_once_the_reference_is_lower() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(0, 1.0);
        policy.adopt(0.2);

        for _ in 0..20 {
            assert_eq!(policy.decide(0.5, &mut rng), Decision::Pull);
            assert_eq!(policy.reference_score(), 0.2);
        }
    }

    #[test]
    fn zero_probability_never_pulls() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(0, 0.0);
        policy.adopt(0.1);

        assert!((0..100).all(|_| policy.decide(0.5, &mut rng) == Decision::Hold));
    }

    #[test]
    fn nan_loss_never_pushes() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut policy = SyncPolicy::new(0, 0.0);

        assert_eq!(policy.decide(f64::NAN, &mut rng), Decision::Hold);
        assert_eq!(policy.reference_score(), f64::INFINITY);
    }
}
