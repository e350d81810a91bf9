use machine_learning::Model;

use crate::Result;

/// The scores a candidate got on the validation set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validation {
    pub loss: f64,
    pub accuracy: f64,
}

/// This trait scores a candidate model, the parameter server only accepts candidates
/// that improve on the best validated loss seen so far.
pub trait Validator: Send {
    /// Scores `model` without modifying it.
    ///
    /// # Arguments
    /// * `model` - The candidate model, already loaded with the candidate's state.
    ///
    /// # Returns
    /// The validated loss and accuracy or an error if validation could not run.
    fn validate<M: Model + ?Sized>(&mut self, model: &M) -> Result<Validation>;
}
