mod held_out;
mod validator;

pub use held_out::HeldOutValidator;
pub use validator::{Validation, Validator};
