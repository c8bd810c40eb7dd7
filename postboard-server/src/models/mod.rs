//! Domain models with validation at construction
//!
//! User input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod post;
pub mod validation;

pub use post::{Post, PostText, MAX_TEXT_LEN, MIN_TEXT_LEN};
pub use validation::ValidationError;
