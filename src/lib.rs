pub mod builders;
pub mod error;
pub mod input;
pub mod math;
pub mod model;

pub use error::{Result, VeracoreError};
