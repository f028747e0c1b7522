//! Error type shared across the core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A domain value failed validation.
    #[error("validation error: {0}")]
    Validation(String),
}
