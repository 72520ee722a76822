use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MandateError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl MandateError {
    /// Shorthand for the validation-failure variant; every structural
    /// invariant check in the crate reports through this.
    pub fn invalid(msg: impl Into<String>) -> Self {
        MandateError::ValidationError(msg.into())
    }
}
