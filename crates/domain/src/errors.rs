//! Domain error types.

use thiserror::Error;
use validator::ValidationErrors;

/// Errors raised while preparing a place for storage.
#[derive(Debug, Error, PartialEq)]
pub enum PlaceError {
    #[error("Place requires a circle or a polygon")]
    MissingGeometry,

    #[error("Invalid place geometry: {0}")]
    InvalidGeometry(String),
}

impl From<ValidationErrors> for PlaceError {
    fn from(errors: ValidationErrors) -> Self {
        PlaceError::InvalidGeometry(errors.to_string())
    }
}

/// Errors raised when an event carries out-of-range values.
#[derive(Debug, Error, PartialEq)]
#[error("Invalid event: {0}")]
pub struct EventError(pub String);

impl From<ValidationErrors> for EventError {
    fn from(errors: ValidationErrors) -> Self {
        EventError(errors.to_string())
    }
}
