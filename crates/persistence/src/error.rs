//! Error type shared by the store backends and repositories.

use domain::errors::{EventError, PlaceError};
use shared::id::IdError;
use shared::password::PasswordError;
use thiserror::Error;

/// Every store operation either succeeds or returns exactly one of these.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record does not exist, or exists in another group.
    #[error("Not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The backing store could not be reached. Never retried here.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Hashing a secret failed; the operation was aborted.
    #[error("Secret hashing failed: {0}")]
    Secret(#[from] PasswordError),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::DuplicateKey(db.message().to_string())
            }
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => StoreError::Connection(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<PlaceError> for StoreError {
    fn from(err: PlaceError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<EventError> for StoreError {
    fn from(err: EventError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<IdError> for StoreError {
    fn from(err: IdError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_error_maps_to_validation() {
        let err: StoreError = PlaceError::MissingGeometry.into();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("circle or a polygon")));
    }

    #[test]
    fn test_id_error_maps_to_validation() {
        let err: StoreError = IdError::InvalidEventId("xyz".to_string()).into();
        assert!(matches!(err, StoreError::Validation(msg) if msg.contains("xyz")));
    }

    #[test]
    fn test_sqlx_pool_errors_map_to_connection() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, StoreError::Connection(_)));

        let err: StoreError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_secret_error_display() {
        let err: StoreError = PasswordError::HashError("boom".to_string()).into();
        assert!(err.to_string().contains("boom"));
    }
}
