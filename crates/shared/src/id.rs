//! Identifier generation.
//!
//! Users, devices and places are keyed by short random strings; events get
//! time-ordered UUIDv7 tokens so that ids sort roughly by creation time.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

/// Number of random bytes behind a generated identifier.
const ID_BYTES: usize = 12;

/// Error type for identifier parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("Invalid event id: {0}")]
    InvalidEventId(String),
}

/// Generates a new globally unique identifier.
///
/// The result is 16 characters of URL-safe base64 without padding.
pub fn new_id() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; ID_BYTES] = rng.gen();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Generates a new event identifier.
pub fn new_event_id() -> Uuid {
    Uuid::now_v7()
}

/// Parses an event identifier received from a caller.
pub fn parse_event_id(raw: &str) -> Result<Uuid, IdError> {
    Uuid::parse_str(raw).map_err(|_| IdError::InvalidEventId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_length() {
        let id = new_id();
        assert_eq!(id.len(), 16);
    }

    #[test]
    fn test_new_id_is_url_safe() {
        for _ in 0..100 {
            let id = new_id();
            assert!(!id.contains('+'));
            assert!(!id.contains('/'));
            assert!(!id.contains('='));
        }
    }

    #[test]
    fn test_new_id_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_new_event_id_is_v7() {
        let id = new_event_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_new_event_ids_are_ordered() {
        let first = new_event_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_event_id();
        assert!(first < second);
    }

    #[test]
    fn test_parse_event_id_roundtrip() {
        let id = new_event_id();
        assert_eq!(parse_event_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_parse_event_id_rejects_garbage() {
        let err = parse_event_id("not-a-token").unwrap_err();
        assert_eq!(err, IdError::InvalidEventId("not-a-token".to_string()));
        assert!(parse_event_id("").is_err());
    }
}
