//! User domain model.

use serde::{Deserialize, Serialize};
use shared::password::{PasswordDigest, PasswordError};

/// A person using the service.
///
/// The login is the user's globally unique identifier (an e-mail address
/// works well) and never changes once set. A user belongs to exactly one
/// group at a time and may move to another one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "id", default)]
    pub login: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Never part of the outward representation.
    #[serde(skip)]
    pub password: Option<PasswordDigest>,
}

impl User {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the stored digest with one computed from `plaintext`.
    pub fn set_password(&mut self, plaintext: &str) -> Result<(), PasswordError> {
        self.password = Some(PasswordDigest::hash(plaintext)?);
        Ok(())
    }

    /// Checks `plaintext` against the stored digest; `false` without one.
    pub fn check_password(&self, plaintext: &str) -> bool {
        self.password
            .as_ref()
            .map(|digest| digest.verify(plaintext))
            .unwrap_or(false)
    }
}
