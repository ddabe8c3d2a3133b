//! Device domain model.

use std::fmt;

use serde::{Deserialize, Serialize};
use shared::password::{PasswordDigest, PasswordError};

/// A tracked device.
///
/// The id is globally unique. A device is bound to one group at a time;
/// moving it to another group cuts the old group off from its new events
/// while events already recorded stay with the group they were made for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Opaque classification tag describing capabilities and data format.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    /// Device credentials; never part of the outward representation.
    #[serde(skip)]
    pub password: Option<PasswordDigest>,
}

impl Device {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_type(mut self, device_type: impl Into<String>) -> Self {
        self.device_type = Some(device_type.into());
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

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => f.write_str(&self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display_prefers_name() {
        let device = Device::new("d1").with_name("Car tracker");
        assert_eq!(device.to_string(), "Car tracker");
    }

    #[test]
    fn test_device_display_falls_back_to_id() {
        assert_eq!(Device::new("d1").to_string(), "d1");

        let mut device = Device::new("d2");
        device.name = Some(String::new());
        assert_eq!(device.to_string(), "d2");
    }

    #[test]
    fn test_device_serialization() {
        let mut device = Device::new("d1").with_name("Phone").with_type("android");
        device.set_password("pin").unwrap();

        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["id"], "d1");
        assert_eq!(json["type"], "android");
        assert!(json.get("password").is_none());
        assert!(json.get("groupId").is_none());
    }
}
