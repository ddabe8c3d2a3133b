//! Device document mapping.

use domain::models::Device;
use serde::{Deserialize, Serialize};
use shared::password::PasswordDigest;

use crate::config::CollectionNames;
use crate::repositories::scoped::{GroupScope, ScopedDocument};

/// Stored form of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub group_id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub device_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<Device> for DeviceEntity {
    fn from(device: Device) -> Self {
        Self {
            id: device.id,
            group_id: device.group_id,
            name: device.name,
            device_type: device.device_type,
            password: device.password.map(|digest| digest.as_str().to_string()),
        }
    }
}

impl From<DeviceEntity> for Device {
    fn from(entity: DeviceEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            name: entity.name,
            device_type: entity.device_type,
            password: entity.password.map(PasswordDigest::from_stored),
        }
    }
}

impl ScopedDocument for DeviceEntity {
    type Scope = GroupScope;

    const KIND: &'static str = "device";
    const HIDDEN_ON_GET: &'static [&'static str] = &["groupId", "password"];
    const HIDDEN_ON_LIST: &'static [&'static str] = &["groupId", "password"];

    fn collection_name(names: &CollectionNames) -> &str {
        &names.devices
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn assign_scope(&mut self, scope: &GroupScope) {
        self.group_id = Some(scope.group_id.clone());
    }
}
