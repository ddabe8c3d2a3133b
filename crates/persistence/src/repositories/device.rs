//! Device repository.

use domain::models::Device;
use shared::id::new_id;

use crate::db::Store;
use crate::entities::DeviceEntity;
use crate::error::StoreError;
use crate::repositories::scoped::{GroupScope, ScopedRepository};

/// Devices of one store, addressed through their group.
pub struct DeviceRepository<'a> {
    inner: ScopedRepository<'a, DeviceEntity>,
}

impl<'a> DeviceRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            inner: ScopedRepository::new(store),
        }
    }

    /// Finds a device within a group; neither group id nor password is
    /// returned.
    pub async fn get(&self, group_id: &str, device_id: &str) -> Result<Device, StoreError> {
        let entity = self.inner.get(&GroupScope::new(group_id), device_id).await?;
        Ok(entity.into())
    }

    pub async fn list(&self, group_id: &str) -> Result<Vec<Device>, StoreError> {
        let entities = self.inner.list(&GroupScope::new(group_id)).await?;
        Ok(entities.into_iter().map(Device::from).collect())
    }

    /// Stores a new device in the group, generating its id when empty.
    pub async fn create(&self, group_id: &str, device: &mut Device) -> Result<(), StoreError> {
        if device.id.is_empty() {
            device.id = new_id();
        }
        device.group_id = Some(group_id.to_string());

        self.inner
            .create(&GroupScope::new(group_id), vec![DeviceEntity::from(device.clone())])
            .await
    }

    /// Replaces the device's fields and moves it into the group.
    ///
    /// Events the device recorded before a move stay in their original
    /// group.
    pub async fn update(&self, group_id: &str, device: &mut Device) -> Result<(), StoreError> {
        if device.id.is_empty() {
            return Err(StoreError::Validation("device id is required".to_string()));
        }
        device.group_id = Some(group_id.to_string());

        self.inner
            .update(&GroupScope::new(group_id), DeviceEntity::from(device.clone()))
            .await
    }

    pub async fn delete(&self, group_id: &str, device_id: &str) -> Result<(), StoreError> {
        self.inner.delete(&GroupScope::new(group_id), device_id).await
    }

    /// Reads a device for authentication, across all groups and including
    /// the password digest.
    pub async fn login(&self, device_id: &str) -> Result<Device, StoreError> {
        let entity = self.inner.find_by_id(device_id).await?;
        tracing::debug!(device_id = %device_id, "Device loaded for authentication");
        Ok(entity.into())
    }
}
