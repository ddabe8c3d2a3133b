//! Event repository.
//!
//! Events are addressed by group AND device. Event ids are time-ordered
//! UUIDs, so listing by id lists in creation order.

use std::collections::BTreeSet;

use chrono::Utc;
use domain::errors::EventError;
use domain::models::Event;
use serde_json::Value;
use shared::id::{new_event_id, parse_event_id};
use validator::Validate;

use crate::db::Store;
use crate::entities::EventEntity;
use crate::error::StoreError;
use crate::repositories::scoped::{DeviceScope, GroupScope, ScopedRepository, DEVICE_FIELD};

pub struct EventRepository<'a> {
    inner: ScopedRepository<'a, EventEntity>,
}

impl<'a> EventRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            inner: ScopedRepository::new(store),
        }
    }

    /// Finds one event of a device. Group and device ids are not returned.
    pub async fn get(
        &self,
        group_id: &str,
        device_id: &str,
        event_id: &str,
    ) -> Result<Event, StoreError> {
        let id = parse_event_id(event_id)?;
        let entity = self
            .inner
            .get(&DeviceScope::new(group_id, device_id), &id.to_string())
            .await?;
        Ok(entity.into())
    }

    /// Lists the events a device recorded within a group, oldest first.
    pub async fn list(&self, group_id: &str, device_id: &str) -> Result<Vec<Event>, StoreError> {
        let entities = self
            .inner
            .list(&DeviceScope::new(group_id, device_id))
            .await?;
        Ok(entities.into_iter().map(Event::from).collect())
    }

    /// Stores a batch of events for one device.
    ///
    /// Every event is validated before anything is written. Events without
    /// an id or timestamp get a fresh one; the slice is updated in place.
    /// An empty batch does nothing.
    pub async fn create(
        &self,
        group_id: &str,
        device_id: &str,
        events: &mut [Event],
    ) -> Result<(), StoreError> {
        if events.is_empty() {
            return Ok(());
        }

        for event in events.iter() {
            event.validate().map_err(EventError::from)?;
        }

        let now = Utc::now();
        for event in events.iter_mut() {
            event.id.get_or_insert_with(new_event_id);
            event.timestamp.get_or_insert(now);
            event.group_id = Some(group_id.to_string());
            event.device_id = Some(device_id.to_string());
        }

        let entities = events.iter().cloned().map(EventEntity::from).collect();
        self.inner
            .create(&DeviceScope::new(group_id, device_id), entities)
            .await
    }

    /// Replaces an event's fields. Only events of the given device within
    /// the given group can be updated.
    pub async fn update(
        &self,
        group_id: &str,
        device_id: &str,
        event: &mut Event,
    ) -> Result<(), StoreError> {
        if event.id.is_none() {
            return Err(StoreError::Validation("event id is required".to_string()));
        }
        event.validate().map_err(EventError::from)?;
        event.group_id = Some(group_id.to_string());
        event.device_id = Some(device_id.to_string());

        self.inner
            .update(
                &DeviceScope::new(group_id, device_id),
                EventEntity::from(event.clone()),
            )
            .await
    }

    pub async fn delete(
        &self,
        group_id: &str,
        device_id: &str,
        event_id: &str,
    ) -> Result<(), StoreError> {
        let id = parse_event_id(event_id)?;
        self.inner
            .delete(&DeviceScope::new(group_id, device_id), &id.to_string())
            .await
    }

    /// Ids of every device that has recorded events within the group.
    pub async fn devices(&self, group_id: &str) -> Result<BTreeSet<String>, StoreError> {
        let values = self
            .inner
            .distinct(&GroupScope::new(group_id), DEVICE_FIELD)
            .await?;

        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(id) => Some(id),
                _ => None,
            })
            .collect())
    }
}
