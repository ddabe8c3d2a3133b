//! Event document mapping.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use domain::models::{Event, ExtraValue, Point};
use serde::{Deserialize, Serialize};
use shared::id::new_event_id;
use uuid::Uuid;

use crate::config::CollectionNames;
use crate::repositories::scoped::{DeviceScope, ScopedDocument};

/// Stored form of an event.
///
/// `time` is omitted when unknown so that an update keeps the recorded
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntity {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub device_id: Option<String>,
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub location: Option<Point>,
    pub accuracy: Option<f64>,
    pub power: Option<u8>,
    pub emoji: Option<char>,
    pub comment: Option<String>,
    #[serde(default)]
    pub extra: BTreeMap<String, ExtraValue>,
}

impl From<Event> for EventEntity {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.unwrap_or_else(new_event_id),
            device_id: event.device_id,
            group_id: event.group_id,
            time: event.timestamp,
            event_type: event.event_type,
            location: event.location,
            accuracy: event.accuracy,
            power: event.power,
            emoji: event.emoji,
            comment: event.comment,
            extra: event.extra,
        }
    }
}

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Self {
            id: Some(entity.id),
            device_id: entity.device_id,
            group_id: entity.group_id,
            timestamp: entity.time,
            event_type: entity.event_type,
            location: entity.location,
            accuracy: entity.accuracy,
            power: entity.power,
            emoji: entity.emoji,
            comment: entity.comment,
            extra: entity.extra,
        }
    }
}

impl ScopedDocument for EventEntity {
    type Scope = DeviceScope;

    const KIND: &'static str = "event";
    const HIDDEN_ON_GET: &'static [&'static str] = &["groupId", "deviceId"];
    const HIDDEN_ON_LIST: &'static [&'static str] = &["groupId"];

    fn collection_name(names: &CollectionNames) -> &str {
        &names.events
    }

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn assign_scope(&mut self, scope: &DeviceScope) {
        self.group_id = Some(scope.group_id.clone());
        self.device_id = Some(scope.device_id.clone());
    }
}
