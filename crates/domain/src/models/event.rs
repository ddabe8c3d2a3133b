//! Event domain model.
//!
//! An event is something that happened to a device at some place and time:
//! a location ping, an arrival, a check-in. It is tied to the device that
//! reported it and to the group the device belonged to at that moment. The
//! group is recorded on the event itself so that moving the device to a
//! new group neither exposes its history to the new group nor hides it
//! from the old one.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use shared::validation::{validate_accuracy, validate_latitude, validate_longitude};

use super::geometry::Point;

/// Value stored in an event's `extra` bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Bool(bool),
    Number(f64),
    String(String),
    Map(BTreeMap<String, ExtraValue>),
}

impl ExtraValue {
    /// `false` if any number, including those in nested maps, is NaN or
    /// infinite. JSON has no representation for those.
    pub fn is_finite(&self) -> bool {
        match self {
            ExtraValue::Number(n) => n.is_finite(),
            ExtraValue::Map(map) => map.values().all(ExtraValue::is_finite),
            ExtraValue::Bool(_) | ExtraValue::String(_) => true,
        }
    }
}

impl From<bool> for ExtraValue {
    fn from(v: bool) -> Self {
        ExtraValue::Bool(v)
    }
}

impl From<f64> for ExtraValue {
    fn from(v: f64) -> Self {
        ExtraValue::Number(v)
    }
}

impl From<&str> for ExtraValue {
    fn from(v: &str) -> Self {
        ExtraValue::String(v.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(v: String) -> Self {
        ExtraValue::String(v)
    }
}

/// A single event reported by a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Assigned by the store on create when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Server time is used when omitted.
    #[serde(rename = "time", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    /// Free-form kind: Arrive, Leave, Travel, Check-in, Happen, ...
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Point>,

    /// Location error radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    /// Battery level at the time of the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<char>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Named sensor readings and other application data.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, ExtraValue>,
}

impl Event {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: Some(event_type.into()),
            ..Default::default()
        }
    }

    pub fn at(mut self, location: Point) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<ExtraValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl Validate for Event {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(location) = &self.location {
            if let Err(e) =
                validate_longitude(location.lon).and(validate_latitude(location.lat))
            {
                errors.add("location", e);
            }
        }
        if let Some(accuracy) = self.accuracy {
            if let Err(e) = validate_accuracy(accuracy) {
                errors.add("accuracy", e);
            }
        }
        if !self.extra.values().all(ExtraValue::is_finite) {
            let mut err = ValidationError::new("extra_number");
            err.message = Some("Extra values must not contain NaN or infinite numbers".into());
            errors.add("extra", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
