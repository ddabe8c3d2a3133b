//! Place (geofence) domain model.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::geometry::{circle_to_polygon, Circle, IndexGeometry, Polygon};
use crate::errors::PlaceError;

/// A named geographic area shared by a group.
///
/// A place is described either by a circle (center and radius in meters)
/// or by a polygon. The circle takes priority: when both are given, the
/// polygon is dropped. The store's spatial index only understands
/// polygons, so a circle is approximated by one for indexing while the
/// circle itself is kept and returned to callers as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle: Option<Circle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,
}

impl Place {
    pub fn circle(name: impl Into<String>, circle: Circle) -> Self {
        Self {
            name: Some(name.into()),
            circle: Some(circle),
            ..Default::default()
        }
    }

    pub fn polygon(name: impl Into<String>, polygon: Polygon) -> Self {
        Self {
            name: Some(name.into()),
            polygon: Some(polygon),
            ..Default::default()
        }
    }

    /// Normalizes the geometry and returns the shape to index.
    ///
    /// 1. A circle clears the polygon and is indexed as its polygon
    ///    approximation.
    /// 2. Otherwise a polygon clears the circle and is indexed as is.
    /// 3. Otherwise the place is rejected.
    pub fn prepare(&mut self) -> Result<IndexGeometry, PlaceError> {
        if let Some(circle) = &self.circle {
            circle.validate()?;
            self.polygon = None;
            Ok(IndexGeometry::from(&circle_to_polygon(circle)))
        } else if let Some(polygon) = &self.polygon {
            polygon.validate()?;
            Ok(IndexGeometry::from(polygon))
        } else {
            Err(PlaceError::MissingGeometry)
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => f.write_str(&self.id),
        }
    }
}
