//! Place document mapping.

use domain::models::{Circle, IndexGeometry, Place, Polygon};
use serde::{Deserialize, Serialize};

use crate::config::CollectionNames;
use crate::repositories::scoped::{GroupScope, ScopedDocument};

/// Stored form of a place.
///
/// `geo` is the GeoJSON polygon used for spatial indexing. It is computed
/// from the place's geometry on every write and never read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceEntity {
    #[serde(rename = "_id")]
    pub id: String,
    pub group_id: Option<String>,
    pub name: Option<String>,
    pub circle: Option<Circle>,
    pub polygon: Option<Polygon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<IndexGeometry>,
}

impl PlaceEntity {
    /// Builds the stored form of a prepared place.
    pub fn new(place: Place, geo: IndexGeometry) -> Self {
        Self {
            id: place.id,
            group_id: place.group_id,
            name: place.name,
            circle: place.circle,
            polygon: place.polygon,
            geo: Some(geo),
        }
    }
}

impl From<PlaceEntity> for Place {
    fn from(entity: PlaceEntity) -> Self {
        Self {
            id: entity.id,
            group_id: entity.group_id,
            name: entity.name,
            circle: entity.circle,
            polygon: entity.polygon,
        }
    }
}

impl ScopedDocument for PlaceEntity {
    type Scope = GroupScope;

    const KIND: &'static str = "place";
    const HIDDEN_ON_GET: &'static [&'static str] = &["groupId", "geo"];
    const HIDDEN_ON_LIST: &'static [&'static str] = &["groupId", "geo"];

    fn collection_name(names: &CollectionNames) -> &str {
        &names.places
    }

    fn id(&self) -> String {
        self.id.clone()
    }

    fn assign_scope(&mut self, scope: &GroupScope) {
        self.group_id = Some(scope.group_id.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::Point;
    use serde_json::json;

    #[test]
    fn test_place_entity_carries_index_geometry() {
        let mut place = Place::circle("Home", Circle::new(Point::new(88.9, 55.4), 500.0));
        place.id = "p1".to_string();
        let geo = place.prepare().unwrap();

        let value = serde_json::to_value(PlaceEntity::new(place, geo)).unwrap();
        assert_eq!(value["_id"], "p1");
        assert_eq!(value["polygon"], serde_json::Value::Null);
        assert_eq!(value["geo"]["type"], "Polygon");
        assert_eq!(value["circle"]["radius"], json!(500.0));
    }

    #[test]
    fn test_place_entity_without_geo_reads_back() {
        let entity: PlaceEntity = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Office",
            "polygon": [[37.6, 55.7], [37.7, 55.7], [37.65, 55.8]]
        }))
        .unwrap();
        assert!(entity.geo.is_none());

        let place = Place::from(entity);
        assert_eq!(place.polygon.map(|p| p.points().len()), Some(3));
        assert!(place.circle.is_none());
    }
}
