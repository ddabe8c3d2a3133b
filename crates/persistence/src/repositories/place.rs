//! Place repository.

use domain::models::Place;
use shared::id::new_id;

use crate::db::Store;
use crate::entities::PlaceEntity;
use crate::error::StoreError;
use crate::repositories::scoped::{GroupScope, ScopedRepository};

/// Places of one store, addressed through their group.
///
/// Every write normalizes the geometry first: a circle wins over a polygon
/// and the index geometry is recomputed. A place without geometry is
/// rejected and nothing is written.
pub struct PlaceRepository<'a> {
    inner: ScopedRepository<'a, PlaceEntity>,
}

impl<'a> PlaceRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            inner: ScopedRepository::new(store),
        }
    }

    pub async fn get(&self, group_id: &str, place_id: &str) -> Result<Place, StoreError> {
        let entity = self.inner.get(&GroupScope::new(group_id), place_id).await?;
        Ok(entity.into())
    }

    pub async fn list(&self, group_id: &str) -> Result<Vec<Place>, StoreError> {
        let entities = self.inner.list(&GroupScope::new(group_id)).await?;
        Ok(entities.into_iter().map(Place::from).collect())
    }

    /// Stores a new place in the group. `place` is updated in place with
    /// its normalized geometry, id and group.
    pub async fn create(&self, group_id: &str, place: &mut Place) -> Result<(), StoreError> {
        let geo = place.prepare()?;
        if place.id.is_empty() {
            place.id = new_id();
        }
        place.group_id = Some(group_id.to_string());

        self.inner
            .create(
                &GroupScope::new(group_id),
                vec![PlaceEntity::new(place.clone(), geo)],
            )
            .await
    }

    /// Replaces the place's fields and geometry and moves it into the group.
    pub async fn update(&self, group_id: &str, place: &mut Place) -> Result<(), StoreError> {
        if place.id.is_empty() {
            return Err(StoreError::Validation("place id is required".to_string()));
        }
        let geo = place.prepare()?;
        place.group_id = Some(group_id.to_string());

        self.inner
            .update(&GroupScope::new(group_id), PlaceEntity::new(place.clone(), geo))
            .await
    }

    pub async fn delete(&self, group_id: &str, place_id: &str) -> Result<(), StoreError> {
        self.inner.delete(&GroupScope::new(group_id), place_id).await
    }
}
