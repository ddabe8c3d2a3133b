//! Group-scoped repository shared by all entity types.
//!
//! Every operation takes the caller's scope explicitly. Reads and deletes
//! filter on the primary key AND the scope, so a record in another group
//! looks exactly like a missing one. Writes stamp the scope onto the
//! document, whatever the caller left in it.

use std::fmt;
use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::config::{CollectionNames, UpdatePolicy};
use crate::db::Store;
use crate::error::StoreError;
use crate::store::{Collection, Document, Filter, Projection, ID_FIELD};

/// Tenant field carried by every scoped document.
pub const GROUP_FIELD: &str = "groupId";

/// Device field carried by every event document.
pub const DEVICE_FIELD: &str = "deviceId";

/// The slice of the store a caller is allowed to see.
pub trait Scope: fmt::Debug + Send + Sync {
    /// Conditions carried by every read and delete.
    fn filter(&self) -> Filter;

    /// Conditions the stored record must meet for an update to apply.
    fn update_filter(&self, policy: UpdatePolicy) -> Filter {
        match policy {
            UpdatePolicy::Reassign => Filter::new(),
            UpdatePolicy::SameGroup => self.filter(),
        }
    }
}

/// Scope of users, devices and places: one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupScope {
    pub group_id: String,
}

impl GroupScope {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
        }
    }
}

impl Scope for GroupScope {
    fn filter(&self) -> Filter {
        Filter::new().eq(GROUP_FIELD, self.group_id.as_str())
    }
}

/// Scope of events: one device's events within one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceScope {
    pub group_id: String,
    pub device_id: String,
}

impl DeviceScope {
    pub fn new(group_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            device_id: device_id.into(),
        }
    }
}

impl Scope for DeviceScope {
    fn filter(&self) -> Filter {
        Filter::new()
            .eq(GROUP_FIELD, self.group_id.as_str())
            .eq(DEVICE_FIELD, self.device_id.as_str())
    }

    // An event's group is frozen at creation; it is never moved.
    fn update_filter(&self, _policy: UpdatePolicy) -> Filter {
        self.filter()
    }
}

/// A stored document that lives inside a scope.
pub trait ScopedDocument: Serialize + DeserializeOwned + Send + Sync {
    type Scope: Scope;

    /// Entity name for log messages.
    const KIND: &'static str;

    /// Fields omitted when reading a single document.
    const HIDDEN_ON_GET: &'static [&'static str];

    /// Fields omitted when listing documents.
    const HIDDEN_ON_LIST: &'static [&'static str];

    /// Configured collection holding this kind of document.
    fn collection_name(names: &CollectionNames) -> &str;

    /// Primary key as stored in `_id`.
    fn id(&self) -> String;

    /// Overwrites the scope fields with `scope`.
    fn assign_scope(&mut self, scope: &Self::Scope);
}

fn encode<D: Serialize>(doc: &D) -> Result<Document, StoreError> {
    match serde_json::to_value(doc)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Serialization(
            "document must serialize to a JSON object".to_string(),
        )),
    }
}

fn decode<D: DeserializeOwned>(doc: Document) -> Result<D, StoreError> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// Generic repository implementing the scoping rules once for every
/// document type.
pub struct ScopedRepository<'a, D> {
    store: &'a Store,
    marker: PhantomData<fn() -> D>,
}

impl<'a, D: ScopedDocument> ScopedRepository<'a, D> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    fn collection(&self) -> Collection<'a> {
        let store: &'a Store = self.store;
        Collection::new(store.name(), D::collection_name(store.collections()))
    }

    /// Reads one document by id within `scope`.
    pub async fn get(&self, scope: &D::Scope, id: &str) -> Result<D, StoreError> {
        let filter = scope.filter().eq(ID_FIELD, id);
        let found = self
            .store
            .backend()
            .find_one(self.collection(), &filter, &Projection::exclude(D::HIDDEN_ON_GET))
            .await?;

        match found {
            Some(doc) => decode(doc),
            None => {
                tracing::debug!(kind = D::KIND, id = %id, scope = ?scope, "Not found in scope");
                Err(StoreError::NotFound)
            }
        }
    }

    /// Lists every document within `scope`; empty when there are none.
    pub async fn list(&self, scope: &D::Scope) -> Result<Vec<D>, StoreError> {
        let docs = self
            .store
            .backend()
            .find(
                self.collection(),
                &scope.filter(),
                &Projection::exclude(D::HIDDEN_ON_LIST),
            )
            .await?;
        docs.into_iter().map(decode).collect()
    }

    /// Inserts `docs` into `scope` as one batch.
    pub async fn create(&self, scope: &D::Scope, docs: Vec<D>) -> Result<(), StoreError> {
        if docs.is_empty() {
            return Ok(());
        }

        let count = docs.len();
        let encoded = docs
            .into_iter()
            .map(|mut doc| {
                doc.assign_scope(scope);
                encode(&doc)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.store
            .backend()
            .insert(self.collection(), encoded)
            .await?;

        tracing::info!(kind = D::KIND, count, scope = ?scope, "Created");
        Ok(())
    }

    /// Replaces the stored fields of `doc` and moves it into `scope`.
    ///
    /// Which stored record may be targeted depends on the store's
    /// [`UpdatePolicy`] and the scope type.
    pub async fn update(&self, scope: &D::Scope, mut doc: D) -> Result<(), StoreError> {
        let id = doc.id();
        doc.assign_scope(scope);

        let filter = scope
            .update_filter(self.store.update_policy())
            .eq(ID_FIELD, id.as_str());
        let matched = self
            .store
            .backend()
            .update(self.collection(), &filter, encode(&doc)?)
            .await?;

        if matched == 0 {
            tracing::debug!(kind = D::KIND, id = %id, scope = ?scope, "Nothing to update");
            return Err(StoreError::NotFound);
        }

        tracing::info!(kind = D::KIND, id = %id, scope = ?scope, "Updated");
        Ok(())
    }

    /// Deletes one document by id within `scope`.
    pub async fn delete(&self, scope: &D::Scope, id: &str) -> Result<(), StoreError> {
        let filter = scope.filter().eq(ID_FIELD, id);
        let removed = self
            .store
            .backend()
            .remove(self.collection(), &filter)
            .await?;

        if removed == 0 {
            return Err(StoreError::NotFound);
        }

        tracing::info!(kind = D::KIND, id = %id, scope = ?scope, "Deleted");
        Ok(())
    }

    /// Reads the whole document by primary key, ignoring scopes.
    ///
    /// Only for authentication, where the group is not known yet.
    pub async fn find_by_id(&self, id: &str) -> Result<D, StoreError> {
        let found = self
            .store
            .backend()
            .find_one(self.collection(), &Filter::by_id(id), &Projection::all())
            .await?;
        found.map(decode::<D>).transpose()?.ok_or(StoreError::NotFound)
    }

    /// Distinct values of `field` among documents within `scope`.
    pub async fn distinct<S: Scope>(&self, scope: &S, field: &str) -> Result<Vec<Value>, StoreError> {
        self.store
            .backend()
            .distinct(self.collection(), field, &scope.filter())
            .await
    }
}
