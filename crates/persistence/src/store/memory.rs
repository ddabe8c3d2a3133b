//! In-process document store.
//!
//! Keeps collections in memory, for tests and for embedding the store
//! without a database server. A semaphore stands in for the connection
//! pool so that lease handling follows the same rules as the Postgres
//! backend.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};

use super::{Collection, Document, DocumentStore, Filter, Projection, ID_FIELD};
use crate::error::StoreError;

/// Default number of concurrent leases.
pub const DEFAULT_MAX_LEASES: usize = 16;

type Documents = BTreeMap<String, Document>;

/// Document store held entirely in memory.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Documents>>,
    leases: Semaphore,
    max_leases: usize,
    closed: AtomicBool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_max_leases(DEFAULT_MAX_LEASES)
    }

    pub fn with_max_leases(max_leases: usize) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            leases: Semaphore::new(max_leases),
            max_leases,
            closed: AtomicBool::new(false),
        }
    }

    /// Number of leases not currently held.
    pub fn available_leases(&self) -> usize {
        self.leases.available_permits()
    }

    pub fn max_leases(&self) -> usize {
        self.max_leases
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection, bypassing leases.
    pub async fn count(&self, collection: Collection<'_>) -> usize {
        self.collections
            .read()
            .await
            .get(&collection.to_string())
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    async fn lease(&self) -> Result<SemaphorePermit<'_>, StoreError> {
        if self.is_closed() {
            return Err(StoreError::Connection("store is closed".to_string()));
        }
        self.leases
            .acquire()
            .await
            .map_err(|_| StoreError::Connection("store is closed".to_string()))
    }
}

fn primary_key(doc: &Document) -> Result<String, StoreError> {
    match doc.get(ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Null) | None => Err(StoreError::Validation(
            "document has no primary key".to_string(),
        )),
        Some(Value::String(_)) => Err(StoreError::Validation(
            "document has an empty primary key".to_string(),
        )),
        Some(other) => Ok(other.to_string()),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError> {
        let _lease = self.lease().await?;
        let collections = self.collections.read().await;
        let docs = collections
            .get(&collection.to_string())
            .map(|docs| {
                docs.values()
                    .filter(|doc| filter.matches(doc))
                    .map(|doc| projection.apply(doc.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn find_one(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        let _lease = self.lease().await?;
        let collections = self.collections.read().await;
        Ok(collections.get(&collection.to_string()).and_then(|docs| {
            docs.values()
                .find(|doc| filter.matches(doc))
                .map(|doc| projection.apply(doc.clone()))
        }))
    }

    async fn insert(
        &self,
        collection: Collection<'_>,
        docs: Vec<Document>,
    ) -> Result<(), StoreError> {
        let _lease = self.lease().await?;
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection.to_string()).or_default();

        // All-or-nothing, like a single multi-row INSERT.
        let mut batch_keys = HashSet::with_capacity(docs.len());
        let mut keyed = Vec::with_capacity(docs.len());
        for doc in docs {
            let key = primary_key(&doc)?;
            if stored.contains_key(&key) || !batch_keys.insert(key.clone()) {
                return Err(StoreError::DuplicateKey(format!(
                    "{} already exists in {}",
                    key, collection
                )));
            }
            keyed.push((key, doc));
        }
        stored.extend(keyed);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError> {
        let _lease = self.lease().await?;
        let mut collections = self.collections.write().await;
        let Some(stored) = collections.get_mut(&collection.to_string()) else {
            return Ok(0);
        };
        let mut matched = 0;
        for doc in stored.values_mut().filter(|doc| filter.matches(doc)) {
            for (field, value) in &set {
                if field != ID_FIELD {
                    doc.insert(field.clone(), value.clone());
                }
            }
            matched += 1;
        }
        Ok(matched)
    }

    async fn remove(&self, collection: Collection<'_>, filter: &Filter) -> Result<u64, StoreError> {
        let _lease = self.lease().await?;
        let mut collections = self.collections.write().await;
        let Some(stored) = collections.get_mut(&collection.to_string()) else {
            return Ok(0);
        };
        let before = stored.len();
        stored.retain(|_, doc| !filter.matches(doc));
        Ok((before - stored.len()) as u64)
    }

    async fn distinct(
        &self,
        collection: Collection<'_>,
        field: &str,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let _lease = self.lease().await?;
        let collections = self.collections.read().await;
        let mut values: Vec<Value> = Vec::new();
        if let Some(stored) = collections.get(&collection.to_string()) {
            for value in stored
                .values()
                .filter(|doc| filter.matches(doc))
                .filter_map(|doc| doc.get(field))
                .filter(|value| !value.is_null())
            {
                if !values.contains(value) {
                    values.push(value.clone());
                }
            }
        }
        Ok(values)
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.leases.close();
    }
}
