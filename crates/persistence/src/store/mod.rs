//! Document store abstraction.
//!
//! Repositories talk to the backing store only through [`DocumentStore`]:
//! find, insert, update, remove and distinct over named collections of
//! JSON documents keyed by `_id`. Each call is one logical operation on
//! one leased connection.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreError;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// A stored document.
pub type Document = Map<String, Value>;

/// Primary key field of every collection.
pub const ID_FIELD: &str = "_id";

/// A named collection inside a logical database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection<'a> {
    pub database: &'a str,
    pub name: &'a str,
}

impl<'a> Collection<'a> {
    pub fn new(database: &'a str, name: &'a str) -> Self {
        Self { database, name }
    }
}

impl fmt::Display for Collection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.name)
    }
}

/// Conjunction of top-level equality conditions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Document,
}

impl Filter {
    /// An empty filter; matches every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the primary key alone.
    pub fn by_id(id: impl Into<Value>) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Adds `field == value`, replacing an earlier condition on `field`.
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.to_string(), value.into());
        self
    }

    pub fn conditions(&self) -> &Document {
        &self.conditions
    }

    /// Returns `true` if every condition holds for `doc`.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// The filter as a JSON object, suitable for JSONB containment.
    pub fn to_value(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

/// Fields to leave out of returned documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Projection {
    /// Returns whole documents.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn exclude(fields: &[&str]) -> Self {
        Self {
            excluded: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn apply(&self, mut doc: Document) -> Document {
        for field in &self.excluded {
            doc.remove(field);
        }
        doc
    }
}

/// Primitive operations of a document store.
///
/// Implementations acquire a connection lease for the duration of a single
/// call and release it before returning, on success and on error alike.
/// Nothing is retried.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns all documents matching `filter`, in primary key order.
    async fn find(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError>;

    /// Returns the first document matching `filter`, if any.
    async fn find_one(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError>;

    /// Inserts `docs` in one batch. A primary key collision fails the call
    /// with [`StoreError::DuplicateKey`].
    async fn insert(&self, collection: Collection<'_>, docs: Vec<Document>)
        -> Result<(), StoreError>;

    /// Merges the top-level fields of `set` into every document matching
    /// `filter` and returns the number of matched documents.
    async fn update(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        set: Document,
    ) -> Result<u64, StoreError>;

    /// Removes documents matching `filter` and returns how many were removed.
    async fn remove(&self, collection: Collection<'_>, filter: &Filter) -> Result<u64, StoreError>;

    /// Distinct non-null values of `field` among documents matching `filter`.
    async fn distinct(
        &self,
        collection: Collection<'_>,
        field: &str,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError>;

    /// Creates the collection if the backend needs it to exist up front.
    async fn ensure_collection(&self, _collection: Collection<'_>) -> Result<(), StoreError> {
        Ok(())
    }

    /// Releases the underlying connections.
    async fn close(&self);
}
