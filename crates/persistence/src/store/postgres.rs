//! PostgreSQL document store.
//!
//! A logical database maps to a Postgres schema and each collection to a
//! table `(id TEXT PRIMARY KEY, doc JSONB NOT NULL)`. Filters are JSONB
//! containment checks, so an equality filter `{"groupId": "g1"}` becomes
//! `doc @> '{"groupId": "g1"}'`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::{Collection, Document, DocumentStore, Filter, Projection};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

/// Document store backed by a Postgres connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Quoted `"schema"."table"` for a collection.
///
/// Names are restricted to ASCII alphanumerics and underscores when the
/// configuration is loaded; this re-checks before they reach SQL.
fn table_name(collection: Collection<'_>) -> Result<String, StoreError> {
    for part in [collection.database, collection.name] {
        if !is_identifier(part) {
            return Err(StoreError::Validation(format!(
                "invalid collection name: {}",
                collection
            )));
        }
    }
    Ok(format!("\"{}\".\"{}\"", collection.database, collection.name))
}

pub(crate) fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn into_document(value: Value) -> Result<Document, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[tracing::instrument(skip(self, collection, filter, projection), fields(collection = %collection))]
    async fn find(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Vec<Document>, StoreError> {
        let table = table_name(collection)?;
        let timer = QueryTimer::new("find", collection.name);
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_scalar::<_, Value>(&format!(
            "SELECT doc - $2::text[] FROM {} WHERE doc @> $1::jsonb ORDER BY id",
            table
        ))
        .bind(filter.to_value())
        .bind(projection.excluded().to_vec())
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        rows?.into_iter().map(into_document).collect()
    }

    #[tracing::instrument(skip(self, collection, filter, projection), fields(collection = %collection))]
    async fn find_one(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        projection: &Projection,
    ) -> Result<Option<Document>, StoreError> {
        let table = table_name(collection)?;
        let timer = QueryTimer::new("find_one", collection.name);
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_scalar::<_, Value>(&format!(
            "SELECT doc - $2::text[] FROM {} WHERE doc @> $1::jsonb ORDER BY id LIMIT 1",
            table
        ))
        .bind(filter.to_value())
        .bind(projection.excluded().to_vec())
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        row?.map(into_document).transpose()
    }

    #[tracing::instrument(skip(self, collection, docs), fields(collection = %collection, count = docs.len()))]
    async fn insert(
        &self,
        collection: Collection<'_>,
        docs: Vec<Document>,
    ) -> Result<(), StoreError> {
        let table = table_name(collection)?;
        let batch = Value::Array(docs.into_iter().map(Value::Object).collect());
        let timer = QueryTimer::new("insert", collection.name);
        let mut conn = self.pool.acquire().await?;
        // One statement, so the batch lands or fails as a whole.
        let result = sqlx::query(&format!(
            "INSERT INTO {} (id, doc) SELECT d->>'_id', d FROM jsonb_array_elements($1::jsonb) AS d",
            table
        ))
        .bind(batch)
        .execute(&mut *conn)
        .await;
        timer.record();
        result?;
        Ok(())
    }

    #[tracing::instrument(skip(self, collection, filter, set), fields(collection = %collection))]
    async fn update(
        &self,
        collection: Collection<'_>,
        filter: &Filter,
        mut set: Document,
    ) -> Result<u64, StoreError> {
        let table = table_name(collection)?;
        set.remove(super::ID_FIELD);
        let timer = QueryTimer::new("update", collection.name);
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(&format!(
            "UPDATE {} SET doc = doc || $2::jsonb WHERE doc @> $1::jsonb",
            table
        ))
        .bind(filter.to_value())
        .bind(Value::Object(set))
        .execute(&mut *conn)
        .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    #[tracing::instrument(skip(self, collection, filter), fields(collection = %collection))]
    async fn remove(&self, collection: Collection<'_>, filter: &Filter) -> Result<u64, StoreError> {
        let table = table_name(collection)?;
        let timer = QueryTimer::new("remove", collection.name);
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE doc @> $1::jsonb", table))
            .bind(filter.to_value())
            .execute(&mut *conn)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    #[tracing::instrument(skip(self, collection, filter), fields(collection = %collection))]
    async fn distinct(
        &self,
        collection: Collection<'_>,
        field: &str,
        filter: &Filter,
    ) -> Result<Vec<Value>, StoreError> {
        let table = table_name(collection)?;
        let timer = QueryTimer::new("distinct", collection.name);
        let mut conn = self.pool.acquire().await?;
        let values = sqlx::query_scalar::<_, Value>(&format!(
            "SELECT DISTINCT doc -> $1::text FROM {} \
             WHERE doc @> $2::jsonb AND jsonb_typeof(doc -> $1::text) <> 'null'",
            table
        ))
        .bind(field)
        .bind(filter.to_value())
        .fetch_all(&mut *conn)
        .await;
        timer.record();
        Ok(values?)
    }

    async fn ensure_collection(&self, collection: Collection<'_>) -> Result<(), StoreError> {
        let table = table_name(collection)?;
        let mut conn = self.pool.acquire().await?;
        sqlx::query(&format!(
            "CREATE SCHEMA IF NOT EXISTS \"{}\"",
            collection.database
        ))
        .execute(&mut *conn)
        .await?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY, doc JSONB NOT NULL)",
            table
        ))
        .execute(&mut *conn)
        .await?;
        tracing::info!(collection = %collection, "Collection ready");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
