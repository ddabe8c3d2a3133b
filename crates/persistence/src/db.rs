//! Store handle and connection pool management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::{CollectionNames, DatabaseConfig, StoreConfig, UpdatePolicy};
use crate::error::StoreError;
use crate::metrics::record_pool_metrics;
use crate::repositories::{DeviceRepository, EventRepository, PlaceRepository, UserRepository};
use crate::store::{Collection, DocumentStore, PgDocumentStore};

/// Creates a PostgreSQL connection pool with the given configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await
}

/// One logical database reachable through one connection pool.
///
/// Repositories borrow the handle and cannot outlive it. Whoever opened the
/// handle closes it once the repositories are done.
pub struct Store {
    backend: Arc<dyn DocumentStore>,
    name: String,
    collections: CollectionNames,
    update_policy: UpdatePolicy,
    closed: AtomicBool,
}

impl Store {
    /// Connects to Postgres as configured.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        config
            .validate()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let pool = create_pool(&config.database).await.map_err(|e| match e {
            sqlx::Error::Database(_) => StoreError::Connection(e.to_string()),
            other => StoreError::from(other),
        })?;
        record_pool_metrics(&pool);

        tracing::info!(database = %config.database.name, "Store opened");
        Ok(Self::with_backend(Arc::new(PgDocumentStore::new(pool)), config))
    }

    /// Wraps an already connected backend.
    pub fn with_backend(backend: Arc<dyn DocumentStore>, config: &StoreConfig) -> Self {
        Self {
            backend,
            name: config.database.name.clone(),
            collections: config.collections.clone(),
            update_policy: config.update_policy,
            closed: AtomicBool::new(false),
        }
    }

    /// Creates any missing collections.
    pub async fn prepare_collections(&self) -> Result<(), StoreError> {
        for name in self.collections.all() {
            self.backend
                .ensure_collection(Collection::new(&self.name, name))
                .await?;
        }
        Ok(())
    }

    /// Releases the underlying connections. Calling it again does nothing.
    pub async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.backend.close().await;
            tracing::info!(database = %self.name, "Store closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Logical database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        self.update_policy
    }

    pub(crate) fn backend(&self) -> &dyn DocumentStore {
        self.backend.as_ref()
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self)
    }

    pub fn devices(&self) -> DeviceRepository<'_> {
        DeviceRepository::new(self)
    }

    pub fn events(&self) -> EventRepository<'_> {
        EventRepository::new(self)
    }

    pub fn places(&self) -> PlaceRepository<'_> {
        PlaceRepository::new(self)
    }
}
