//! Common test utilities for integration tests.
//!
//! Stores built here use the in-memory backend unless a test asks for
//! Postgres explicitly through [`pg_store`].

#![allow(dead_code)]

use std::sync::Arc;

use domain::models::{Circle, Device, Point, Polygon, User};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use persistence::store::MemoryDocumentStore;
use persistence::{Store, StoreConfig};

/// Test configuration with the given overrides applied.
pub fn test_config(overrides: &[(&str, &str)]) -> StoreConfig {
    StoreConfig::load_for_test(overrides).expect("Failed to build test config")
}

/// A store over a fresh in-memory backend.
pub fn memory_store() -> Store {
    memory_store_with(&[]).0
}

/// A store plus its backend, for tests that inspect leases or counts.
pub fn memory_store_with(overrides: &[(&str, &str)]) -> (Store, Arc<MemoryDocumentStore>) {
    let backend = Arc::new(MemoryDocumentStore::new());
    let store = Store::with_backend(backend.clone(), &test_config(overrides));
    (store, backend)
}

/// A store connected to `TEST_DATABASE_URL`, or `None` when it is unset.
///
/// Each call uses its own schema so tests never see each other's data.
pub async fn pg_store() -> Option<Store> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let schema = format!("geotrace_test_{}", uuid::Uuid::new_v4().simple());
    let config = test_config(&[("database.url", &url), ("database.name", &schema)]);

    let store = Store::open(&config)
        .await
        .expect("Failed to connect to test database");
    store
        .prepare_collections()
        .await
        .expect("Failed to create test collections");
    Some(store)
}

/// Generate a unique group id.
pub fn unique_group() -> String {
    format!("group_{}", uuid::Uuid::new_v4().simple())
}

/// Generate a unique login for testing.
pub fn unique_login() -> String {
    let email: String = SafeEmail().fake();
    format!("{}_{}", uuid::Uuid::new_v4().simple(), email)
}

pub fn test_user(login: &str, password: &str) -> User {
    let name: String = Name().fake();
    let mut user = User::new(login).with_name(name);
    user.set_password(password).expect("Failed to hash password");
    user
}

pub fn test_device(id: &str) -> Device {
    Device::new(id).with_name("Test phone").with_type("android")
}

pub fn home_circle() -> Circle {
    Circle::new(Point::new(88.9283429834, 55.3980239842), 500.0)
}

pub fn office_polygon() -> Polygon {
    Polygon::new(vec![
        Point::new(37.60, 55.70),
        Point::new(37.70, 55.70),
        Point::new(37.65, 55.80),
    ])
}
